use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use arc_swap::ArcSwap;
use imbl::OrdMap;

use crate::error::StoreError;
use crate::store::Store;

use super::transaction::MemoryTransaction;

pub(crate) type ColumnFamily = OrdMap<Vec<u8>, Vec<u8>>;

/// Ordered in-memory store.
///
/// Column families are persistent `OrdMap`s behind an `ArcSwap`, so a reader
/// takes a structurally shared copy and never blocks. One write transaction
/// runs at a time; on commit it swaps in the maps it changed.
#[derive(Default)]
pub struct MemoryStore {
    cfs: RwLock<HashMap<String, Arc<ArcSwap<ColumnFamily>>>>,
    writer: Mutex<()>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn load(&self, name: &str) -> Result<Arc<ColumnFamily>, StoreError> {
        let cfs = self.cfs.read()?;
        cfs.get(name)
            .map(|cf| cf.load_full())
            .ok_or_else(|| StoreError::UnknownColumnFamily(name.to_string()))
    }

    /// Column families are never removed, so every name here still resolves.
    pub(crate) fn publish(
        &self,
        changed: impl IntoIterator<Item = (String, Arc<ColumnFamily>)>,
    ) -> Result<(), StoreError> {
        let cfs = self.cfs.read()?;
        for (name, data) in changed {
            let cf = cfs
                .get(&name)
                .ok_or_else(|| StoreError::UnknownColumnFamily(name.clone()))?;
            cf.store(data);
        }
        Ok(())
    }
}

impl Store for MemoryStore {
    type Txn<'a> = MemoryTransaction<'a>;

    fn begin(&self, read_only: bool) -> Result<Self::Txn<'_>, StoreError> {
        let writer = if read_only {
            None
        } else {
            Some(self.writer.lock()?)
        };
        Ok(MemoryTransaction::new(self, writer))
    }

    fn create_cf(&self, name: &str) -> Result<(), StoreError> {
        if self.has_cf(name) {
            return Ok(());
        }
        let mut cfs = self.cfs.write()?;
        cfs.entry(name.to_string())
            .or_insert_with(|| Arc::new(ArcSwap::from_pointee(OrdMap::new())));
        Ok(())
    }

    fn has_cf(&self, name: &str) -> bool {
        let cfs = self.cfs.read().unwrap_or_else(PoisonError::into_inner);
        cfs.contains_key(name)
    }
}
