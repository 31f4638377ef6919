use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::{Arc, MutexGuard};

use crate::error::StoreError;
use crate::store::Transaction;

use super::store::{ColumnFamily, MemoryStore};

/// Name of a column family the transaction has loaded.
#[derive(Clone, Debug)]
pub struct MemoryCf {
    name: String,
}

/// A column family as this transaction sees it.
struct View {
    data: Arc<ColumnFamily>,
    changed: bool,
}

/// Snapshot transaction over a [`MemoryStore`].
///
/// Each column family is pinned the first time `cf` names it; later commits
/// by other writers are not seen. Writes go to a private copy and become
/// visible to others only on `commit`.
pub struct MemoryTransaction<'a> {
    store: &'a MemoryStore,
    views: RefCell<HashMap<String, View>>,
    /// `Some` for write transactions: the store's single-writer lock.
    writer: Option<MutexGuard<'a, ()>>,
}

impl<'a> MemoryTransaction<'a> {
    pub(crate) fn new(store: &'a MemoryStore, writer: Option<MutexGuard<'a, ()>>) -> Self {
        Self {
            store,
            views: RefCell::new(HashMap::new()),
            writer,
        }
    }

    fn view<T>(
        &self,
        cf: &MemoryCf,
        f: impl FnOnce(&ColumnFamily) -> T,
    ) -> Result<T, StoreError> {
        let views = self.views.borrow();
        let view = views
            .get(&cf.name)
            .ok_or_else(|| StoreError::UnknownColumnFamily(cf.name.clone()))?;
        Ok(f(&*view.data))
    }
}

impl Transaction for MemoryTransaction<'_> {
    type Cf = MemoryCf;

    fn cf(&self, name: &str) -> Result<MemoryCf, StoreError> {
        let mut views = self.views.borrow_mut();
        if !views.contains_key(name) {
            let data = self.store.load(name)?;
            views.insert(
                name.to_string(),
                View {
                    data,
                    changed: false,
                },
            );
        }
        Ok(MemoryCf {
            name: name.to_string(),
        })
    }

    fn get(&self, cf: &MemoryCf, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        self.view(cf, |data| data.get(key).cloned())
    }

    fn scan<'t>(
        &'t self,
        cf: &MemoryCf,
    ) -> Result<Box<dyn Iterator<Item = (Vec<u8>, Vec<u8>)> + 't>, StoreError> {
        // OrdMap clones share structure; iterating the clone leaves the view free.
        let data = self.view(cf, ColumnFamily::clone)?;
        Ok(Box::new(data.into_iter()))
    }

    fn put(&self, cf: &MemoryCf, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        if self.writer.is_none() {
            return Err(StoreError::ReadOnly);
        }
        let mut views = self.views.borrow_mut();
        let view = views
            .get_mut(&cf.name)
            .ok_or_else(|| StoreError::UnknownColumnFamily(cf.name.clone()))?;
        Arc::make_mut(&mut view.data).insert(key.to_vec(), value.to_vec());
        view.changed = true;
        Ok(())
    }

    fn commit(self) -> Result<(), StoreError> {
        let changed = self
            .views
            .into_inner()
            .into_iter()
            .filter(|(_, view)| view.changed)
            .map(|(name, view)| (name, view.data));
        // Published while `self.writer` is still held.
        self.store.publish(changed)
    }

    fn rollback(self) {}
}
