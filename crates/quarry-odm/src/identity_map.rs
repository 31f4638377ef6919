use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use bson::Bson;

use crate::document::{Document, Model};

/// Hashable form of an `_id`. The BSON type is part of the key, so `1_i32`,
/// `1_i64` and `"1"` are three different ids, as they are for the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum IdKey {
    ObjectId([u8; 12]),
    String(String),
    Int32(i32),
    Int64(i64),
    Other(u8, String),
}

impl From<&Bson> for IdKey {
    fn from(id: &Bson) -> Self {
        match id {
            Bson::ObjectId(oid) => IdKey::ObjectId(oid.bytes()),
            Bson::String(s) => IdKey::String(s.clone()),
            Bson::Int32(n) => IdKey::Int32(*n),
            Bson::Int64(n) => IdKey::Int64(*n),
            other => IdKey::Other(other.element_type() as u8, other.to_string()),
        }
    }
}

type Entry = Arc<dyn Any + Send + Sync>;

/// Registry of persisted documents keyed by (model name, `_id`).
///
/// Writes are last-writer-wins. Entries are never evicted; the owner of the
/// unit of work calls [`clear`](IdentityMap::clear) at its boundary. While
/// disabled, `set` does nothing and `get` always misses.
pub struct IdentityMap {
    enabled: AtomicBool,
    entries: RwLock<HashMap<(&'static str, IdKey), Entry>>,
}

impl IdentityMap {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    pub fn enable(&self) {
        self.enabled.store(true, Ordering::Release);
    }

    /// Registered entries stay in place and become visible again on `enable`.
    pub fn disable(&self) {
        self.enabled.store(false, Ordering::Release);
    }

    pub fn get<M: Model>(&self, id: &Bson) -> Option<Arc<Document<M>>> {
        if !self.is_enabled() {
            return None;
        }
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.get(&(M::NAME, IdKey::from(id)))?;
        Arc::clone(entry).downcast::<Document<M>>().ok()
    }

    /// Register a snapshot of `document`, replacing any earlier entry.
    pub fn set<M: Model>(&self, document: &Document<M>) {
        if !self.is_enabled() {
            return;
        }
        let key = (M::NAME, IdKey::from(document.id()));
        let entry: Entry = Arc::new(document.clone());
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key, entry);
        tracing::debug!(model = M::NAME, id = %document.id(), "registered in identity map");
    }

    pub fn remove<M: Model>(&self, id: &Bson) -> Option<Arc<Document<M>>> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.remove(&(M::NAME, IdKey::from(id)))?;
        entry.downcast::<Document<M>>().ok()
    }

    pub fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.clear();
    }

    pub fn len(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for IdentityMap {
    fn default() -> Self {
        Self::new(false)
    }
}
