use std::sync::Arc;

use bson::oid::ObjectId;
use bson::{Bson, Document, RawDocumentBuf};
use quarry_store::{MemoryStore, Store, Transaction};

use crate::collection::{Collection, Database, WriteAck, WriteOptions};
use crate::error::CollectionError;
use crate::key::encode_id;
use crate::modifier::parse_modifier;
use crate::selector::Selector;

/// In-process database backed by a [`MemoryStore`].
///
/// Every collection is a column family of BSON records keyed by `_id`.
/// Cloning shares the underlying store.
#[derive(Clone, Default)]
pub struct MemoryDatabase {
    store: Arc<MemoryStore>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether anything has ever been written to the named collection.
    pub fn has_collection(&self, name: &str) -> bool {
        self.store.has_cf(name)
    }
}

impl Database for MemoryDatabase {
    type Collection = MemoryCollection;

    fn collection(&self, name: &str) -> MemoryCollection {
        MemoryCollection {
            name: name.to_string(),
            store: Arc::clone(&self.store),
        }
    }
}

#[derive(Clone)]
pub struct MemoryCollection {
    name: String,
    store: Arc<MemoryStore>,
}

impl MemoryCollection {
    /// Look a document up by `_id`.
    pub fn find_by_id(&self, id: &Bson) -> Result<Option<Document>, CollectionError> {
        if !self.store.has_cf(&self.name) {
            return Ok(None);
        }
        let key = encode_id(id)?;
        let txn = self.store.begin(true)?;
        let cf = txn.cf(&self.name)?;
        txn.get(&cf, &key)?.map(|bytes| decode(&bytes)).transpose()
    }

    /// First document, in `_id` order, matching an equality selector.
    pub fn find_one(&self, selector: &Document) -> Result<Option<Document>, CollectionError> {
        let selector = Selector::parse(selector)?;
        if let Some(id) = selector.id() {
            return Ok(self.find_by_id(id)?.filter(|doc| selector.matches(doc)));
        }
        if !self.store.has_cf(&self.name) {
            return Ok(None);
        }
        let txn = self.store.begin(true)?;
        let cf = txn.cf(&self.name)?;
        for (_, bytes) in txn.scan(&cf)? {
            let doc = decode(&bytes)?;
            if selector.matches(&doc) {
                return Ok(Some(doc));
            }
        }
        Ok(None)
    }

    pub fn count(&self) -> Result<u64, CollectionError> {
        if !self.store.has_cf(&self.name) {
            return Ok(0);
        }
        let txn = self.store.begin(true)?;
        let cf = txn.cf(&self.name)?;
        Ok(txn.scan(&cf)?.count() as u64)
    }

    fn insert_record(&self, attributes: &Document) -> Result<u64, CollectionError> {
        let mut doc = attributes.clone();
        if !doc.contains_key("_id") {
            doc.insert("_id", ObjectId::new());
        }
        let id = doc.get("_id").cloned().unwrap_or(Bson::Null);
        let key = encode_id(&id)?;
        let bytes = RawDocumentBuf::try_from(&doc)?;

        self.store.create_cf(&self.name)?;
        let txn = self.store.begin(false)?;
        let cf = txn.cf(&self.name)?;
        if txn.get(&cf, &key)?.is_some() {
            txn.rollback();
            return Err(CollectionError::DuplicateKey(id.to_string()));
        }
        txn.put(&cf, &key, bytes.as_bytes())?;
        txn.commit()?;
        Ok(1)
    }

    fn update_record(&self, selector: &Document, modifier: &Document) -> Result<u64, CollectionError> {
        let selector = Selector::parse(selector)?;
        let modifier =
            parse_modifier(modifier).map_err(|e| CollectionError::InvalidModifier(e.0))?;
        if !self.store.has_cf(&self.name) {
            return Ok(0);
        }

        let txn = self.store.begin(false)?;
        let cf = txn.cf(&self.name)?;
        let target = match selector.id() {
            Some(id) => {
                let key = encode_id(id)?;
                match txn.get(&cf, &key)? {
                    Some(bytes) => {
                        let doc = decode(&bytes)?;
                        selector.matches(&doc).then_some((key, doc))
                    }
                    None => None,
                }
            }
            None => {
                let mut found = None;
                for (key, bytes) in txn.scan(&cf)? {
                    let doc = decode(&bytes)?;
                    if selector.matches(&doc) {
                        found = Some((key, doc));
                        break;
                    }
                }
                found
            }
        };

        let Some((key, mut doc)) = target else {
            txn.rollback();
            return Ok(0);
        };

        let changed = modifier
            .apply(&mut doc)
            .map_err(|e| CollectionError::TypeMismatch(e.0))?;
        if changed {
            let bytes = RawDocumentBuf::try_from(&doc)?;
            txn.put(&cf, &key, bytes.as_bytes())?;
            txn.commit()?;
        } else {
            txn.rollback();
        }
        Ok(1)
    }

    /// Shape a write outcome according to the write's safety.
    fn acknowledge(
        &self,
        operation: &str,
        outcome: Result<u64, CollectionError>,
        options: &WriteOptions,
    ) -> Result<WriteAck, CollectionError> {
        match outcome {
            Ok(n) if options.safe => Ok(WriteAck::Acknowledged { n }),
            Ok(_) => Ok(WriteAck::Unacknowledged),
            Err(e) if !options.safe && e.is_write_error() => {
                tracing::warn!(
                    collection = %self.name,
                    operation,
                    error = %e,
                    "unacknowledged write failed"
                );
                Ok(WriteAck::Unacknowledged)
            }
            Err(e) => Err(e),
        }
    }
}

impl Collection for MemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    fn insert(
        &self,
        attributes: &Document,
        options: &WriteOptions,
    ) -> Result<WriteAck, CollectionError> {
        let outcome = self.insert_record(attributes);
        self.acknowledge("insert", outcome, options)
    }

    fn update(
        &self,
        selector: &Document,
        modifier: &Document,
        options: &WriteOptions,
    ) -> Result<WriteAck, CollectionError> {
        let outcome = self.update_record(selector, modifier);
        self.acknowledge("update", outcome, options)
    }
}

fn decode(bytes: &[u8]) -> Result<Document, CollectionError> {
    Ok(bson::deserialize_from_slice(bytes)?)
}
