use bson::Document;
use serde::{Deserialize, Serialize};

use crate::error::CollectionError;

/// Per-call write settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteOptions {
    /// Wait for the store to confirm the write and report its failures.
    #[serde(default)]
    pub safe: bool,
}

/// What the store said about a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteAck {
    /// Safe write. `n` is the number of documents inserted or matched.
    Acknowledged { n: u64 },
    /// Fire-and-forget write; the outcome is unknown to the caller.
    Unacknowledged,
}

/// Handle to a single named collection. The only thing that issues writes.
pub trait Collection {
    fn name(&self) -> &str;

    fn insert(&self, attributes: &Document, options: &WriteOptions)
    -> Result<WriteAck, CollectionError>;

    fn update(
        &self,
        selector: &Document,
        modifier: &Document,
        options: &WriteOptions,
    ) -> Result<WriteAck, CollectionError>;
}

/// Resolves collection handles by name.
pub trait Database {
    type Collection: Collection;

    fn collection(&self, name: &str) -> Self::Collection;
}
