use std::fmt;

use quarry_collection::CollectionError;

use crate::document::{Document, Model};

#[derive(Debug)]
pub enum OdmError {
    /// The collection handle failed the write. Never retried.
    Collection(CollectionError),
    Bson(bson::error::Error),
    ImmutableId,
    UnsupportedNesting(String),
    Config(String),
}

impl fmt::Display for OdmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Collection(e) => write!(f, "collection error: {e}"),
            Self::Bson(e) => write!(f, "bson: {e}"),
            Self::ImmutableId => write!(f, "_id cannot be changed"),
            Self::UnsupportedNesting(msg) => write!(f, "unsupported nesting: {msg}"),
            Self::Config(msg) => write!(f, "invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for OdmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Collection(e) => Some(e),
            Self::Bson(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CollectionError> for OdmError {
    fn from(e: CollectionError) -> Self {
        Self::Collection(e)
    }
}

impl From<bson::error::Error> for OdmError {
    fn from(e: bson::error::Error) -> Self {
        Self::Bson(e)
    }
}

/// A failed persist. Carries the document back so the caller can retry or
/// inspect it; the document is still a new record.
pub struct PersistError<M: Model> {
    error: OdmError,
    document: Document<M>,
}

impl<M: Model> PersistError<M> {
    pub(crate) fn new(error: impl Into<OdmError>, document: Document<M>) -> Self {
        Self {
            error: error.into(),
            document,
        }
    }

    pub fn error(&self) -> &OdmError {
        &self.error
    }

    pub fn document(&self) -> &Document<M> {
        &self.document
    }

    pub fn into_document(self) -> Document<M> {
        self.document
    }

    pub fn into_parts(self) -> (OdmError, Document<M>) {
        (self.error, self.document)
    }
}

impl<M: Model> fmt::Debug for PersistError<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistError")
            .field("error", &self.error)
            .field("document", &self.document)
            .finish()
    }
}

impl<M: Model> fmt::Display for PersistError<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "persist {} {}: {}", M::NAME, self.document.id(), self.error)
    }
}

impl<M: Model> std::error::Error for PersistError<M> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl<M: Model> From<PersistError<M>> for OdmError {
    fn from(e: PersistError<M>) -> Self {
        e.error
    }
}
