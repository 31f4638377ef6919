use std::fmt;

use quarry_store::StoreError;

#[derive(Debug)]
pub enum CollectionError {
    Store(StoreError),
    Bson(bson::error::Error),
    DuplicateKey(String),
    InvalidId(String),
    InvalidSelector(String),
    InvalidModifier(String),
    TypeMismatch(String),
}

impl CollectionError {
    /// Failures the store reports back to the writer rather than failures to
    /// reach it. Unacknowledged writes never see these.
    pub fn is_write_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicateKey(_)
                | Self::InvalidId(_)
                | Self::InvalidSelector(_)
                | Self::InvalidModifier(_)
                | Self::TypeMismatch(_)
        )
    }
}

impl fmt::Display for CollectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Store(e) => write!(f, "store error: {e}"),
            Self::Bson(e) => write!(f, "bson: {e}"),
            Self::DuplicateKey(id) => write!(f, "duplicate key: {id}"),
            Self::InvalidId(msg) => write!(f, "invalid _id: {msg}"),
            Self::InvalidSelector(msg) => write!(f, "invalid selector: {msg}"),
            Self::InvalidModifier(msg) => write!(f, "invalid modifier: {msg}"),
            Self::TypeMismatch(msg) => write!(f, "type mismatch: {msg}"),
        }
    }
}

impl std::error::Error for CollectionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store(e) => Some(e),
            Self::Bson(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for CollectionError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

impl From<bson::error::Error> for CollectionError {
    fn from(e: bson::error::Error) -> Self {
        Self::Bson(e)
    }
}
