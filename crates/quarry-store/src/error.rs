use std::fmt;
use std::sync::PoisonError;

#[derive(Debug)]
pub enum StoreError {
    /// A write was attempted through a read-only transaction.
    ReadOnly,
    UnknownColumnFamily(String),
    /// The backend itself failed: a poisoned lock in memory, I/O elsewhere.
    Backend(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadOnly => write!(f, "write through a read-only transaction"),
            Self::UnknownColumnFamily(name) => write!(f, "no column family named '{name}'"),
            Self::Backend(msg) => write!(f, "backend failure: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl<T> From<PoisonError<T>> for StoreError {
    fn from(e: PoisonError<T>) -> Self {
        Self::Backend(e.to_string())
    }
}
