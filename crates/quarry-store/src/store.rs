use crate::error::StoreError;

/// A set of named, ordered byte maps ("column families") with snapshot
/// transactions over them.
pub trait Store {
    type Txn<'a>: Transaction
    where
        Self: 'a;

    fn begin(&self, read_only: bool) -> Result<Self::Txn<'_>, StoreError>;
    /// Creating a column family that already exists is a no-op.
    fn create_cf(&self, name: &str) -> Result<(), StoreError>;
    fn has_cf(&self, name: &str) -> bool;
}

pub trait Transaction {
    type Cf: Clone;

    fn cf(&self, name: &str) -> Result<Self::Cf, StoreError>;

    fn get(&self, cf: &Self::Cf, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;
    /// Every record in the column family, in key order, as seen by this
    /// transaction.
    fn scan<'t>(
        &'t self,
        cf: &Self::Cf,
    ) -> Result<Box<dyn Iterator<Item = (Vec<u8>, Vec<u8>)> + 't>, StoreError>;
    fn put(&self, cf: &Self::Cf, key: &[u8], value: &[u8]) -> Result<(), StoreError>;

    fn commit(self) -> Result<(), StoreError>;
    /// Drop the transaction's writes.
    fn rollback(self);
}
