mod collection;
mod error;
mod key;
mod memory;
pub mod modifier;
mod selector;

pub use bson::{Bson, Document};
pub use collection::{Collection, Database, WriteAck, WriteOptions};
pub use error::CollectionError;
pub use memory::{MemoryCollection, MemoryDatabase};
pub use quarry_store::StoreError;
