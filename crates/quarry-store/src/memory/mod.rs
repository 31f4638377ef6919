mod store;
mod transaction;

pub use store::MemoryStore;
pub use transaction::{MemoryCf, MemoryTransaction};
