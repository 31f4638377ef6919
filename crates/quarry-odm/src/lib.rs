mod config;
mod document;
mod error;
mod identity_map;
pub mod operations;
mod session;
pub mod validation;

pub use config::OdmConfig;
pub use document::{Document, DocumentKind, Model};
pub use error::{OdmError, PersistError};
pub use identity_map::IdentityMap;
pub use operations::{Insert, InsertOptions};
pub use quarry_collection::{Collection, Database, WriteAck, WriteOptions};
pub use session::Session;
pub use validation::{Validatable, ValidationErrors};
