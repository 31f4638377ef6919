use quarry_collection::Database;

use crate::config::OdmConfig;
use crate::document::{Document, Model};
use crate::error::PersistError;
use crate::identity_map::IdentityMap;
use crate::operations::{Insert, InsertOptions};

/// A unit of work: a database, the settings in force, and the identity map
/// documents persisted through it are registered in.
pub struct Session<D: Database> {
    database: D,
    config: OdmConfig,
    identity_map: IdentityMap,
}

impl<D: Database> Session<D> {
    pub fn new(database: D, config: OdmConfig) -> Self {
        Self {
            database,
            identity_map: IdentityMap::new(config.identity_map_enabled),
            config,
        }
    }

    pub fn database(&self) -> &D {
        &self.database
    }

    pub fn config(&self) -> &OdmConfig {
        &self.config
    }

    pub fn identity_map(&self) -> &IdentityMap {
        &self.identity_map
    }

    /// Validate and write a new document with the session defaults.
    pub fn insert<M: Model>(
        &self,
        document: Document<M>,
    ) -> Result<Document<M>, PersistError<M>> {
        Insert::new(document, self).persist()
    }

    pub fn insert_with<M: Model>(
        &self,
        document: Document<M>,
        options: InsertOptions,
    ) -> Result<Document<M>, PersistError<M>> {
        Insert::with_options(document, self, options).persist()
    }
}
