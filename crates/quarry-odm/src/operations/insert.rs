use bson::doc;
use quarry_collection::{Collection, Database, WriteOptions};
use serde::{Deserialize, Serialize};

use crate::document::{Document, DocumentKind, Model};
use crate::error::PersistError;
use crate::identity_map::IdentityMap;
use crate::session::Session;
use crate::validation::Validatable;

/// Caller overrides for a single insert. `None` keeps the session default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertOptions {
    #[serde(default)]
    pub safe: Option<bool>,
    #[serde(default)]
    pub validate: Option<bool>,
}

/// Writes a new document.
///
/// Root documents are inserted into their collection. Embedded documents are
/// pushed onto their parent's array field with
/// `update({_id: parent}, {$push: {field: attributes}})`.
pub struct Insert<'s, M: Model, D: Database> {
    document: Document<M>,
    collection: D::Collection,
    validating: bool,
    options: WriteOptions,
    identity_map: &'s IdentityMap,
}

impl<'s, M: Model, D: Database> Insert<'s, M, D> {
    pub fn new(document: Document<M>, session: &'s Session<D>) -> Self {
        Self::with_options(document, session, InsertOptions::default())
    }

    pub fn with_options(
        document: Document<M>,
        session: &'s Session<D>,
        options: InsertOptions,
    ) -> Self {
        let collection = session.database().collection(document.collection());
        Self {
            document,
            collection,
            validating: options.validate.unwrap_or(true),
            options: WriteOptions {
                safe: options
                    .safe
                    .unwrap_or(session.config().persist_in_safe_mode),
            },
            identity_map: session.identity_map(),
        }
    }

    /// Turn the validation gate on or off.
    pub fn validating(mut self, validating: bool) -> Self {
        self.validating = validating;
        self
    }

    pub fn document(&self) -> &Document<M> {
        &self.document
    }

    pub fn collection(&self) -> &D::Collection {
        &self.collection
    }

    pub fn is_validating(&self) -> bool {
        self.validating
    }

    pub fn options(&self) -> &WriteOptions {
        &self.options
    }

    /// Run the insert and hand the document back.
    ///
    /// An invalid document comes back untouched apart from its `errors()`,
    /// still a new record, and nothing is written. A collection failure comes
    /// back as a [`PersistError`] holding the unchanged document; the identity
    /// map is left alone.
    pub fn persist(self) -> Result<Document<M>, PersistError<M>> {
        let Insert {
            mut document,
            collection,
            validating,
            options,
            identity_map,
        } = self;

        if validating {
            if let Err(errors) = document.validate() {
                tracing::debug!(
                    model = M::NAME,
                    id = %document.id(),
                    %errors,
                    "validation failed, skipping insert"
                );
                document.set_errors(errors);
                return Ok(document);
            }
        }
        document.set_errors(Default::default());

        let written = match document.kind() {
            DocumentKind::Root { .. } => {
                tracing::trace!(
                    model = M::NAME,
                    collection = collection.name(),
                    safe = options.safe,
                    "insert"
                );
                collection.insert(document.raw_attributes(), &options)
            }
            DocumentKind::Embedded {
                parent_id, field, ..
            } => {
                tracing::trace!(
                    model = M::NAME,
                    collection = collection.name(),
                    field = field.as_str(),
                    safe = options.safe,
                    "push into parent"
                );
                let selector = doc! { "_id": parent_id.clone() };
                let mut push = bson::Document::new();
                push.insert(field.clone(), document.raw_attributes().clone());
                collection.update(&selector, &doc! { "$push": push }, &options)
            }
        };
        if let Err(e) = written {
            return Err(PersistError::new(e, document));
        }

        document.set_new_record(false);
        identity_map.set(&document);
        Ok(document)
    }
}
