use std::fmt;
use std::marker::PhantomData;

use bson::oid::ObjectId;
use bson::{Bson, doc};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::OdmError;
use crate::validation::{Validatable, ValidationErrors};

/// Static description of a mapped document type.
pub trait Model: Send + Sync + 'static {
    /// Type key in the identity map.
    const NAME: &'static str;
    /// Collection root documents of this type are stored in.
    const COLLECTION: &'static str;

    fn validate(_attributes: &bson::Document, _errors: &mut ValidationErrors) {}
}

/// Where a document lives, fixed when it is built.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentKind {
    Root {
        collection: String,
    },
    /// Stored inside the array `field` of the root document `parent_id`.
    Embedded {
        parent_id: Bson,
        collection: String,
        field: String,
    },
}

/// In-memory record of a model `M`.
///
/// The attributes always carry `_id`, generated as an `ObjectId` when the
/// caller supplies none.
pub struct Document<M: Model> {
    attributes: bson::Document,
    kind: DocumentKind,
    new_record: bool,
    errors: ValidationErrors,
    _model: PhantomData<fn() -> M>,
}

impl<M: Model> Document<M> {
    /// A new root document stored in `M::COLLECTION`.
    pub fn new(attributes: bson::Document) -> Self {
        Self::build(
            attributes,
            DocumentKind::Root {
                collection: M::COLLECTION.to_string(),
            },
        )
    }

    /// A new document nested in `parent`'s array `field`.
    ///
    /// Only root parents are supported.
    pub fn embedded_in<P: Model>(
        parent: &Document<P>,
        field: impl Into<String>,
        attributes: bson::Document,
    ) -> Result<Self, OdmError> {
        let field = field.into();
        let DocumentKind::Root { collection } = &parent.kind else {
            return Err(OdmError::UnsupportedNesting(format!(
                "{} cannot be embedded in embedded {}",
                M::NAME,
                P::NAME
            )));
        };
        if field.is_empty() || field.contains('.') || field.starts_with('$') {
            return Err(OdmError::UnsupportedNesting(format!(
                "invalid embedding field '{field}'"
            )));
        }
        Ok(Self::build(
            attributes,
            DocumentKind::Embedded {
                parent_id: parent.id().clone(),
                collection: collection.clone(),
                field,
            },
        ))
    }

    /// A new root document from any serializable value.
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self, OdmError> {
        Ok(Self::new(bson::serialize_to_document(value)?))
    }

    fn build(attributes: bson::Document, kind: DocumentKind) -> Self {
        let attributes = if attributes.contains_key("_id") {
            attributes
        } else {
            let mut with_id = doc! { "_id": ObjectId::new() };
            with_id.extend(attributes);
            with_id
        };
        Self {
            attributes,
            kind,
            new_record: true,
            errors: ValidationErrors::new(),
            _model: PhantomData,
        }
    }

    pub fn id(&self) -> &Bson {
        // `build` guarantees the key and `set` refuses to touch it.
        self.attributes.get("_id").unwrap_or(&Bson::Null)
    }

    pub fn raw_attributes(&self) -> &bson::Document {
        &self.attributes
    }

    pub fn kind(&self) -> &DocumentKind {
        &self.kind
    }

    pub fn is_embedded(&self) -> bool {
        matches!(self.kind, DocumentKind::Embedded { .. })
    }

    /// Collection the document is written through; the parent's for
    /// embedded documents.
    pub fn collection(&self) -> &str {
        match &self.kind {
            DocumentKind::Root { collection } | DocumentKind::Embedded { collection, .. } => {
                collection
            }
        }
    }

    pub fn is_new_record(&self) -> bool {
        self.new_record
    }

    pub fn set_new_record(&mut self, new_record: bool) {
        self.new_record = new_record;
    }

    pub fn is_persisted(&self) -> bool {
        !self.new_record
    }

    /// Errors from the last validation run by an insert.
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub(crate) fn set_errors(&mut self, errors: ValidationErrors) {
        self.errors = errors;
    }

    pub fn get(&self, key: &str) -> Option<&Bson> {
        self.attributes.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Bson>) -> Result<(), OdmError> {
        let key = key.into();
        if key == "_id" {
            return Err(OdmError::ImmutableId);
        }
        self.attributes.insert(key, value.into());
        Ok(())
    }

    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, OdmError> {
        Ok(bson::deserialize_from_document(self.attributes.clone())?)
    }
}

impl<M: Model> Validatable for Document<M> {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        M::validate(&self.attributes, &mut errors);
        errors.into_result()
    }
}

impl<M: Model> Clone for Document<M> {
    fn clone(&self) -> Self {
        Self {
            attributes: self.attributes.clone(),
            kind: self.kind.clone(),
            new_record: self.new_record,
            errors: self.errors.clone(),
            _model: PhantomData,
        }
    }
}

impl<M: Model> PartialEq for Document<M> {
    fn eq(&self, other: &Self) -> bool {
        self.attributes == other.attributes
            && self.kind == other.kind
            && self.new_record == other.new_record
    }
}

impl<M: Model> fmt::Debug for Document<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(M::NAME)
            .field("attributes", &self.attributes)
            .field("kind", &self.kind)
            .field("new_record", &self.new_record)
            .finish()
    }
}
