use bson::{Bson, Document};

use crate::error::CollectionError;

/// Equality selector over top-level fields.
///
/// `{}` matches every document. Operator keys are not understood here; the
/// mapper only ever addresses documents by `_id`.
pub(crate) struct Selector<'a> {
    fields: &'a Document,
}

impl<'a> Selector<'a> {
    pub(crate) fn parse(selector: &'a Document) -> Result<Self, CollectionError> {
        if let Some(key) = selector.keys().find(|k| k.starts_with('$')) {
            return Err(CollectionError::InvalidSelector(format!(
                "unsupported operator: {key}"
            )));
        }
        for (key, value) in selector {
            if let Bson::Document(d) = value {
                if let Some(op) = d.keys().find(|k| k.starts_with('$')) {
                    return Err(CollectionError::InvalidSelector(format!(
                        "unsupported operator {op} on '{key}'"
                    )));
                }
            }
        }
        Ok(Self { fields: selector })
    }

    /// The `_id` being selected, when the selector pins one.
    pub(crate) fn id(&self) -> Option<&'a Bson> {
        self.fields.get("_id")
    }

    pub(crate) fn matches(&self, doc: &Document) -> bool {
        self.fields
            .iter()
            .all(|(key, expected)| doc.get(key) == Some(expected))
    }
}
