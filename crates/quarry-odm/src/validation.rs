//! Validation run before a document is written.
//!
//! Each [`Model`](crate::Model) supplies its own rules through
//! `Model::validate`; [`Validatable`] is the capability the insert operation
//! checks.

use std::fmt;
use std::ops::RangeInclusive;

use bson::Bson;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Failures collected by one validation run, in the order they were found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// Messages recorded against one field.
    pub fn on(&self, field: &str) -> Vec<&str> {
        self.errors
            .iter()
            .filter(|e| e.field == field)
            .map(|e| e.message.as_str())
            .collect()
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{} {}", e.field, e.message)?;
        }
        Ok(())
    }
}

pub trait Validatable {
    fn validate(&self) -> Result<(), ValidationErrors>;

    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

/// Missing, null and empty-string values are blank.
pub fn presence_of(attributes: &bson::Document, field: &str, errors: &mut ValidationErrors) {
    let blank = match attributes.get(field) {
        None | Some(Bson::Null) => true,
        Some(Bson::String(s)) => s.trim().is_empty(),
        Some(Bson::Array(a)) => a.is_empty(),
        Some(_) => false,
    };
    if blank {
        errors.add(field, "can't be blank");
    }
}

/// Character length of a string field. Absent fields are left to
/// [`presence_of`]; non-string values fail.
pub fn length_of(
    attributes: &bson::Document,
    field: &str,
    range: RangeInclusive<usize>,
    errors: &mut ValidationErrors,
) {
    match attributes.get(field) {
        None | Some(Bson::Null) => {}
        Some(Bson::String(s)) => {
            let len = s.chars().count();
            if len < *range.start() {
                errors.add(field, format!("is too short (minimum is {})", range.start()));
            } else if len > *range.end() {
                errors.add(field, format!("is too long (maximum is {})", range.end()));
            }
        }
        Some(_) => errors.add(field, "must be a string"),
    }
}

#[cfg(test)]
mod tests {
    use bson::doc;

    use super::*;

    #[test]
    fn presence_rejects_missing_null_and_blank() {
        let attrs = doc! { "a": Bson::Null, "b": "  ", "c": "x", "d": [] };
        let mut errors = ValidationErrors::new();
        for field in ["a", "b", "c", "d", "missing"] {
            presence_of(&attrs, field, &mut errors);
        }
        assert_eq!(errors.len(), 4);
        assert!(errors.on("c").is_empty());
        assert_eq!(errors.on("missing"), vec!["can't be blank"]);
    }

    #[test]
    fn length_bounds() {
        let attrs = doc! { "ssn": "12", "name": "Alexander", "age": 3 };
        let mut errors = ValidationErrors::new();
        length_of(&attrs, "ssn", 3..=11, &mut errors);
        length_of(&attrs, "name", 1..=4, &mut errors);
        length_of(&attrs, "age", 1..=4, &mut errors);
        length_of(&attrs, "missing", 1..=4, &mut errors);
        assert_eq!(errors.on("ssn"), vec!["is too short (minimum is 3)"]);
        assert_eq!(errors.on("name"), vec!["is too long (maximum is 4)"]);
        assert_eq!(errors.on("age"), vec!["must be a string"]);
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn display_joins_messages() {
        let mut errors = ValidationErrors::new();
        errors.add("title", "can't be blank");
        errors.add("ssn", "is too short (minimum is 3)");
        assert_eq!(
            errors.to_string(),
            "title can't be blank; ssn is too short (minimum is 3)"
        );
    }

    #[test]
    fn into_result() {
        assert!(ValidationErrors::new().into_result().is_ok());
        let mut errors = ValidationErrors::new();
        errors.add("a", "b");
        assert_eq!(errors.clone().into_result().unwrap_err(), errors);
    }
}
