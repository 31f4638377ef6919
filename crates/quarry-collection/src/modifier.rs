//! Update modifiers: `{ "$push": { "addresses": {...} }, "$set": {...} }`.
//!
//! A modifier document is parsed into a flat list of field mutations and then
//! applied to a stored document. Field names may be dotted paths into nested
//! sub-documents.

use std::fmt;

use bson::{Bson, Document};

/// A single field-level mutation operator.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOp {
    /// Set a field to a value. Creates the field if it doesn't exist.
    Set(Bson),
    /// Remove a field from the document.
    Unset,
    /// Add to a numeric field. A missing field starts at zero.
    Inc(Bson),
    /// Append a value to an array field. Creates the array if missing.
    Push(Bson),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldMutation {
    pub field: String,
    pub op: MutationOp,
}

/// A parsed update modifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Modifier {
    pub ops: Vec<FieldMutation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseError(pub String);

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "modifier parse error: {}", self.0)
    }
}

impl std::error::Error for ParseError {}

/// Raised while applying a parsed modifier to a document.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplyError(pub String);

impl fmt::Display for ApplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ApplyError {}

/// Parse an update document into a [`Modifier`].
///
/// Recognizes `$set`, `$unset`, `$inc` and `$push`, whose values map field
/// paths to operands. Bare top-level fields are an implicit `$set`. A
/// top-level `_id` is skipped; any operator targeting `_id` is rejected.
pub fn parse_modifier(doc: &Document) -> Result<Modifier, ParseError> {
    let mut ops = Vec::new();

    for (key, value) in doc {
        match key.as_str() {
            "_id" => continue,
            "$set" => parse_operator_fields(key, value, MutationOp::Set, &mut ops)?,
            "$push" => parse_operator_fields(key, value, MutationOp::Push, &mut ops)?,
            "$unset" => parse_unset_fields(value, &mut ops)?,
            "$inc" => parse_inc_fields(value, &mut ops)?,
            k if k.starts_with('$') => {
                return Err(ParseError(format!("unknown operator: {k}")));
            }
            _ => ops.push(FieldMutation {
                field: key.clone(),
                op: MutationOp::Set(value.clone()),
            }),
        }
    }

    if ops.is_empty() {
        return Err(ParseError("empty modifier document".into()));
    }

    for fm in &ops {
        let target = fm.field.split('.').next().unwrap_or(&fm.field);
        if target == "_id" {
            return Err(ParseError("cannot modify _id field".into()));
        }
    }

    Ok(Modifier { ops })
}

fn operand_doc<'a>(operator: &str, value: &'a Bson) -> Result<&'a Document, ParseError> {
    match value {
        Bson::Document(d) => Ok(d),
        _ => Err(ParseError(format!("{operator} value must be a document"))),
    }
}

fn parse_operator_fields(
    operator: &str,
    value: &Bson,
    make_op: fn(Bson) -> MutationOp,
    ops: &mut Vec<FieldMutation>,
) -> Result<(), ParseError> {
    for (field, val) in operand_doc(operator, value)? {
        ops.push(FieldMutation {
            field: field.clone(),
            op: make_op(val.clone()),
        });
    }
    Ok(())
}

/// Values are ignored (`{ "field": "" }` by convention).
fn parse_unset_fields(value: &Bson, ops: &mut Vec<FieldMutation>) -> Result<(), ParseError> {
    for (field, _) in operand_doc("$unset", value)? {
        ops.push(FieldMutation {
            field: field.clone(),
            op: MutationOp::Unset,
        });
    }
    Ok(())
}

fn parse_inc_fields(value: &Bson, ops: &mut Vec<FieldMutation>) -> Result<(), ParseError> {
    for (field, val) in operand_doc("$inc", value)? {
        match val {
            Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) => {}
            _ => {
                return Err(ParseError(format!(
                    "$inc value for '{field}' must be numeric"
                )));
            }
        }
        ops.push(FieldMutation {
            field: field.clone(),
            op: MutationOp::Inc(val.clone()),
        });
    }
    Ok(())
}

impl Modifier {
    /// Apply every mutation in order. Returns whether the document changed.
    pub fn apply(&self, doc: &mut Document) -> Result<bool, ApplyError> {
        let mut changed = false;
        for fm in &self.ops {
            let creates = !matches!(fm.op, MutationOp::Unset);
            let Some((parent, leaf)) = resolve_parent_mut(doc, &fm.field, creates)? else {
                continue;
            };
            changed |= match &fm.op {
                MutationOp::Set(val) => op_set(parent, leaf, val),
                MutationOp::Unset => parent.remove(leaf).is_some(),
                MutationOp::Inc(amount) => op_inc(parent, leaf, amount)?,
                MutationOp::Push(val) => op_push(parent, leaf, val)?,
            };
        }
        Ok(changed)
    }
}

/// Walk a dotted path down to the document holding its last segment.
///
/// Missing intermediate documents are created when `create` is set, otherwise
/// the walk stops with `None`. Crossing a non-document value is an error.
fn resolve_parent_mut<'d, 'f>(
    doc: &'d mut Document,
    path: &'f str,
    create: bool,
) -> Result<Option<(&'d mut Document, &'f str)>, ApplyError> {
    let Some((head, leaf)) = path.rsplit_once('.') else {
        return Ok(Some((doc, path)));
    };

    let mut current = doc;
    for segment in head.split('.') {
        if !current.contains_key(segment) {
            if !create {
                return Ok(None);
            }
            current.insert(segment, Document::new());
        }
        current = match current.get_mut(segment) {
            Some(Bson::Document(d)) => d,
            _ => {
                return Err(ApplyError(format!(
                    "cannot traverse '{segment}' in '{path}': not a document"
                )));
            }
        };
    }
    Ok(Some((current, leaf)))
}

fn op_set(parent: &mut Document, leaf: &str, val: &Bson) -> bool {
    if parent.get(leaf) == Some(val) {
        return false;
    }
    parent.insert(leaf, val.clone());
    true
}

fn op_inc(parent: &mut Document, leaf: &str, amount: &Bson) -> Result<bool, ApplyError> {
    let overflow = || ApplyError(format!("$inc: field '{leaf}' would overflow"));
    let next = match (parent.get(leaf), amount) {
        (None, amount) => amount.clone(),
        (Some(Bson::Int32(a)), Bson::Int32(b)) => match a.checked_add(*b) {
            Some(n) => Bson::Int32(n),
            // Widened sum of two i32 always fits.
            None => Bson::Int64(*a as i64 + *b as i64),
        },
        (Some(Bson::Int32(a)), Bson::Int64(b)) => {
            Bson::Int64((*a as i64).checked_add(*b).ok_or_else(overflow)?)
        }
        (Some(Bson::Int64(a)), Bson::Int32(b)) => {
            Bson::Int64(a.checked_add(*b as i64).ok_or_else(overflow)?)
        }
        (Some(Bson::Int64(a)), Bson::Int64(b)) => {
            Bson::Int64(a.checked_add(*b).ok_or_else(overflow)?)
        }
        (Some(Bson::Double(a)), Bson::Int32(b)) => Bson::Double(a + *b as f64),
        (Some(Bson::Double(a)), Bson::Int64(b)) => Bson::Double(a + *b as f64),
        (Some(Bson::Double(a)), Bson::Double(b)) => Bson::Double(a + b),
        (Some(Bson::Int32(a)), Bson::Double(b)) => Bson::Double(*a as f64 + b),
        (Some(Bson::Int64(a)), Bson::Double(b)) => Bson::Double(*a as f64 + b),
        (Some(_), _) => {
            return Err(ApplyError(format!("$inc: field '{leaf}' is not numeric")));
        }
    };
    parent.insert(leaf, next);
    Ok(true)
}

fn op_push(parent: &mut Document, leaf: &str, val: &Bson) -> Result<bool, ApplyError> {
    match parent.get_mut(leaf) {
        None => {
            parent.insert(leaf, Bson::Array(vec![val.clone()]));
        }
        Some(Bson::Array(arr)) => arr.push(val.clone()),
        Some(_) => {
            return Err(ApplyError(format!("$push: field '{leaf}' is not an array")));
        }
    }
    Ok(true)
}
