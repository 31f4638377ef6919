use bson::Bson;
use bson::spec::ElementType;

use crate::error::CollectionError;

// Numeric ids are encoded so that byte order matches numeric order: XOR the
// sign bit for integers, flip the sign bit (positive) or every bit (negative)
// for doubles.

#[inline]
fn encode_i32_sortable(n: i32) -> [u8; 4] {
    ((n as u32) ^ 0x8000_0000).to_be_bytes()
}

#[inline]
fn encode_i64_sortable(n: i64) -> [u8; 8] {
    ((n as u64) ^ 0x8000_0000_0000_0000).to_be_bytes()
}

#[inline]
fn encode_f64_sortable(f: f64) -> [u8; 8] {
    let bits = f.to_bits();
    let encoded = if (bits & 0x8000_0000_0000_0000) != 0 {
        !bits
    } else {
        bits ^ 0x8000_0000_0000_0000
    };
    encoded.to_be_bytes()
}

/// Encode a document `_id` as a record key: `[bson_type: 1][value bytes]`.
///
/// The type tag keeps `"1"` and `1` apart. Documents, arrays, null and the
/// other non-scalar types are not accepted as ids.
pub(crate) fn encode_id(id: &Bson) -> Result<Vec<u8>, CollectionError> {
    let (tag, bytes): (ElementType, Vec<u8>) = match id {
        Bson::ObjectId(oid) => (ElementType::ObjectId, oid.bytes().to_vec()),
        Bson::String(s) => (ElementType::String, s.as_bytes().to_vec()),
        Bson::Int32(n) => (ElementType::Int32, encode_i32_sortable(*n).to_vec()),
        Bson::Int64(n) => (ElementType::Int64, encode_i64_sortable(*n).to_vec()),
        Bson::Double(f) => (ElementType::Double, encode_f64_sortable(*f).to_vec()),
        Bson::DateTime(dt) => (
            ElementType::DateTime,
            encode_i64_sortable(dt.timestamp_millis()).to_vec(),
        ),
        Bson::Boolean(b) => (ElementType::Boolean, vec![*b as u8]),
        other => {
            return Err(CollectionError::InvalidId(format!(
                "unsupported _id type: {:?}",
                other.element_type()
            )));
        }
    };
    let mut buf = Vec::with_capacity(1 + bytes.len());
    buf.push(tag as u8);
    buf.extend_from_slice(&bytes);
    Ok(buf)
}
