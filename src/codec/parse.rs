//! Result-document parsing
//!
//! The inverse of value coercion: native store values flowing back into
//! algebra rows. Identifiers become algebra integers, stored datetimes
//! narrow back to dates and times, blobs decode through the blob codec.

use bson::Bson;

use crate::algebra::{Constant, FieldType};

use super::{blob, objectid};

/// Parses a native value under a declared field type
pub fn parse(value: &Bson, ftype: &FieldType) -> Constant {
    match ftype {
        FieldType::Id | FieldType::Reference(_) => match value {
            Bson::ObjectId(oid) => Constant::Id(objectid::object_id_to_int(oid)),
            other => parse_untyped(other),
        },
        FieldType::ListReference(_) => match value {
            Bson::Array(items) => Constant::List(
                items
                    .iter()
                    .map(|item| parse(item, &FieldType::Id))
                    .collect(),
            ),
            other => parse_untyped(other),
        },
        FieldType::Blob => blob::decode(value),
        FieldType::Date => match value {
            Bson::DateTime(dt) => Constant::Date(dt.to_chrono().naive_utc().date()),
            other => parse_untyped(other),
        },
        FieldType::Time => match value {
            Bson::DateTime(dt) => Constant::Time(dt.to_chrono().naive_utc().time()),
            other => parse_untyped(other),
        },
        FieldType::Datetime => match value {
            Bson::DateTime(dt) => Constant::DateTime(dt.to_chrono().naive_utc()),
            other => parse_untyped(other),
        },
        _ => parse_untyped(value),
    }
}

/// Generic conversion for values with no declared type
pub fn parse_untyped(value: &Bson) -> Constant {
    match value {
        Bson::Null => Constant::Null,
        Bson::Boolean(b) => Constant::Bool(*b),
        Bson::Int32(n) => Constant::Int(*n as i64),
        Bson::Int64(n) => Constant::Int(*n),
        Bson::Double(f) => Constant::Float(*f),
        Bson::String(s) => Constant::Str(s.clone()),
        Bson::ObjectId(oid) => Constant::Id(objectid::object_id_to_int(oid)),
        Bson::DateTime(dt) => Constant::DateTime(dt.to_chrono().naive_utc()),
        Bson::Binary(b) => Constant::Bytes(b.bytes.clone()),
        Bson::Array(items) => Constant::List(items.iter().map(parse_untyped).collect()),
        other => Constant::Str(other.to_string()),
    }
}
