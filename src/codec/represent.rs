//! Type-directed value coercion
//!
//! `represent` converts algebra constants into the store's native value
//! types under a declared field type. The store has no bare date or time
//! values, so both are widened to datetimes; identifier and reference
//! values route through the identifier codec; blobs through the blob
//! codec. Every other type takes the generic conversion.

use bson::{Binary, Bson};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::algebra::{Constant, FieldType};

use super::errors::IdResult;
use super::{blob, objectid};

/// Fixed date combined with bare times (the store needs full datetimes)
fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default()
}

fn datetime_bson(dt: NaiveDateTime) -> Bson {
    Bson::DateTime(bson::DateTime::from_chrono(dt.and_utc()))
}

/// Coerces a constant for storage under the given declared type
pub fn represent(value: &Constant, ftype: &FieldType) -> IdResult<Bson> {
    match ftype {
        FieldType::Date => Ok(match value {
            Constant::Null => Bson::Null,
            Constant::Date(d) => datetime_bson(d.and_time(NaiveTime::MIN)),
            other => to_bson(other),
        }),
        FieldType::Time => Ok(match value {
            Constant::Null => Bson::Null,
            Constant::Time(t) => datetime_bson(reference_date().and_time(*t)),
            other => to_bson(other),
        }),
        FieldType::Blob => Ok(blob::encode(value)),
        FieldType::Id | FieldType::Reference(_) => {
            if value.is_null() {
                Ok(Bson::Null)
            } else {
                Ok(Bson::ObjectId(objectid::object_id(value)?))
            }
        }
        FieldType::ListReference(_) => match value {
            Constant::List(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(Bson::ObjectId(objectid::object_id(item)?));
                }
                Ok(Bson::Array(out))
            }
            other => Ok(to_bson(other)),
        },
        _ => Ok(to_bson(value)),
    }
}

/// Generic base conversion with no declared-type handling
pub fn to_bson(value: &Constant) -> Bson {
    match value {
        Constant::Null => Bson::Null,
        Constant::Bool(b) => Bson::Boolean(*b),
        Constant::Int(n) => Bson::Int64(*n),
        Constant::Float(f) => Bson::Double(*f),
        Constant::Str(s) => Bson::String(s.clone()),
        Constant::Bytes(b) => Bson::Binary(Binary {
            subtype: bson::spec::BinarySubtype::Generic,
            bytes: b.clone(),
        }),
        Constant::Date(d) => datetime_bson(d.and_time(NaiveTime::MIN)),
        Constant::Time(t) => datetime_bson(reference_date().and_time(*t)),
        Constant::DateTime(dt) => datetime_bson(*dt),
        Constant::Id(n) => Bson::ObjectId(objectid::object_id_from_int(*n)),
        Constant::List(items) => Bson::Array(items.iter().map(to_bson).collect()),
    }
}
