//! Blob codec
//!
//! Opaque payloads are stored as tagged binary values so the original
//! representation class survives the round trip:
//!
//! - subtype 0x80: raw bytes
//! - subtype 0x81: text that is not valid UTF-8 (written by other
//!   clients; never produced here, since Rust strings are always UTF-8)
//!
//! UTF-8 text is stored as a plain string, untouched.

use bson::spec::BinarySubtype;
use bson::{Binary, Bson};

use crate::algebra::Constant;

/// Binary subtype marking a raw byte payload
pub const BLOB_BYTES: u8 = 0x80;
/// Binary subtype marking non-UTF-8 text
pub const BLOB_NON_UTF8_STR: u8 = 0x81;

/// Encodes a blob-typed value for storage
pub fn encode(value: &Constant) -> Bson {
    match value {
        Constant::Null => Bson::Null,
        Constant::Bytes(bytes) => Bson::Binary(Binary {
            subtype: BinarySubtype::UserDefined(BLOB_BYTES),
            bytes: bytes.clone(),
        }),
        Constant::Str(s) => Bson::String(s.clone()),
        other => super::represent::to_bson(other),
    }
}

/// Decodes a stored blob back to its original representation class
pub fn decode(value: &Bson) -> Constant {
    match value {
        Bson::Binary(Binary {
            subtype: BinarySubtype::UserDefined(BLOB_BYTES),
            bytes,
        }) => Constant::Bytes(bytes.clone()),
        Bson::Binary(Binary {
            subtype: BinarySubtype::UserDefined(BLOB_NON_UTF8_STR),
            bytes,
        }) => match std::str::from_utf8(bytes) {
            Ok(s) => Constant::Str(s.to_string()),
            Err(_) => Constant::Bytes(bytes.clone()),
        },
        other => super::parse::parse_untyped(other),
    }
}
