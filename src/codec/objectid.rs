//! Identifier codec
//!
//! Bidirectional conversion between the store's 12-byte ObjectId and the
//! algebra-side integer representation. An ObjectId is 96 bits, so every
//! identifier fits a `u128` losslessly: the integer is the id's 24 hex
//! digits read as base 16.

use bson::oid::ObjectId;
use rand::Rng;

use crate::algebra::Constant;

use super::errors::{IdError, IdResult};

/// Sentinel string that requests a freshly generated identifier
pub const RANDOM_ID: &str = "<random>";

/// Converts an algebra value to a native ObjectId.
///
/// Accepted inputs:
/// - null or the empty string (identifier zero)
/// - a decimal string (base 10)
/// - the `"<random>"` sentinel (24 uniform-random hex digits)
/// - an alphanumeric string, with or without a `0x` prefix (base 16)
/// - a non-negative integer or an algebra identifier
///
/// The integer's big-endian bytes, left-padded or truncated to 12 bytes,
/// become the identifier.
pub fn object_id(arg: &Constant) -> IdResult<ObjectId> {
    let value: u128 = match arg {
        Constant::Null => 0,
        Constant::Str(s) if s.is_empty() => 0,
        Constant::Str(s) => parse_id_string(s)?,
        Constant::Int(n) => {
            if *n < 0 {
                return Err(IdError::NegativeInteger);
            }
            *n as u128
        }
        Constant::Id(n) => *n,
        other => return Err(IdError::WrongType(other.type_name())),
    };
    Ok(object_id_from_int(value))
}

/// Builds an ObjectId from the low 96 bits of an integer
pub fn object_id_from_int(value: u128) -> ObjectId {
    let wide = value.to_be_bytes();
    let mut bytes = [0u8; 12];
    bytes.copy_from_slice(&wide[4..]);
    ObjectId::from_bytes(bytes)
}

/// Reinterprets an ObjectId's hex digits as a base-16 integer.
///
/// This is the algebra-side form of every identifier that flows back out
/// of the store, including newly inserted ids.
pub fn object_id_to_int(oid: &ObjectId) -> u128 {
    let mut wide = [0u8; 16];
    wide[4..].copy_from_slice(&oid.bytes());
    u128::from_be_bytes(wide)
}

/// Generates a uniform-random identifier (not guaranteed unique)
pub fn random_object_id() -> ObjectId {
    object_id_from_int(random_id_int())
}

fn random_id_int() -> u128 {
    let mut rng = rand::thread_rng();
    // one uniform hex digit per nibble, 24 digits total
    (0..24).fold(0u128, |acc, _| (acc << 4) | rng.gen_range(0..16u32) as u128)
}

fn parse_id_string(s: &str) -> IdResult<u128> {
    // A 24-digit form is raw hex even when all digits are decimal
    let rawhex = s.replace("0x", "").len() == 24;
    if s.bytes().all(|b| b.is_ascii_digit()) && !rawhex {
        s.parse::<u128>()
            .map_err(|e| IdError::InvalidString(e.to_string()))
    } else if s == RANDOM_ID {
        Ok(random_id_int())
    } else if s.bytes().all(|b| b.is_ascii_alphanumeric()) {
        let hex = s.strip_prefix("0x").unwrap_or(s);
        u128::from_str_radix(hex, 16).map_err(|e| IdError::InvalidString(e.to_string()))
    } else {
        Err(IdError::InvalidFormat)
    }
}
