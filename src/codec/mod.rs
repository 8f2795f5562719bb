//! Value codecs between the algebra and the document store
//!
//! Three concerns, all lossless where the data model allows:
//!
//! - identifier codec: 12-byte ObjectId <-> algebra integer
//! - value coercion: typed constants -> native values (`represent`)
//!   and back (`parse`)
//! - blob codec: byte payloads and text as tagged binary values

pub mod blob;
mod errors;
pub mod objectid;
mod parse;
mod represent;

pub use errors::{IdError, IdResult};
pub use objectid::{object_id, object_id_from_int, object_id_to_int, random_object_id, RANDOM_ID};
pub use parse::{parse, parse_untyped};
pub use represent::{represent, to_bson};
