//! Query executor subsystem
//!
//! The executor consumes compiled algebra and runs it against a
//! `DocumentStore`.
//!
//! # Execution flow (strict order)
//!
//! 1. Compile the query to a filter (or pipeline) document
//! 2. Coerce assigned values through the codec
//! 3. Issue the store operation with the resolved safe setting
//! 4. Reassemble results in request order
//! 5. After a delete, repair inbound references per on-delete policy

mod adapter;
mod attributes;
mod errors;
mod result;

pub use adapter::{Adapter, AdapterConfig};
pub use attributes::SelectAttributes;
pub use errors::{ExecError, ExecResult};
pub use result::Rows;
