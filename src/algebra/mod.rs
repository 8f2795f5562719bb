//! Query algebra consumed by the compiler
//!
//! The backend-agnostic representation of schemas and queries:
//!
//! - Tables and fields with declared semantic types
//! - Literal constants
//! - Expression trees (comparisons, boolean logic, arithmetic,
//!   aggregates, pattern matching)
//! - Inbound-reference bookkeeping for delete-time integrity maintenance
//!
//! Every node kind is a closed enum, so compilation dispatches by
//! exhaustive pattern match rather than runtime type inspection.

mod expr;
mod types;

pub use expr::{Constant, Expr, OpOptions, Operator, Query};
pub use types::{Field, FieldType, OnDelete, ReferencedBy, Schema, TableSchema};
