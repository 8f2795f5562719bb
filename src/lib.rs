//! mongodal - a relational query algebra compiled onto a document store
//!
//! Queries are built as typed expression trees, compiled into native
//! filter or aggregation-pipeline documents, and executed through a
//! pluggable `DocumentStore`.

pub mod algebra;
pub mod codec;
pub mod compiler;
pub mod executor;
pub mod observability;
pub mod store;
