//! Document store seam
//!
//! The executor talks to collections through the `DocumentStore` trait:
//! counts, filtered finds, aggregation pipelines, and the write operations
//! the adapter issues. `MemoryStore` is the in-process implementation used
//! by the test suites; a driver-backed store plugs in behind the same
//! trait.

pub mod errors;
pub mod interface;
pub mod memory;

pub use errors::{StoreError, StoreResult};
pub use interface::{DocumentStore, InsertOutcome, WriteOutcome};
pub use memory::MemoryStore;
