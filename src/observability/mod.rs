//! Observability subsystem
//!
//! Structured JSON logging for adapter operations: ignored select
//! options, referential-maintenance fan-out, and store errors.
//!
//! Principles:
//! 1. Observability is read-only
//! 2. No side effects on execution
//! 3. No async or background threads
//! 4. Deterministic output

mod logger;

pub use logger::{Logger, Severity};
