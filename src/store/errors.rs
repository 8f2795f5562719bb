//! Store error types

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by a document store while evaluating compiled documents
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Filter or pipeline operator the store cannot evaluate
    #[error("unsupported operator: {0}")]
    UnsupportedOperator(String),

    /// Structurally invalid filter/update/pipeline document
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// `$regex` fragment that is not a valid regular expression
    #[error("invalid regular expression: {0}")]
    BadRegex(String),
}
