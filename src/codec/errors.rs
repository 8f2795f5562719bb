//! Identifier codec error types

use thiserror::Error;

/// Result type for identifier codec operations
pub type IdResult<T> = Result<T, IdError>;

/// Errors raised while converting algebra values to native identifiers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    /// Alphanumeric input that failed to parse as base 16
    #[error("invalid object id string: {0}")]
    InvalidString(String),

    /// Input that is neither decimal nor base 16
    #[error("invalid object id string: requires an integer or base 16 value")]
    InvalidFormat,

    /// Input of a class that cannot represent an identifier
    #[error("object id argument must be an identifier or a representable integer, got {0}")]
    WrongType(&'static str),

    /// Identifier integers must be non-negative
    #[error("object id integers must be non-negative")]
    NegativeInteger,
}
