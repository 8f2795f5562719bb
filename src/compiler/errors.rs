//! Compiler error types
//!
//! Unsupported features fail loudly at compile time rather than
//! degrading into a silently wrong filter document.

use thiserror::Error;

use crate::codec::IdError;

/// Result type for compiler operations
pub type CompileResult<T> = Result<T, CompileError>;

/// Errors raised while compiling algebra expressions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// Pre-serialized nested queries cannot be recompiled
    #[error("nested queries are not supported")]
    NestedQuery,

    /// Distinct counting has no pipeline equivalent here
    #[error("COUNT DISTINCT is not supported")]
    CountDistinct,

    /// Aliasing would require server-side javascript
    #[error("AS is not supported by this backend")]
    AliasUnsupported,

    /// Explicit joins do not exist in a document store
    #[error("ON is not possible in a document store; simulate joins in a wrapper")]
    JoinUnsupported,

    /// Ordered comparisons against an absent operand are invalid
    #[error("cannot compare {0} against an absent operand")]
    MissingOperand(&'static str),

    /// Structurally invalid input
    #[error("malformed query: {0}")]
    InvalidQuery(String),

    /// Identifier coercion failure on a right-hand side
    #[error(transparent)]
    Id(#[from] IdError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert!(CompileError::NestedQuery.to_string().contains("nested"));
        assert!(CompileError::MissingOperand("GT").to_string().contains("GT"));
    }
}
