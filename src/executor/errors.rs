//! Executor errors

use thiserror::Error;

use crate::codec::IdError;
use crate::compiler::CompileError;
use crate::store::StoreError;

/// Errors raised while executing operations against a store
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("COUNT DISTINCT is not supported")]
    CountDistinct,

    #[error("unknown table: {0}")]
    UnknownTable(String),

    #[error("unknown field: {0}.{1}")]
    UnknownField(String, String),

    #[error("unable to determine the collection for this operation")]
    NoCollection,

    #[error("expression update on {0} fields requires server 2.6 or later")]
    LegacyExpressionUpdate(String),

    #[error("update failed after matching documents")]
    UpdateFailed {
        #[source]
        source: StoreError,
    },

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Id(#[from] IdError),
}

pub type ExecResult<T> = Result<T, ExecError>;
