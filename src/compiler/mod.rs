//! Expression compiler
//!
//! Rewrites algebra trees into native filter documents and
//! aggregation-projection fragments.
//!
//! # Design
//!
//! - Exhaustive dispatch over the closed operator enum
//! - NOT compiles through a De Morgan rewrite; double negation collapses
//! - Two rendering modes: plain filters vs. pipeline projections, passed
//!   as an explicit parameter (no shared mutable mode state)
//! - `AS` and `ON` fail with explicit unsupported errors instead of
//!   degrading silently

mod errors;
mod expand;
mod like;
mod operators;

pub use errors::{CompileError, CompileResult};
pub use expand::{expand, expand_query, field_name, CompileMode};
pub use like::{build_like_regex, LikeFlags};
