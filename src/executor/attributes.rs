//! Select attributes
//!
//! Modifiers applied to a select beyond its filter and column list.
//! Ordering is an expression (a field, `field.invert()`, or several
//! joined with `comma`); paging is an explicit (skip, limit) pair.

use crate::algebra::Expr;

/// Modifiers for `Adapter::select`
#[derive(Debug, Clone, Default)]
pub struct SelectAttributes {
    /// Sort order expression, `-name` fragments sort descending
    pub orderby: Option<Expr>,
    /// (skip, limit); limit 0 means unbounded
    pub limitby: Option<(u64, u64)>,
    /// Row locking request, ignored with a warning
    pub for_update: bool,
    /// Unsupported extra attributes, ignored with a warning each
    pub extras: Vec<String>,
}

impl SelectAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn orderby(mut self, expr: Expr) -> Self {
        self.orderby = Some(expr);
        self
    }

    pub fn limitby(mut self, skip: u64, limit: u64) -> Self {
        self.limitby = Some((skip, limit));
        self
    }

    pub fn for_update(mut self, flag: bool) -> Self {
        self.for_update = flag;
        self
    }
}
