//! Select results
//!
//! A select produces a rectangular `Rows` block: one label per selected
//! column and one `Constant` per cell. Missing document keys surface as
//! `Constant::Null`.

use crate::algebra::Constant;

/// Rectangular result of a select
#[derive(Debug, Clone, PartialEq)]
pub struct Rows {
    /// Column labels, `table.field` for plain fields
    pub colnames: Vec<String>,
    /// Row-major cell values
    pub rows: Vec<Vec<Constant>>,
}

impl Rows {
    pub fn new(colnames: Vec<String>) -> Self {
        Self {
            colnames,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell lookup by row index and column label
    pub fn cell(&self, row: usize, colname: &str) -> Option<&Constant> {
        let col = self.colnames.iter().position(|c| c == colname)?;
        self.rows.get(row)?.get(col)
    }

    /// All values of one column
    pub fn column(&self, colname: &str) -> Vec<&Constant> {
        match self.colnames.iter().position(|c| c == colname) {
            Some(col) => self.rows.iter().filter_map(|row| row.get(col)).collect(),
            None => Vec::new(),
        }
    }
}
