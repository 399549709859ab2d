//! Monthly factor table (Fama-French layout).
//!
//! Cells are kept as the raw text of the source file. Numeric coercion happens
//! on read through [`parse_numeric`], so a malformed cell only turns into a
//! missing value for the rows and columns that actually use it.

use super::month::YearMonth;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default name of the risk-free rate column.
pub const RISK_FREE_COLUMN: &str = "RF";

/// Coerce a raw cell to a finite number. Non-numeric text, blanks and the
/// usual missing-value sentinels become `None`.
pub fn parse_numeric(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.parse::<f64>() {
        // -99.99 and -999 are the missing-value markers of the factor library.
        Ok(v) if v.is_finite() && v != -99.99 && v != -999.0 => Some(v),
        _ => None,
    }
}

/// Factor values keyed by month, with named columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactorTable {
    columns: Vec<String>,
    rows: BTreeMap<YearMonth, Vec<String>>,
}

impl FactorTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: BTreeMap::new(),
        }
    }

    /// Insert a row of raw cells. Short rows are padded with blanks and long
    /// rows truncated so every row matches the header width.
    ///
    /// Returns `false` (and leaves the table untouched) when `month` is
    /// already present; the first occurrence wins.
    pub fn insert_row(&mut self, month: YearMonth, mut cells: Vec<String>) -> bool {
        if self.rows.contains_key(&month) {
            return false;
        }
        cells.resize(self.columns.len(), String::new());
        self.rows.insert(month, cells);
        true
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Raw text of one cell.
    pub fn raw(&self, month: &YearMonth, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(month).map(|cells| cells[idx].as_str())
    }

    /// Numeric value of one cell; `None` when the month or column is absent
    /// or the cell is not numeric.
    pub fn value(&self, month: &YearMonth, column: &str) -> Option<f64> {
        self.raw(month, column).and_then(parse_numeric)
    }

    pub fn contains(&self, month: &YearMonth) -> bool {
        self.rows.contains_key(month)
    }

    pub fn months(&self) -> impl Iterator<Item = &YearMonth> {
        self.rows.keys()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
