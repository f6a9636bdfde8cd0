//! Raw tabular input
//!
//! Rows arrive untyped and positionally aligned with a header row, exactly as
//! a spreadsheet range export looks. The single-character string `?` marks an
//! unknown cell.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel marking an absent value in raw input
pub const ABSENT_SENTINEL: &str = "?";

/// One raw scalar cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Bool(bool),
    Text(String),
    Empty,
}

impl CellValue {
    /// True for the `?` sentinel and for blank cells
    pub fn is_absent(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(text) => {
                let trimmed = text.trim();
                trimmed.is_empty() || trimmed == ABSENT_SENTINEL
            }
            _ => false,
        }
    }

    /// Finite numeric reading of the cell, if it has one.
    ///
    /// Numeric-looking text is accepted so that sheets exported with every
    /// cell stringified still load. `NaN` and infinities are not numbers here,
    /// whether spelled out as text or stored directly.
    pub fn as_number(&self) -> Option<f64> {
        let value = match self {
            CellValue::Number(value) => Some(*value),
            CellValue::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
            CellValue::Text(text) => text.trim().parse::<f64>().ok(),
            CellValue::Empty => None,
        };
        value.filter(|v| v.is_finite())
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(value) => write!(f, "{value}"),
            CellValue::Bool(flag) => write!(f, "{flag}"),
            CellValue::Text(text) => write!(f, "'{text}'"),
            CellValue::Empty => write!(f, "<empty>"),
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

/// Ordered field names
pub type Header = Vec<String>;

/// Ordered cells aligned with a [`Header`]
pub type RawRow = Vec<CellValue>;

/// Headers plus rows, as supplied by a data source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    pub headers: Header,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    pub fn new(headers: Header, rows: Vec<RawRow>) -> Self {
        Self { headers, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
