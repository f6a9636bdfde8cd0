//! Record normalization
//!
//! This module turns untyped rows into typed [`RiskRecord`]s:
//! - Header names resolved against the known survey columns
//! - `?` and blank cells mapped to absent values
//! - Row length and flag values validated

use crate::config::{ColumnPolicy, PipelineConfig};
use crate::error::PipelineError;
use crate::schema::{CellValue, Column, ColumnKind, RawRow};
use crate::types::{RecordSet, RiskRecord};
use std::collections::HashSet;

/// A data row that failed normalization
#[derive(Debug)]
pub struct RowIssue {
    /// 1-based position among the data rows
    pub row: usize,
    pub error: PipelineError,
}

/// Normalizer for converting raw rows to typed records
pub struct Normalizer {
    policy: ColumnPolicy,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(&PipelineConfig::default())
    }
}

impl Normalizer {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            policy: config.unknown_columns,
        }
    }

    /// Normalize with the default configuration
    pub fn normalize(headers: &[String], rows: &[RawRow]) -> Result<RecordSet, PipelineError> {
        Normalizer::default().run(headers, rows)
    }

    /// Normalize every row, failing on the first malformed one
    pub fn run(&self, headers: &[String], rows: &[RawRow]) -> Result<RecordSet, PipelineError> {
        let layout = self.resolve_layout(headers)?;

        let records = rows
            .iter()
            .enumerate()
            .map(|(row_index, row)| build_record(&layout, row, row_index + 1))
            .collect::<Result<RecordSet, _>>()?;

        log::debug!(
            "normalized {} rows across {} columns",
            records.len(),
            headers.len()
        );
        Ok(records)
    }

    /// Check every row and collect the failures instead of stopping at the first.
    ///
    /// Header problems (duplicates, rejected columns) still fail the whole call.
    pub fn validate(
        &self,
        headers: &[String],
        rows: &[RawRow],
    ) -> Result<Vec<RowIssue>, PipelineError> {
        let layout = self.resolve_layout(headers)?;

        Ok(rows
            .iter()
            .enumerate()
            .filter_map(|(row_index, row)| {
                build_record(&layout, row, row_index + 1)
                    .err()
                    .map(|error| RowIssue {
                        row: row_index + 1,
                        error,
                    })
            })
            .collect())
    }

    /// Map each header position to its known column
    fn resolve_layout(&self, headers: &[String]) -> Result<Vec<Option<Column>>, PipelineError> {
        let mut seen = HashSet::with_capacity(headers.len());
        let mut unknown = Vec::new();
        let mut layout = Vec::with_capacity(headers.len());

        for header in headers {
            let name = header.trim();
            if !seen.insert(name) {
                return Err(PipelineError::SchemaError(format!(
                    "duplicate header '{name}'"
                )));
            }

            let column = Column::from_header(name);
            if column.is_none() {
                unknown.push(name);
            }
            layout.push(column);
        }

        if !unknown.is_empty() {
            match self.policy {
                ColumnPolicy::Ignore => {
                    log::warn!("ignoring unknown columns: {}", unknown.join(", "));
                }
                ColumnPolicy::Reject => {
                    return Err(PipelineError::SchemaError(format!(
                        "unknown columns: {}",
                        unknown.join(", ")
                    )));
                }
            }
        }

        Ok(layout)
    }
}

fn build_record(
    layout: &[Option<Column>],
    row: &RawRow,
    row_number: usize,
) -> Result<RiskRecord, PipelineError> {
    if row.len() != layout.len() {
        return Err(PipelineError::SchemaError(format!(
            "row {row_number} has {} cells but the header has {} fields",
            row.len(),
            layout.len()
        )));
    }

    let mut slots = [None; Column::COUNT];
    for (column, cell) in layout.iter().zip(row) {
        if let Some(column) = column {
            slots[column.index()] = parse_cell(*column, cell, row_number)?;
        }
    }

    Ok(RiskRecord::from_slots(slots))
}

fn parse_cell(
    column: Column,
    cell: &CellValue,
    row_number: usize,
) -> Result<Option<f64>, PipelineError> {
    if cell.is_absent() {
        return Ok(None);
    }

    let value = cell.as_number().ok_or_else(|| {
        PipelineError::SchemaError(format!(
            "row {row_number}, column '{}': expected a number, got {cell}",
            column.header()
        ))
    })?;

    if column.kind() == ColumnKind::Flag && value != 0.0 && value != 1.0 {
        return Err(PipelineError::SchemaError(format!(
            "row {row_number}, column '{}': flag must be 0 or 1, got {value}",
            column.header()
        )));
    }

    Ok(Some(value))
}
