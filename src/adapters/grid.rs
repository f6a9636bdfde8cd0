//! JSON value-grid row source
//!
//! Accepts the shape a spreadsheet range export produces: a JSON array of
//! rows, where the first row holds the column names.

use super::RowSource;
use crate::error::PipelineError;
use crate::schema::{CellValue, RawTable};

/// Row source backed by a JSON array of arrays
#[derive(Debug, Clone)]
pub struct GridSource {
    json: String,
}

impl GridSource {
    pub fn from_json(json: impl Into<String>) -> Self {
        Self { json: json.into() }
    }

    /// Split a value grid into headers and data rows
    pub fn table_from_grid(grid: Vec<Vec<CellValue>>) -> Result<RawTable, PipelineError> {
        let mut rows = grid.into_iter();
        let header_row = rows.next().ok_or_else(|| {
            PipelineError::SourceUnavailable("value grid is empty".to_string())
        })?;

        let headers = header_row
            .into_iter()
            .enumerate()
            .map(|(position, cell)| match cell {
                CellValue::Text(name) => Ok(name.trim().to_string()),
                other => Err(PipelineError::SourceUnavailable(format!(
                    "header cell {} is not a column name: {other}",
                    position + 1
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RawTable::new(headers, rows.collect()))
    }
}

impl RowSource for GridSource {
    fn fetch_raw_rows(&self) -> Result<RawTable, PipelineError> {
        let grid: Vec<Vec<CellValue>> = serde_json::from_str(&self.json).map_err(|e| {
            PipelineError::SourceUnavailable(format!("value grid is not a JSON array of rows: {e}"))
        })?;
        Self::table_from_grid(grid)
    }
}
