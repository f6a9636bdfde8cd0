//! CSV row source
//!
//! Reads the survey as published: one header line, comma-separated cells,
//! `?` for unknown values.

use super::RowSource;
use crate::error::PipelineError;
use crate::schema::{CellValue, RawRow, RawTable, ABSENT_SENTINEL};
use std::path::{Path, PathBuf};

/// Where the CSV text comes from
#[derive(Debug, Clone)]
enum CsvOrigin {
    File(PathBuf),
    Text(String),
}

/// Row source backed by CSV text
#[derive(Debug, Clone)]
pub struct CsvSource {
    origin: CsvOrigin,
}

impl CsvSource {
    /// Read from a file on every fetch
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self {
            origin: CsvOrigin::File(path.as_ref().to_path_buf()),
        }
    }

    /// Read from CSV text already in memory
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            origin: CsvOrigin::Text(text.into()),
        }
    }

    fn parse<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<RawTable, PipelineError> {
        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| PipelineError::SourceUnavailable(format!("cannot read CSV header: {e}")))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
            return Err(PipelineError::SourceUnavailable(
                "CSV input has no header row".to_string(),
            ));
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let row: RawRow = record.iter().map(parse_cell).collect();
            rows.push(row);
        }

        Ok(RawTable::new(headers, rows))
    }
}

impl RowSource for CsvSource {
    fn fetch_raw_rows(&self) -> Result<RawTable, PipelineError> {
        // Flexible so that short rows reach the normalizer and surface as schema errors
        let mut builder = csv::ReaderBuilder::new();
        builder.flexible(true);

        match &self.origin {
            CsvOrigin::File(path) => {
                let reader = builder.from_path(path).map_err(|e| {
                    PipelineError::SourceUnavailable(format!("{}: {e}", path.display()))
                })?;
                Self::parse(reader)
            }
            CsvOrigin::Text(text) => Self::parse(builder.from_reader(text.as_bytes())),
        }
    }
}

/// Finite numbers become numbers, blanks become empty, everything else stays text
fn parse_cell(raw: &str) -> CellValue {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return CellValue::Empty;
    }
    if trimmed == ABSENT_SENTINEL {
        return CellValue::Text(ABSENT_SENTINEL.to_string());
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => CellValue::Number(value),
        _ => CellValue::Text(trimmed.to_string()),
    }
}
