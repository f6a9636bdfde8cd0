//! Row sources
//!
//! This module provides the sources that supply the untyped survey table:
//! a CSV export, a JSON value grid (spreadsheet range export) and the
//! in-memory [`RawTable`] itself.

mod csv_file;
mod grid;

pub use csv_file::CsvSource;
pub use grid::GridSource;

use crate::error::PipelineError;
use crate::schema::RawTable;

/// Trait for anything that can hand over the raw survey table
pub trait RowSource {
    /// Fetch the header row and every data row.
    ///
    /// Fails with [`PipelineError::SourceUnavailable`] when the table cannot be
    /// read at all.
    fn fetch_raw_rows(&self) -> Result<RawTable, PipelineError>;
}

impl RowSource for RawTable {
    fn fetch_raw_rows(&self) -> Result<RawTable, PipelineError> {
        Ok(self.clone())
    }
}

impl<S: RowSource + ?Sized> RowSource for Box<S> {
    fn fetch_raw_rows(&self) -> Result<RawTable, PipelineError> {
        (**self).fetch_raw_rows()
    }
}
