//! Error types for Riskfactor Flux

use thiserror::Error;

/// Errors that can occur while running the dashboard pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Data source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Schema error: {0}")]
    SchemaError(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
