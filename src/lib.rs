//! Riskfactor Flux - Aggregation engine for cervical cancer risk-factor survey dashboards
//!
//! Flux turns the raw survey table into dashboard-ready output through a
//! deterministic pipeline: row source → normalization → optional filtering
//! → metrics aggregation and chart series → response envelope.
//!
//! ## Modules
//!
//! - **Sources**: CSV exports and JSON value grids ([`adapters`])
//! - **Pipeline**: Normalize, filter, aggregate and chart ([`pipeline`])
//! - **FFI**: C ABI for dashboard front ends ([`ffi`])

pub mod adapters;
pub mod charts;
pub mod classifier;
pub mod config;
pub mod encoder;
pub mod error;
pub mod filter;
pub mod metrics;
pub mod normalizer;
pub mod pipeline;
pub mod schema;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use adapters::{CsvSource, GridSource, RowSource};
pub use charts::{ChartData, ChartSeries};
pub use classifier::AgeGroup;
pub use config::{ColumnPolicy, PipelineConfig};
pub use error::PipelineError;
pub use pipeline::{records_json, run, run_json, try_run, DashboardProcessor};

// Schema exports
pub use schema::{CellValue, Column, RawRow, RawTable};

// Record and envelope exports
pub use types::{
    DashboardReport, FilterSpec, MetricsResult, RecordSet, RecordsEnvelope, ResponseEnvelope,
    RiskRecord,
};

/// Flux version reported by the CLI and the C ABI
pub const FLUX_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name reported by the CLI
pub const PRODUCER_NAME: &str = "riskfactor-flux";
