//! Pipeline orchestration
//!
//! This module provides the public API for Riskfactor Flux.
//! It composes the stages into one path shared by filtered and unfiltered
//! requests: normalize, optionally filter, then aggregate metrics and build
//! chart series over the resulting record set.

use crate::adapters::RowSource;
use crate::charts::ChartSeriesBuilder;
use crate::config::PipelineConfig;
use crate::encoder::EnvelopeEncoder;
use crate::error::PipelineError;
use crate::filter::FilterEngine;
use crate::metrics::MetricsAggregator;
use crate::normalizer::Normalizer;
use crate::schema::{RawRow, RawTable};
use crate::types::{
    DashboardReport, FilterSpec, RecordSet, RecordsEnvelope, ResponseEnvelope,
};

/// Run the pipeline over raw rows and wrap the outcome in an envelope.
///
/// # Arguments
/// * `headers` - Ordered field names
/// * `rows` - Raw rows aligned with `headers`
/// * `filter` - Optional constraints; `None` aggregates every record
///
/// # Example
/// ```ignore
/// let envelope = run(&table.headers, &table.rows, Some(&FilterSpec::new().with_smoking(true)));
/// assert!(envelope.success);
/// ```
pub fn run(headers: &[String], rows: &[RawRow], filter: Option<&FilterSpec>) -> ResponseEnvelope {
    EnvelopeEncoder::envelope(log_failure(try_run(headers, rows, filter)))
}

/// Fallible core of [`run`] with the default configuration
pub fn try_run(
    headers: &[String],
    rows: &[RawRow],
    filter: Option<&FilterSpec>,
) -> Result<DashboardReport, PipelineError> {
    execute(&Normalizer::default(), headers, rows, filter)
}

/// Run the pipeline over a JSON table and return the envelope as JSON.
///
/// # Arguments
/// * `table_json` - `{"headers": [...], "rows": [[...], ...]}`
/// * `filter_json` - Optional camelCase filter object
pub fn run_json(table_json: &str, filter_json: Option<&str>) -> Result<String, PipelineError> {
    let outcome = parse_request(table_json, filter_json)
        .and_then(|(table, filter)| try_run(&table.headers, &table.rows, filter.as_ref()));
    let envelope = EnvelopeEncoder::envelope(log_failure(outcome));
    EnvelopeEncoder::new().encode_to_json(&envelope)
}

/// Normalize a JSON table and return the records envelope as JSON
pub fn records_json(table_json: &str) -> Result<String, PipelineError> {
    let outcome = serde_json::from_str::<RawTable>(table_json)
        .map_err(PipelineError::from)
        .and_then(|table| {
            let records = Normalizer::normalize(&table.headers, &table.rows)?;
            Ok((table.headers, records))
        });
    let envelope = EnvelopeEncoder::records_envelope(log_failure(outcome));
    EnvelopeEncoder::new().encode_to_json(&envelope)
}

fn parse_request(
    table_json: &str,
    filter_json: Option<&str>,
) -> Result<(RawTable, Option<FilterSpec>), PipelineError> {
    let table: RawTable = serde_json::from_str(table_json)?;
    let filter = filter_json.map(FilterSpec::from_json).transpose()?;
    Ok((table, filter))
}

/// Normalize, optionally filter, then aggregate and chart.
///
/// Pipeline stages:
/// 1. Normalizer - Typed records from raw rows
/// 2. FilterEngine - Narrow the record set (only when a filter is given)
/// 3. MetricsAggregator - Summary statistics
/// 4. ChartSeriesBuilder - Chart-ready series
fn execute(
    normalizer: &Normalizer,
    headers: &[String],
    rows: &[RawRow],
    filter: Option<&FilterSpec>,
) -> Result<DashboardReport, PipelineError> {
    let records = normalizer.run(headers, rows)?;

    let records = match filter {
        Some(spec) => FilterEngine::apply(&records, spec),
        None => records,
    };

    Ok(DashboardReport {
        metrics: MetricsAggregator::aggregate(&records),
        chart_data: ChartSeriesBuilder::build(&records),
    })
}

fn log_failure<T>(result: Result<T, PipelineError>) -> Result<T, PipelineError> {
    if let Err(e) = &result {
        log::error!("pipeline call failed: {e}");
    }
    result
}

/// Processor bound to a row source.
///
/// Every call re-fetches and re-normalizes the full table; nothing is cached
/// between calls.
pub struct DashboardProcessor<S: RowSource> {
    source: S,
    normalizer: Normalizer,
    encoder: EnvelopeEncoder,
}

impl<S: RowSource> DashboardProcessor<S> {
    /// Create a processor with default settings
    pub fn new(source: S) -> Self {
        Self::with_config(source, &PipelineConfig::default())
    }

    /// Create a processor with explicit settings
    pub fn with_config(source: S, config: &PipelineConfig) -> Self {
        Self {
            source,
            normalizer: Normalizer::new(config),
            encoder: EnvelopeEncoder::new(),
        }
    }

    /// Encode JSON output with indentation
    pub fn pretty(mut self) -> Self {
        self.encoder = EnvelopeEncoder::pretty();
        self
    }

    /// Typed report over the whole table or a filtered subset
    pub fn report(&self, filter: Option<&FilterSpec>) -> Result<DashboardReport, PipelineError> {
        let table = self.source.fetch_raw_rows()?;
        execute(&self.normalizer, &table.headers, &table.rows, filter)
    }

    /// Metrics and charts over every record
    pub fn summary(&self) -> ResponseEnvelope {
        EnvelopeEncoder::envelope(log_failure(self.report(None)))
    }

    /// Metrics and charts over the records matching `spec`
    pub fn filtered(&self, spec: &FilterSpec) -> ResponseEnvelope {
        EnvelopeEncoder::envelope(log_failure(self.report(Some(spec))))
    }

    /// Normalized records alongside the source headers
    pub fn records(&self) -> RecordsEnvelope {
        EnvelopeEncoder::records_envelope(log_failure(self.load_records()))
    }

    pub fn summary_json(&self) -> Result<String, PipelineError> {
        self.encoder.encode_to_json(&self.summary())
    }

    pub fn filtered_json(&self, spec: &FilterSpec) -> Result<String, PipelineError> {
        self.encoder.encode_to_json(&self.filtered(spec))
    }

    pub fn records_json(&self) -> Result<String, PipelineError> {
        self.encoder.encode_to_json(&self.records())
    }

    fn load_records(&self) -> Result<(Vec<String>, RecordSet), PipelineError> {
        let table = self.source.fetch_raw_rows()?;
        let records = self.normalizer.run(&table.headers, &table.rows)?;
        Ok((table.headers, records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{CsvSource, GridSource};
    use crate::classifier::AgeGroup;
    use crate::config::ColumnPolicy;

    fn sample_csv() -> &'static str {
        "Age,Number of sexual partners,Smokes,Smokes (years),STDs,Hinselmann,Schiller,Citology\n\
         25,3,1,2,1,0,1,0\n\
         45,?,0,?,0,0,0,0\n\
         19,1,0,0,0,0,0,0\n"
    }

    #[test]
    fn test_run_unfiltered() {
        let table = CsvSource::from_text(sample_csv()).fetch_raw_rows().unwrap();
        let envelope = run(&table.headers, &table.rows, None);

        assert!(envelope.success);
        let metrics = envelope.metrics.unwrap();
        assert_eq!(metrics.total_records, 3);
        assert_eq!(metrics.avg_partners, "2.00");
        assert_eq!(metrics.percent_abnormal, "33.33");
    }

    #[test]
    fn test_processor_filtered() {
        let processor = DashboardProcessor::new(CsvSource::from_text(sample_csv()));
        let envelope = processor.filtered(&FilterSpec::new().with_smoking(true));

        let metrics = envelope.metrics.unwrap();
        assert_eq!(metrics.total_records, 1);
        assert_eq!(metrics.percent_stds, "100.00");

        let charts = envelope.chart_data.unwrap();
        assert_eq!(charts.positive_rates_by_age.value_for(AgeGroup::Twenties), Some(100.0));
    }

    #[test]
    fn test_processor_reports_source_failure() {
        let processor = DashboardProcessor::new(CsvSource::from_path("/nonexistent/sheet.csv"));
        let envelope = processor.summary();

        assert!(!envelope.success);
        assert!(envelope.error.unwrap().starts_with("Data source unavailable"));
    }

    #[test]
    fn test_processor_strict_config() {
        let config = PipelineConfig {
            unknown_columns: ColumnPolicy::Reject,
        };
        let source = GridSource::from_json(r#"[["Age", "Shoe size"], [30, 38]]"#);
        let envelope = DashboardProcessor::with_config(source, &config).summary();

        assert!(!envelope.success);
        assert!(envelope.error.unwrap().contains("Shoe size"));
    }

    #[test]
    fn test_records_envelope() {
        let processor = DashboardProcessor::new(CsvSource::from_text(sample_csv()));
        let json = processor.records_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["success"], true);
        assert_eq!(value["headers"][0], "Age");
        assert_eq!(value["data"].as_array().unwrap().len(), 3);
        assert_eq!(value["data"][1]["Number of sexual partners"], serde_json::Value::Null);
    }

    #[test]
    fn test_processor_pretty_json() {
        let processor = DashboardProcessor::new(CsvSource::from_text(sample_csv())).pretty();
        let json = processor.summary_json().unwrap();

        assert!(json.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["metrics"]["totalRecords"], 3);

        let filtered: serde_json::Value = serde_json::from_str(
            &processor.filtered_json(&FilterSpec::new().with_age_max(19.0)).unwrap(),
        )
        .unwrap();
        assert_eq!(filtered["metrics"]["totalRecords"], 1);
    }

    #[test]
    fn test_run_json() {
        let table = r#"{"headers": ["Age", "STDs"], "rows": [[22, 1], [61, 0]]}"#;
        let json = run_json(table, Some(r#"{"ageMin": 50}"#)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["success"], true);
        assert_eq!(value["metrics"]["totalRecords"], 1);
        assert_eq!(value["metrics"]["percentSTDs"], "0.00");
    }

    #[test]
    fn test_run_json_invalid_input() {
        let json = run_json("not valid json", None).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["success"], false);
        assert!(value["error"].as_str().unwrap().starts_with("Invalid JSON"));
    }

    #[test]
    fn test_run_json_invalid_filter() {
        let table = r#"{"headers": ["Age"], "rows": [[22]]}"#;
        let json = run_json(table, Some(r#"{"smoking": "yes"}"#)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["success"], false);
        assert!(value["error"].as_str().unwrap().starts_with("Invalid filter"));
    }

    #[test]
    fn test_records_json_schema_error() {
        let table = r#"{"headers": ["Age", "Smokes"], "rows": [[22]]}"#;
        let value: serde_json::Value =
            serde_json::from_str(&records_json(table).unwrap()).unwrap();

        assert_eq!(value["success"], false);
        assert!(value.get("data").is_none());
    }
}
