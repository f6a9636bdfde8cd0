//! Envelope encoding
//!
//! This module formats summary metrics for display and encodes the response
//! envelopes handed to the presentation layer. Percentages and ratios are
//! printed with two decimals, year and age averages with one.

use crate::error::PipelineError;
use crate::types::{
    DashboardReport, MetricsResult, RecordSet, RecordsEnvelope, ResponseEnvelope, SummaryMetrics,
};
use serde::Serialize;

/// Decimal places for percentages and ratios
pub const RATIO_PLACES: usize = 2;

/// Decimal places for year and age averages
pub const YEARS_PLACES: usize = 1;

/// Format `value` with exactly `places` decimals.
///
/// Rounds the exact binary value, so `4.35` (stored just below 4.35) prints as
/// `4.3` at one place. A value lying exactly halfway between two outputs, such
/// as `0.125` at two places, rounds away from zero. Non-finite input prints as
/// zero so that a display string never reads `NaN` or `inf`, and a result that
/// rounds to zero never carries a minus sign.
pub fn to_fixed(value: f64, places: usize) -> String {
    if !value.is_finite() {
        return format!("{:.*}", places, 0.0);
    }

    let magnitude = match exact_tie_rounded_up(value.abs(), places) {
        Some(text) => text,
        None => format!("{:.*}", places, value.abs()),
    };

    let is_zero = magnitude.bytes().all(|b| b == b'0' || b == b'.');
    if value < 0.0 && !is_zero {
        format!("-{magnitude}")
    } else {
        magnitude
    }
}

/// Rounded magnitude when `magnitude` sits exactly on a midpoint at `places`.
///
/// A midpoint has exactly `places + 1` decimals ending in 5, and such a
/// decimal is a binary fraction only when its digits divide by `5^(places + 1)`.
fn exact_tie_rounded_up(magnitude: f64, places: usize) -> Option<String> {
    let extended = format!("{:.*}", places + 1, magnitude);
    if !extended.ends_with('5') || extended.parse::<f64>().ok()? != magnitude {
        return None;
    }

    let digits: u128 = extended.replace('.', "").parse().ok()?;
    let five_power = 5u128.checked_pow(u32::try_from(places + 1).ok()?)?;
    if digits % five_power != 0 {
        return None;
    }

    let rounded = digits / 10 + 1;
    if places == 0 {
        return Some(rounded.to_string());
    }
    let scale = 10u128.pow(places as u32);
    Some(format!(
        "{}.{:0width$}",
        rounded / scale,
        rounded % scale,
        width = places
    ))
}

/// Encoder for response envelopes
pub struct EnvelopeEncoder {
    pretty: bool,
}

impl Default for EnvelopeEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvelopeEncoder {
    /// Create an encoder producing compact JSON
    pub fn new() -> Self {
        Self { pretty: false }
    }

    /// Create an encoder producing indented JSON
    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    /// Display form of the summary metrics
    pub fn format_metrics(metrics: &SummaryMetrics) -> MetricsResult {
        MetricsResult {
            total_records: metrics.total_records,
            percent_stds: to_fixed(metrics.percent_stds, RATIO_PLACES),
            avg_partners: to_fixed(metrics.avg_partners, RATIO_PLACES),
            avg_first_intercourse_age: to_fixed(metrics.avg_first_intercourse_age, YEARS_PLACES),
            avg_hormonal_contraceptives_years: to_fixed(
                metrics.avg_hormonal_contraceptives_years,
                YEARS_PLACES,
            ),
            percent_iud: to_fixed(metrics.percent_iud, RATIO_PLACES),
            avg_iud_years: to_fixed(metrics.avg_iud_years, YEARS_PLACES),
            percent_abnormal: to_fixed(metrics.percent_abnormal, RATIO_PLACES),
        }
    }

    /// Wrap a pipeline outcome into a response envelope
    pub fn envelope(result: Result<DashboardReport, PipelineError>) -> ResponseEnvelope {
        match result {
            Ok(report) => ResponseEnvelope {
                success: true,
                metrics: Some(Self::format_metrics(&report.metrics)),
                chart_data: Some(report.chart_data),
                error: None,
            },
            Err(e) => ResponseEnvelope::failure(&e),
        }
    }

    /// Wrap a records outcome into a records envelope
    pub fn records_envelope(
        result: Result<(Vec<String>, RecordSet), PipelineError>,
    ) -> RecordsEnvelope {
        match result {
            Ok((headers, records)) => RecordsEnvelope {
                success: true,
                data: Some(records),
                headers: Some(headers),
                error: None,
            },
            Err(e) => RecordsEnvelope::failure(&e),
        }
    }

    /// Encode any envelope to JSON
    pub fn encode_to_json<T: Serialize>(&self, envelope: &T) -> Result<String, PipelineError> {
        let json = if self.pretty {
            serde_json::to_string_pretty(envelope)?
        } else {
            serde_json::to_string(envelope)?
        };
        Ok(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::ChartSeriesBuilder;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_to_fixed() {
        assert_eq!(to_fixed(50.0, 2), "50.00");
        assert_eq!(to_fixed(2.0 / 3.0, 2), "0.67");
        assert_eq!(to_fixed(16.25, 1), "16.3");
        assert_eq!(to_fixed(0.0, 1), "0.0");
        assert_eq!(to_fixed(-0.001, 2), "0.00");
        assert_eq!(to_fixed(-2.5, 0), "-3");
    }

    #[test]
    fn test_to_fixed_rounds_the_stored_value() {
        // Stored just below the written decimal
        assert_eq!(to_fixed(4.35, 1), "4.3");
        assert_eq!(to_fixed(2.675, 2), "2.67");
        assert_eq!(to_fixed(1.005, 2), "1.00");
    }

    #[test]
    fn test_to_fixed_exact_midpoint_rounds_up() {
        assert_eq!(to_fixed(0.125, 2), "0.13");
        assert_eq!(to_fixed(0.375, 2), "0.38");
        assert_eq!(to_fixed(2.5, 0), "3");
        assert_eq!(to_fixed(0.25, 1), "0.3");
        assert_eq!(to_fixed(12.5, 0), "13");
    }

    #[test]
    fn test_to_fixed_non_finite_is_zero() {
        assert_eq!(to_fixed(f64::NAN, 2), "0.00");
        assert_eq!(to_fixed(f64::INFINITY, 1), "0.0");
    }

    #[test]
    fn test_zero_metrics_follow_display_convention() {
        let formatted = EnvelopeEncoder::format_metrics(&SummaryMetrics::default());

        assert_eq!(
            formatted,
            MetricsResult {
                total_records: 0,
                percent_stds: "0.00".to_string(),
                avg_partners: "0.00".to_string(),
                avg_first_intercourse_age: "0.0".to_string(),
                avg_hormonal_contraceptives_years: "0.0".to_string(),
                percent_iud: "0.00".to_string(),
                avg_iud_years: "0.0".to_string(),
                percent_abnormal: "0.00".to_string(),
            }
        );
    }

    #[test]
    fn test_envelope_keys() {
        let report = DashboardReport {
            metrics: SummaryMetrics::default(),
            chart_data: ChartSeriesBuilder::build(&[]),
        };
        let envelope = EnvelopeEncoder::envelope(Ok(report));
        let json = EnvelopeEncoder::new().encode_to_json(&envelope).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["success"], true);
        assert_eq!(value["metrics"]["totalRecords"], 0);
        assert_eq!(value["metrics"]["percentSTDs"], "0.00");
        assert_eq!(value["metrics"]["avgIUDYears"], "0.0");
        assert_eq!(value["metrics"]["avgHormonalContraceptivesYears"], "0.0");
        assert!(value["chartData"]["barChart"].is_array());
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_failure_envelope() {
        let envelope = EnvelopeEncoder::envelope(Err(PipelineError::SchemaError(
            "row 3 has 2 cells but the header has 4 fields".into(),
        )));

        assert!(!envelope.success);
        assert!(envelope.metrics.is_none());
        assert_eq!(
            envelope.error.as_deref(),
            Some("Schema error: row 3 has 2 cells but the header has 4 fields")
        );
    }
}
