//! Core types for the Riskfactor Flux pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: typed records, filter options, summary metrics and the response
//! envelopes handed to the presentation layer. Chart series live in
//! [`crate::charts`].

use crate::charts::ChartData;
use crate::error::PipelineError;
use crate::schema::{Column, ColumnKind};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// A number serialized the way a JavaScript client prints it: whole values
/// become JSON integers (`100`, not `100.0`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JsNumber(pub f64);

/// Largest integer an IEEE double represents exactly (2^53)
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

impl Serialize for JsNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let value = self.0;
        if value.is_finite() && value.fract() == 0.0 && value.abs() < MAX_SAFE_INTEGER {
            serializer.serialize_i64(value as i64)
        } else {
            serializer.serialize_f64(value)
        }
    }
}

/// One normalized survey respondent.
///
/// Holds one optional value per known [`Column`]. Flag columns only ever hold
/// `0.0`, `1.0` or `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskRecord {
    values: [Option<f64>; Column::COUNT],
}

impl RiskRecord {
    /// Build a record from a slot array already checked by the normalizer
    pub(crate) fn from_slots(values: [Option<f64>; Column::COUNT]) -> Self {
        Self { values }
    }

    /// Build a record from `(column, value)` pairs; unlisted columns are absent.
    pub fn from_pairs(pairs: &[(Column, f64)]) -> Result<Self, PipelineError> {
        let mut values = [None; Column::COUNT];
        for &(column, value) in pairs {
            if column.kind() == ColumnKind::Flag && value != 0.0 && value != 1.0 {
                return Err(PipelineError::SchemaError(format!(
                    "flag column '{}' must be 0 or 1, got {}",
                    column.header(),
                    value
                )));
            }
            values[column.index()] = Some(value);
        }
        Ok(Self { values })
    }

    /// Value of a column, `None` when absent
    pub fn value(&self, column: Column) -> Option<f64> {
        self.values[column.index()]
    }

    /// Flag reading of a column, `None` when absent
    pub fn flag(&self, column: Column) -> Option<bool> {
        self.value(column).map(|v| v == 1.0)
    }

    /// True only when the column is present and equals 1
    pub fn is_set(&self, column: Column) -> bool {
        self.value(column) == Some(1.0)
    }

    pub fn age(&self) -> Option<f64> {
        self.value(Column::Age)
    }

    /// Any of the Hinselmann, Schiller or cytology screenings came back positive
    pub fn has_abnormal_result(&self) -> bool {
        self.is_set(Column::Hinselmann)
            || self.is_set(Column::Schiller)
            || self.is_set(Column::Citology)
    }
}

impl Serialize for RiskRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Column::COUNT))?;
        for column in Column::ALL {
            map.serialize_entry(column.header(), &self.value(column).map(JsNumber))?;
        }
        map.end()
    }
}

/// Working collection of records for one pipeline call
pub type RecordSet = Vec<RiskRecord>;

/// Optional record-level constraints.
///
/// Every option left as `None` imposes no constraint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    #[serde(default)]
    pub age_min: Option<f64>,
    #[serde(default)]
    pub age_max: Option<f64>,
    #[serde(default)]
    pub pregnancies: Option<f64>,
    #[serde(default, with = "binary_flag")]
    pub smoking: Option<bool>,
    #[serde(default, with = "binary_flag")]
    pub birth_control: Option<bool>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a filter from camelCase JSON
    pub fn from_json(json: &str) -> Result<Self, PipelineError> {
        serde_json::from_str(json).map_err(|e| PipelineError::InvalidFilter(e.to_string()))
    }

    pub fn with_age_range(mut self, min: f64, max: f64) -> Self {
        self.age_min = Some(min);
        self.age_max = Some(max);
        self
    }

    pub fn with_age_min(mut self, min: f64) -> Self {
        self.age_min = Some(min);
        self
    }

    pub fn with_age_max(mut self, max: f64) -> Self {
        self.age_max = Some(max);
        self
    }

    pub fn with_pregnancies(mut self, pregnancies: f64) -> Self {
        self.pregnancies = Some(pregnancies);
        self
    }

    pub fn with_smoking(mut self, smoking: bool) -> Self {
        self.smoking = Some(smoking);
        self
    }

    pub fn with_birth_control(mut self, birth_control: bool) -> Self {
        self.birth_control = Some(birth_control);
        self
    }

    /// True when no option is set
    pub fn is_unconstrained(&self) -> bool {
        self.age_min.is_none()
            && self.age_max.is_none()
            && self.pregnancies.is_none()
            && self.smoking.is_none()
            && self.birth_control.is_none()
    }

    /// Overlay every option set on `other` onto `self`
    pub fn merged_with(mut self, other: &FilterSpec) -> Self {
        self.age_min = other.age_min.or(self.age_min);
        self.age_max = other.age_max.or(self.age_max);
        self.pregnancies = other.pregnancies.or(self.pregnancies);
        self.smoking = other.smoking.or(self.smoking);
        self.birth_control = other.birth_control.or(self.birth_control);
        self
    }
}

/// 0/1 wire form for optional boolean filter options
mod binary_flag {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<bool>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(flag) => serializer.serialize_u8(u8::from(*flag)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<bool>, D::Error> {
        match Option::<f64>::deserialize(deserializer)? {
            None => Ok(None),
            Some(v) if v == 0.0 => Ok(Some(false)),
            Some(v) if v == 1.0 => Ok(Some(true)),
            Some(v) => Err(D::Error::custom(format!("expected 0 or 1, got {v}"))),
        }
    }
}

/// Raw summary statistics, before display formatting
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryMetrics {
    pub total_records: usize,
    pub percent_stds: f64,
    pub avg_partners: f64,
    pub avg_first_intercourse_age: f64,
    pub avg_hormonal_contraceptives_years: f64,
    pub percent_iud: f64,
    pub avg_iud_years: f64,
    pub percent_abnormal: f64,
}

/// Summary statistics as fixed-precision display strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsResult {
    pub total_records: usize,
    #[serde(rename = "percentSTDs")]
    pub percent_stds: String,
    pub avg_partners: String,
    pub avg_first_intercourse_age: String,
    pub avg_hormonal_contraceptives_years: String,
    #[serde(rename = "percentIUD")]
    pub percent_iud: String,
    #[serde(rename = "avgIUDYears")]
    pub avg_iud_years: String,
    pub percent_abnormal: String,
}

/// Typed result of one successful pipeline call
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardReport {
    pub metrics: SummaryMetrics,
    pub chart_data: ChartData,
}

/// Response handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<MetricsResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_data: Option<ChartData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResponseEnvelope {
    pub fn failure(error: &PipelineError) -> Self {
        Self {
            success: false,
            metrics: None,
            chart_data: None,
            error: Some(error.to_string()),
        }
    }
}

/// Response of the raw-records endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordsEnvelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<RecordSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RecordsEnvelope {
    pub fn failure(error: &PipelineError) -> Self {
        Self {
            success: false,
            data: None,
            headers: None,
            error: Some(error.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_js_number_serialization() {
        assert_eq!(serde_json::to_value(JsNumber(100.0)).unwrap(), json!(100));
        assert_eq!(serde_json::to_value(JsNumber(0.5)).unwrap(), json!(0.5));
        assert_eq!(serde_json::to_value(JsNumber(-3.0)).unwrap(), json!(-3));
    }

    #[test]
    fn test_record_rejects_non_binary_flag() {
        assert!(RiskRecord::from_pairs(&[(Column::Smokes, 2.0)]).is_err());
        assert!(RiskRecord::from_pairs(&[(Column::SmokesYears, 2.0)]).is_ok());
    }

    #[test]
    fn test_record_accessors() {
        let record = RiskRecord::from_pairs(&[
            (Column::Age, 31.0),
            (Column::Smokes, 0.0),
            (Column::Schiller, 1.0),
        ])
        .unwrap();

        assert_eq!(record.age(), Some(31.0));
        assert_eq!(record.flag(Column::Smokes), Some(false));
        assert_eq!(record.flag(Column::Iud), None);
        assert!(!record.is_set(Column::Smokes));
        assert!(record.has_abnormal_result());
    }

    #[test]
    fn test_record_serializes_as_header_map() {
        let record = RiskRecord::from_pairs(&[(Column::Age, 18.0)]).unwrap();
        let value = serde_json::to_value(&record).unwrap();
        let map = value.as_object().unwrap();

        assert_eq!(map.len(), Column::COUNT);
        assert_eq!(map["Age"], json!(18));
        assert_eq!(map["Number of sexual partners"], json!(null));
    }

    #[test]
    fn test_filter_spec_from_json() {
        let spec = FilterSpec::from_json(
            r#"{"ageMin": 20, "ageMax": 29, "pregnancies": null, "smoking": 1}"#,
        )
        .unwrap();

        assert_eq!(
            spec,
            FilterSpec::new().with_age_range(20.0, 29.0).with_smoking(true)
        );
        assert!(FilterSpec::from_json("{}").unwrap().is_unconstrained());
    }

    #[test]
    fn test_filter_spec_rejects_bad_flag() {
        let err = FilterSpec::from_json(r#"{"birthControl": 2}"#).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidFilter(_)));
    }

    #[test]
    fn test_filter_spec_merge_prefers_overlay() {
        let base = FilterSpec::new().with_age_range(20.0, 40.0).with_smoking(false);
        let overlay = FilterSpec::new().with_smoking(true).with_pregnancies(2.0);
        let merged = base.merged_with(&overlay);

        assert_eq!(merged.age_min, Some(20.0));
        assert_eq!(merged.smoking, Some(true));
        assert_eq!(merged.pregnancies, Some(2.0));
    }

    #[test]
    fn test_failure_envelope_omits_payload() {
        let envelope =
            ResponseEnvelope::failure(&PipelineError::SourceUnavailable("sheet missing".into()));
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({"success": false, "error": "Data source unavailable: sheet missing"})
        );
    }
}
