//! Chart series construction
//!
//! Builds the three chart-ready series of the dashboard from a record set:
//! - positive screening rate per age group
//! - mean number of diagnosed STDs per age group
//! - smoking years against age, one point per respondent

use crate::classifier::AgeGroup;
use crate::metrics::percent;
use crate::schema::Column;
use crate::types::{JsNumber, RiskRecord};
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

/// STD indicator columns counted per respondent
pub const STD_INDICATOR_COLUMNS: [Column; 12] = [
    Column::StdCondylomatosis,
    Column::StdCervicalCondylomatosis,
    Column::StdVaginalCondylomatosis,
    Column::StdVulvoPerinealCondylomatosis,
    Column::StdSyphilis,
    Column::StdPelvicInflammatoryDisease,
    Column::StdGenitalHerpes,
    Column::StdMolluscumContagiosum,
    Column::StdAids,
    Column::StdHiv,
    Column::StdHepatitisB,
    Column::StdHpv,
];

pub const POSITIVE_RATE_COLUMNS: [&str; 2] = ["Age Group", "Positive Rate (%)"];
pub const STD_COUNT_COLUMNS: [&str; 2] = ["Age Group", "Average Number of STDs"];
pub const SMOKING_COLUMNS: [&str; 2] = ["Age", "Smoking Years"];

/// X-axis value of a chart row
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChartKey {
    Group(AgeGroup),
    Value(f64),
}

impl Serialize for ChartKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ChartKey::Group(group) => serializer.serialize_str(group.label()),
            ChartKey::Value(value) => JsNumber(*value).serialize(serializer),
        }
    }
}

/// One `[x, y]` chart row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartPoint {
    pub x: ChartKey,
    pub y: f64,
}

impl Serialize for ChartPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.x, JsNumber(self.y)).serialize(serializer)
    }
}

/// Header pair followed by `[x, y]` rows, serialized as an array of arrays
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub columns: [&'static str; 2],
    pub rows: Vec<ChartPoint>,
}

impl ChartSeries {
    pub fn new(label: &'static str, value_label: &'static str) -> Self {
        Self {
            columns: [label, value_label],
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, x: ChartKey, y: f64) {
        self.rows.push(ChartPoint { x, y });
    }

    /// Only the header row is present
    pub fn is_header_only(&self) -> bool {
        self.rows.is_empty()
    }

    /// y value recorded for an age group, if the series has one
    pub fn value_for(&self, group: AgeGroup) -> Option<f64> {
        self.rows
            .iter()
            .find(|p| p.x == ChartKey::Group(group))
            .map(|p| p.y)
    }
}

impl Serialize for ChartSeries {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len() + 1))?;
        seq.serialize_element(&self.columns)?;
        for point in &self.rows {
            seq.serialize_element(point)?;
        }
        seq.end()
    }
}

/// The three chart series of the dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub positive_rates_by_age: ChartSeries,
    #[serde(rename = "barChart")]
    pub stds_by_age_group: ChartSeries,
    #[serde(rename = "lineChart")]
    pub smoking_vs_age: ChartSeries,
}

/// Per-group counts behind the age-group series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeGroupTally {
    pub group: AgeGroup,
    pub members: usize,
    pub positives: usize,
    pub std_indicators: usize,
}

impl AgeGroupTally {
    fn empty(group: AgeGroup) -> Self {
        Self {
            group,
            members: 0,
            positives: 0,
            std_indicators: 0,
        }
    }

    pub fn positive_rate(&self) -> f64 {
        percent(self.positives, self.members)
    }

    /// Zero for a group without members
    pub fn mean_std_count(&self) -> f64 {
        if self.members == 0 {
            return 0.0;
        }
        self.std_indicators as f64 / self.members as f64
    }
}

/// Number of distinct STD indicator columns set to 1
pub fn std_indicator_count(record: &RiskRecord) -> usize {
    STD_INDICATOR_COLUMNS
        .iter()
        .filter(|column| record.is_set(**column))
        .count()
}

/// Builder for the dashboard chart series
pub struct ChartSeriesBuilder;

impl ChartSeriesBuilder {
    /// Build every series. An empty record set yields header-only series.
    pub fn build(records: &[RiskRecord]) -> ChartData {
        let mut positive_rates_by_age =
            ChartSeries::new(POSITIVE_RATE_COLUMNS[0], POSITIVE_RATE_COLUMNS[1]);
        let mut stds_by_age_group = ChartSeries::new(STD_COUNT_COLUMNS[0], STD_COUNT_COLUMNS[1]);

        if !records.is_empty() {
            for tally in Self::tally(records) {
                positive_rates_by_age.push(ChartKey::Group(tally.group), tally.positive_rate());
                stds_by_age_group.push(ChartKey::Group(tally.group), tally.mean_std_count());
            }
        }

        ChartData {
            positive_rates_by_age,
            stds_by_age_group,
            smoking_vs_age: Self::smoking_vs_age(records),
        }
    }

    /// Count members, positive screenings and STD indicators per age group
    pub fn tally(records: &[RiskRecord]) -> [AgeGroupTally; 5] {
        let mut tallies = AgeGroup::ALL.map(AgeGroupTally::empty);

        for record in records {
            let tally = &mut tallies[AgeGroup::of_record(record).index()];
            tally.members += 1;
            if record.has_abnormal_result() {
                tally.positives += 1;
            }
            tally.std_indicators += std_indicator_count(record);
        }

        tallies
    }

    /// One `(age, smoking years)` point per record that has both, in record order
    pub fn smoking_vs_age(records: &[RiskRecord]) -> ChartSeries {
        let mut series = ChartSeries::new(SMOKING_COLUMNS[0], SMOKING_COLUMNS[1]);

        for record in records {
            if let (Some(age), Some(years)) = (record.age(), record.value(Column::SmokesYears)) {
                series.push(ChartKey::Value(age), years);
            }
        }

        series
    }
}
