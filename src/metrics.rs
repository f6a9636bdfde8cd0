//! Summary metrics
//!
//! This module computes the scalar statistics shown on the dashboard:
//! - Percentages over the whole record set (STDs, IUD use, abnormal screening)
//! - Means over the non-null values of a column (partners, ages, years)
//!
//! Counts and sums are gathered in a [`MetricsAccumulator`] that can be merged
//! with another one, so the record set may be split and folded in any order.
//! Divisions only happen once everything has been reduced.

use crate::schema::Column;
use crate::types::{RiskRecord, SummaryMetrics};

/// Aggregator for computing summary metrics over a record set
pub struct MetricsAggregator;

impl MetricsAggregator {
    /// Compute every summary metric. An empty record set yields all zeros.
    pub fn aggregate(records: &[RiskRecord]) -> SummaryMetrics {
        records
            .iter()
            .fold(MetricsAccumulator::default(), |mut acc, record| {
                acc.add(record);
                acc
            })
            .finish()
    }
}

/// Sum and count of the non-null values of one column
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct RunningMean {
    sum: f64,
    count: usize,
}

impl RunningMean {
    fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
            self.count += 1;
        }
    }

    fn merge(&mut self, other: &RunningMean) {
        self.sum += other.sum;
        self.count += other.count;
    }

    /// Zero when no value was seen
    fn mean(&self) -> f64 {
        if self.count > 0 {
            self.sum / self.count as f64
        } else {
            0.0
        }
    }
}

/// Partial counts and sums for the summary metrics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsAccumulator {
    records: usize,
    with_stds: usize,
    iud_users: usize,
    abnormal: usize,
    partners: RunningMean,
    first_intercourse: RunningMean,
    hormonal_years: RunningMean,
    iud_years: RunningMean,
}

impl MetricsAccumulator {
    pub fn add(&mut self, record: &RiskRecord) {
        self.records += 1;

        if record.is_set(Column::Stds) {
            self.with_stds += 1;
        }
        if record.is_set(Column::Iud) {
            self.iud_users += 1;
        }
        if record.has_abnormal_result() {
            self.abnormal += 1;
        }

        self.partners.push(record.value(Column::SexualPartners));
        self.first_intercourse
            .push(record.value(Column::FirstIntercourse));
        self.hormonal_years
            .push(record.value(Column::HormonalContraceptivesYears));
        self.iud_years.push(record.value(Column::IudYears));
    }

    /// Combine with counts gathered over another slice of records
    pub fn merge(&mut self, other: &MetricsAccumulator) {
        self.records += other.records;
        self.with_stds += other.with_stds;
        self.iud_users += other.iud_users;
        self.abnormal += other.abnormal;
        self.partners.merge(&other.partners);
        self.first_intercourse.merge(&other.first_intercourse);
        self.hormonal_years.merge(&other.hormonal_years);
        self.iud_years.merge(&other.iud_years);
    }

    pub fn finish(&self) -> SummaryMetrics {
        SummaryMetrics {
            total_records: self.records,
            percent_stds: percent(self.with_stds, self.records),
            avg_partners: self.partners.mean(),
            avg_first_intercourse_age: self.first_intercourse.mean(),
            avg_hormonal_contraceptives_years: self.hormonal_years.mean(),
            percent_iud: percent(self.iud_users, self.records),
            avg_iud_years: self.iud_years.mean(),
            percent_abnormal: percent(self.abnormal, self.records),
        }
    }
}

/// Share of `part` in `total` as a percentage; zero for an empty total
pub(crate) fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 / total as f64) * 100.0
}
