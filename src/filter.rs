//! Record filtering
//!
//! Applies the options of a [`FilterSpec`] as independent predicates. A record
//! survives only when it satisfies every configured option.

use crate::schema::Column;
use crate::types::{FilterSpec, RecordSet, RiskRecord};

/// Filter engine for narrowing a record set
pub struct FilterEngine;

impl FilterEngine {
    /// Return the records that satisfy every option of `spec`.
    ///
    /// The input is left untouched; an empty result is a valid outcome.
    pub fn apply(records: &[RiskRecord], spec: &FilterSpec) -> RecordSet {
        let kept: RecordSet = records
            .iter()
            .filter(|record| Self::matches(record, spec))
            .cloned()
            .collect();

        log::debug!("filter kept {} of {} records", kept.len(), records.len());
        kept
    }

    /// Whether a single record satisfies every configured option
    pub fn matches(record: &RiskRecord, spec: &FilterSpec) -> bool {
        within_age_bounds(record, spec.age_min, spec.age_max)
            && value_equals(record, Column::Pregnancies, spec.pregnancies)
            && flag_equals(record, Column::Smokes, spec.smoking)
            && flag_equals(record, Column::HormonalContraceptives, spec.birth_control)
    }
}

/// Inclusive bounds; a record without an age fails once any bound is set
fn within_age_bounds(record: &RiskRecord, min: Option<f64>, max: Option<f64>) -> bool {
    if min.is_none() && max.is_none() {
        return true;
    }

    match record.age() {
        Some(age) => min.map_or(true, |m| age >= m) && max.map_or(true, |m| age <= m),
        None => false,
    }
}

fn value_equals(record: &RiskRecord, column: Column, expected: Option<f64>) -> bool {
    expected.map_or(true, |e| record.value(column) == Some(e))
}

fn flag_equals(record: &RiskRecord, column: Column, expected: Option<bool>) -> bool {
    expected.map_or(true, |e| record.flag(column) == Some(e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(age: Option<f64>, pregnancies: f64, smokes: f64, hormonal: f64) -> RiskRecord {
        let mut pairs = vec![
            (Column::Pregnancies, pregnancies),
            (Column::Smokes, smokes),
            (Column::HormonalContraceptives, hormonal),
        ];
        if let Some(age) = age {
            pairs.push((Column::Age, age));
        }
        RiskRecord::from_pairs(&pairs).unwrap()
    }

    fn sample() -> Vec<RiskRecord> {
        vec![
            record(Some(18.0), 0.0, 0.0, 1.0),
            record(Some(20.0), 1.0, 1.0, 0.0),
            record(Some(29.0), 2.0, 1.0, 1.0),
            record(Some(30.0), 2.0, 0.0, 1.0),
            record(None, 1.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_unconstrained_keeps_everything() {
        let records = sample();
        let kept = FilterEngine::apply(&records, &FilterSpec::new());
        assert_eq!(kept, records);
    }

    #[test]
    fn test_age_range_is_inclusive() {
        let kept = FilterEngine::apply(&sample(), &FilterSpec::new().with_age_range(20.0, 29.0));
        let ages: Vec<_> = kept.iter().map(|r| r.age()).collect();
        assert_eq!(ages, vec![Some(20.0), Some(29.0)]);
    }

    #[test]
    fn test_single_bound() {
        let kept = FilterEngine::apply(&sample(), &FilterSpec::new().with_age_min(29.0));
        assert_eq!(kept.len(), 2);

        let kept = FilterEngine::apply(&sample(), &FilterSpec::new().with_age_max(19.0));
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_missing_age_fails_bound() {
        let kept = FilterEngine::apply(&sample(), &FilterSpec::new().with_age_min(0.0));
        assert!(kept.iter().all(|r| r.age().is_some()));
        assert_eq!(kept.len(), 4);
    }

    #[test]
    fn test_categorical_options() {
        let records = sample();

        let smokers = FilterEngine::apply(&records, &FilterSpec::new().with_smoking(true));
        assert_eq!(smokers.len(), 3);

        let on_pill = FilterEngine::apply(&records, &FilterSpec::new().with_birth_control(true));
        assert_eq!(on_pill.len(), 3);

        let two_pregnancies =
            FilterEngine::apply(&records, &FilterSpec::new().with_pregnancies(2.0));
        assert_eq!(two_pregnancies.len(), 2);
    }

    #[test]
    fn test_conjunction() {
        let spec = FilterSpec::new()
            .with_age_range(20.0, 30.0)
            .with_smoking(true)
            .with_birth_control(true);
        let kept = FilterEngine::apply(&sample(), &spec);

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].age(), Some(29.0));
    }

    #[test]
    fn test_no_match_is_empty() {
        let kept = FilterEngine::apply(&sample(), &FilterSpec::new().with_pregnancies(9.0));
        assert!(kept.is_empty());
    }
}
