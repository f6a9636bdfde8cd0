//! Age classification
//!
//! Maps a numeric age onto one of five fixed, ordered buckets. The buckets
//! partition the whole real line: there are no gaps, no overlaps and no
//! rejected inputs.

use crate::types::RiskRecord;
use serde::{Deserialize, Serialize};

/// Age bucket used by every per-group chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgeGroup {
    #[serde(rename = "< 20")]
    Under20,
    #[serde(rename = "20-29")]
    Twenties,
    #[serde(rename = "30-39")]
    Thirties,
    #[serde(rename = "40-49")]
    Forties,
    #[serde(rename = "50+")]
    FiftyPlus,
}

/// A bucket and the exclusive upper bound of its age range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgeBand {
    pub group: AgeGroup,
    /// `None` for the open-ended last band
    pub upper_bound: Option<f64>,
}

/// Age bands in ascending order
pub const AGE_GROUPS: [AgeBand; 5] = [
    AgeBand {
        group: AgeGroup::Under20,
        upper_bound: Some(20.0),
    },
    AgeBand {
        group: AgeGroup::Twenties,
        upper_bound: Some(30.0),
    },
    AgeBand {
        group: AgeGroup::Thirties,
        upper_bound: Some(40.0),
    },
    AgeBand {
        group: AgeGroup::Forties,
        upper_bound: Some(50.0),
    },
    AgeBand {
        group: AgeGroup::FiftyPlus,
        upper_bound: None,
    },
];

impl AgeGroup {
    /// Every group, in chart order
    pub const ALL: [AgeGroup; 5] = [
        AgeGroup::Under20,
        AgeGroup::Twenties,
        AgeGroup::Thirties,
        AgeGroup::Forties,
        AgeGroup::FiftyPlus,
    ];

    /// Bucket an age.
    ///
    /// Negative ages and `-inf` land in `< 20`; `+inf` and NaN fail every
    /// bounded comparison and land in `50+`.
    pub fn classify(age: f64) -> AgeGroup {
        AGE_GROUPS
            .iter()
            .find(|band| band.upper_bound.map_or(true, |upper| age < upper))
            .map_or(AgeGroup::FiftyPlus, |band| band.group)
    }

    /// Bucket a record. A record without an age counts as `< 20`, so the
    /// groups always cover the whole record set.
    pub fn of_record(record: &RiskRecord) -> AgeGroup {
        record.age().map_or(AgeGroup::Under20, AgeGroup::classify)
    }

    /// Display label used in chart rows
    pub fn label(&self) -> &'static str {
        match self {
            AgeGroup::Under20 => "< 20",
            AgeGroup::Twenties => "20-29",
            AgeGroup::Thirties => "30-39",
            AgeGroup::Forties => "40-49",
            AgeGroup::FiftyPlus => "50+",
        }
    }

    /// Position in chart order
    pub fn index(&self) -> usize {
        *self as usize
    }
}
