//! Pipeline configuration

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};

/// How the normalizer treats header names outside the known survey columns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnPolicy {
    /// Drop the column and log a warning
    #[default]
    Ignore,
    /// Fail normalization with a schema error
    Reject,
}

/// Settings shared by every call a processor makes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineConfig {
    pub unknown_columns: ColumnPolicy,
}

impl PipelineConfig {
    /// Load configuration from JSON; missing keys keep their defaults
    pub fn from_json(json: &str) -> Result<Self, PipelineError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn strict() -> Self {
        Self {
            unknown_columns: ColumnPolicy::Reject,
        }
    }
}
