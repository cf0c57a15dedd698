use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::predictor::NEUTRAL_PREDICTION;
use crate::scoring::PenaltyConfig;

/// Top-level configuration file.
///
/// Every section is optional; a missing file means all defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    pub models: ModelsConfig,
    pub penalties: PenaltyConfig,
    /// Log filter such as "info" or "saju_match=debug". `SAJU_MATCH_LOG` wins.
    pub log_level: Option<String>,
}

/// Where the affinity models live and what to use without them.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct ModelsConfig {
    pub stem: Option<PathBuf>,
    pub branch: Option<PathBuf>,
    pub fallback_prediction: f64,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            stem: None,
            branch: None,
            fallback_prediction: NEUTRAL_PREDICTION,
        }
    }
}
