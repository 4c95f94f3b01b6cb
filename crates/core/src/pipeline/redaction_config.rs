use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::matching::domain::match_config::MatchConfig;
use crate::redaction::infrastructure::gaussian_region_redactor::RedactionShape;
use crate::shared::constants::DEFAULT_BLUR_INTENSITY;

/// What to do when one of several targets cannot be matched.
///
/// Only a missing match is subject to the policy. A reference photo without a
/// detectable face fails the request under either policy with
/// [`NoFaceDetected`](super::redaction_error::RedactionError::NoFaceDetected).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissPolicy {
    /// Fail the whole request and discard the partially redacted image.
    AbortOnFirstMiss,
    /// Skip the target; fail only if nobody was redacted.
    #[default]
    BestEffort,
}

impl FromStr for MissPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "abort" | "abort_on_first_miss" => Ok(MissPolicy::AbortOnFirstMiss),
            "best-effort" | "best_effort" => Ok(MissPolicy::BestEffort),
            other => Err(format!(
                "Miss policy must be 'abort' or 'best-effort', got '{other}'"
            )),
        }
    }
}

/// Everything that tunes a redaction request. Loadable from JSON, with
/// missing fields taking their defaults.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedactionConfig {
    pub matching: MatchConfig,
    /// Gaussian kernel size; positive and odd.
    pub blur_intensity: usize,
    pub blur_shape: RedactionShape,
    pub miss_policy: MissPolicy,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            matching: MatchConfig::default(),
            blur_intensity: DEFAULT_BLUR_INTENSITY,
            blur_shape: RedactionShape::default(),
            miss_policy: MissPolicy::default(),
        }
    }
}

impl RedactionConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.matching.validate().map_err(|e| e.to_string())?;
        if self.blur_intensity == 0 || self.blur_intensity % 2 == 0 {
            return Err(format!(
                "Blur intensity must be a positive odd number, got {}",
                self.blur_intensity
            ));
        }
        Ok(())
    }
}
