use serde::{Deserialize, Serialize};

use super::match_error::MatchError;

/// Distance at or above which a candidate is ignored entirely.
pub const DEFAULT_SOFT_THRESHOLD: f64 = 0.7;

/// Bar for the lone surviving candidate. Stricter than the multi-candidate
/// bar because nothing corroborates it.
pub const DEFAULT_SINGLE_MATCH_THRESHOLD: f64 = 0.5;

pub const DEFAULT_MULTI_MATCH_THRESHOLD: f64 = 0.55;

/// Required gap between the best and the runner-up candidate.
pub const DEFAULT_AMBIGUITY_MARGIN: f64 = 0.1;

/// Presets for L2-normalised ArcFace embeddings, where the Euclidean distance
/// of two unit vectors is `sqrt(2 - 2 * cos)`. A lone face needs cosine
/// similarity of about 0.4 (distance 1.1), the usual same-person bar for this
/// model; faces below a cosine of about 0.15 are ignored.
pub const ARCFACE_SOFT_THRESHOLD: f64 = 1.3;
pub const ARCFACE_SINGLE_MATCH_THRESHOLD: f64 = 1.1;
pub const ARCFACE_MULTI_MATCH_THRESHOLD: f64 = 1.15;
pub const ARCFACE_AMBIGUITY_MARGIN: f64 = 0.2;

/// Thresholds for the match decision, all in embedding-distance units.
///
/// The defaults are tuned for 128-d dlib-style embeddings. Embeddings from a
/// different model live in a different distance range and need their own
/// empirically derived values.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub soft_threshold: f64,
    pub single_match_threshold: f64,
    pub multi_match_threshold: f64,
    pub ambiguity_margin: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            soft_threshold: DEFAULT_SOFT_THRESHOLD,
            single_match_threshold: DEFAULT_SINGLE_MATCH_THRESHOLD,
            multi_match_threshold: DEFAULT_MULTI_MATCH_THRESHOLD,
            ambiguity_margin: DEFAULT_AMBIGUITY_MARGIN,
        }
    }
}

impl MatchConfig {
    /// Thresholds for the bundled ArcFace embedder.
    pub fn arcface() -> Self {
        Self {
            soft_threshold: ARCFACE_SOFT_THRESHOLD,
            single_match_threshold: ARCFACE_SINGLE_MATCH_THRESHOLD,
            multi_match_threshold: ARCFACE_MULTI_MATCH_THRESHOLD,
            ambiguity_margin: ARCFACE_AMBIGUITY_MARGIN,
        }
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        let fields = [
            ("soft_threshold", self.soft_threshold),
            ("single_match_threshold", self.single_match_threshold),
            ("multi_match_threshold", self.multi_match_threshold),
            ("ambiguity_margin", self.ambiguity_margin),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(MatchError::InvalidConfig(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        if self.single_match_threshold > self.soft_threshold {
            return Err(MatchError::InvalidConfig(format!(
                "single_match_threshold ({}) exceeds soft_threshold ({})",
                self.single_match_threshold, self.soft_threshold
            )));
        }
        if self.multi_match_threshold > self.soft_threshold {
            return Err(MatchError::InvalidConfig(format!(
                "multi_match_threshold ({}) exceeds soft_threshold ({})",
                self.multi_match_threshold, self.soft_threshold
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn test_default_values() {
        let config = MatchConfig::default();
        assert_relative_eq!(config.soft_threshold, 0.7);
        assert_relative_eq!(config.single_match_threshold, 0.5);
        assert_relative_eq!(config.multi_match_threshold, 0.55);
        assert_relative_eq!(config.ambiguity_margin, 0.1);
    }

    #[test]
    fn test_default_is_valid() {
        assert!(MatchConfig::default().validate().is_ok());
    }

    #[test]
    fn test_arcface_preset_is_valid() {
        assert!(MatchConfig::arcface().validate().is_ok());
    }

    /// Cosine similarity a unit-vector distance corresponds to.
    fn cosine(distance: f64) -> f64 {
        1.0 - distance * distance / 2.0
    }

    #[test]
    fn test_arcface_preset_in_cosine_terms() {
        let config = MatchConfig::arcface();
        assert_relative_eq!(cosine(config.single_match_threshold), 0.395, epsilon = 1e-9);
        assert_relative_eq!(cosine(config.soft_threshold), 0.155, epsilon = 1e-9);
        assert!(config.single_match_threshold < config.multi_match_threshold);
    }

    #[rstest]
    #[case::negative_margin(MatchConfig { ambiguity_margin: -0.1, ..MatchConfig::default() })]
    #[case::nan_soft(MatchConfig { soft_threshold: f64::NAN, ..MatchConfig::default() })]
    #[case::infinite_multi(MatchConfig { multi_match_threshold: f64::INFINITY, ..MatchConfig::default() })]
    #[case::single_above_soft(MatchConfig { single_match_threshold: 0.8, ..MatchConfig::default() })]
    #[case::multi_above_soft(MatchConfig { multi_match_threshold: 0.75, ..MatchConfig::default() })]
    fn test_invalid_configs(#[case] config: MatchConfig) {
        assert!(matches!(
            config.validate(),
            Err(MatchError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_deserialize_partial_uses_defaults() {
        let config: MatchConfig = serde_json::from_str(r#"{"ambiguity_margin": 0.2}"#).unwrap();
        assert_relative_eq!(config.ambiguity_margin, 0.2);
        assert_relative_eq!(config.soft_threshold, 0.7);
        assert_relative_eq!(config.single_match_threshold, 0.5);
    }
}
