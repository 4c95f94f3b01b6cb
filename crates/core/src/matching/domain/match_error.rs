use thiserror::Error;

/// Contract violations detected while matching. A "no match" outcome is
/// never an error; see [`MatchDecision`](super::match_decision::MatchDecision).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatchError {
    /// `subject` is either `"reference"` or `"candidate #<index>"`.
    #[error("invalid embedding for {subject}: {reason}")]
    InvalidEmbedding { subject: String, reason: String },

    #[error("invalid match configuration: {0}")]
    InvalidConfig(String),
}

impl MatchError {
    pub(crate) fn reference(reason: impl Into<String>) -> Self {
        Self::InvalidEmbedding {
            subject: "reference".to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn candidate(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidEmbedding {
            subject: format!("candidate #{index}"),
            reason: reason.into(),
        }
    }
}
