use serde::Serialize;

use crate::shared::face_box::FaceBox;

/// A group-photo face scored against the reference embedding.
///
/// Exists only for the duration of one matching call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    /// Position of the face in the provider's detection list.
    pub index: usize,
    pub face_box: FaceBox,
    pub distance: f64,
}

/// Why a matching attempt selected nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoMatchReason {
    /// The group photo contained no faces.
    NoCandidates,
    /// Every face was at or beyond the soft threshold.
    AboveSoftThreshold,
    /// The best face did not clear the single/multi threshold.
    InsufficientConfidence,
    /// The best face was too close to the runner-up.
    Ambiguous,
}

/// Outcome of one matching attempt. At most one face is ever selected.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MatchDecision {
    NoMatch(NoMatchReason),
    Matched(Candidate),
}

impl MatchDecision {
    pub fn is_match(&self) -> bool {
        matches!(self, MatchDecision::Matched(_))
    }

    pub fn face_box(&self) -> Option<FaceBox> {
        match self {
            MatchDecision::Matched(c) => Some(c.face_box),
            MatchDecision::NoMatch(_) => None,
        }
    }

    pub fn distance(&self) -> Option<f64> {
        match self {
            MatchDecision::Matched(c) => Some(c.distance),
            MatchDecision::NoMatch(_) => None,
        }
    }

    pub fn no_match_reason(&self) -> Option<NoMatchReason> {
        match self {
            MatchDecision::NoMatch(reason) => Some(*reason),
            MatchDecision::Matched(_) => None,
        }
    }
}
