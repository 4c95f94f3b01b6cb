//! Decides which, if any, group-photo face belongs to the reference person.
//!
//! Pure functions only: no I/O and no state carried between calls. When in
//! doubt the answer is "no match".

use std::cmp::Ordering;

use crate::shared::detected_face::DetectedFace;
use crate::shared::embedding::Embedding;

use super::match_config::MatchConfig;
use super::match_decision::{Candidate, MatchDecision, NoMatchReason};
use super::match_error::MatchError;

/// Scores every detected face against `reference` and applies the
/// threshold/ambiguity rules of `config`.
///
/// Fails with [`MatchError::InvalidEmbedding`] when the reference is empty or
/// any embedding has a different dimensionality or non-finite values; such
/// faces are never skipped silently.
pub fn select_match(
    reference: &Embedding,
    faces: &[DetectedFace],
    config: &MatchConfig,
) -> Result<MatchDecision, MatchError> {
    let candidates = score_candidates(reference, faces)?;
    Ok(decide(candidates, config))
}

/// Computes the reference distance for every face, keeping detection order.
pub fn score_candidates(
    reference: &Embedding,
    faces: &[DetectedFace],
) -> Result<Vec<Candidate>, MatchError> {
    if reference.is_empty() {
        return Err(MatchError::reference("embedding is empty"));
    }
    if !reference.is_finite() {
        return Err(MatchError::reference("embedding has non-finite values"));
    }

    faces
        .iter()
        .enumerate()
        .map(|(index, face)| {
            if !face.embedding.is_finite() {
                return Err(MatchError::candidate(index, "embedding has non-finite values"));
            }
            let distance = reference
                .euclidean_distance(&face.embedding)
                .ok_or_else(|| {
                    MatchError::candidate(
                        index,
                        format!(
                            "dimension {} does not match reference dimension {}",
                            face.embedding.dim(),
                            reference.dim()
                        ),
                    )
                })?;
            log::debug!("Face #{index} distance: {distance:.3}");
            Ok(Candidate {
                index,
                face_box: face.face_box,
                distance,
            })
        })
        .collect()
}

/// Applies the decision rules to already-scored candidates.
///
/// 1. Candidates at or beyond `soft_threshold` are dropped.
/// 2. A lone survivor must be below `single_match_threshold`.
/// 3. With several survivors the closest must be below
///    `multi_match_threshold` and lead the runner-up by more than
///    `ambiguity_margin`.
pub fn decide(mut candidates: Vec<Candidate>, config: &MatchConfig) -> MatchDecision {
    if candidates.is_empty() {
        return MatchDecision::NoMatch(NoMatchReason::NoCandidates);
    }

    candidates.retain(|c| c.distance < config.soft_threshold);
    // Stable: equal distances keep detection order.
    candidates.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(Ordering::Equal));

    match candidates.as_slice() {
        [] => MatchDecision::NoMatch(NoMatchReason::AboveSoftThreshold),
        [only] => {
            if only.distance < config.single_match_threshold {
                MatchDecision::Matched(*only)
            } else {
                MatchDecision::NoMatch(NoMatchReason::InsufficientConfidence)
            }
        }
        [best, second, ..] => {
            if best.distance >= config.multi_match_threshold {
                MatchDecision::NoMatch(NoMatchReason::InsufficientConfidence)
            } else if second.distance - best.distance <= config.ambiguity_margin {
                MatchDecision::NoMatch(NoMatchReason::Ambiguous)
            } else {
                MatchDecision::Matched(*best)
            }
        }
    }
}
