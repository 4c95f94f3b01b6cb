use serde::Serialize;

use crate::matching::domain::match_decision::NoMatchReason;
use crate::pipeline::redact_face_use_case::RedactFaceUseCase;
use crate::pipeline::redaction_config::MissPolicy;
use crate::pipeline::redaction_error::RedactionError;
use crate::shared::face_box::FaceBox;
use crate::shared::image_buffer::ImageBuffer;

/// A person whose face should be removed from the group photo.
#[derive(Clone, Debug)]
pub struct RedactionTarget {
    pub name: String,
    pub reference: ImageBuffer,
}

impl RedactionTarget {
    pub fn new(name: impl Into<String>, reference: ImageBuffer) -> Self {
        Self {
            name: name.into(),
            reference,
        }
    }
}

/// Per-target summary of what the fold did.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TargetReport {
    pub name: String,
    pub redacted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<NoMatchReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub face_box: Option<FaceBox>,
    pub faces_found: usize,
}

#[derive(Debug)]
pub struct GroupRedaction {
    pub image: ImageBuffer,
    pub reports: Vec<TargetReport>,
}

impl GroupRedaction {
    pub fn redacted_count(&self) -> usize {
        self.reports.iter().filter(|r| r.redacted).count()
    }
}

/// Removes several people from one photo, one after another. Each step runs
/// on the output of the previous one.
pub struct RedactGroupPhotoUseCase {
    face: RedactFaceUseCase,
    miss_policy: MissPolicy,
}

impl RedactGroupPhotoUseCase {
    pub fn new(face: RedactFaceUseCase, miss_policy: MissPolicy) -> Self {
        Self { face, miss_policy }
    }

    pub fn execute(
        &mut self,
        image: ImageBuffer,
        targets: &[RedactionTarget],
    ) -> Result<GroupRedaction, RedactionError> {
        if targets.is_empty() {
            return Err(RedactionError::NoTargets);
        }

        let mut current = image;
        let mut reports = Vec::with_capacity(targets.len());

        for target in targets {
            log::info!("Redacting {}", target.name);
            let step = self.face.execute(current, &target.reference, &target.name)?;

            if let Some(reason) = step.decision.no_match_reason() {
                if self.miss_policy == MissPolicy::AbortOnFirstMiss {
                    return Err(RedactionError::NoMatch {
                        target: target.name.clone(),
                        reason,
                    });
                }
                log::warn!("Could not find {} in the photo, skipping", target.name);
            }

            reports.push(TargetReport {
                name: target.name.clone(),
                redacted: step.redacted(),
                reason: step.decision.no_match_reason(),
                distance: step.decision.distance(),
                face_box: step.decision.face_box(),
                faces_found: step.faces_found,
            });
            current = step.image;
        }

        let result = GroupRedaction {
            image: current,
            reports,
        };
        if result.redacted_count() == 0 {
            return Err(RedactionError::NothingRedacted);
        }
        log::info!(
            "Redacted {} of {} targets",
            result.redacted_count(),
            targets.len()
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::domain::match_config::MatchConfig;
    use crate::pipeline::redact_face_use_case::tests::{
        face, reference_image, PaintingRedactor, StubProvider,
    };
    use crate::shared::embedding::Embedding;

    const LEFT: FaceBox = FaceBox {
        top: 2,
        right: 12,
        bottom: 12,
        left: 2,
    };
    const RIGHT: FaceBox = FaceBox {
        top: 2,
        right: 32,
        bottom: 12,
        left: 22,
    };
    const BACKGROUND: [u8; 3] = [10, 20, 30];
    const PAINTED: [u8; 3] = [255, 255, 255];

    /// Reference keys: 1 matches LEFT, 2 matches RIGHT, 3 matches nobody,
    /// 4 has no face.
    fn provider() -> StubProvider {
        StubProvider::new(
            vec![
                (1, Some(Embedding::new(vec![0.0, 0.0]))),
                (2, Some(Embedding::new(vec![1.0, 0.0]))),
                (3, Some(Embedding::new(vec![5.0, 5.0]))),
                (4, None),
            ],
            vec![face(LEFT, &[0.05, 0.0]), face(RIGHT, &[0.95, 0.0])],
        )
    }

    fn use_case(provider: StubProvider, policy: MissPolicy) -> RedactGroupPhotoUseCase {
        let face = RedactFaceUseCase::new(
            Box::new(provider),
            Box::new(PaintingRedactor::new()),
            MatchConfig::default(),
            55,
        );
        RedactGroupPhotoUseCase::new(face, policy)
    }

    fn group_image() -> ImageBuffer {
        ImageBuffer::filled(40, 20, BACKGROUND)
    }

    fn target(name: &str, key: u8) -> RedactionTarget {
        RedactionTarget::new(name, reference_image(key))
    }

    #[test]
    fn test_redactions_accumulate_across_targets() {
        let mut uc = use_case(provider(), MissPolicy::BestEffort);

        let result = uc
            .execute(group_image(), &[target("alice", 1), target("bob", 2)])
            .unwrap();

        assert_eq!(result.redacted_count(), 2);
        assert_eq!(result.image.pixel(5, 5), PAINTED);
        assert_eq!(result.image.pixel(25, 5), PAINTED);
        assert_eq!(result.image.pixel(16, 15), BACKGROUND);
    }

    #[test]
    fn test_reports_follow_target_order() {
        let mut uc = use_case(provider(), MissPolicy::BestEffort);

        let result = uc
            .execute(group_image(), &[target("bob", 2), target("nobody", 3)])
            .unwrap();

        assert_eq!(result.reports.len(), 2);
        assert_eq!(result.reports[0].name, "bob");
        assert!(result.reports[0].redacted);
        assert_eq!(result.reports[0].face_box, Some(RIGHT));
        assert_eq!(result.reports[1].name, "nobody");
        assert!(!result.reports[1].redacted);
        assert_eq!(
            result.reports[1].reason,
            Some(NoMatchReason::AboveSoftThreshold)
        );
        assert_eq!(result.reports[1].distance, None);
    }

    #[test]
    fn test_best_effort_skips_misses() {
        let mut uc = use_case(provider(), MissPolicy::BestEffort);

        let result = uc
            .execute(group_image(), &[target("nobody", 3), target("alice", 1)])
            .unwrap();

        assert_eq!(result.redacted_count(), 1);
        assert_eq!(result.image.pixel(5, 5), PAINTED);
        assert_eq!(result.image.pixel(25, 5), BACKGROUND);
    }

    #[test]
    fn test_best_effort_fails_when_nothing_redacted() {
        let mut uc = use_case(provider(), MissPolicy::BestEffort);

        let err = uc
            .execute(group_image(), &[target("nobody", 3)])
            .unwrap_err();
        assert!(matches!(err, RedactionError::NothingRedacted));
    }

    #[test]
    fn test_abort_stops_at_first_miss() {
        let provider = provider();
        let calls = provider.calls.clone();
        let mut uc = use_case(provider, MissPolicy::AbortOnFirstMiss);

        let err = uc
            .execute(
                group_image(),
                &[target("alice", 1), target("nobody", 3), target("bob", 2)],
            )
            .unwrap_err();

        assert!(matches!(err, RedactionError::NoMatch { ref target, .. } if target == "nobody"));
        // bob was never attempted
        assert_eq!(calls.lock().unwrap().len(), 4);
    }

    #[test]
    fn test_missing_reference_face_is_fatal_under_best_effort() {
        let mut uc = use_case(provider(), MissPolicy::BestEffort);

        let err = uc
            .execute(group_image(), &[target("alice", 1), target("ghost", 4)])
            .unwrap_err();
        assert!(matches!(err, RedactionError::NoFaceDetected { ref target } if target == "ghost"));
    }

    #[test]
    fn test_no_targets_is_an_error() {
        let mut uc = use_case(provider(), MissPolicy::BestEffort);
        let err = uc.execute(group_image(), &[]).unwrap_err();
        assert!(matches!(err, RedactionError::NoTargets));
    }

    #[test]
    fn test_report_serializes_without_empty_fields() {
        let report = TargetReport {
            name: "alice".to_string(),
            redacted: true,
            reason: None,
            distance: Some(0.25),
            face_box: None,
            faces_found: 3,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "alice",
                "redacted": true,
                "distance": 0.25,
                "faces_found": 3,
            })
        );
    }
}
