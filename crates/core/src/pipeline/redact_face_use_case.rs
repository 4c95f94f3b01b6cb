use crate::detection::domain::embedding_provider::EmbeddingProvider;
use crate::matching::domain::match_config::MatchConfig;
use crate::matching::domain::match_decision::MatchDecision;
use crate::matching::domain::match_selector::select_match;
use crate::pipeline::redaction_error::RedactionError;
use crate::redaction::domain::region_redactor::RegionRedactor;
use crate::shared::image_buffer::ImageBuffer;

/// Outcome of redacting one target in one image.
#[derive(Debug)]
pub struct FaceRedaction {
    pub image: ImageBuffer,
    pub decision: MatchDecision,
    pub faces_found: usize,
}

impl FaceRedaction {
    pub fn redacted(&self) -> bool {
        self.decision.is_match()
    }
}

/// Applies a decision to `image`: the matched box is redacted, anything else
/// hands the buffer back unchanged. The flag reports whether a redaction
/// happened.
pub fn apply_decision(
    image: ImageBuffer,
    decision: &MatchDecision,
    redactor: &dyn RegionRedactor,
    intensity: usize,
) -> Result<(ImageBuffer, bool), Box<dyn std::error::Error>> {
    match decision {
        MatchDecision::Matched(candidate) => {
            let redacted = redactor.redact(&image, &candidate.face_box, intensity)?;
            Ok((redacted, true))
        }
        MatchDecision::NoMatch(_) => Ok((image, false)),
    }
}

/// Single-target pipeline: reference embedding → detect → select → redact.
pub struct RedactFaceUseCase {
    provider: Box<dyn EmbeddingProvider>,
    redactor: Box<dyn RegionRedactor>,
    match_config: MatchConfig,
    blur_intensity: usize,
}

impl RedactFaceUseCase {
    pub fn new(
        provider: Box<dyn EmbeddingProvider>,
        redactor: Box<dyn RegionRedactor>,
        match_config: MatchConfig,
        blur_intensity: usize,
    ) -> Self {
        Self {
            provider,
            redactor,
            match_config,
            blur_intensity,
        }
    }

    /// Redacts `target`'s face in `image` if it can be picked out with
    /// confidence. A reference without a detectable face is an error and is
    /// reported before the group image is examined.
    pub fn execute(
        &mut self,
        image: ImageBuffer,
        reference: &ImageBuffer,
        target: &str,
    ) -> Result<FaceRedaction, RedactionError> {
        let reference_embedding = self
            .provider
            .extract_embedding(reference)
            .map_err(RedactionError::Provider)?
            .ok_or_else(|| RedactionError::NoFaceDetected {
                target: target.to_string(),
            })?;

        let faces = self
            .provider
            .detect_faces(&image)
            .map_err(RedactionError::Provider)?;
        log::info!("Found {} faces in group image", faces.len());

        let decision = select_match(&reference_embedding, &faces, &self.match_config)?;
        match &decision {
            MatchDecision::Matched(c) => log::info!(
                "Matched {target} to face #{} (distance {:.3})",
                c.index,
                c.distance
            ),
            MatchDecision::NoMatch(reason) => {
                log::info!("No confident match for {target}: {reason:?}")
            }
        }

        let (image, _) = apply_decision(image, &decision, &*self.redactor, self.blur_intensity)
            .map_err(RedactionError::Redactor)?;

        Ok(FaceRedaction {
            image,
            decision,
            faces_found: faces.len(),
        })
    }
}
