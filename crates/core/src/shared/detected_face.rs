use crate::shared::embedding::Embedding;
use crate::shared::face_box::FaceBox;

/// One face found by an embedding provider: its box paired with the
/// embedding computed from the same image.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectedFace {
    pub face_box: FaceBox,
    pub embedding: Embedding,
}

impl DetectedFace {
    pub fn new(face_box: FaceBox, embedding: Embedding) -> Self {
        Self {
            face_box,
            embedding,
        }
    }
}
