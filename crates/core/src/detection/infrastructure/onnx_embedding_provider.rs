use std::path::Path;

use crate::detection::domain::embedding_provider::EmbeddingProvider;
use crate::shared::detected_face::DetectedFace;
use crate::shared::face_box::FaceBox;
use crate::shared::image_buffer::ImageBuffer;

use super::arcface_embedder::ArcFaceEmbedder;
use super::onnx_face_detector::OnnxFaceDetector;

/// Context added around each detected box before embedding, as a fraction
/// of the box size.
const CROP_MARGIN: f64 = 0.1;

/// Embedding provider backed by a YOLO face detector and an ArcFace
/// embedder, both running on ONNX Runtime.
pub struct OnnxEmbeddingProvider {
    detector: OnnxFaceDetector,
    embedder: ArcFaceEmbedder,
}

impl OnnxEmbeddingProvider {
    pub fn new(detector: OnnxFaceDetector, embedder: ArcFaceEmbedder) -> Self {
        Self { detector, embedder }
    }

    pub fn from_models(
        detector_model: &Path,
        embedding_model: &Path,
        confidence: f64,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self::new(
            OnnxFaceDetector::new(detector_model, confidence)?,
            ArcFaceEmbedder::new(embedding_model)?,
        ))
    }
}

/// Box to crop for embedding: the face plus margin, squared so the resize to
/// the embedder's square input keeps proportions, and kept inside the image.
fn crop_box(face_box: &FaceBox, margin: f64, width: u32, height: u32) -> Option<FaceBox> {
    face_box.expand(margin).squared().clamp_to(width, height)
}

impl EmbeddingProvider for OnnxEmbeddingProvider {
    fn detect_faces(
        &mut self,
        image: &ImageBuffer,
    ) -> Result<Vec<DetectedFace>, Box<dyn std::error::Error>> {
        let boxes = self.detector.detect(image)?;
        log::debug!("Detected {} faces", boxes.len());

        let mut faces = Vec::with_capacity(boxes.len());
        for face_box in boxes {
            let Some(roi) = crop_box(&face_box, CROP_MARGIN, image.width(), image.height())
            else {
                continue;
            };
            let (crop, w, h) = image.crop(&roi);
            let embedding = self.embedder.embed(&crop, w, h)?;
            faces.push(DetectedFace::new(face_box, embedding));
        }
        Ok(faces)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crop_box_adds_margin() {
        let b = FaceBox::new(100, 200, 200, 100);
        assert_eq!(
            crop_box(&b, 0.1, 1000, 1000),
            Some(FaceBox::new(90, 210, 210, 90))
        );
    }

    #[test]
    fn test_crop_box_stays_inside_image() {
        let b = FaceBox::new(0, 50, 50, 0);
        assert_eq!(
            crop_box(&b, 0.2, 60, 60),
            Some(FaceBox::new(0, 60, 60, 0))
        );
    }

    #[test]
    fn test_crop_box_squares_tall_face() {
        // 40 wide × 60 tall, margin 0.1 → 48 × 72, squared to 72 × 72
        let b = FaceBox::new(100, 140, 160, 100);
        let roi = crop_box(&b, 0.1, 1000, 1000).unwrap();
        assert_eq!(roi, FaceBox::new(94, 156, 166, 84));
        assert_eq!(roi.width(), roi.height());
    }
}
