use crate::shared::detected_face::DetectedFace;
use crate::shared::embedding::Embedding;
use crate::shared::image_buffer::ImageBuffer;

/// Domain interface for face detection plus embedding extraction.
///
/// Implementations may hold inference sessions that need exclusive access,
/// hence `&mut self`.
pub trait EmbeddingProvider: Send {
    /// Every face in `image` with its embedding; empty when none are found.
    fn detect_faces(
        &mut self,
        image: &ImageBuffer,
    ) -> Result<Vec<DetectedFace>, Box<dyn std::error::Error>>;

    /// Embedding of the face a reference portrait shows, or `None` when the
    /// image contains no detectable face.
    ///
    /// Defaults to the largest detected face.
    fn extract_embedding(
        &mut self,
        image: &ImageBuffer,
    ) -> Result<Option<Embedding>, Box<dyn std::error::Error>> {
        let faces = self.detect_faces(image)?;
        if faces.len() > 1 {
            log::warn!(
                "Reference image contains {} faces, using the largest",
                faces.len()
            );
        }
        Ok(faces
            .into_iter()
            .max_by_key(|f| f.face_box.area())
            .map(|f| f.embedding))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::face_box::FaceBox;

    struct FixedProvider(Vec<DetectedFace>);

    impl EmbeddingProvider for FixedProvider {
        fn detect_faces(
            &mut self,
            _image: &ImageBuffer,
        ) -> Result<Vec<DetectedFace>, Box<dyn std::error::Error>> {
            Ok(self.0.clone())
        }
    }

    fn image() -> ImageBuffer {
        ImageBuffer::filled(10, 10, [0, 0, 0])
    }

    #[test]
    fn test_extract_embedding_picks_largest_face() {
        let mut provider = FixedProvider(vec![
            DetectedFace::new(FaceBox::new(0, 10, 10, 0), Embedding::new(vec![1.0])),
            DetectedFace::new(FaceBox::new(0, 50, 50, 0), Embedding::new(vec![2.0])),
            DetectedFace::new(FaceBox::new(0, 20, 20, 0), Embedding::new(vec![3.0])),
        ]);
        let embedding = provider.extract_embedding(&image()).unwrap();
        assert_eq!(embedding, Some(Embedding::new(vec![2.0])));
    }

    #[test]
    fn test_extract_embedding_without_faces_is_none() {
        let mut provider = FixedProvider(Vec::new());
        assert_eq!(provider.extract_embedding(&image()).unwrap(), None);
    }
}
