use crate::shared::face_box::FaceBox;
use crate::shared::image_buffer::ImageBuffer;

/// Domain interface for irreversibly obscuring one face region.
///
/// Implementations return a new buffer; the input is never modified, so a
/// failed redaction leaves the caller's image untouched.
pub trait RegionRedactor: Send {
    fn redact(
        &self,
        image: &ImageBuffer,
        face_box: &FaceBox,
        intensity: usize,
    ) -> Result<ImageBuffer, Box<dyn std::error::Error>>;
}
