use std::path::Path;

use crate::shared::image_buffer::ImageBuffer;

/// Decodes a photo from storage into an RGB buffer.
pub trait ImageReader: Send {
    fn read(&self, path: &Path) -> Result<ImageBuffer, Box<dyn std::error::Error>>;
}
