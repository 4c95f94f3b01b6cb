use std::path::Path;

use crate::shared::image_buffer::ImageBuffer;

/// Encodes an RGB buffer to storage.
pub trait ImageWriter: Send {
    /// Writes `image` to `path`. Either the complete file appears at `path`
    /// or nothing does.
    fn write(&self, path: &Path, image: &ImageBuffer) -> Result<(), Box<dyn std::error::Error>>;
}
