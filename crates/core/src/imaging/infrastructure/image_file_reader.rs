use std::path::Path;

use crate::imaging::domain::image_reader::ImageReader;
use crate::shared::image_buffer::ImageBuffer;

/// Reads any format the `image` crate can decode, converting to RGB8.
///
/// Alpha is dropped and grayscale is expanded, so every downstream stage
/// sees three channels.
pub struct ImageFileReader;

impl ImageFileReader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageReader for ImageFileReader {
    fn read(&self, path: &Path) -> Result<ImageBuffer, Box<dyn std::error::Error>> {
        let decoded = image::ImageReader::open(path)?
            .with_guessed_format()?
            .decode()?;
        let rgb = decoded.to_rgb8();
        if rgb.width() == 0 || rgb.height() == 0 {
            return Err(format!("Image has zero dimensions: {}", path.display()).into());
        }
        log::debug!(
            "Read {} ({}x{})",
            path.display(),
            rgb.width(),
            rgb.height()
        );
        Ok(ImageBuffer::from(rgb))
    }
}
