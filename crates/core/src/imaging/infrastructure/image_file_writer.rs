use std::fs;
use std::path::{Path, PathBuf};

use crate::imaging::domain::image_writer::ImageWriter;
use crate::shared::image_buffer::ImageBuffer;

/// Writes a buffer with the `image` crate, choosing the format from the
/// destination extension.
///
/// Encodes into a hidden sibling file first and renames it over the
/// destination, so readers never observe a half-written photo.
pub struct ImageFileWriter;

impl ImageFileWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.part"))
}

impl ImageWriter for ImageFileWriter {
    fn write(&self, path: &Path, image: &ImageBuffer) -> Result<(), Box<dyn std::error::Error>> {
        let format = image::ImageFormat::from_path(path)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let img: image::RgbImage = image.clone().try_into()?;
        let temp_path = partial_path(path);
        if let Err(e) = img.save_with_format(&temp_path, format) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&temp_path, path) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        ImageFileWriter::new()
            .write(&path, &ImageBuffer::filled(100, 80, [50, 100, 200]))
            .unwrap();
        assert!(path.exists());
        assert!(fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_png_roundtrip_preserves_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        ImageFileWriter::new()
            .write(&path, &ImageBuffer::filled(50, 50, [50, 100, 200]))
            .unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (50, 50));
        assert_eq!(img.get_pixel(0, 0).0, [50, 100, 200]);
    }

    #[test]
    fn test_creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("class_photos").join("3A").join("out.jpg");
        ImageFileWriter::new()
            .write(&path, &ImageBuffer::filled(10, 10, [0, 0, 0]))
            .unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_no_partial_file_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        ImageFileWriter::new()
            .write(&path, &ImageBuffer::filled(10, 10, [0, 0, 0]))
            .unwrap();
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_unknown_extension_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.unknown");
        let result = ImageFileWriter::new().write(&path, &ImageBuffer::filled(4, 4, [0, 0, 0]));
        assert!(result.is_err());
        assert!(!path.exists());
    }
}
