use std::path::{Path, PathBuf};

use crate::imaging::domain::image_reader::ImageReader;
use crate::imaging::domain::image_writer::ImageWriter;
use crate::pipeline::redact_group_photo_use_case::{
    RedactGroupPhotoUseCase, RedactionTarget, TargetReport,
};
use crate::pipeline::redaction_error::RedactionError;
use crate::shared::image_buffer::ImageBuffer;

/// A named reference portrait on disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReferenceFile {
    pub name: String,
    pub path: PathBuf,
}

impl ReferenceFile {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// File-level pipeline: read references and group photo → redact → write.
///
/// The output is written only when the whole request succeeds.
pub struct RedactPhotoFileUseCase {
    reader: Box<dyn ImageReader>,
    writer: Box<dyn ImageWriter>,
    group: RedactGroupPhotoUseCase,
}

impl RedactPhotoFileUseCase {
    pub fn new(
        reader: Box<dyn ImageReader>,
        writer: Box<dyn ImageWriter>,
        group: RedactGroupPhotoUseCase,
    ) -> Self {
        Self {
            reader,
            writer,
            group,
        }
    }

    pub fn execute(
        &mut self,
        input_path: &Path,
        references: &[ReferenceFile],
        output_path: &Path,
    ) -> Result<Vec<TargetReport>, RedactionError> {
        let mut targets = Vec::with_capacity(references.len());
        for reference in references {
            targets.push(RedactionTarget::new(
                reference.name.clone(),
                self.read(&reference.path)?,
            ));
        }

        let image = self.read(input_path)?;
        log::info!(
            "Loaded {} ({}x{})",
            input_path.display(),
            image.width(),
            image.height()
        );

        let result = self.group.execute(image, &targets)?;

        self.writer
            .write(output_path, &result.image)
            .map_err(|source| RedactionError::Write {
                path: output_path.to_path_buf(),
                source,
            })?;
        log::info!("Wrote {}", output_path.display());

        Ok(result.reports)
    }

    fn read(&self, path: &Path) -> Result<ImageBuffer, RedactionError> {
        self.reader.read(path).map_err(|source| RedactionError::Read {
            path: path.to_path_buf(),
            source,
        })
    }
}
