use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::redaction::domain::region_redactor::RegionRedactor;
use crate::shared::face_box::FaceBox;
use crate::shared::image_buffer::{ImageBuffer, CHANNELS};

/// Which part of the face box gets blurred.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedactionShape {
    /// The whole rectangle.
    #[default]
    Rectangle,
    /// Only the ellipse inscribed in the rectangle.
    Ellipse,
}

impl FromStr for RedactionShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rect" | "rectangle" => Ok(RedactionShape::Rectangle),
            "ellipse" => Ok(RedactionShape::Ellipse),
            other => Err(format!(
                "Blur shape must be 'rect' or 'ellipse', got '{other}'"
            )),
        }
    }
}

/// Blurs a face box with a Gaussian whose strength is given as an odd
/// kernel size, the way OpenCV's `GaussianBlur(k, k, 0)` is parameterised.
pub struct GaussianRegionRedactor {
    shape: RedactionShape,
}

impl GaussianRegionRedactor {
    pub fn new(shape: RedactionShape) -> Self {
        Self { shape }
    }
}

impl Default for GaussianRegionRedactor {
    fn default() -> Self {
        Self::new(RedactionShape::Rectangle)
    }
}

/// Sigma OpenCV derives for kernel size `k` when sigma is left at zero.
pub fn sigma_for_kernel(kernel_size: usize) -> f32 {
    0.3 * ((kernel_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

impl RegionRedactor for GaussianRegionRedactor {
    fn redact(
        &self,
        image: &ImageBuffer,
        face_box: &FaceBox,
        intensity: usize,
    ) -> Result<ImageBuffer, Box<dyn std::error::Error>> {
        if intensity == 0 || intensity % 2 == 0 {
            return Err(format!(
                "Blur intensity must be a positive odd integer, got {intensity}"
            )
            .into());
        }
        let roi = face_box
            .clamp_to(image.width(), image.height())
            .ok_or_else(|| format!("Face box {face_box:?} lies outside the image"))?;

        let mut output = image.clone();
        if intensity == 1 {
            return Ok(output);
        }

        let (crop, rw, rh) = image.crop(&roi);
        let crop_img =
            image::RgbImage::from_raw(rw, rh, crop).ok_or("Failed to build ROI image")?;
        let blurred = image::imageops::blur(&crop_img, sigma_for_kernel(intensity));

        let fw = image.width() as usize;
        let (x0, y0) = (roi.left as usize, roi.top as usize);
        let (a, b) = (rw as f64 / 2.0, rh as f64 / 2.0);
        let data = output.data_mut();
        let src = blurred.as_raw();

        for row in 0..rh as usize {
            for col in 0..rw as usize {
                if self.shape == RedactionShape::Ellipse {
                    let dx = (col as f64 + 0.5 - a) / a;
                    let dy = (row as f64 + 0.5 - b) / b;
                    if dx * dx + dy * dy > 1.0 {
                        continue;
                    }
                }
                let dst = ((y0 + row) * fw + x0 + col) * CHANNELS;
                let s = (row * rw as usize + col) * CHANNELS;
                data[dst..dst + CHANNELS].copy_from_slice(&src[s..s + CHANNELS]);
            }
        }

        Ok(output)
    }
}
