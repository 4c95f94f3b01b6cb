/// ArcFace face embedder using ONNX Runtime.
///
/// Produces L2-normalized 512-d embeddings from face crops.
use std::path::Path;

use image::imageops::FilterType;
use ndarray::{ArrayView3, Axis};

use crate::shared::embedding::Embedding;

use super::onnx_session::build_session;

const INPUT_SIZE: usize = 112;
const NORM_MEAN: f32 = 127.5;
const NORM_STD: f32 = 127.5;

pub struct ArcFaceEmbedder {
    session: ort::session::Session,
}

impl ArcFaceEmbedder {
    pub fn new(model_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self {
            session: build_session(model_path)?,
        })
    }

    /// Embeds an RGB crop of `width` × `height` pixels.
    pub fn embed(
        &mut self,
        rgb_data: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Embedding, Box<dyn std::error::Error>> {
        if width == 0 || height == 0 {
            return Err("Cannot embed an empty face crop".into());
        }
        let tensor = preprocess(rgb_data, width, height)?;
        let input_value = ort::value::Tensor::from_array(tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        let embedding_array = outputs[0].try_extract_array::<f32>()?;
        let values = embedding_array
            .as_slice()
            .ok_or("Cannot get embedding slice")?
            .to_vec();

        let mut embedding = Embedding::new(values);
        embedding.l2_normalize();
        Ok(embedding)
    }
}

/// Bilinear resize to the model's 112x112 input, scaled to [-1, 1], NCHW.
fn preprocess(
    rgb_data: &[u8],
    width: u32,
    height: u32,
) -> Result<ndarray::Array4<f32>, Box<dyn std::error::Error>> {
    let crop = image::RgbImage::from_raw(width, height, rgb_data.to_vec())
        .ok_or("Face crop data does not match its dimensions")?;
    let side = INPUT_SIZE as u32;
    let resized = image::imageops::resize(&crop, side, side, FilterType::Triangle);

    let pixels =
        ArrayView3::from_shape((INPUT_SIZE, INPUT_SIZE, 3), resized.as_raw().as_slice())?;
    let tensor = pixels
        .mapv(|v| (v as f32 - NORM_MEAN) / NORM_STD)
        .permuted_axes([2, 0, 1])
        .insert_axis(Axis(0));
    Ok(tensor.as_standard_layout().into_owned())
}
