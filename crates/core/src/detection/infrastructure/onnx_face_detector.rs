/// YOLO face detector using ONNX Runtime via `ort`.
///
/// Handles letterbox preprocessing, inference and NMS post-processing, and
/// reports face boxes in the coordinates of the original image.
use std::path::Path;

use crate::shared::face_box::FaceBox;
use crate::shared::image_buffer::ImageBuffer;

use super::math::{nms, ScoredBox};
use super::onnx_session::build_session;

/// Fallback input resolution when the model doesn't specify dimensions.
const DEFAULT_INPUT_SIZE: u32 = 640;

/// Default confidence threshold for face detection.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

const NMS_IOU_THRESH: f64 = 0.45;

/// Letterbox padding value (YOLO convention).
const PAD_VALUE: f32 = 114.0 / 255.0;

/// Where the resized image sits inside the square model input.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Letterbox {
    scale: f64,
    pad_x: u32,
    pad_y: u32,
}

impl Letterbox {
    fn to_image(&self, x: f64, y: f64) -> (f64, f64) {
        (
            (x - self.pad_x as f64) / self.scale,
            (y - self.pad_y as f64) / self.scale,
        )
    }
}

pub struct OnnxFaceDetector {
    session: ort::session::Session,
    confidence: f64,
    input_size: u32,
}

impl OnnxFaceDetector {
    /// Loads a YOLO face model. The input resolution is read from the
    /// model's NCHW input shape, falling back to 640 when it is dynamic.
    pub fn new(model_path: &Path, confidence: f64) -> Result<Self, Box<dyn std::error::Error>> {
        let session = build_session(model_path)?;

        let input_size = session
            .inputs()
            .first()
            .and_then(|input| {
                if let ort::value::ValueType::Tensor { ref shape, .. } = input.dtype() {
                    if shape.len() >= 4 && shape[2] > 0 {
                        Some(shape[2] as u32)
                    } else {
                        None
                    }
                } else {
                    None
                }
            })
            .unwrap_or(DEFAULT_INPUT_SIZE);

        Ok(Self {
            session,
            confidence,
            input_size,
        })
    }

    /// Detects faces, highest confidence first.
    pub fn detect(&mut self, image: &ImageBuffer) -> Result<Vec<FaceBox>, Box<dyn std::error::Error>> {
        let (input_tensor, letterbox) = letterbox(image, self.input_size);

        let input_value = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        if outputs.len() == 0 {
            return Err("Face detection model produced no outputs".into());
        }
        let tensor = outputs[0].try_extract_array::<f32>()?;
        let shape = tensor.shape().to_vec();
        let data = tensor.as_slice().ok_or("Cannot get tensor slice")?;

        let boxes = parse_detections(data, &shape, self.confidence, letterbox)?;
        let kept = nms(boxes, NMS_IOU_THRESH);

        Ok(kept
            .iter()
            .filter_map(|b| {
                FaceBox::from_corners(b.x1, b.y1, b.x2, b.y2).clamp_to(image.width(), image.height())
            })
            .collect())
    }
}

/// Letterbox-resize an image to `target_size` × `target_size`, returning the
/// NCHW float32 tensor and the placement used.
fn letterbox(image: &ImageBuffer, target_size: u32) -> (ndarray::Array4<f32>, Letterbox) {
    let fw = image.width() as f64;
    let fh = image.height() as f64;
    let target = target_size as f64;

    let scale = (target / fw).min(target / fh);
    let new_w = ((fw * scale).round() as u32).min(target_size);
    let new_h = ((fh * scale).round() as u32).min(target_size);
    let pad_x = (target_size - new_w) / 2;
    let pad_y = (target_size - new_h) / 2;

    let mut tensor = ndarray::Array4::<f32>::from_elem(
        (1, 3, target_size as usize, target_size as usize),
        PAD_VALUE,
    );

    let src = image.as_ndarray();
    let src_h = image.height() as usize;
    let src_w = image.width() as usize;

    // Nearest-neighbour resize into the padded square
    for y in 0..new_h as usize {
        let src_y = ((y as f64 / scale) as usize).min(src_h - 1);
        for x in 0..new_w as usize {
            let src_x = ((x as f64 / scale) as usize).min(src_w - 1);
            let ty = pad_y as usize + y;
            let tx = pad_x as usize + x;
            for c in 0..3 {
                tensor[[0, c, ty, tx]] = src[[src_y, src_x, c]] as f32 / 255.0;
            }
        }
    }

    (
        tensor,
        Letterbox {
            scale,
            pad_x,
            pad_y,
        },
    )
}

/// Decodes raw YOLO output rows `[cx, cy, w, h, conf, ...]`.
///
/// Accepts both `[1, features, detections]` (transposed, the usual export)
/// and `[1, detections, features]` layouts. Extra per-row values such as
/// keypoints are ignored.
fn parse_detections(
    data: &[f32],
    shape: &[usize],
    confidence: f64,
    letterbox: Letterbox,
) -> Result<Vec<ScoredBox>, Box<dyn std::error::Error>> {
    if shape.len() != 3 {
        return Err(format!("Unexpected detector output shape: {shape:?}").into());
    }
    let transposed = shape[1] < shape[2];
    let (num_dets, num_feats) = if transposed {
        (shape[2], shape[1])
    } else {
        (shape[1], shape[2])
    };
    if num_feats < 5 {
        return Ok(Vec::new());
    }
    if data.len() < num_dets * num_feats {
        return Err("Detector output is shorter than its shape".into());
    }

    let value = |det: usize, feat: usize| -> f64 {
        let idx = if transposed {
            feat * num_dets + det
        } else {
            det * num_feats + feat
        };
        data[idx] as f64
    };

    let mut boxes = Vec::new();
    for i in 0..num_dets {
        let conf = value(i, 4);
        if conf < confidence {
            continue;
        }
        let (cx, cy, w, h) = (value(i, 0), value(i, 1), value(i, 2), value(i, 3));
        let (x1, y1) = letterbox.to_image(cx - w / 2.0, cy - h / 2.0);
        let (x2, y2) = letterbox.to_image(cx + w / 2.0, cy + h / 2.0);
        boxes.push(ScoredBox {
            x1,
            y1,
            x2,
            y2,
            confidence: conf,
        });
    }
    Ok(boxes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const IDENTITY: Letterbox = Letterbox {
        scale: 1.0,
        pad_x: 0,
        pad_y: 0,
    };

    #[test]
    fn test_letterbox_preserves_aspect_ratio() {
        // 200x100 → 640x640: scale 3.2, new 640x320, pad_y 160
        let image = ImageBuffer::filled(200, 100, [128, 128, 128]);
        let (tensor, lb) = letterbox(&image, 640);

        assert_eq!(tensor.shape(), &[1, 3, 640, 640]);
        assert_relative_eq!(lb.scale, 3.2, epsilon = 1e-9);
        assert_eq!(lb.pad_x, 0);
        assert_eq!(lb.pad_y, 160);
    }

    #[test]
    fn test_letterbox_values_normalized() {
        let image = ImageBuffer::filled(100, 50, [255, 255, 255]);
        let (tensor, lb) = letterbox(&image, 640);

        let y = lb.pad_y as usize + 1;
        assert_relative_eq!(tensor[[0, 0, y, 1]], 1.0, epsilon = 0.01);
        assert_relative_eq!(tensor[[0, 0, 0, 0]], PAD_VALUE, epsilon = 0.01);
    }

    #[test]
    fn test_letterbox_maps_back_to_image() {
        let lb = Letterbox {
            scale: 2.0,
            pad_x: 0,
            pad_y: 100,
        };
        let (x, y) = lb.to_image(200.0, 300.0);
        assert_relative_eq!(x, 100.0);
        assert_relative_eq!(y, 100.0);
    }

    #[test]
    fn test_parse_row_major_layout() {
        // six detections × 5 features, only the first confident
        let mut data = vec![0.0f32; 6 * 5];
        data[..5].copy_from_slice(&[50.0, 50.0, 20.0, 40.0, 0.9]);
        data[5..10].copy_from_slice(&[10.0, 10.0, 4.0, 4.0, 0.1]);
        let boxes = parse_detections(&data, &[1, 6, 5], 0.5, IDENTITY).unwrap();
        assert_eq!(boxes.len(), 1);
        assert_relative_eq!(boxes[0].x1, 40.0);
        assert_relative_eq!(boxes[0].y1, 30.0);
        assert_relative_eq!(boxes[0].x2, 60.0);
        assert_relative_eq!(boxes[0].y2, 70.0);
    }

    #[test]
    fn test_parse_transposed_layout_ignores_keypoints() {
        // 6 features (5 + one keypoint value) × 8 detections, only det 3 confident
        let num_dets = 8;
        let mut data = vec![0.0f32; 6 * num_dets];
        let row = [100.0, 80.0, 30.0, 30.0, 0.95, 7.0];
        for (feat, v) in row.iter().enumerate() {
            data[feat * num_dets + 3] = *v;
        }
        let boxes = parse_detections(&data, &[1, 6, num_dets], 0.5, IDENTITY).unwrap();
        assert_eq!(boxes.len(), 1);
        assert_relative_eq!(boxes[0].x1, 85.0);
        assert_relative_eq!(boxes[0].confidence, 0.95, epsilon = 1e-6);
    }

    #[test]
    fn test_parse_rejects_unexpected_rank() {
        assert!(parse_detections(&[0.0; 10], &[2, 5], 0.5, IDENTITY).is_err());
    }
}
