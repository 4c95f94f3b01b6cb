use serde::{Deserialize, Serialize};

/// A detected face rectangle in pixel space of one specific image.
///
/// Coordinates follow the (top, right, bottom, left) convention: `right` and
/// `bottom` are exclusive, so the box covers `left..right` × `top..bottom`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FaceBox {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl FaceBox {
    pub fn new(top: i32, right: i32, bottom: i32, left: i32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Builds a box from floating-point `(x1, y1, x2, y2)` corners, rounding
    /// outward so the face is never cut.
    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            top: y1.floor() as i32,
            right: x2.ceil() as i32,
            bottom: y2.ceil() as i32,
            left: x1.floor() as i32,
        }
    }

    pub fn width(&self) -> i32 {
        (self.right - self.left).max(0)
    }

    pub fn height(&self) -> i32 {
        (self.bottom - self.top).max(0)
    }

    pub fn area(&self) -> i64 {
        self.width() as i64 * self.height() as i64
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Intersects the box with a `width` × `height` image.
    ///
    /// Returns `None` when nothing of the box lies inside the image.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<FaceBox> {
        let clamped = FaceBox {
            top: self.top.clamp(0, height as i32),
            right: self.right.clamp(0, width as i32),
            bottom: self.bottom.clamp(0, height as i32),
            left: self.left.clamp(0, width as i32),
        };
        if clamped.is_empty() {
            None
        } else {
            Some(clamped)
        }
    }

    /// Grows the box by `margin` (fraction of its size) on every side.
    pub fn expand(&self, margin: f64) -> FaceBox {
        let dx = (self.width() as f64 * margin).round() as i32;
        let dy = (self.height() as f64 * margin).round() as i32;
        FaceBox {
            top: self.top - dy,
            right: self.right + dx,
            bottom: self.bottom + dy,
            left: self.left - dx,
        }
    }

    /// Grows the shorter side, keeping the centre, so width equals height.
    pub fn squared(&self) -> FaceBox {
        let diff = self.width() - self.height();
        let grow = diff.abs();
        let (before, after) = (grow / 2, grow - grow / 2);
        if diff > 0 {
            FaceBox {
                top: self.top - before,
                bottom: self.bottom + after,
                ..*self
            }
        } else {
            FaceBox {
                left: self.left - before,
                right: self.right + after,
                ..*self
            }
        }
    }
}
