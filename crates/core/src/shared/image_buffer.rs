use ndarray::{ArrayView3, ArrayViewMut3};

use crate::shared::face_box::FaceBox;

/// Number of channels in every buffer: RGB8.
pub const CHANNELS: usize = 3;

/// A decoded photo: contiguous RGB bytes in row-major order.
///
/// Format conversion happens at I/O boundaries only; matching and redaction
/// treat pixel data as opaque bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageBuffer {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl ImageBuffer {
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * CHANNELS,
            "data length must equal width * height * 3"
        );
        Self {
            data,
            width,
            height,
        }
    }

    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let data = rgb
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * CHANNELS)
            .collect();
        Self::new(data, width, height)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let i = (y as usize * self.width as usize + x as usize) * CHANNELS;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    /// Copies the pixels under `face_box` (already clamped to the image)
    /// into a new `(bytes, width, height)` crop.
    pub fn crop(&self, face_box: &FaceBox) -> (Vec<u8>, u32, u32) {
        let w = face_box.width() as usize;
        let h = face_box.height() as usize;
        let x0 = face_box.left as usize;
        let y0 = face_box.top as usize;
        let stride = self.width as usize * CHANNELS;

        let mut out = Vec::with_capacity(w * h * CHANNELS);
        for row in y0..y0 + h {
            let start = row * stride + x0 * CHANNELS;
            out.extend_from_slice(&self.data[start..start + w * CHANNELS]);
        }
        (out, w as u32, h as u32)
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("ImageBuffer data length must match dimensions")
    }

    pub fn as_ndarray_mut(&mut self) -> ArrayViewMut3<'_, u8> {
        let shape = self.shape();
        ArrayViewMut3::from_shape(shape, &mut self.data)
            .expect("ImageBuffer data length must match dimensions")
    }

    fn shape(&self) -> (usize, usize, usize) {
        (self.height as usize, self.width as usize, CHANNELS)
    }
}

impl From<image::RgbImage> for ImageBuffer {
    fn from(img: image::RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self::new(img.into_raw(), width, height)
    }
}

impl TryFrom<ImageBuffer> for image::RgbImage {
    type Error = String;

    fn try_from(buf: ImageBuffer) -> Result<Self, Self::Error> {
        let (w, h) = (buf.width, buf.height);
        image::RgbImage::from_raw(w, h, buf.data)
            .ok_or_else(|| format!("pixel data does not match {w}x{h}"))
    }
}
