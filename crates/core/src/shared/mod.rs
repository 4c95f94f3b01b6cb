pub mod constants;
pub mod detected_face;
pub mod embedding;
pub mod face_box;
pub mod image_buffer;
