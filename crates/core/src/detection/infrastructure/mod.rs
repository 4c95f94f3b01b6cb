pub mod arcface_embedder;
pub mod math;
pub mod model_resolver;
pub mod onnx_embedding_provider;
pub mod onnx_face_detector;
mod onnx_session;
