pub mod color;
pub mod onnx_shapes;
pub mod remote_ocr;
pub mod traits;
pub mod types;
