//! Concrete operator kinds.

pub mod onnx;
