use super::tensor::{DataType, Shape};

/// Errors raised by DLR managers and arrays. All of them are caller errors
/// reported synchronously; nothing here is transient.
#[derive(thiserror::Error, Debug)]
pub enum DlrError {
    #[error("DLR only supports float32, got {0}")]
    UnsupportedElementType(DataType),

    #[error("Shape mismatch: shape {expected} holds {} elements, buffer has {actual}", .expected.size())]
    ShapeMismatch { expected: Shape, actual: usize },

    #[error("Shape {0} holds more elements than can be addressed")]
    ShapeTooLarge(Shape),

    #[error("Invalid buffer length: {len} bytes is not a whole number of float32 values")]
    InvalidBufferLength { len: usize },

    #[error("Manager {0} has already been closed")]
    ManagerClosed(String),

    #[error("Array {0} has already been released")]
    ResourceClosed(String),

    #[error("Candle error: {0}")]
    Candle(#[from] candle_core::Error),
}

impl DlrError {
    pub fn is_unsupported_type(&self) -> bool {
        matches!(self, DlrError::UnsupportedElementType(_))
    }
}
