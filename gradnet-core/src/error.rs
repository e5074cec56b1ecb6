use crate::device::DeviceType;
use thiserror::Error;

/// Custom error type for the GradNet runtime.
#[derive(Error, Debug, PartialEq, Clone)] // PartialEq for easier testing
pub enum GradNetError {
    #[error("Shape mismatch: expected {expected:?}, got {actual:?} during operation {operation}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
        operation: String,
    },

    #[error("Tensor creation error: data length {data_len} does not match shape {shape:?}")]
    TensorCreationError { data_len: usize, shape: Vec<usize> },

    #[error("Blob '{name}' not found in workspace")]
    BlobNotFound { name: String },

    #[error("No operator registered under name '{op_type}'")]
    UnknownOperator { op_type: String },

    #[error("Operator '{op_type}' is missing required argument '{arg}'")]
    MissingArgument { op_type: String, arg: String },

    #[error("Invalid argument '{arg}' for operator '{op_type}': {message}")]
    InvalidArgument {
        op_type: String,
        arg: String,
        message: String,
    },

    #[error("Operator '{op_type}' expected {expected} inputs, got {actual}")]
    InputCountMismatch {
        op_type: String,
        expected: usize,
        actual: usize,
    },

    #[error("DType mismatch during operation {operation}")]
    DTypeMismatch { operation: String },

    #[error("Device {device:?} is not available for operator '{op_type}'")]
    UnsupportedDevice {
        device: DeviceType,
        op_type: String,
    },

    #[error("No gradient defined for operator '{op_type}'")]
    NoGradientDefined { op_type: String },

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}
