use skewbridge_core::{ExError, ExErrorKind, TransformError};
use std::path::Path;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Create a parse error for a definition file
pub fn parse_error(path: &Path, err: serde_json::Error) -> ExError {
    ExError::new(ExErrorKind::Serialization)
        .with_op("parse_definition")
        .with_message(format!("{}: {}", path.display(), err))
}

/// Create an invalid definition error wrapping the decoder's complaint
pub fn invalid_definition(path: &Path, err: TransformError) -> ExError {
    ExError::new(ExErrorKind::InvalidDescription)
        .with_op("decode_definition")
        .with_message(format!("definition {} is not valid", path.display()))
        .with_source(err.into())
}

/// Create an invalid input error
pub fn invalid_input(operation: &str, message: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::InvalidInput)
        .with_op(operation.to_string())
        .with_message(message)
}

/// Create a serialization error
pub fn serialize_error(operation: &str, err: serde_json::Error) -> ExError {
    ExError::new(ExErrorKind::Serialization)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}
