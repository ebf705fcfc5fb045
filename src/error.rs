//! Error handling for embedgen
//!
//! One taxonomy covers the whole conversion pipeline: tensor flattening,
//! WAV decoding, model parsing/validation, and file handling. Verification
//! discrepancies are not errors; they accumulate into a report (see
//! [`crate::verify`]).

use thiserror::Error;

/// Result type alias for conversion operations
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Main error type for conversion operations
#[derive(Error, Debug)]
pub enum ConvertError {
    // File Errors
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Output already exists: {path} (use --force to overwrite)")]
    OutputExists { path: String },

    // Tensor Errors
    #[error("Malformed tensor: {reason}")]
    MalformedTensor { reason: String },

    // WAV Errors
    #[error("Invalid WAV container: {reason}")]
    InvalidContainer { reason: String },

    #[error("Unsupported bit depth: {bits} bits per sample")]
    UnsupportedBitDepth { bits: u16 },

    // Model Errors
    #[error("Malformed model: {reason}")]
    MalformedModel { reason: String },

    #[error("Unsupported architecture: {reason}")]
    UnsupportedArchitecture { reason: String },

    #[error("Tensor size mismatch for {tensor}: got {actual}, expected {expected}")]
    TensorSizeMismatch {
        tensor: String,
        actual: usize,
        expected: usize,
    },

    // Verification Errors
    #[error("Could not find array '{name}' in generated header")]
    ArrayNotFound { name: String },

    #[error("Verification failed: {mismatches} mismatches across {total_values} values")]
    VerificationFailed {
        mismatches: usize,
        total_values: usize,
    },

    // Batch Errors
    #[error("Batch conversion incomplete: {converted}/{total} files converted")]
    BatchIncomplete { converted: usize, total: usize },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConvertError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            ConvertError::FileNotFound { .. } => "FILE_NOT_FOUND",
            ConvertError::OutputExists { .. } => "OUTPUT_EXISTS",
            ConvertError::MalformedTensor { .. } => "MALFORMED_TENSOR",
            ConvertError::InvalidContainer { .. } => "INVALID_CONTAINER",
            ConvertError::UnsupportedBitDepth { .. } => "UNSUPPORTED_BIT_DEPTH",
            ConvertError::MalformedModel { .. } => "MALFORMED_MODEL",
            ConvertError::UnsupportedArchitecture { .. } => "UNSUPPORTED_ARCHITECTURE",
            ConvertError::TensorSizeMismatch { .. } => "TENSOR_SIZE_MISMATCH",
            ConvertError::ArrayNotFound { .. } => "ARRAY_NOT_FOUND",
            ConvertError::VerificationFailed { .. } => "VERIFICATION_FAILED",
            ConvertError::BatchIncomplete { .. } => "BATCH_INCOMPLETE",
            ConvertError::Io(_) => "IO_ERROR",
            ConvertError::Json(_) => "JSON_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = ConvertError::FileNotFound {
            path: "model.json".to_string(),
        };
        assert_eq!(err.error_code(), "FILE_NOT_FOUND");

        let err = ConvertError::TensorSizeMismatch {
            tensor: "kernel".to_string(),
            actual: 47,
            expected: 48,
        };
        assert_eq!(err.error_code(), "TENSOR_SIZE_MISMATCH");
    }

    #[test]
    fn test_error_display() {
        let err = ConvertError::UnsupportedBitDepth { bits: 8 };
        assert_eq!(err.to_string(), "Unsupported bit depth: 8 bits per sample");
    }
}
