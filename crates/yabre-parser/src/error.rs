//! Parser error types

use thiserror::Error;
use yabre_core::CoreError;

/// Parser error
#[derive(Error, Debug)]
pub enum ParseError {
    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Invalid field value
    #[error("Invalid value for field '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// Type mismatch
    #[error("Type mismatch for field '{field}': expected {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: String,
        actual: String,
    },

    /// Document parsed but breaks a graph invariant
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type for parser operations
pub type Result<T> = std::result::Result<T, ParseError>;
