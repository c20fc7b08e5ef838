//! SDK error types

use thiserror::Error;

/// SDK error type
#[derive(Error, Debug)]
pub enum SdkError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Rule-set document could not be parsed
    #[error("Parser error: {0}")]
    ParseError(#[from] yabre_parser::ParseError),

    /// Rule library could not be scanned or resolved
    #[error("Repository error: {0}")]
    RepositoryError(#[from] yabre_repository::RepositoryError),

    /// Graph invariant violated
    #[error("Invalid rule graph: {0}")]
    GraphError(#[from] yabre_core::CoreError),

    /// Scripting environment could not be prepared
    #[error("Bind error: {0}")]
    BindError(#[from] yabre_runtime::BridgeError),

    /// Run failed
    #[error("Run error: {0}")]
    RuntimeError(#[from] yabre_runtime::RuntimeError),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// No rules given to the builder or its configuration
    #[error("No rules configured")]
    NoRules,
}

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;
