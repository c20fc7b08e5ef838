//! Error types for the repository layer

use std::path::PathBuf;
use thiserror::Error;
use yabre_core::CoreError;
use yabre_parser::ParseError;

/// Result type alias for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Errors that can occur while scanning or loading a rule library
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Base path does not exist
    #[error("Invalid path: {path}")]
    InvalidPath { path: PathBuf },

    /// Neither a base path nor a source was configured
    #[error("no rule source configured: set a base path or a source")]
    NoSource,

    /// A source has no document at this path
    #[error("Document not found: {path}")]
    NotFound { path: String },

    /// Document is not a valid rule set
    #[error("failed to parse yaml {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: ParseError,
    },

    /// Document lacks the `name` field
    #[error("file {path} has no name")]
    MissingName { path: String },

    /// Two documents declare the same name
    #[error("duplicate rule set name {name}")]
    DuplicateName { name: String },

    /// Requested rule set or dependency is not in the library
    #[error("rule set {name} not found")]
    RuleSetNotFound { name: String },

    /// Folding a dependency into the graph failed
    #[error("failed to merge dependency {dependency} into {name}: {source}")]
    Merge {
        name: String,
        dependency: String,
        #[source]
        source: CoreError,
    },

    /// The merged graph breaks an invariant
    #[error("invalid rule graph {name}: {source}")]
    InvalidGraph {
        name: String,
        #[source]
        source: CoreError,
    },
}
