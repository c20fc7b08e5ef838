//! Error types for yabre Core

use thiserror::Error;

/// Violations of the rule graph invariants
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("multiple default conditions found: '{first}' and '{second}'")]
    MultipleDefaults { first: String, second: String },

    #[error("decision '{decision}' cannot set both next and terminate")]
    NextAndTerminate { decision: String },

    #[error("duplicate condition {0}")]
    DuplicateCondition(String),

    #[error("decision '{decision}' points to unknown condition '{next}'")]
    UnknownNext { decision: String, next: String },
}

pub type Result<T> = std::result::Result<T, CoreError>;
