//! Runtime error types
//!
//! Three layers, one enum each: the host-function adapter, the scripting
//! bridge, and the executor walking the graph.

use thiserror::Error;

/// Error returned by an adapted host function
#[derive(Error, Debug)]
pub enum AdapterError {
    /// Fixed-arity function called with the wrong number of arguments
    #[error("expected {expected} arguments, got {got}")]
    ArgumentCount { expected: usize, got: usize },

    /// Variadic function called with too few arguments
    #[error("expected at least {minimum} arguments, got {got}")]
    TooFewArguments { minimum: usize, got: usize },

    /// Argument cannot be converted to the parameter type (1-based position)
    #[error("argument {position} must be '{expected}' but received '{actual}'")]
    TypeMismatch {
        position: usize,
        expected: &'static str,
        actual: &'static str,
    },

    /// Function returns nothing
    #[error("function must return (any) or (any, error)")]
    NoResult,

    /// The host function itself returned an error
    #[error(transparent)]
    Failed(#[from] anyhow::Error),

    /// The host function panicked
    #[error("panic recovered: {0}")]
    Panicked(String),
}

/// Error raised while preparing or calling into a scripting environment
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Context could not cross the host/script boundary
    #[error("failed to convert context: {0}")]
    Context(String),

    /// Script source does not compile
    #[error("failed to compile {slot}: {message}")]
    Compile { slot: String, message: String },

    /// Script source compiled but failed while being installed
    #[error("failed to evaluate {slot}: {message}")]
    Evaluate { slot: String, message: String },

    /// No installed function with this name
    #[error("function {name} not found")]
    FunctionNotFound { name: String },

    /// Installed function raised an error
    #[error("function {name} failed: {message}")]
    Invocation { name: String, message: String },
}

/// Error raised while walking a rule graph
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Binding table has no entry for a check or action
    #[error("no function bound for slot {slot}")]
    SlotNotBound { slot: String },

    /// A condition's check failed
    #[error("error evaluating check function {condition}: {source}")]
    CheckFailed {
        condition: String,
        #[source]
        source: BridgeError,
    },

    /// A decision's action failed
    #[error("error running action function {decision}: {source}")]
    ActionFailed {
        decision: String,
        #[source]
        source: BridgeError,
    },

    /// Start or `next` names an unknown condition
    #[error("condition '{0}' not found")]
    ConditionNotFound(String),

    /// No explicit start and no default condition
    #[error("no default condition found")]
    NoDefaultCondition,

    /// Environment preparation failed
    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;
