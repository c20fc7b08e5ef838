//! yabre Decision Engine SDK
//!
//! High-level API for loading rule graphs and running them against a context.
//!
//! ```rust,ignore
//! use yabre_sdk::Runner;
//!
//! let runner = Runner::<serde_json::Value>::from_yaml_str(RULES)?;
//! let mut context = serde_json::json!({"score": 720});
//! runner.run(&mut context, None)?;
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod runner;

// Re-export main types
pub use builder::RunnerBuilder;
pub use config::RunnerConfig;
pub use error::{Result, SdkError};
pub use runner::Runner;

// Re-export commonly used types from dependencies
pub use yabre_core::{Branch, Condition, Decision, RuleSet, Rules, Value};
pub use yabre_repository::{LibrarySettings, MemorySource, RulesLibrary};
pub use yabre_runtime::{
    AdapterError, DecisionEvent, HostFunction, RecordingSink, TraceSink, Variadic,
};
