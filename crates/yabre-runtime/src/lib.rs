//! yabre Runtime - Scripting bridge and decision executor
//!
//! This crate provides everything a single run needs:
//! - The host function adapter (typed Rust functions to a uniform shape)
//! - The scripting bridge (a per-run Rhai environment)
//! - The decision executor walking a resolved graph
//! - Decision trace events and sinks

pub mod adapter;
pub mod bridge;
pub mod error;
pub mod executor;
pub mod trace;

// Re-export main types
pub use adapter::{adapt, HostFunction, IntoHostFunction, SharedHostFunction, Variadic};
pub use bridge::{DebugHook, Environment, FunctionBindings, HostFunctions, SlotKind};
pub use error::{AdapterError, BridgeError, Result, RuntimeError};
pub use executor::{resolve_start, Executor};
pub use trace::{DecisionEvent, RecordingSink, TraceSink};
