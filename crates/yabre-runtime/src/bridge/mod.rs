//! Scripting bridge
//!
//! Prepares a Rhai environment for one run: the context, the debug hook,
//! host functions, the prelude and one function per check and action.
//!
//! Every script reads and writes the run's context through the variable
//! `context`, including inside prelude helpers called as plain functions.
//! Checks and actions also see the same value as `this`.

pub mod convert;
pub mod environment;
pub mod naming;

use crate::adapter::SharedHostFunction;
use std::collections::BTreeMap;
use std::sync::Arc;
use yabre_core::Value;

pub use convert::{dynamic_to_value, is_truthy, value_to_dynamic};
pub use environment::{Environment, CONTEXT_VARIABLE, PRELUDE_SLOT};
pub use naming::{extract_function_name, sanitize_identifier, FunctionBindings, SlotKind};

/// Receiver for `debug(value)` calls in scripts
///
/// Called with a snapshot of the current context and the value passed. The
/// snapshot is `Null` when the call happens inside a method call on `this`.
pub type DebugHook = Arc<dyn Fn(&Value, &Value) + Send + Sync>;

/// Host functions by script-visible name
pub type HostFunctions = BTreeMap<String, SharedHostFunction>;
