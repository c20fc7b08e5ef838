//! Per-run scripting environment
//!
//! An [`Environment`] owns a fresh Rhai engine and the compiled functions of
//! one resolved graph. It is created for a single run and dropped afterwards.
//!
//! The run's context lives in one shared cell. Every script, at top level or
//! inside a function body, reaches it through the variable `context`; checks
//! and actions also get it bound as `this`.

use super::convert::{
    context_from_dynamic, context_to_dynamic, dynamic_to_value, is_truthy, value_to_dynamic,
};
use super::naming::{
    extract_function_name, slot_script, FunctionBindings, NameAllocator, SlotKind,
};
use super::{DebugHook, HostFunctions};
use crate::adapter::HostFunction;
use crate::error::BridgeError;
use rhai::{
    CallFnOptions, Dynamic, Engine, EvalAltResult, FnPtr, ImmutableString, Position, Scope, AST,
    FLOAT,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;
use tracing::debug;
use yabre_core::{Rules, Value};

/// Slot name reported for failures in the shared prelude
pub const PRELUDE_SLOT: &str = "scripts";

/// Name under which scripts see the run's context
pub const CONTEXT_VARIABLE: &str = "context";

/// A prepared scripting environment for one run
pub struct Environment {
    engine: Engine,
    ast: AST,
    context: Dynamic,
    bindings: FunctionBindings,
}

/// A check or action waiting to be installed
struct Slot<'a> {
    kind: SlotKind,
    name: &'a str,
    source: &'a str,
}

impl Environment {
    /// Build an environment for `rules` around a copy of `context`
    ///
    /// Host functions and the debug hook are registered first, then the
    /// prelude runs once, then every check and action is installed in
    /// condition-name order. The first compile or evaluation failure aborts
    /// preparation.
    pub fn prepare<C>(
        rules: &Rules,
        context: &C,
        functions: &HostFunctions,
        debug_hook: Option<DebugHook>,
    ) -> Result<Self, BridgeError>
    where
        C: Serialize + ?Sized,
    {
        let context = context_to_dynamic(context)?.into_shared();

        let mut engine = Engine::new();
        engine.on_print(|text| tracing::info!(target: "yabre::script", "{}", text));
        engine.on_debug(log_debug);
        bind_context_variable(&mut engine, context.clone());
        register_debug(&mut engine, context.clone(), debug_hook);

        let mut names = NameAllocator::new();
        for (name, function) in functions {
            register_host_function(&mut engine, name, function);
            names.reserve(name.as_str());
        }

        let mut scope = Scope::new();
        let mut ast = AST::empty();
        if let Some(prelude) = rules.scripts.as_deref().filter(|s| !s.trim().is_empty()) {
            ast = install(&engine, &mut scope, ast, PRELUDE_SLOT, prelude)?;
            for function in ast.iter_functions() {
                names.reserve(function.name);
            }
        }

        let slots = rule_slots(rules);
        for slot in &slots {
            if let Some(declared) = extract_function_name(slot.source) {
                names.reserve(declared);
            }
        }

        let mut bindings = FunctionBindings::new();
        for slot in slots {
            let installed = slot_script(slot.name, slot.source, &mut names);
            ast = install(&engine, &mut scope, ast, slot.name, &installed.script)?;
            debug!(slot = slot.name, function = %installed.function, "installed {}", slot.kind);
            bindings.bind(slot.kind, slot.name, installed.function);
        }

        Ok(Self {
            engine,
            ast,
            context,
            bindings,
        })
    }

    /// Invoke an installed function with the context bound as `this`
    pub fn call(&mut self, name: &str) -> Result<Dynamic, BridgeError> {
        if !self.has_function(name) {
            return Err(BridgeError::FunctionNotFound {
                name: name.to_string(),
            });
        }

        let options = CallFnOptions::new()
            .eval_ast(false)
            .rewind_scope(true)
            .bind_this_ptr(&mut self.context);

        self.engine
            .call_fn_with_options::<Dynamic>(options, &mut Scope::new(), &self.ast, name, ())
            .map_err(|e| BridgeError::Invocation {
                name: name.to_string(),
                message: e.to_string(),
            })
    }

    /// Invoke an installed function and interpret the result as a boolean
    pub fn call_check(&mut self, name: &str) -> Result<bool, BridgeError> {
        self.call(name).map(|result| is_truthy(&result))
    }

    /// Whether a zero-argument function with this name is installed
    pub fn has_function(&self, name: &str) -> bool {
        self.ast
            .iter_functions()
            .any(|f| f.name == name && f.params.is_empty())
    }

    pub fn bindings(&self) -> &FunctionBindings {
        &self.bindings
    }

    /// Current context as a [`Value`]
    pub fn context_value(&self) -> Value {
        dynamic_to_value(&self.context)
    }

    /// Deserialize the current context without consuming the environment
    pub fn read_context<C: DeserializeOwned>(&self) -> Result<C, BridgeError> {
        context_from_dynamic(&self.context)
    }

    pub fn into_context<C: DeserializeOwned>(self) -> Result<C, BridgeError> {
        context_from_dynamic(&self.context)
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("bindings", &self.bindings)
            .field("context", &self.context_value())
            .finish_non_exhaustive()
    }
}

/// Checks and actions of `rules` in installation order
fn rule_slots(rules: &Rules) -> Vec<Slot<'_>> {
    let mut slots = Vec::new();
    for name in rules.condition_names() {
        let condition = &rules.conditions[name];
        if let Some(check) = condition.check.as_deref() {
            slots.push(Slot {
                kind: SlotKind::Check,
                name,
                source: check,
            });
        }
        for decision in condition.decisions() {
            if let Some(action) = decision.action.as_deref() {
                slots.push(Slot {
                    kind: SlotKind::Action,
                    name: &decision.name,
                    source: action,
                });
            }
        }
    }
    slots
}

/// Compile `source`, run its top-level statements and keep its functions
fn install(
    engine: &Engine,
    scope: &mut Scope,
    ast: AST,
    slot: &str,
    source: &str,
) -> Result<AST, BridgeError> {
    let compiled = engine.compile(source).map_err(|e| BridgeError::Compile {
        slot: slot.to_string(),
        message: e.to_string(),
    })?;

    let runnable = ast.merge(&compiled);
    engine
        .run_ast_with_scope(scope, &runnable)
        .map_err(|e| BridgeError::Evaluate {
            slot: slot.to_string(),
            message: e.to_string(),
        })?;

    Ok(runnable.clone_functions_only())
}

/// Resolve `context` to the shared cell wherever a script names it
///
/// A local variable of the same name wins. A method call on `this` holds the
/// cell for its duration, so the cell cannot be reached as `context` from
/// inside such a call.
#[allow(deprecated)]
fn bind_context_variable(engine: &mut Engine, context: Dynamic) {
    engine.on_var(move |name, _, ctx| {
        if name != CONTEXT_VARIABLE || ctx.scope().contains(name) {
            return Ok(None);
        }
        if context.is_locked() {
            return Err(format!(
                "'{}' is held by a method call on `this`; call the function directly",
                name
            )
            .into());
        }
        Ok(Some(context.clone()))
    });
}

macro_rules! register_debug_for {
    ($engine:expr, $forward:expr; $($ty:ty),*) => {$(
        let forward = Rc::clone(&$forward);
        $engine.register_fn("debug", move |value: $ty| forward(Dynamic::from(value)));
    )*};
}

/// Route `debug(value)` to the hook with the current context and the value
///
/// The returned text still reaches the engine's debug callback, which logs it.
/// Every built-in `debug` overload is shadowed so no argument type bypasses
/// the hook.
fn register_debug(engine: &mut Engine, context: Dynamic, hook: Option<DebugHook>) {
    let forward: Rc<dyn Fn(Dynamic) -> ImmutableString> = Rc::new(move |value| {
        if let Some(hook) = &hook {
            let snapshot = if context.is_locked() {
                Value::Null
            } else {
                dynamic_to_value(&context)
            };
            hook(&snapshot, &dynamic_to_value(&value));
        }
        debug_text(&value).into()
    });

    register_debug_for!(engine, forward; Dynamic, ImmutableString, char, bool, (), FLOAT, FnPtr);
}

fn debug_text(value: &Dynamic) -> String {
    let value = value.flatten_clone();
    if value.is_string() {
        value.to_string()
    } else {
        format!("{:?}", value)
    }
}

fn invoke_host(
    name: &str,
    function: &dyn HostFunction,
    args: &[Dynamic],
) -> Result<Dynamic, Box<EvalAltResult>> {
    let args: Vec<Value> = args.iter().map(dynamic_to_value).collect();
    function
        .call(&args)
        .map(|result| value_to_dynamic(&result))
        .map_err(|e| format!("{}: {}", name, e).into())
}

macro_rules! register_arity {
    ($engine:expr, $name:expr, $function:expr; $($arg:ident),*) => {{
        let function = Arc::clone($function);
        let name = $name.to_string();
        $engine.register_fn(
            $name,
            move |$($arg: Dynamic),*| -> Result<Dynamic, Box<EvalAltResult>> {
                invoke_host(&name, function.as_ref(), &[$($arg),*])
            },
        );
    }};
}

/// Register `function` under `name` for every arity from 0 to 8
///
/// Scripts dispatch on name and argument count; arity errors are reported by
/// the host function itself.
fn register_host_function(engine: &mut Engine, name: &str, function: &Arc<dyn HostFunction>) {
    register_arity!(engine, name, function;);
    register_arity!(engine, name, function; a1);
    register_arity!(engine, name, function; a1, a2);
    register_arity!(engine, name, function; a1, a2, a3);
    register_arity!(engine, name, function; a1, a2, a3, a4);
    register_arity!(engine, name, function; a1, a2, a3, a4, a5);
    register_arity!(engine, name, function; a1, a2, a3, a4, a5, a6);
    register_arity!(engine, name, function; a1, a2, a3, a4, a5, a6, a7);
    register_arity!(engine, name, function; a1, a2, a3, a4, a5, a6, a7, a8);
    debug!(function = name, "registered host function");
}

fn log_debug(text: &str, source: Option<&str>, pos: Position) {
    match source {
        Some(source) => debug!(target: "yabre::script", %pos, source, "{}", text),
        None => debug!(target: "yabre::script", %pos, "{}", text),
    }
}
