//! Runner - entry point for executing a rule graph against a context

use crate::builder::RunnerBuilder;
use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use yabre_core::{export_mermaid, Rules};
use yabre_repository::RulesLibrary;
use yabre_runtime::{resolve_start, DebugHook, Environment, Executor, HostFunctions, TraceSink};

/// Executes one loaded graph against contexts of type `C`
///
/// The graph and host functions are shared and immutable; every call to
/// [`Runner::run`] prepares its own scripting environment, so a runner can be
/// used from several threads at once.
pub struct Runner<C> {
    rules: Arc<Rules>,
    functions: Arc<HostFunctions>,
    debug_hook: Option<DebugHook>,
    trace_sink: Option<Arc<dyn TraceSink>>,
    start_condition: Option<String>,
    enable_tracing: bool,
    _context: PhantomData<fn(&mut C)>,
}

impl<C> Runner<C>
where
    C: Serialize + DeserializeOwned,
{
    pub(crate) fn new(
        rules: Rules,
        functions: HostFunctions,
        debug_hook: Option<DebugHook>,
        trace_sink: Option<Arc<dyn TraceSink>>,
        start_condition: Option<String>,
        enable_tracing: bool,
    ) -> Self {
        Self {
            rules: Arc::new(rules),
            functions: Arc::new(functions),
            debug_hook,
            trace_sink,
            start_condition,
            enable_tracing,
            _context: PhantomData,
        }
    }

    pub fn builder() -> RunnerBuilder<C> {
        RunnerBuilder::new()
    }

    /// Runner over a standalone rule-set document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        RunnerBuilder::new().with_rules_yaml(yaml).build()
    }

    /// Runner over a library rule set and its dependencies
    pub fn from_library(library: &RulesLibrary, name: &str) -> Result<Self> {
        RunnerBuilder::new().with_library(library, name).build()
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Render the loaded graph as a Mermaid flowchart
    pub fn export_mermaid(&self) -> String {
        export_mermaid(&self.rules)
    }

    /// Run the graph against `context`
    ///
    /// `start` overrides the configured start condition, which overrides the
    /// graph's default. The context is updated in place, also when a check or
    /// action fails part way through.
    pub fn run(&self, context: &mut C, start: Option<&str>) -> Result<()> {
        let start = start.or(self.start_condition.as_deref());
        let start = resolve_start(&self.rules, start)?;

        let mut env = Environment::prepare(
            &self.rules,
            &*context,
            &self.functions,
            self.debug_hook.clone(),
        )?;

        tracing::debug!(start = %start.name, "starting run");
        let outcome = Executor::new(&self.rules)
            .with_sink(self.trace_sink.as_deref())
            .with_tracing(self.enable_tracing)
            .run(&mut env, &start.name);

        match env.into_context() {
            Ok(updated) => *context = updated,
            Err(e) if outcome.is_ok() => return Err(e.into()),
            Err(e) => tracing::warn!(error = %e, "context could not be read back after a failed run"),
        }

        outcome.map_err(Into::into)
    }
}

impl<C> fmt::Debug for Runner<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runner")
            .field("rules", &self.rules.name)
            .field("conditions", &self.rules.len())
            .field("functions", &self.functions.keys().collect::<Vec<_>>())
            .field("start_condition", &self.start_condition)
            .field("enable_tracing", &self.enable_tracing)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value as Json};

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_runner_is_shareable() {
        assert_send_sync::<Runner<Json>>();
    }

    #[test]
    fn test_run_updates_context() {
        let runner = Runner::<Json>::from_yaml_str(
            r#"
name: greet
conditions:
  hello:
    default: true
    check: this.name != ""
    true:
      action: this.greeting = "hello " + this.name;
"#,
        )
        .unwrap();

        let mut context = json!({"name": "Ann"});
        runner.run(&mut context, None).unwrap();
        assert_eq!(context["greeting"], json!("hello Ann"));
    }
}
