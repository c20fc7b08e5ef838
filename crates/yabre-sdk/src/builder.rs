//! Builder pattern for Runner

use crate::config::RunnerConfig;
use crate::error::{Result, SdkError};
use crate::runner::Runner;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::Arc;
use yabre_core::{Rules, Value};
use yabre_parser::RuleSetParser;
use yabre_repository::{RepositoryError, RulesLibrary};
use yabre_runtime::{adapt, AdapterError, DebugHook, HostFunctions, IntoHostFunction, TraceSink};

enum RulesInput {
    Graph(Rules),
    Yaml(String),
    File(PathBuf),
    Library(std::result::Result<Rules, RepositoryError>),
}

/// Builder for Runner
///
/// # Example
///
/// ```rust,ignore
/// use yabre_sdk::RunnerBuilder;
///
/// let runner = RunnerBuilder::<Applicant>::new()
///     .with_rules_file("rules/loan.yaml")
///     .with_function("risk_score", |income: f64, debt: f64| debt / income)
///     .with_debug_hook(|_context, value| println!("{}", value))
///     .build()?;
///
/// runner.run(&mut applicant, None)?;
/// ```
pub struct RunnerBuilder<C> {
    rules: Option<RulesInput>,
    config: RunnerConfig,
    functions: HostFunctions,
    debug_hook: Option<DebugHook>,
    trace_sink: Option<Arc<dyn TraceSink>>,
    _context: PhantomData<fn(&mut C)>,
}

impl<C> RunnerBuilder<C>
where
    C: Serialize + DeserializeOwned,
{
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            rules: None,
            config: RunnerConfig::new(),
            functions: HostFunctions::new(),
            debug_hook: None,
            trace_sink: None,
            _context: PhantomData,
        }
    }

    // ========== Rules ==========

    /// Use an already resolved graph
    pub fn with_rules(mut self, rules: Rules) -> Self {
        self.rules = Some(RulesInput::Graph(rules));
        self
    }

    /// Parse a standalone rule-set document
    pub fn with_rules_yaml(mut self, yaml: impl Into<String>) -> Self {
        self.rules = Some(RulesInput::Yaml(yaml.into()));
        self
    }

    /// Read and parse a standalone rule-set document
    pub fn with_rules_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.rules = Some(RulesInput::File(path.into()));
        self
    }

    /// Resolve a rule set and its dependencies from a library
    pub fn with_library(mut self, library: &RulesLibrary, name: &str) -> Self {
        self.rules = Some(RulesInput::Library(library.load_rules(name)));
        self
    }

    /// Apply a configuration
    ///
    /// Its rule source is only used when no rules were given directly.
    pub fn with_config(mut self, config: RunnerConfig) -> Self {
        self.config = config;
        self
    }

    // ========== Script surface ==========

    /// Expose a typed Rust function to scripts
    pub fn with_function<F, M>(mut self, name: impl Into<String>, function: F) -> Self
    where
        F: IntoHostFunction<M>,
    {
        self.functions.insert(name.into(), adapt(function));
        self
    }

    /// Expose a function taking the raw argument list
    pub fn with_dynamic_function<F>(mut self, name: impl Into<String>, function: F) -> Self
    where
        F: Fn(&[Value]) -> std::result::Result<Value, AdapterError> + Send + Sync + 'static,
    {
        self.functions.insert(name.into(), Arc::new(function));
        self
    }

    /// Receive `debug(value)` calls with the current context and the value
    pub fn with_debug_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Value, &Value) + Send + Sync + 'static,
    {
        self.debug_hook = Some(Arc::new(hook));
        self
    }

    pub fn with_trace_sink(mut self, sink: impl TraceSink + 'static) -> Self {
        self.trace_sink = Some(Arc::new(sink));
        self
    }

    /// Share a sink the caller keeps a handle to
    pub fn with_shared_trace_sink(mut self, sink: Arc<dyn TraceSink>) -> Self {
        self.trace_sink = Some(sink);
        self
    }

    /// Enable tracing
    pub fn enable_tracing(mut self, enable: bool) -> Self {
        self.config.enable_tracing = enable;
        self
    }

    /// Build the runner
    ///
    /// Rules given directly take precedence over the configuration's rule
    /// source. A configured start condition must exist in the graph.
    pub fn build(self) -> Result<Runner<C>> {
        self.config.validate()?;

        let rules = match self.rules {
            Some(input) => load_input(input)?,
            None => load_configured(&self.config)?,
        };

        if let Some(start) = self.config.start_condition.as_deref() {
            if rules.condition(start).is_none() {
                return Err(SdkError::ConfigError(format!(
                    "start condition '{}' not found",
                    start
                )));
            }
        }

        tracing::info!(
            rules = rules.name.as_deref().unwrap_or("<unnamed>"),
            conditions = rules.len(),
            functions = self.functions.len(),
            "runner built"
        );

        Ok(Runner::new(
            rules,
            self.functions,
            self.debug_hook,
            self.trace_sink,
            self.config.start_condition,
            self.config.enable_tracing,
        ))
    }
}

impl<C> Default for RunnerBuilder<C>
where
    C: Serialize + DeserializeOwned,
{
    fn default() -> Self {
        Self::new()
    }
}

fn load_input(input: RulesInput) -> Result<Rules> {
    match input {
        RulesInput::Graph(rules) => Ok(rules),
        RulesInput::Yaml(yaml) => rules_from_yaml(&yaml),
        RulesInput::File(path) => {
            let yaml = std::fs::read_to_string(&path)?;
            rules_from_yaml(&yaml)
        }
        RulesInput::Library(loaded) => Ok(loaded?),
    }
}

fn load_configured(config: &RunnerConfig) -> Result<Rules> {
    if let Some(path) = &config.rules_file {
        return load_input(RulesInput::File(path.clone()));
    }

    match (&config.library_path, &config.entry) {
        (Some(path), Some(entry)) => {
            let library = RulesLibrary::from_path(path)?;
            Ok(library.load_rules(entry)?)
        }
        _ => Err(SdkError::NoRules),
    }
}

/// Standalone documents have no library to resolve `require` against
fn rules_from_yaml(yaml: &str) -> Result<Rules> {
    let rule_set = RuleSetParser::parse(yaml)?;
    if !rule_set.require.is_empty() {
        tracing::warn!(
            require = ?rule_set.require,
            "dependencies of a standalone rule set are ignored"
        );
    }

    let rules = Rules::from_rule_set(rule_set)?;
    rules.validate()?;
    Ok(rules)
}
