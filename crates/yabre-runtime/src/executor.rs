//! Decision executor
//!
//! Walks a resolved graph from a start condition: evaluate the check, pick
//! the branch, run its action, then follow `next` or stop. The walk is a
//! plain loop, so long or cyclic graphs never grow the stack.

use crate::bridge::{Environment, SlotKind};
use crate::error::{Result, RuntimeError};
use crate::trace::{DecisionEvent, TraceSink};
use tracing::{debug, info};
use yabre_core::{Branch, Condition, Rules};

/// Pick the condition a run starts from
///
/// An explicit name must exist in the graph; without one the graph's default
/// condition is used.
pub fn resolve_start<'a>(rules: &'a Rules, start: Option<&str>) -> Result<&'a Condition> {
    match start {
        Some(name) => rules
            .condition(name)
            .ok_or_else(|| RuntimeError::ConditionNotFound(name.to_string())),
        None => rules
            .default_condition()
            .ok_or(RuntimeError::NoDefaultCondition),
    }
}

/// Executes one run over a prepared environment
pub struct Executor<'a> {
    rules: &'a Rules,
    sink: Option<&'a dyn TraceSink>,
    enable_tracing: bool,
}

impl<'a> Executor<'a> {
    pub fn new(rules: &'a Rules) -> Self {
        Self {
            rules,
            sink: None,
            enable_tracing: false,
        }
    }

    pub fn with_sink(mut self, sink: Option<&'a dyn TraceSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Log events at `info` instead of `debug`
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }

    /// Walk the graph starting at condition `start`
    ///
    /// The first failing check or action ends the run. Context changes made
    /// before the failure stay in `env`.
    pub fn run(&self, env: &mut Environment, start: &str) -> Result<()> {
        let mut current = self
            .rules
            .condition(start)
            .ok_or_else(|| RuntimeError::ConditionNotFound(start.to_string()))?;

        loop {
            self.emit(DecisionEvent::Evaluating {
                condition: current.name.clone(),
            });

            let check = bound_function(env, SlotKind::Check, &current.name)?;
            let outcome = env
                .call_check(&check)
                .map_err(|source| RuntimeError::CheckFailed {
                    condition: current.name.clone(),
                    source,
                })?;
            let branch = Branch::from_bool(outcome);

            let Some(decision) = current.decision(branch) else {
                self.emit(DecisionEvent::Halt {
                    condition: current.name.clone(),
                    branch,
                });
                return Ok(());
            };

            self.emit(DecisionEvent::Branch {
                condition: current.name.clone(),
                branch,
                description: decision.description.clone(),
            });

            if decision.action.is_some() {
                let function = bound_function(env, SlotKind::Action, &decision.name)?;
                self.emit(DecisionEvent::Action {
                    decision: decision.name.clone(),
                    function: function.clone(),
                });
                env.call(&function)
                    .map(|_| ())
                    .map_err(|source| RuntimeError::ActionFailed {
                        decision: decision.name.clone(),
                        source,
                    })?;
            }

            if let Some(next) = &decision.next {
                current = self
                    .rules
                    .condition(next)
                    .ok_or_else(|| RuntimeError::ConditionNotFound(next.clone()))?;
                self.emit(DecisionEvent::Transition {
                    from: decision.name.clone(),
                    to: next.clone(),
                });
                continue;
            }

            if decision.terminate {
                self.emit(DecisionEvent::Terminate {
                    decision: decision.name.clone(),
                });
            }
            return Ok(());
        }
    }

    fn emit(&self, event: DecisionEvent) {
        if self.enable_tracing {
            info!(target: "yabre::decision", "{}", event);
        } else {
            debug!(target: "yabre::decision", "{}", event);
        }

        if let Some(sink) = self.sink {
            sink.on_decision(&event);
        }
    }
}

fn bound_function(env: &Environment, kind: SlotKind, slot: &str) -> Result<String> {
    env.bindings()
        .resolve(kind, slot)
        .map(str::to_string)
        .ok_or_else(|| RuntimeError::SlotNotBound {
            slot: slot.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::HostFunctions;
    use crate::trace::RecordingSink;
    use serde_json::json;
    use yabre_core::{Decision, RuleSet};

    fn two_conditions() -> Rules {
        Rules::from_rule_set(
            RuleSet::new("pair")
                .with_condition(
                    Condition::new("start")
                        .as_default()
                        .with_check("true")
                        .with_decision(Decision::new("start", Branch::True).with_next("second")),
                )
                .with_condition(
                    Condition::new("second")
                        .with_check("false")
                        .with_decision(Decision::new("second", Branch::False).terminating()),
                ),
        )
        .unwrap()
    }

    #[test]
    fn test_resolve_start() {
        let rules = two_conditions();
        assert_eq!(resolve_start(&rules, None).unwrap().name, "start");
        assert_eq!(resolve_start(&rules, Some("second")).unwrap().name, "second");
        assert!(matches!(
            resolve_start(&rules, Some("ghost")),
            Err(RuntimeError::ConditionNotFound(ref name)) if name == "ghost"
        ));

        let empty = Rules::default();
        assert!(matches!(
            resolve_start(&empty, None),
            Err(RuntimeError::NoDefaultCondition)
        ));
    }

    #[test]
    fn test_two_condition_walk() {
        let rules = two_conditions();
        let mut env = Environment::prepare(&rules, &json!({}), &HostFunctions::new(), None)
            .unwrap();
        let sink = RecordingSink::new();

        Executor::new(&rules)
            .with_sink(Some(&sink))
            .run(&mut env, "start")
            .unwrap();

        assert_eq!(
            sink.messages(),
            vec![
                "evaluating condition start",
                "condition start is true",
                "next start_true -> second",
                "evaluating condition second",
                "condition second is false",
                "terminate at second_false",
            ]
        );
    }

    #[test]
    fn test_missing_branch_halts() {
        let rules = Rules::from_rule_set(
            RuleSet::new("open").with_condition(Condition::new("only").with_check("false")),
        )
        .unwrap();
        let mut env = Environment::prepare(&rules, &json!({}), &HostFunctions::new(), None)
            .unwrap();
        let sink = RecordingSink::new();

        Executor::new(&rules)
            .with_sink(Some(&sink))
            .run(&mut env, "only")
            .unwrap();

        assert_eq!(
            sink.events().last(),
            Some(&DecisionEvent::Halt {
                condition: "only".to_string(),
                branch: Branch::False,
            })
        );
    }

    #[test]
    fn test_condition_without_check() {
        let rules = Rules::from_rule_set(RuleSet::new("bare").with_condition(Condition::new("x")))
            .unwrap();
        let mut env = Environment::prepare(&rules, &json!({}), &HostFunctions::new(), None)
            .unwrap();

        let err = Executor::new(&rules).run(&mut env, "x").unwrap_err();
        assert!(matches!(err, RuntimeError::SlotNotBound { ref slot } if slot == "x"));
    }

    #[test]
    fn test_unknown_next_at_run_time() {
        let mut rules = two_conditions();
        rules.conditions.remove("second");
        let mut env = Environment::prepare(&rules, &json!({}), &HostFunctions::new(), None)
            .unwrap();

        let err = Executor::new(&rules).run(&mut env, "start").unwrap_err();
        assert_eq!(err.to_string(), "condition 'second' not found");
    }
}
