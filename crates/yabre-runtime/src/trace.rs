//! Decision trace events and sinks

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;
use yabre_core::Branch;

/// One step of a run, in the order it happened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DecisionEvent {
    Evaluating {
        condition: String,
    },
    Branch {
        condition: String,
        branch: Branch,
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    Action {
        decision: String,
        function: String,
    },
    Transition {
        from: String,
        to: String,
    },
    Terminate {
        decision: String,
    },
    /// The taken branch has no decision
    Halt {
        condition: String,
        branch: Branch,
    },
}

impl fmt::Display for DecisionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecisionEvent::Evaluating { condition } => {
                write!(f, "evaluating condition {}", condition)
            }
            DecisionEvent::Branch {
                condition,
                branch,
                description,
            } => match description {
                Some(description) => write!(
                    f,
                    "condition {} is {}: {}",
                    condition, branch, description
                ),
                None => write!(f, "condition {} is {}", condition, branch),
            },
            DecisionEvent::Action { decision, function } => {
                write!(f, "running action {} ({})", decision, function)
            }
            DecisionEvent::Transition { from, to } => write!(f, "next {} -> {}", from, to),
            DecisionEvent::Terminate { decision } => write!(f, "terminate at {}", decision),
            DecisionEvent::Halt { condition, branch } => {
                write!(f, "no decision for {} {}, halting", condition, branch)
            }
        }
    }
}

/// Receives decision events during a run
pub trait TraceSink: Send + Sync {
    fn on_decision(&self, event: &DecisionEvent);
}

/// Any `Fn(&str)` receives the formatted event
impl<F> TraceSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn on_decision(&self, event: &DecisionEvent) {
        self(&event.to_string())
    }
}

/// Sink keeping every event in memory
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<DecisionEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DecisionEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.events().iter().map(ToString::to_string).collect()
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

impl TraceSink for RecordingSink {
    fn on_decision(&self, event: &DecisionEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
