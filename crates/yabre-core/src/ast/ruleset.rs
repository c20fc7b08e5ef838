//! Rule set, condition and decision definitions
//!
//! A rule set is one independently loadable document. Its conditions form the
//! nodes of the decision graph; each condition owns up to two decisions, one
//! per boolean outcome of its check.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Which outcome of a check a decision is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Branch {
    True,
    False,
}

impl Branch {
    pub fn from_bool(value: bool) -> Self {
        if value {
            Branch::True
        } else {
            Branch::False
        }
    }

    pub fn value(self) -> bool {
        matches!(self, Branch::True)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Branch::True => "true",
            Branch::False => "false",
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome-specific action, transition or termination of a condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// Synthesized name: `<condition>_true` or `<condition>_false`
    pub name: String,

    /// The branch this decision was declared under
    pub branch: Branch,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Script source run when this branch is taken
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,

    /// Condition to continue with
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,

    /// Halt the run after the action
    #[serde(default)]
    pub terminate: bool,
}

impl Decision {
    /// Create an empty decision for a condition's branch
    pub fn new(condition: &str, branch: Branch) -> Self {
        Self {
            name: Self::slot_name(condition, branch),
            branch,
            description: None,
            action: None,
            next: None,
            terminate: false,
        }
    }

    /// Default slot name of the action attached to `condition`'s `branch`
    pub fn slot_name(condition: &str, branch: Branch) -> String {
        format!("{}_{}", condition, branch)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn with_next(mut self, next: impl Into<String>) -> Self {
        self.next = Some(next.into());
        self
    }

    pub fn terminating(mut self) -> Self {
        self.terminate = true;
        self
    }

    /// The boolean outcome this decision handles
    pub fn value(&self) -> bool {
        self.branch.value()
    }

    /// `next` and `terminate` are mutually exclusive
    pub fn validate(&self) -> Result<()> {
        if self.next.is_some() && self.terminate {
            return Err(CoreError::NextAndTerminate {
                decision: self.name.clone(),
            });
        }
        Ok(())
    }
}

/// A named decision point with a boolean check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Marks the default entry point of the graph
    #[serde(default)]
    pub default: bool,

    /// Script source evaluated to pick a branch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check: Option<String>,

    #[serde(rename = "true", skip_serializing_if = "Option::is_none")]
    pub on_true: Option<Decision>,

    #[serde(rename = "false", skip_serializing_if = "Option::is_none")]
    pub on_false: Option<Decision>,
}

impl Condition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            default: false,
            check: None,
            on_true: None,
            on_false: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_check(mut self, check: impl Into<String>) -> Self {
        self.check = Some(check.into());
        self
    }

    pub fn as_default(mut self) -> Self {
        self.default = true;
        self
    }

    /// Attach a decision to the branch it was created for
    pub fn with_decision(mut self, decision: Decision) -> Self {
        match decision.branch {
            Branch::True => self.on_true = Some(decision),
            Branch::False => self.on_false = Some(decision),
        }
        self
    }

    /// Start building the decision for one of this condition's branches
    pub fn decision_for(&self, branch: Branch) -> Decision {
        Decision::new(&self.name, branch)
    }

    /// The decision selected by a check outcome
    pub fn decision(&self, branch: Branch) -> Option<&Decision> {
        match branch {
            Branch::True => self.on_true.as_ref(),
            Branch::False => self.on_false.as_ref(),
        }
    }

    /// All declared decisions, true branch first
    pub fn decisions(&self) -> impl Iterator<Item = &Decision> {
        self.on_true.iter().chain(self.on_false.iter())
    }

    pub fn validate(&self) -> Result<()> {
        self.decisions().try_for_each(Decision::validate)
    }
}

/// One independently loadable rule document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RuleSet {
    /// Unique name within a library
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Names of the rule sets this one depends on
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub require: Vec<String>,

    /// Shared script prelude
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scripts: Option<String>,

    #[serde(default)]
    pub conditions: HashMap<String, Condition>,
}

impl RuleSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_require(mut self, dependency: impl Into<String>) -> Self {
        self.require.push(dependency.into());
        self
    }

    pub fn with_scripts(mut self, scripts: impl Into<String>) -> Self {
        self.scripts = Some(scripts.into());
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.insert(condition.name.clone(), condition);
        self
    }

    /// Name of the condition flagged as default, if exactly one is
    pub fn default_condition(&self) -> Result<Option<&str>> {
        default_of(self.conditions.values())
    }

    /// Check the per-document invariants
    pub fn validate(&self) -> Result<()> {
        for condition in self.conditions.values() {
            condition.validate()?;
        }
        self.default_condition().map(|_| ())
    }
}

/// Find the single default-flagged condition among `conditions`
pub(crate) fn default_of<'a>(
    conditions: impl Iterator<Item = &'a Condition>,
) -> Result<Option<&'a str>> {
    let mut defaults: Vec<&str> = conditions
        .filter(|c| c.default)
        .map(|c| c.name.as_str())
        .collect();
    defaults.sort_unstable();

    match defaults.as_slice() {
        [] => Ok(None),
        [single] => Ok(Some(*single)),
        [first, second, ..] => Err(CoreError::MultipleDefaults {
            first: first.to_string(),
            second: second.to_string(),
        }),
    }
}
