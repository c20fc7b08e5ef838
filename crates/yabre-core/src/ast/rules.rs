//! Resolved rule graph
//!
//! `Rules` is what the executor walks: the conditions of an entry rule set
//! merged with those of its dependencies, plus the combined script prelude.

use crate::ast::ruleset::{default_of, Condition, RuleSet};
use crate::error::{CoreError, Result};
use std::collections::HashMap;

/// A fully merged graph of conditions ready for execution
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Rules {
    /// Name of the entry rule set
    pub name: Option<String>,

    /// Combined script prelude of all merged rule sets
    pub scripts: Option<String>,

    pub conditions: HashMap<String, Condition>,

    /// Name of the default entry condition
    pub default_condition: Option<String>,
}

impl Rules {
    /// Build a graph from a single rule set
    pub fn from_rule_set(rule_set: RuleSet) -> Result<Self> {
        rule_set.validate()?;
        let default_condition = rule_set.default_condition()?.map(str::to_string);

        Ok(Self {
            name: rule_set.name,
            scripts: rule_set.scripts,
            conditions: rule_set.conditions,
            default_condition,
        })
    }

    /// Fold a dependency into this graph
    ///
    /// The dependency's prelude is appended after the current one; a condition
    /// name that already exists is rejected.
    pub fn absorb(&mut self, dependency: RuleSet) -> Result<()> {
        dependency.validate()?;

        if let Some(scripts) = dependency.scripts.filter(|s| !s.is_empty()) {
            self.scripts = Some(match self.scripts.take() {
                Some(existing) if !existing.is_empty() => format!("{}\n{}", existing, scripts),
                _ => scripts,
            });
        }

        for (name, condition) in dependency.conditions {
            if self.conditions.contains_key(&name) {
                return Err(CoreError::DuplicateCondition(name));
            }
            self.conditions.insert(name, condition);
        }

        self.default_condition = default_of(self.conditions.values())?.map(str::to_string);
        Ok(())
    }

    /// Check that every transition points to a known condition
    pub fn validate(&self) -> Result<()> {
        default_of(self.conditions.values())?;

        for name in self.condition_names() {
            let condition = &self.conditions[name];
            for decision in condition.decisions() {
                decision.validate()?;
                if let Some(next) = &decision.next {
                    if !self.conditions.contains_key(next) {
                        return Err(CoreError::UnknownNext {
                            decision: decision.name.clone(),
                            next: next.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    pub fn condition(&self, name: &str) -> Option<&Condition> {
        self.conditions.get(name)
    }

    pub fn default_condition(&self) -> Option<&Condition> {
        self.default_condition
            .as_deref()
            .and_then(|name| self.conditions.get(name))
    }

    /// Condition names in a stable (sorted) order
    pub fn condition_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.conditions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ruleset::{Branch, Decision};

    fn child() -> RuleSet {
        RuleSet::new("child")
            .with_require("parent")
            .with_scripts("fn child_helper() { 1 }")
            .with_condition(
                Condition::new("start")
                    .as_default()
                    .with_check("true")
                    .with_decision(Decision::new("start", Branch::True).with_next("shared")),
            )
    }

    fn parent() -> RuleSet {
        RuleSet::new("parent")
            .with_scripts("fn parent_helper() { 2 }")
            .with_condition(
                Condition::new("shared")
                    .with_check("false")
                    .with_decision(Decision::new("shared", Branch::False).terminating()),
            )
    }

    #[test]
    fn test_from_rule_set_keeps_default() {
        let rules = Rules::from_rule_set(child()).unwrap();
        assert_eq!(rules.name.as_deref(), Some("child"));
        assert_eq!(rules.default_condition().unwrap().name, "start");
    }

    #[test]
    fn test_absorb_appends_scripts_and_conditions() {
        let mut rules = Rules::from_rule_set(child()).unwrap();
        rules.absorb(parent()).unwrap();

        assert_eq!(rules.len(), 2);
        assert_eq!(
            rules.scripts.as_deref(),
            Some("fn child_helper() { 1 }\nfn parent_helper() { 2 }")
        );
        assert_eq!(rules.default_condition.as_deref(), Some("start"));
        assert!(rules.validate().is_ok());
    }

    #[test]
    fn test_absorb_rejects_duplicate_condition() {
        let mut rules = Rules::from_rule_set(child()).unwrap();
        let clash = RuleSet::new("parent").with_condition(Condition::new("start"));

        let err = rules.absorb(clash).unwrap_err();
        assert_eq!(err, CoreError::DuplicateCondition("start".to_string()));
        assert_eq!(err.to_string(), "duplicate condition start");
    }

    #[test]
    fn test_absorb_rejects_second_default() {
        let mut rules = Rules::from_rule_set(child()).unwrap();
        let other = RuleSet::new("parent").with_condition(Condition::new("other").as_default());

        assert!(matches!(
            rules.absorb(other),
            Err(CoreError::MultipleDefaults { .. })
        ));
    }

    #[test]
    fn test_dependency_default_used_when_entry_has_none() {
        let entry = RuleSet::new("entry").with_condition(Condition::new("a"));
        let mut rules = Rules::from_rule_set(entry).unwrap();
        assert!(rules.default_condition.is_none());

        rules
            .absorb(RuleSet::new("dep").with_condition(Condition::new("b").as_default()))
            .unwrap();
        assert_eq!(rules.default_condition.as_deref(), Some("b"));
    }

    #[test]
    fn test_validate_unknown_next() {
        let rules = Rules::from_rule_set(child()).unwrap();
        assert_eq!(
            rules.validate(),
            Err(CoreError::UnknownNext {
                decision: "start_true".to_string(),
                next: "shared".to_string()
            })
        );
    }

    #[test]
    fn test_condition_names_sorted() {
        let mut rules = Rules::from_rule_set(child()).unwrap();
        rules.absorb(parent()).unwrap();
        assert_eq!(rules.condition_names(), vec!["shared", "start"]);
    }
}
