//! Rule set parser
//!
//! Parses one YAML rule-set document into a `RuleSet`:
//!
//! ```yaml
//! name: loan
//! require: [common]
//! scripts: |
//!   fn is_adult() { this.age >= 18 }
//! conditions:
//!   adult:
//!     default: true
//!     check: is_adult()
//!     true:
//!       action: this.status = "ok";
//!       next: income
//!     false:
//!       terminate: true
//! ```

use crate::error::{ParseError, Result};
use crate::yaml_parser::YamlParser;
use serde::Deserialize;
use serde_yaml::Value as YamlValue;
use tracing::debug;
use yabre_core::ast::{Branch, Condition, Decision, RuleSet};

/// Name and dependencies of a document, read without parsing its conditions
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RuleSetHeader {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub require: Vec<String>,
}

/// Rule set parser
pub struct RuleSetParser;

impl RuleSetParser {
    /// Parse a rule set from YAML string
    pub fn parse(yaml_str: &str) -> Result<RuleSet> {
        let yaml = YamlParser::parse(yaml_str)?;
        Self::parse_from_yaml(&yaml)
    }

    /// Read only the `name` and `require` fields of a document
    pub fn parse_header(yaml_str: &str) -> Result<RuleSetHeader> {
        match YamlParser::parse(yaml_str)? {
            YamlValue::Null => Ok(RuleSetHeader::default()),
            yaml => Ok(serde_yaml::from_value(yaml)?),
        }
    }

    /// Parse a rule set from YAML value
    pub fn parse_from_yaml(yaml: &YamlValue) -> Result<RuleSet> {
        if yaml.is_null() {
            return Ok(RuleSet::default());
        }
        if !yaml.is_mapping() {
            return Err(ParseError::TypeMismatch {
                field: "<document>".to_string(),
                expected: "object".to_string(),
                actual: YamlParser::kind_name(yaml).to_string(),
            });
        }

        let mut rule_set = RuleSet {
            name: YamlParser::get_optional_string(yaml, "name")?,
            require: YamlParser::get_optional_string_list(yaml, "require")?,
            scripts: YamlParser::get_optional_source(yaml, "scripts")?,
            ..RuleSet::default()
        };

        if let Some(conditions) = YamlParser::get_optional_object(yaml, "conditions")? {
            for (key, body) in conditions {
                let name = key.as_str().ok_or_else(|| ParseError::InvalidValue {
                    field: "conditions".to_string(),
                    message: format!("condition names must be strings, got {}", YamlParser::kind_name(key)),
                })?;
                let condition = Self::parse_condition(name, body)?;
                rule_set.conditions.insert(name.to_string(), condition);
            }
        }

        rule_set.validate()?;

        debug!(
            "Parsed rule set {:?} with {} conditions",
            rule_set.name,
            rule_set.conditions.len()
        );
        Ok(rule_set)
    }

    /// Parse a condition; an empty body yields a condition with no check
    fn parse_condition(name: &str, yaml: &YamlValue) -> Result<Condition> {
        let mut condition = Condition::new(name);
        if yaml.is_null() {
            return Ok(condition);
        }
        if !yaml.is_mapping() {
            return Err(ParseError::TypeMismatch {
                field: name.to_string(),
                expected: "object".to_string(),
                actual: YamlParser::kind_name(yaml).to_string(),
            });
        }

        condition.description = YamlParser::get_optional_string(yaml, "description")?;
        condition.default = YamlParser::get_optional_bool(yaml, "default")?.unwrap_or(false);
        condition.check = YamlParser::get_optional_source(yaml, "check")?;

        for branch in [Branch::True, Branch::False] {
            if let Some(body) = Self::branch_node(yaml, branch) {
                condition = condition.with_decision(Self::parse_decision(name, branch, body)?);
            }
        }

        Ok(condition)
    }

    fn parse_decision(condition: &str, branch: Branch, yaml: &YamlValue) -> Result<Decision> {
        let mut decision = Decision::new(condition, branch);
        if !yaml.is_mapping() {
            return Err(ParseError::TypeMismatch {
                field: decision.name,
                expected: "object".to_string(),
                actual: YamlParser::kind_name(yaml).to_string(),
            });
        }

        decision.description = YamlParser::get_optional_string(yaml, "description")?;
        decision.action = YamlParser::get_optional_source(yaml, "action")?;
        decision.next = YamlParser::get_optional_string(yaml, "next")?;
        decision.terminate = YamlParser::get_optional_bool(yaml, "terminate")?.unwrap_or(false);

        Ok(decision)
    }

    /// Branch keys may be written as plain `true:` (a boolean key) or quoted
    fn branch_node(yaml: &YamlValue, branch: Branch) -> Option<&YamlValue> {
        let mapping = yaml.as_mapping()?;
        mapping
            .get(YamlValue::Bool(branch.value()))
            .or_else(|| mapping.get(branch.as_str()))
            .filter(|v| !v.is_null())
    }
}
