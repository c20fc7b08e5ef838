//! YAML Parser
//!
//! Small typed accessors over `serde_yaml::Value` used by the rule-set parser.
//! Optional accessors fail on a present field of the wrong type instead of
//! silently ignoring it.

use crate::error::{ParseError, Result};
use serde_yaml::{Mapping, Value as YamlValue};

/// YAML parser utilities
pub struct YamlParser;

impl YamlParser {
    /// Parse YAML string into a YAML value; blank input is `Null`
    pub fn parse(yaml_str: &str) -> Result<YamlValue> {
        if yaml_str.trim().is_empty() {
            return Ok(YamlValue::Null);
        }
        Ok(serde_yaml::from_str(yaml_str)?)
    }

    /// Get an optional string field from YAML object
    pub fn get_optional_string(obj: &YamlValue, field: &str) -> Result<Option<String>> {
        match Self::present(obj, field) {
            None => Ok(None),
            Some(YamlValue::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(Self::mismatch(field, "string", other)),
        }
    }

    /// Get an optional script source field
    ///
    /// Plain scalars are accepted as source text, so `check: true` reads the
    /// same as `check: "true"`.
    pub fn get_optional_source(obj: &YamlValue, field: &str) -> Result<Option<String>> {
        match Self::present(obj, field) {
            None => Ok(None),
            Some(YamlValue::String(s)) => Ok(Some(s.clone())),
            Some(YamlValue::Bool(b)) => Ok(Some(b.to_string())),
            Some(YamlValue::Number(n)) => Ok(Some(n.to_string())),
            Some(other) => Err(Self::mismatch(field, "string", other)),
        }
    }

    /// Get an optional boolean field from YAML object
    pub fn get_optional_bool(obj: &YamlValue, field: &str) -> Result<Option<bool>> {
        match Self::present(obj, field) {
            None => Ok(None),
            Some(YamlValue::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(Self::mismatch(field, "bool", other)),
        }
    }

    /// Get an optional list of strings from YAML object
    pub fn get_optional_string_list(obj: &YamlValue, field: &str) -> Result<Vec<String>> {
        let items = match Self::present(obj, field) {
            None => return Ok(Vec::new()),
            Some(YamlValue::Sequence(items)) => items,
            Some(other) => return Err(Self::mismatch(field, "list", other)),
        };

        items
            .iter()
            .map(|item| match item {
                YamlValue::String(s) => Ok(s.clone()),
                other => Err(Self::mismatch(field, "string", other)),
            })
            .collect()
    }

    /// Get an optional object field from YAML object
    pub fn get_optional_object<'a>(obj: &'a YamlValue, field: &str) -> Result<Option<&'a Mapping>> {
        match Self::present(obj, field) {
            None => Ok(None),
            Some(YamlValue::Mapping(mapping)) => Ok(Some(mapping)),
            Some(other) => Err(Self::mismatch(field, "object", other)),
        }
    }

    /// Human-readable kind of a YAML value
    pub fn kind_name(value: &YamlValue) -> &'static str {
        match value {
            YamlValue::Null => "null",
            YamlValue::Bool(_) => "bool",
            YamlValue::Number(_) => "number",
            YamlValue::String(_) => "string",
            YamlValue::Sequence(_) => "list",
            YamlValue::Mapping(_) => "object",
            YamlValue::Tagged(_) => "tagged value",
        }
    }

    /// Field lookup treating an explicit `null` as absent
    fn present<'a>(obj: &'a YamlValue, field: &str) -> Option<&'a YamlValue> {
        obj.get(field).filter(|v| !v.is_null())
    }

    fn mismatch(field: &str, expected: &str, actual: &YamlValue) -> ParseError {
        ParseError::TypeMismatch {
            field: field.to_string(),
            expected: expected.to_string(),
            actual: Self::kind_name(actual).to_string(),
        }
    }
}
