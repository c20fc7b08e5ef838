//! Unit tests for the YAML rule-set parser

use yabre_core::ast::Branch;
use yabre_core::CoreError;
use yabre_parser::*;

// =============================================================================
// Rule Set Parser Tests
// =============================================================================

#[test]
fn test_parse_full_rule_set() {
    let yaml = r#"
name: loan
require:
  - common
  - scoring
scripts: |
  fn is_adult() { this.age >= 18 }
conditions:
  adult:
    description: Is the applicant an adult?
    default: true
    check: is_adult()
    true:
      description: Mark as adult
      action: this.adult = true;
      next: income
    false:
      terminate: true
  income:
    check: this.income > 1000
    true:
      terminate: true
"#;

    let result = RuleSetParser::parse(yaml);
    assert!(result.is_ok(), "Failed to parse rule set: {:?}", result.err());

    let rule_set = result.unwrap();
    assert_eq!(rule_set.name.as_deref(), Some("loan"));
    assert_eq!(rule_set.require, vec!["common", "scoring"]);
    assert!(rule_set.scripts.as_deref().unwrap().contains("fn is_adult()"));
    assert_eq!(rule_set.conditions.len(), 2);
    assert_eq!(rule_set.default_condition().unwrap(), Some("adult"));

    let adult = &rule_set.conditions["adult"];
    assert_eq!(adult.description.as_deref(), Some("Is the applicant an adult?"));
    assert_eq!(adult.check.as_deref(), Some("is_adult()"));

    let yes = adult.decision(Branch::True).unwrap();
    assert_eq!(yes.name, "adult_true");
    assert_eq!(yes.description.as_deref(), Some("Mark as adult"));
    assert_eq!(yes.action.as_deref(), Some("this.adult = true;"));
    assert_eq!(yes.next.as_deref(), Some("income"));
    assert!(!yes.terminate);

    let no = adult.decision(Branch::False).unwrap();
    assert_eq!(no.name, "adult_false");
    assert!(no.terminate);
    assert!(no.action.is_none());

    let income = &rule_set.conditions["income"];
    assert!(!income.default);
    assert!(income.decision(Branch::False).is_none());
}

#[test]
fn test_parse_quoted_branch_keys() {
    let yaml = r#"
conditions:
  start:
    check: "true"
    "true":
      next: second
    "false":
      terminate: true
  second: {}
"#;

    let rule_set = RuleSetParser::parse(yaml).unwrap();
    let start = &rule_set.conditions["start"];
    assert_eq!(start.decision(Branch::True).unwrap().next.as_deref(), Some("second"));
    assert!(start.decision(Branch::False).unwrap().terminate);
}

#[test]
fn test_parse_unquoted_check_scalar() {
    let yaml = r#"
conditions:
  start:
    check: false
"#;

    let rule_set = RuleSetParser::parse(yaml).unwrap();
    assert_eq!(rule_set.conditions["start"].check.as_deref(), Some("false"));
}

#[test]
fn test_parse_empty_document() {
    let rule_set = RuleSetParser::parse("").unwrap();
    assert!(rule_set.name.is_none());
    assert!(rule_set.require.is_empty());
    assert!(rule_set.conditions.is_empty());
}

#[test]
fn test_parse_condition_without_body() {
    let rule_set = RuleSetParser::parse("conditions:\n  idle:\n").unwrap();
    let idle = &rule_set.conditions["idle"];
    assert!(idle.check.is_none());
    assert_eq!(idle.decisions().count(), 0);
}

// =============================================================================
// Load Invariants
// =============================================================================

#[test]
fn test_parse_rejects_next_and_terminate() {
    let yaml = r#"
name: broken
conditions:
  start:
    check: "true"
    true:
      next: other
      terminate: true
"#;

    let err = RuleSetParser::parse(yaml).unwrap_err();
    assert!(
        matches!(
            err,
            ParseError::Core(CoreError::NextAndTerminate { ref decision }) if decision == "start_true"
        ),
        "unexpected error: {:?}",
        err
    );
}

#[test]
fn test_parse_rejects_multiple_defaults() {
    let yaml = r#"
conditions:
  first:
    default: true
  second:
    default: true
"#;

    let err = RuleSetParser::parse(yaml).unwrap_err();
    assert!(matches!(err, ParseError::Core(CoreError::MultipleDefaults { .. })));
    assert!(err.to_string().contains("multiple default conditions found"));
}

#[test]
fn test_parse_malformed_yaml() {
    let result = RuleSetParser::parse("name: [unclosed");
    assert!(matches!(result, Err(ParseError::YamlError(_))));
}

#[test]
fn test_parse_wrong_field_types() {
    let err = RuleSetParser::parse("name: [a, b]").unwrap_err();
    assert!(matches!(err, ParseError::TypeMismatch { ref field, .. } if field == "name"));

    let err = RuleSetParser::parse("require: common").unwrap_err();
    assert!(matches!(err, ParseError::TypeMismatch { ref field, .. } if field == "require"));

    let err = RuleSetParser::parse("conditions:\n  a:\n    default: maybe").unwrap_err();
    assert!(matches!(err, ParseError::TypeMismatch { ref field, .. } if field == "default"));

    let err = RuleSetParser::parse("conditions:\n  a:\n    true: 5").unwrap_err();
    assert!(matches!(err, ParseError::TypeMismatch { ref field, .. } if field == "a_true"));
}

#[test]
fn test_parse_non_mapping_document() {
    let err = RuleSetParser::parse("- just\n- a list").unwrap_err();
    assert!(matches!(err, ParseError::TypeMismatch { .. }));
}

// =============================================================================
// Header Tests
// =============================================================================

#[test]
fn test_parse_header_only() {
    let yaml = r#"
name: child
require: [parent]
conditions:
  anything:
    check: not even parsed here
"#;

    let header = RuleSetParser::parse_header(yaml).unwrap();
    assert_eq!(header.name.as_deref(), Some("child"));
    assert_eq!(header.require, vec!["parent"]);
}

#[test]
fn test_parse_header_defaults() {
    let header = RuleSetParser::parse_header("scripts: x").unwrap();
    assert!(header.name.is_none());
    assert!(header.require.is_empty());

    assert_eq!(RuleSetParser::parse_header("").unwrap(), RuleSetHeader::default());
}
