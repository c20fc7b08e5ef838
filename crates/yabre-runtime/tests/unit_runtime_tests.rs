//! Integration tests for yabre-runtime
//!
//! Rule sets are parsed from YAML, prepared into an environment and walked by
//! the executor.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::{Arc, Mutex};
use yabre_core::{Branch, Rules, Value};
use yabre_parser::RuleSetParser;
use yabre_runtime::{
    adapt, BridgeError, DebugHook, DecisionEvent, Environment, Executor, HostFunctions,
    RecordingSink, RuntimeError, Variadic,
};

fn load(yaml: &str) -> Rules {
    Rules::from_rule_set(RuleSetParser::parse(yaml).unwrap()).unwrap()
}

fn run_json(
    rules: &Rules,
    context: serde_json::Value,
    functions: &HostFunctions,
) -> (Result<(), RuntimeError>, serde_json::Value, RecordingSink) {
    let sink = RecordingSink::new();
    let mut env = Environment::prepare(rules, &context, functions, None).unwrap();
    let start = rules.default_condition.clone().unwrap();

    let result = Executor::new(rules).with_sink(Some(&sink)).run(&mut env, &start);
    let context = env.into_context().unwrap();
    (result, context, sink)
}

const LOAN_RULES: &str = r#"
name: loan
scripts: |
  fn income_ratio() { this.loan / this.income }
conditions:
  credit_check:
    default: true
    check: this.score >= 650
    true:
      description: good credit
      next: affordability
    false:
      description: poor credit
      action: |
        this.approved = false;
        this.reason = "credit";
      terminate: true
  affordability:
    check: this.income_ratio() < 0.4
    true:
      action: this.approved = true;
      terminate: true
    false:
      action: |
        this.approved = false;
        this.reason = "income";
      terminate: true
"#;

// =============================================================================
// Walking the graph
// =============================================================================

#[test]
fn test_loan_approved() {
    let rules = load(LOAN_RULES);
    let (result, context, sink) = run_json(
        &rules,
        json!({"score": 700, "income": 5000.0, "loan": 1000.0}),
        &HostFunctions::new(),
    );

    result.unwrap();
    assert_eq!(context["approved"], json!(true));
    assert_eq!(
        sink.events().last(),
        Some(&DecisionEvent::Terminate {
            decision: "affordability_true".to_string()
        })
    );
}

#[test]
fn test_loan_rejected_on_credit() {
    let rules = load(LOAN_RULES);
    let (result, context, sink) = run_json(
        &rules,
        json!({"score": 500, "income": 5000.0, "loan": 1000.0}),
        &HostFunctions::new(),
    );

    result.unwrap();
    assert_eq!(context["approved"], json!(false));
    assert_eq!(context["reason"], json!("credit"));
    assert!(sink
        .messages()
        .contains(&"condition credit_check is false: poor credit".to_string()));
}

#[test]
fn test_identical_inputs_identical_traces() {
    let rules = load(LOAN_RULES);
    let input = json!({"score": 700, "income": 1000.0, "loan": 900.0});

    let (_, first_context, first) = run_json(&rules, input.clone(), &HostFunctions::new());
    let (_, second_context, second) = run_json(&rules, input, &HostFunctions::new());

    assert_eq!(first.events(), second.events());
    assert_eq!(first_context, second_context);
    assert_eq!(first_context["reason"], json!("income"));
}

#[test]
fn test_throwing_action_keeps_earlier_mutations() {
    let rules = load(
        r#"
name: failing
conditions:
  start:
    default: true
    check: true
    true:
      action: |
        this.step = 1;
        throw "boom";
"#,
    );

    let (result, context, _) = run_json(&rules, json!({}), &HostFunctions::new());

    let err = result.unwrap_err();
    assert!(matches!(err, RuntimeError::ActionFailed { ref decision, .. } if decision == "start_true"));
    assert!(err.to_string().starts_with("error running action function start_true"));
    assert!(err.to_string().contains("boom"));
    assert_eq!(context["step"], json!(1));
}

#[test]
fn test_failing_check_names_condition() {
    let rules = load(
        r#"
name: failing
conditions:
  start:
    default: true
    check: no_such_function(this.score)
"#,
    );

    let (result, _, _) = run_json(&rules, json!({}), &HostFunctions::new());
    let err = result.unwrap_err();
    assert!(matches!(err, RuntimeError::CheckFailed { ref condition, .. } if condition == "start"));
    assert!(err
        .to_string()
        .starts_with("error evaluating check function start"));
}

#[test]
fn test_loop_until_counter_reached() {
    let rules = load(
        r#"
name: counter
conditions:
  tick:
    default: true
    check: this.count < 1000
    true:
      action: this.count += 1;
      next: tick
"#,
    );

    let (result, context, sink) = run_json(&rules, json!({"count": 0}), &HostFunctions::new());

    result.unwrap();
    assert_eq!(context["count"], json!(1000));
    assert_eq!(
        sink.events().last(),
        Some(&DecisionEvent::Halt {
            condition: "tick".to_string(),
            branch: Branch::False,
        })
    );
}

// =============================================================================
// Host functions and hooks
// =============================================================================

#[test]
fn test_host_functions_from_scripts() {
    let mut functions = HostFunctions::new();
    functions.insert("double".to_string(), adapt(|x: i64| x * 2));
    functions.insert(
        "join".to_string(),
        adapt(|sep: String, parts: Variadic<String>| parts.join(sep.as_str())),
    );
    functions.insert(
        "first".to_string(),
        adapt(|args: &[Value]| -> Result<Value, yabre_runtime::AdapterError> {
            Ok(args.first().cloned().unwrap_or(Value::Null))
        }),
    );

    let rules = load(
        r#"
name: host
conditions:
  start:
    default: true
    check: true
    true:
      action: |
        this.doubled = double(this.n);
        this.label = join("-", "a", "b", "c");
        this.picked = first(7, 8);
      terminate: true
"#,
    );

    let (result, context, _) = run_json(&rules, json!({"n": 21}), &functions);

    result.unwrap();
    assert_eq!(context["doubled"], json!(42));
    assert_eq!(context["label"], json!("a-b-c"));
    assert_eq!(context["picked"], json!(7));
}

#[test]
fn test_debug_hook_receives_context_and_value() {
    let rules = load(
        r#"
name: debugging
scripts: |
  debug("prelude");
conditions:
  start:
    default: true
    check: |
      debug(`score is ${this.score}`);
      debug(#{score: context.score, ok: true});
      true
"#,
    );

    let calls = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&calls);
    let hook: DebugHook = Arc::new(move |context: &Value, value: &Value| {
        sink.lock().unwrap().push((context.clone(), value.clone()));
    });

    let mut env =
        Environment::prepare(&rules, &json!({"score": 3}), &HostFunctions::new(), Some(hook))
            .unwrap();
    Executor::new(&rules).run(&mut env, "start").unwrap();

    let context = Value::from(json!({"score": 3}));
    assert_eq!(
        *calls.lock().unwrap(),
        vec![
            (context.clone(), Value::from("prelude")),
            (context.clone(), Value::from("score is 3")),
            (context, Value::from(json!({"score": 3, "ok": true}))),
        ]
    );
}

// =============================================================================
// Context variable and slot names
// =============================================================================

#[test]
fn test_nested_levels_through_context_variable() {
    let rules = load(
        r#"
name: deeply-nested
scripts: |
  fn bump() { context.level = (context.level ?? 0) + 1; }
conditions:
  level1:
    default: true
    check: context.level < 5
    true:
      action: bump();
      next: level2
    false:
      terminate: true
  level2:
    check: context.level < 5
    true:
      action: bump();
      next: level3
    false:
      terminate: true
  level3:
    check: context.level < 5
    true:
      action: bump();
      next: level4
    false:
      terminate: true
  level4:
    check: context.level < 5
    true:
      action: bump();
      next: level5
    false:
      terminate: true
  level5:
    check: context.level >= 5
    true:
      action: bump();
      terminate: true
"#,
    );

    let (result, context, sink) = run_json(&rules, json!({"level": 0}), &HostFunctions::new());
    result.unwrap();
    assert_eq!(context, json!({"level": 4}));
    assert_eq!(
        sink.events().last(),
        Some(&DecisionEvent::Halt {
            condition: "level5".to_string(),
            branch: Branch::False,
        })
    );
}

#[test]
fn test_similar_slot_names_run_their_own_code() {
    let rules = load(
        r#"
name: lanes
conditions:
  go-left:
    default: true
    check: "false"
    true:
      action: this.took = "wrong";
      terminate: true
  go_left:
    check: "true"
"#,
    );

    let (result, context, sink) = run_json(&rules, json!({}), &HostFunctions::new());
    result.unwrap();
    assert_eq!(context, json!({}));
    assert_eq!(
        sink.events().last(),
        Some(&DecisionEvent::Halt {
            condition: "go-left".to_string(),
            branch: Branch::False,
        })
    );
}

#[test]
fn test_condition_named_after_action_slot() {
    let rules = load(
        r#"
name: approvals
conditions:
  approve:
    default: true
    check: "true"
    true:
      action: this.approved = true;
      next: approve_true
  approve_true:
    check: |
      this.other = 1;
      false
"#,
    );

    let (result, context, _) = run_json(&rules, json!({}), &HostFunctions::new());
    result.unwrap();
    assert_eq!(context, json!({"approved": true, "other": 1}));
}

// =============================================================================
// Typed contexts
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Applicant {
    age: i64,
    name: String,
    #[serde(default)]
    tags: Vec<String>,
}

#[test]
fn test_struct_context_round_trip() {
    let rules = load(
        r#"
name: tagging
conditions:
  adult:
    default: true
    check: this.age >= 18
    true:
      action: this.tags.push("adult");
    false:
      action: this.tags.push("minor");
"#,
    );

    let applicant = Applicant {
        age: 40,
        name: "Ann".to_string(),
        tags: Vec::new(),
    };
    let mut env =
        Environment::prepare(&rules, &applicant, &HostFunctions::new(), None).unwrap();
    Executor::new(&rules).run(&mut env, "adult").unwrap();

    let applicant: Applicant = env.into_context().unwrap();
    assert_eq!(applicant.tags, vec!["adult".to_string()]);
    assert_eq!(applicant.name, "Ann");
}

#[test]
fn test_prelude_failure_is_bind_error() {
    let rules = load(
        r#"
name: broken
scripts: |
  throw "not ready";
"#,
    );

    let err = Environment::prepare(&rules, &json!({}), &HostFunctions::new(), None).unwrap_err();
    assert!(matches!(err, BridgeError::Evaluate { ref slot, .. } if slot == "scripts"));
}
