//! Loan approval example
//!
//! This example demonstrates:
//! - Loading a standalone rule-set document into a Runner
//! - Exposing typed Rust functions to the rule scripts
//! - Collecting the decision trace and the script debug output
//! - Exporting the rule graph as a Mermaid diagram

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use yabre_sdk::{RecordingSink, Runner, RunnerBuilder};

const RULES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/rules/loan_approval.yaml");

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Application {
    applicant: String,
    credit_score: i64,
    monthly_income: f64,
    monthly_debt: f64,
    amount: f64,
    term_months: i64,
    #[serde(default)]
    decision: Option<String>,
    #[serde(default)]
    rate: Option<f64>,
    #[serde(default)]
    reasons: Vec<String>,
}

impl Application {
    fn new(applicant: &str, credit_score: i64, monthly_income: f64, amount: f64) -> Self {
        Self {
            applicant: applicant.to_string(),
            credit_score,
            monthly_income,
            monthly_debt: 400.0,
            amount,
            term_months: 36,
            decision: None,
            rate: None,
            reasons: Vec::new(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    yabre_demos::init_tracing()?;

    println!("=== Loan Approval Example ===\n");

    let trace = Arc::new(RecordingSink::new());
    let runner: Runner<Application> = RunnerBuilder::new()
        .with_rules_file(RULES)
        .with_function("verified", |name: String| !name.trim().is_empty())
        .with_function("base_rate", || 4.5)
        .with_function("risk_premium", |score: i64| {
            if score >= 750 {
                0.5
            } else {
                1.75
            }
        })
        .with_function("max_debt_ratio", |score: i64| -> anyhow::Result<f64> {
            if score < 0 {
                anyhow::bail!("invalid credit score {}", score);
            }
            Ok(if score >= 720 { 0.45 } else { 0.36 })
        })
        .with_debug_hook(|context, value| {
            let applicant = context.get("applicant").map(|a| a.to_string()).unwrap_or_default();
            println!("  [debug] {}: {}", applicant, value)
        })
        .with_shared_trace_sink(trace.clone())
        .build()?;

    let applications = vec![
        Application::new("Ada", 780, 9000.0, 30000.0),
        Application::new("Ben", 610, 5000.0, 10000.0),
        Application::new("Cleo", 690, 3000.0, 36000.0),
        Application::new("", 700, 4000.0, 5000.0),
    ];

    for mut application in applications {
        trace.clear();
        println!("Applicant: {:?}", application.applicant);

        runner.run(&mut application, None)?;

        println!("  Decision: {}", application.decision.as_deref().unwrap_or("none"));
        if let Some(rate) = application.rate {
            println!("  Rate: {:.2}%", rate);
        }
        for reason in &application.reasons {
            println!("  Reason: {}", reason);
        }
        println!("  Trace:");
        for message in trace.messages() {
            println!("    {}", message);
        }
        println!();
    }

    println!("Mermaid diagram:\n{}", runner.export_mermaid());
    Ok(())
}
