//! Common test utilities for SDK integration tests

#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use std::fs;
use tempfile::TempDir;

/// Context used by the loan scenarios
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoanApplication {
    pub applicant: String,
    pub credit_score: i64,
    pub income: f64,
    pub amount: f64,
    #[serde(default)]
    pub approved: Option<bool>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub notes: Vec<String>,
}

impl LoanApplication {
    pub fn new(applicant: &str, credit_score: i64, income: f64, amount: f64) -> Self {
        Self {
            applicant: applicant.to_string(),
            credit_score,
            income,
            amount,
            ..Self::default()
        }
    }
}

pub const LOAN_RULES: &str = r#"
name: loan-approval
scripts: |
  fn ratio() { this.amount / this.income }
conditions:
  credit:
    default: true
    description: Credit score gate
    check: this.credit_score >= 650
    true:
      next: affordability
    false:
      description: score below threshold
      action: |
        this.approved = false;
        this.reason = "credit score";
      terminate: true
  affordability:
    check: this.ratio() <= max_ratio()
    true:
      description: affordable
      action: |
        this.approved = true;
        this.notes.push(`ratio ${this.ratio()}`);
      terminate: true
    false:
      action: |
        this.approved = false;
        this.reason = "amount too high";
      terminate: true
"#;

/// Write rule-set documents under a fresh temporary directory
pub fn write_library(files: &[(&str, &str)]) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    for (path, content) in files {
        let full = temp_dir.path().join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full, content).unwrap();
    }
    temp_dir
}
