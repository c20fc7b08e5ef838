//! Rule graph definitions for yabre
//!
//! This module contains the in-memory model of:
//! - Rule sets (one loadable document)
//! - Conditions and their true/false decisions
//! - Resolved graphs ready for execution

pub mod rules;
pub mod ruleset;

pub use rules::Rules;
pub use ruleset::{Branch, Condition, Decision, RuleSet};
