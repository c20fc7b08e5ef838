//! yabre Parser - YAML to rule graph parser
//!
//! Turns one rule-set document into a [`yabre_core::RuleSet`], enforcing the
//! invariants that can be checked on a single document.

pub mod error;
pub mod ruleset_parser;
pub mod yaml_parser;

pub use error::{ParseError, Result};
pub use ruleset_parser::{RuleSetHeader, RuleSetParser};
pub use yaml_parser::YamlParser;
