//! yabre Core - Core types and definitions for the yabre decision engine
//!
//! This crate provides the fundamental types used across the yabre crates:
//! - Value types exchanged with host functions
//! - The rule graph model (rule sets, conditions, decisions, resolved graphs)
//! - Mermaid flowchart export of a resolved graph
//! - Error types

pub mod ast;
pub mod error;
pub mod mermaid;
pub mod types;

// Re-export commonly used types
pub use ast::{Branch, Condition, Decision, RuleSet, Rules};
pub use error::CoreError;
pub use mermaid::export_mermaid;
pub use types::Value;
