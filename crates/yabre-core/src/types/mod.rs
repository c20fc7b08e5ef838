//! Type system for yabre
//!
//! Dynamic values passed between rule scripts and host functions.

pub mod value;

pub use value::{Value, ValueKind};
