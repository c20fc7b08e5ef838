//! Host function adapter
//!
//! Turns Rust functions into the single calling convention scripts use:
//! dynamic [`yabre_core::Value`] arguments in, one value or an
//! [`crate::error::AdapterError`] out.

pub mod function;
pub mod value;

pub use function::{
    adapt, HostFunction, IntoHostFunction, SharedHostFunction, TypedHostFunction, Variadic,
};
pub use value::{extract, FromValue, IntoHostResult, IntoValue};
