//! Conversions across the host/script boundary
//!
//! Host-function arguments and results use the explicit `Value` <-> `Dynamic`
//! mapping below. The execution context, an arbitrary serde type, goes
//! through `rhai::serde`.

use crate::error::BridgeError;
use rhai::{Array, Dynamic, Map};
use serde::de::DeserializeOwned;
use serde::Serialize;
use yabre_core::Value;

/// Serialize a context into a script value
pub fn context_to_dynamic<C: Serialize + ?Sized>(context: &C) -> Result<Dynamic, BridgeError> {
    rhai::serde::to_dynamic(context).map_err(|e| BridgeError::Context(e.to_string()))
}

/// Deserialize a context back out of a script value
///
/// A shared value is read through its current contents.
pub fn context_from_dynamic<C: DeserializeOwned>(value: &Dynamic) -> Result<C, BridgeError> {
    rhai::serde::from_dynamic(&value.flatten_clone())
        .map_err(|e| BridgeError::Context(e.to_string()))
}

pub fn value_to_dynamic(value: &Value) -> Dynamic {
    match value {
        Value::Null => Dynamic::UNIT,
        Value::Bool(b) => Dynamic::from_bool(*b),
        Value::Int(n) => Dynamic::from_int(*n),
        Value::Float(f) => Dynamic::from_float(*f),
        Value::String(s) => Dynamic::from(s.clone()),
        Value::Array(items) => {
            Dynamic::from_array(items.iter().map(value_to_dynamic).collect::<Array>())
        }
        Value::Object(map) => Dynamic::from_map(
            map.iter()
                .map(|(k, v)| (k.as_str().into(), value_to_dynamic(v)))
                .collect::<Map>(),
        ),
    }
}

/// Convert a script value to a `Value`
///
/// Types without a counterpart (function pointers, timestamps, custom
/// types) are passed as their display string.
pub fn dynamic_to_value(value: &Dynamic) -> Value {
    let value = value.flatten_clone();

    if value.is_unit() {
        return Value::Null;
    }
    if let Ok(b) = value.as_bool() {
        return Value::Bool(b);
    }
    if let Ok(n) = value.as_int() {
        return Value::Int(n);
    }
    if let Ok(f) = value.as_float() {
        return Value::Float(f);
    }
    if let Ok(c) = value.as_char() {
        return Value::String(c.to_string());
    }
    if value.is_string() {
        return Value::String(value.to_string());
    }
    if value.is_array() {
        return match value.into_array() {
            Ok(items) => Value::Array(items.iter().map(dynamic_to_value).collect()),
            Err(_) => Value::Null,
        };
    }
    if let Some(map) = value.clone().try_cast::<Map>() {
        return Value::Object(
            map.iter()
                .map(|(k, v)| (k.to_string(), dynamic_to_value(v)))
                .collect(),
        );
    }
    Value::String(value.to_string())
}

/// Truthiness of a check result
///
/// Booleans are used as-is, `()` is false, numbers are true when non-zero,
/// strings when non-empty; any other value is true.
pub fn is_truthy(value: &Dynamic) -> bool {
    let value = value.flatten_clone();
    if let Ok(b) = value.as_bool() {
        return b;
    }
    if value.is_unit() {
        return false;
    }
    if let Ok(n) = value.as_int() {
        return n != 0;
    }
    if let Ok(f) = value.as_float() {
        return f != 0.0;
    }
    if value.is_string() {
        return !value.to_string().is_empty();
    }
    true
}
