//! Argument decoding and result encoding for typed host functions

use crate::error::AdapterError;
use std::collections::HashMap;
use yabre_core::Value;

/// A parameter type a host function can receive
///
/// `Null` always decodes to [`FromValue::zero`]; any other value goes
/// through [`FromValue::coerce`], which returns `None` on a type mismatch.
pub trait FromValue: Sized {
    /// Type name used in mismatch messages
    const EXPECTED: &'static str;

    /// Value used when the argument is `Null`
    fn zero() -> Self;

    /// Convert a non-null value
    fn coerce(value: Value) -> Option<Self>;
}

/// Decode the argument at 1-based `position`
pub fn extract<T: FromValue>(value: Value, position: usize) -> Result<T, AdapterError> {
    if value.is_null() {
        return Ok(T::zero());
    }

    let actual = value.kind().name();
    T::coerce(value).ok_or(AdapterError::TypeMismatch {
        position,
        expected: T::EXPECTED,
        actual,
    })
}

fn coerce_or_zero<T: FromValue>(value: Value) -> Option<T> {
    if value.is_null() {
        Some(T::zero())
    } else {
        T::coerce(value)
    }
}

macro_rules! impl_from_value_int {
    ($($ty:ty),*) => {
        $(
            impl FromValue for $ty {
                const EXPECTED: &'static str = "int";

                fn zero() -> Self {
                    0
                }

                fn coerce(value: Value) -> Option<Self> {
                    match value {
                        Value::Int(n) => Some(n as $ty),
                        Value::Float(f) => Some(f as $ty),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_from_value_int!(i64, i32, i16, i8, u64, u32, u16, u8, usize, isize);

macro_rules! impl_from_value_float {
    ($($ty:ty),*) => {
        $(
            impl FromValue for $ty {
                const EXPECTED: &'static str = "float";

                fn zero() -> Self {
                    0.0
                }

                fn coerce(value: Value) -> Option<Self> {
                    match value {
                        Value::Int(n) => Some(n as $ty),
                        Value::Float(f) => Some(f as $ty),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_from_value_float!(f64, f32);

impl FromValue for bool {
    const EXPECTED: &'static str = "bool";

    fn zero() -> Self {
        false
    }

    fn coerce(value: Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FromValue for String {
    const EXPECTED: &'static str = "string";

    fn zero() -> Self {
        String::new()
    }

    fn coerce(value: Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl FromValue for Value {
    const EXPECTED: &'static str = "any";

    fn zero() -> Self {
        Value::Null
    }

    fn coerce(value: Value) -> Option<Self> {
        Some(value)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    const EXPECTED: &'static str = T::EXPECTED;

    fn zero() -> Self {
        None
    }

    fn coerce(value: Value) -> Option<Self> {
        T::coerce(value).map(Some)
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    const EXPECTED: &'static str = "array";

    fn zero() -> Self {
        Vec::new()
    }

    fn coerce(value: Value) -> Option<Self> {
        match value {
            Value::Array(items) => items.into_iter().map(coerce_or_zero).collect(),
            _ => None,
        }
    }
}

impl<T: FromValue> FromValue for HashMap<String, T> {
    const EXPECTED: &'static str = "object";

    fn zero() -> Self {
        HashMap::new()
    }

    fn coerce(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => map
                .into_iter()
                .map(|(k, v)| coerce_or_zero(v).map(|v| (k, v)))
                .collect(),
            _ => None,
        }
    }
}

/// A type a host function can return
pub trait IntoValue {
    fn into_value(self) -> Value;
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

macro_rules! impl_into_value_int {
    ($($ty:ty),*) => {
        $(
            impl IntoValue for $ty {
                fn into_value(self) -> Value {
                    Value::Int(self as i64)
                }
            }
        )*
    };
}

impl_into_value_int!(i64, i32, i16, i8, u32, u16, u8);

// may not fit in i64
impl IntoValue for u64 {
    fn into_value(self) -> Value {
        i64::try_from(self).map_or(Value::Float(self as f64), Value::Int)
    }
}

impl IntoValue for usize {
    fn into_value(self) -> Value {
        (self as u64).into_value()
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> Value {
        Value::Float(self)
    }
}

impl IntoValue for f32 {
    fn into_value(self) -> Value {
        Value::Float(self as f64)
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::String(self)
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::String(self.to_string())
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        self.map_or(Value::Null, IntoValue::into_value)
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    fn into_value(self) -> Value {
        Value::Array(self.into_iter().map(IntoValue::into_value).collect())
    }
}

impl<T: IntoValue> IntoValue for HashMap<String, T> {
    fn into_value(self) -> Value {
        Value::Object(self.into_iter().map(|(k, v)| (k, v.into_value())).collect())
    }
}

/// How a host function's return maps onto `Result<Value, AdapterError>`
///
/// A plain value is a success, `Result<T, E>` forwards its error, and `()`
/// is rejected at call time since the script expects a result.
pub trait IntoHostResult {
    fn into_host_result(self) -> Result<Value, AdapterError>;
}

impl<T: IntoValue> IntoHostResult for T {
    fn into_host_result(self) -> Result<Value, AdapterError> {
        Ok(self.into_value())
    }
}

impl<T, E> IntoHostResult for Result<T, E>
where
    T: IntoValue,
    E: Into<anyhow::Error>,
{
    fn into_host_result(self) -> Result<Value, AdapterError> {
        self.map(IntoValue::into_value)
            .map_err(|e| AdapterError::Failed(e.into()))
    }
}

impl IntoHostResult for () {
    fn into_host_result(self) -> Result<Value, AdapterError> {
        Err(AdapterError::NoResult)
    }
}
