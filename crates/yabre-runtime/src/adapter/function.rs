//! Host function shapes
//!
//! Every function exposed to scripts ends up as an `Arc<dyn HostFunction>`:
//! a call taking a slice of [`Value`]s and returning one value or an error.
//! Typed Rust functions are wrapped through [`TypedHostFunction`], which is
//! implemented for plain functions and closures of up to six parameters,
//! optionally followed by a trailing [`Variadic`] parameter.

use super::value::{extract, FromValue, IntoHostResult};
use crate::error::AdapterError;
use std::any::Any;
use std::marker::PhantomData;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use yabre_core::Value;

/// A function callable from scripts with dynamic arguments
pub trait HostFunction: Send + Sync {
    fn call(&self, args: &[Value]) -> Result<Value, AdapterError>;
}

impl<F> HostFunction for F
where
    F: Fn(&[Value]) -> Result<Value, AdapterError> + Send + Sync,
{
    fn call(&self, args: &[Value]) -> Result<Value, AdapterError> {
        self(args)
    }
}

/// Shared handle to a host function
pub type SharedHostFunction = Arc<dyn HostFunction>;

/// Trailing parameter collecting the remaining arguments
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Variadic<T>(pub Vec<T>);

impl<T> Variadic<T> {
    pub fn into_inner(self) -> Vec<T> {
        self.0
    }
}

impl<T> std::ops::Deref for Variadic<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.0
    }
}

/// A typed Rust function that can be called with dynamic arguments
///
/// `Marker` only disambiguates the implementations for different
/// signatures; callers never name it.
pub trait TypedHostFunction<Marker>: Send + Sync + 'static {
    fn invoke(&self, args: Vec<Value>) -> Result<Value, AdapterError>;
}

macro_rules! count_params {
    () => { 0usize };
    ($head:ident $($tail:ident)*) => { 1usize + count_params!($($tail)*) };
}

macro_rules! impl_typed_host_function {
    ($($param:ident),*) => {
        #[allow(non_snake_case, unused_mut, unused_variables)]
        impl<Func, Ret, $($param,)*> TypedHostFunction<fn($($param,)*) -> Ret> for Func
        where
            Func: Fn($($param),*) -> Ret + Send + Sync + 'static,
            Ret: IntoHostResult,
            $($param: FromValue,)*
        {
            fn invoke(&self, args: Vec<Value>) -> Result<Value, AdapterError> {
                let expected = count_params!($($param)*);
                if args.len() != expected {
                    return Err(AdapterError::ArgumentCount {
                        expected,
                        got: args.len(),
                    });
                }

                let mut args = args.into_iter();
                let mut position = 0;
                $(
                    position += 1;
                    let $param = extract::<$param>(args.next().unwrap_or_default(), position)?;
                )*

                (self)($($param),*).into_host_result()
            }
        }

        #[allow(non_snake_case, unused_mut, unused_variables)]
        impl<Func, Ret, Rest, $($param,)*> TypedHostFunction<(Variadic<Rest>, fn($($param,)*) -> Ret)> for Func
        where
            Func: Fn($($param,)* Variadic<Rest>) -> Ret + Send + Sync + 'static,
            Ret: IntoHostResult,
            Rest: FromValue,
            $($param: FromValue,)*
        {
            fn invoke(&self, args: Vec<Value>) -> Result<Value, AdapterError> {
                let minimum = count_params!($($param)*);
                if args.len() < minimum {
                    return Err(AdapterError::TooFewArguments {
                        minimum,
                        got: args.len(),
                    });
                }

                let mut args = args.into_iter();
                let mut position = 0;
                $(
                    position += 1;
                    let $param = extract::<$param>(args.next().unwrap_or_default(), position)?;
                )*

                let rest = args
                    .enumerate()
                    .map(|(i, value)| extract::<Rest>(value, position + i + 1))
                    .collect::<Result<Vec<_>, _>>()?;

                (self)($($param,)* Variadic(rest)).into_host_result()
            }
        }
    };
}

impl_typed_host_function!();
impl_typed_host_function!(A1);
impl_typed_host_function!(A1, A2);
impl_typed_host_function!(A1, A2, A3);
impl_typed_host_function!(A1, A2, A3, A4);
impl_typed_host_function!(A1, A2, A3, A4, A5);
impl_typed_host_function!(A1, A2, A3, A4, A5, A6);

/// A typed function wrapped into the uniform shape
struct Typed<F, Marker> {
    function: F,
    marker: PhantomData<fn() -> Marker>,
}

impl<F, Marker> HostFunction for Typed<F, Marker>
where
    F: TypedHostFunction<Marker>,
    Marker: 'static,
{
    fn call(&self, args: &[Value]) -> Result<Value, AdapterError> {
        catch_unwind(AssertUnwindSafe(|| self.function.invoke(args.to_vec())))
            .unwrap_or_else(|payload| Err(AdapterError::Panicked(panic_message(payload))))
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Marker for functions already in the uniform shape
pub struct UniformShape;

/// Marker for typed functions going through [`TypedHostFunction`]
pub struct TypedShape<Marker>(PhantomData<fn() -> Marker>);

/// Anything that can be turned into a [`SharedHostFunction`]
pub trait IntoHostFunction<Marker> {
    fn into_host_function(self) -> SharedHostFunction;
}

impl<F> IntoHostFunction<UniformShape> for F
where
    F: HostFunction + 'static,
{
    fn into_host_function(self) -> SharedHostFunction {
        Arc::new(self)
    }
}

impl<F, Marker> IntoHostFunction<TypedShape<Marker>> for F
where
    F: TypedHostFunction<Marker>,
    Marker: 'static,
{
    fn into_host_function(self) -> SharedHostFunction {
        Arc::new(Typed {
            function: self,
            marker: PhantomData,
        })
    }
}

/// Adapt a function to the uniform host-function shape
///
/// Functions that already take `&[Value]` and return
/// `Result<Value, AdapterError>` are used as they are. Typed functions get
/// arity checking, per-argument conversion, result mapping and panic
/// recovery.
///
/// ```
/// use yabre_core::Value;
/// use yabre_runtime::adapter::adapt;
///
/// let double = adapt(|x: i64| x * 2);
/// assert_eq!(double.call(&[Value::Int(21)]).unwrap(), Value::Int(42));
/// ```
pub fn adapt<F, Marker>(function: F) -> SharedHostFunction
where
    F: IntoHostFunction<Marker>,
{
    function.into_host_function()
}
