//! # Standard Processors
//!
//! The processors registered by [`ProcessorRegistry::standard`]. Each
//! submodule covers one value family and exposes a `register` function.
//!
//! Bounds passed as arguments may be path references. When a bound
//! resolves to nothing the comparison passes: an unresolved reference is
//! not an error by itself.
//!
//! [`ProcessorRegistry::standard`]: crate::ProcessorRegistry::standard

use serde_json::{Map, Value};
use sieve_core::{StepResult, TrackedError};

use crate::processor::ProcessorRegistry;

pub mod array;
pub mod boolean;
pub mod common;
pub mod date;
pub mod number;
pub mod string;

/// Register every standard processor.
pub fn register_standard(registry: &mut ProcessorRegistry) {
    common::register(registry);
    string::register(registry);
    number::register(registry);
    boolean::register(registry);
    date::register(registry);
    array::register(registry);
}

/// Positional argument `i`, if supplied and resolved.
pub(crate) fn arg(args: &[Option<Value>], i: usize) -> Option<&Value> {
    args.get(i).and_then(Option::as_ref)
}

/// Positional argument `i` as a number.
pub(crate) fn arg_f64(args: &[Option<Value>], i: usize) -> Option<f64> {
    arg(args, i).and_then(Value::as_f64)
}

/// A failed result carrying one error with the given arguments.
pub(crate) fn failure(value: &Value, key: &str, args: Map<String, Value>) -> StepResult {
    StepResult::fail(
        value.clone(),
        TrackedError {
            key: key.to_string(),
            args,
        },
    )
}

/// Build an argument map from name/value pairs.
pub(crate) fn args_of<const N: usize>(pairs: [(&str, Value); N]) -> Map<String, Value> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}
