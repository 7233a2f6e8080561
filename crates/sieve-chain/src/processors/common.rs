//! Kind-independent processors: equality and enumerations.

use serde_json::{Map, Value};
use sieve_core::StepResult;

use super::{arg, args_of, failure};
use crate::processor::ProcessorRegistry;

/// Register `equals` and `one-of`.
pub fn register(registry: &mut ProcessorRegistry) {
    registry.register("equals", equals);
    registry.register("one-of", one_of);
}

/// Passes when the value equals the first argument.
pub fn equals(value: &Value, args: &[Option<Value>]) -> StepResult {
    match arg(args, 0) {
        Some(expected) if expected != value => {
            failure(value, "generic/equals", args_of([("expected", expected.clone())]))
        }
        _ => StepResult::pass(value.clone()),
    }
}

/// Passes when the value is one of the allowed values.
///
/// A single array argument is taken as the list of allowed values;
/// otherwise every resolved argument is one allowed value.
pub fn one_of(value: &Value, args: &[Option<Value>]) -> StepResult {
    let allowed: Vec<Value> = match args {
        [Some(Value::Array(items))] => items.clone(),
        _ => args.iter().flatten().cloned().collect(),
    };
    if allowed.is_empty() || allowed.contains(value) {
        StepResult::pass(value.clone())
    } else {
        let mut details = Map::new();
        details.insert("allowed".into(), Value::Array(allowed));
        failure(value, "generic/one-of", details)
    }
}
