//! Array processors.

use serde_json::{json, Map, Value};
use sieve_core::StepResult;

use super::{arg, arg_f64, args_of, failure};
use crate::processor::ProcessorRegistry;

/// Register the `array/*` processors.
pub fn register(registry: &mut ProcessorRegistry) {
    registry.register("array/min-items", min_items);
    registry.register("array/max-items", max_items);
    registry.register("array/unique", unique);
}

/// Requires at least `args[0]` items.
pub fn min_items(value: &Value, args: &[Option<Value>]) -> StepResult {
    count(value, args, "array/min-items", "min", |n, bound| n >= bound)
}

/// Allows at most `args[0]` items.
pub fn max_items(value: &Value, args: &[Option<Value>]) -> StepResult {
    count(value, args, "array/max-items", "max", |n, bound| n <= bound)
}

fn count(
    value: &Value,
    args: &[Option<Value>],
    key: &str,
    bound_name: &str,
    ok: impl Fn(f64, f64) -> bool,
) -> StepResult {
    let Some(items) = value.as_array() else {
        return failure(value, "array/type", Map::new());
    };
    match (arg_f64(args, 0), arg(args, 0)) {
        (Some(bound), Some(raw)) if !ok(items.len() as f64, bound) => failure(
            value,
            key,
            args_of([(bound_name, raw.clone()), ("actual", json!(items.len()))]),
        ),
        _ => StepResult::pass(value.clone()),
    }
}

/// Rejects arrays containing the same value twice.
pub fn unique(value: &Value, _args: &[Option<Value>]) -> StepResult {
    let Some(items) = value.as_array() else {
        return failure(value, "array/type", Map::new());
    };
    let duplicate = items
        .iter()
        .enumerate()
        .find(|(i, item)| items[..*i].contains(item))
        .map(|(_, item)| item.clone());
    match duplicate {
        Some(dup) => failure(value, "array/unique", args_of([("duplicate", dup)])),
        None => StepResult::pass(value.clone()),
    }
}
