//! String processors. Lengths are counted in characters, not bytes.

use serde_json::{json, Map, Value};
use sieve_core::StepResult;

use super::{arg, arg_f64, args_of, failure};
use crate::processor::ProcessorRegistry;

/// Register the `string/*` processors.
pub fn register(registry: &mut ProcessorRegistry) {
    registry.register("string/trim", |v, _| map_str(v, |s| s.trim().to_string()));
    registry.register("string/lowercase", |v, _| map_str(v, str::to_lowercase));
    registry.register("string/uppercase", |v, _| map_str(v, str::to_uppercase));
    registry.register("string/not-empty", not_empty);
    registry.register("string/min-length", min_length);
    registry.register("string/max-length", max_length);
}

fn map_str(value: &Value, f: impl Fn(&str) -> String) -> StepResult {
    match value.as_str() {
        Some(s) => StepResult::transform(Value::String(f(s))),
        None => failure(value, "string/type", Map::new()),
    }
}

/// Rejects the empty string.
pub fn not_empty(value: &Value, _args: &[Option<Value>]) -> StepResult {
    match value.as_str() {
        Some("") => failure(value, "string/not-empty", Map::new()),
        Some(_) => StepResult::pass(value.clone()),
        None => failure(value, "string/type", Map::new()),
    }
}

/// Requires at least `args[0]` characters.
pub fn min_length(value: &Value, args: &[Option<Value>]) -> StepResult {
    check_length(value, args, "string/min-length", "min", |len, bound| len >= bound)
}

/// Allows at most `args[0]` characters.
pub fn max_length(value: &Value, args: &[Option<Value>]) -> StepResult {
    check_length(value, args, "string/max-length", "max", |len, bound| len <= bound)
}

fn check_length(
    value: &Value,
    args: &[Option<Value>],
    key: &str,
    bound_name: &str,
    ok: impl Fn(f64, f64) -> bool,
) -> StepResult {
    let Some(s) = value.as_str() else {
        return failure(value, "string/type", Map::new());
    };
    let Some(bound) = arg_f64(args, 0) else {
        return StepResult::pass(value.clone());
    };
    let len = s.chars().count();
    if ok(len as f64, bound) {
        StepResult::pass(value.clone())
    } else {
        let bound_value = arg(args, 0).cloned().unwrap_or(Value::Null);
        failure(value, key, args_of([(bound_name, bound_value), ("actual", json!(len))]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_length_counts_chars() {
        assert!(!min_length(&json!("héé"), &[Some(json!(3))]).is_failure());
        let r = min_length(&json!("ab"), &[Some(json!(3))]);
        assert_eq!(r.errors[0].key, "string/min-length");
        assert_eq!(r.errors[0].args["min"], json!(3));
        assert_eq!(r.errors[0].args["actual"], json!(2));
    }

    #[test]
    fn test_max_length() {
        assert!(max_length(&json!("abcd"), &[Some(json!(3))]).is_failure());
        assert!(!max_length(&json!("abc"), &[Some(json!(3))]).is_failure());
    }

    #[test]
    fn test_unresolved_bound_passes() {
        assert!(!min_length(&json!(""), &[None]).is_failure());
    }

    #[test]
    fn test_non_string_is_type_error() {
        let r = not_empty(&json!(5), &[]);
        assert_eq!(r.errors[0].key, "string/type");
    }

    #[test]
    fn test_transforms() {
        let mut registry = ProcessorRegistry::new();
        register(&mut registry);
        let trim = registry.get("string/trim").unwrap();
        assert_eq!(trim.call(&json!("  x "), &[]).value, json!("x"));
        let upper = registry.get("string/uppercase").unwrap();
        assert_eq!(upper.call(&json!("ab"), &[]).value, json!("AB"));
    }
}
