//! Number processors.

use serde_json::{Map, Number, Value};
use sieve_core::StepResult;

use super::{arg, arg_f64, args_of, failure};
use crate::processor::ProcessorRegistry;

/// Register the `number/*` processors.
pub fn register(registry: &mut ProcessorRegistry) {
    registry.register_format("number/parse", parse);
    registry.register("number/min", min);
    registry.register("number/max", max);
    registry.register("number/integer", integer);
}

/// Parse a decimal string such as `" 42 "` or `"-1.5"` into a number.
///
/// Returns `None` for anything that is not a finite number.
pub fn parse_number(input: &str) -> Option<Number> {
    let trimmed = input.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return Some(Number::from(i));
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .and_then(Number::from_f64)
}

/// Format step: numeric strings become numbers; numbers pass through.
pub fn parse(value: &Value, _args: &[Option<Value>]) -> StepResult {
    match value {
        Value::Number(_) => StepResult::pass(value.clone()),
        Value::String(s) => match parse_number(s) {
            Some(n) => StepResult::transform(Value::Number(n)),
            None => failure(value, "number/format", Map::new()),
        },
        _ => failure(value, "number/format", Map::new()),
    }
}

/// Requires `value >= args[0]`.
pub fn min(value: &Value, args: &[Option<Value>]) -> StepResult {
    compare(value, args, "number/min", "min", |v, bound| v >= bound)
}

/// Requires `value <= args[0]`.
pub fn max(value: &Value, args: &[Option<Value>]) -> StepResult {
    compare(value, args, "number/max", "max", |v, bound| v <= bound)
}

fn compare(
    value: &Value,
    args: &[Option<Value>],
    key: &str,
    bound_name: &str,
    ok: impl Fn(f64, f64) -> bool,
) -> StepResult {
    let Some(v) = value.as_f64() else {
        return failure(value, "number/type", Map::new());
    };
    match (arg_f64(args, 0), arg(args, 0)) {
        (Some(bound), Some(raw)) if !ok(v, bound) => {
            failure(value, key, args_of([(bound_name, raw.clone())]))
        }
        _ => StepResult::pass(value.clone()),
    }
}

/// Rejects numbers with a fractional part.
pub fn integer(value: &Value, _args: &[Option<Value>]) -> StepResult {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => StepResult::pass(value.clone()),
        Value::Number(n) if n.as_f64().is_some_and(|f| f.fract() == 0.0) => {
            StepResult::pass(value.clone())
        }
        Value::Number(_) => failure(value, "number/integer", Map::new()),
        _ => failure(value, "number/type", Map::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_strings() {
        assert_eq!(parse(&json!(" 42 "), &[]).value, json!(42));
        assert_eq!(parse(&json!("-1.5"), &[]).value, json!(-1.5));
        assert_eq!(parse(&json!(7), &[]).value, json!(7));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in [json!("12abc"), json!("NaN"), json!("inf"), json!(true)] {
            let r = parse(&bad, &[]);
            assert_eq!(r.errors[0].key, "number/format", "input {bad}");
            assert_eq!(r.value, bad);
        }
    }

    #[test]
    fn test_min_max() {
        assert!(!min(&json!(5), &[Some(json!(5))]).is_failure());
        let r = min(&json!(4), &[Some(json!(5))]);
        assert_eq!(r.errors[0].key, "number/min");
        assert_eq!(r.errors[0].args["min"], json!(5));
        assert!(max(&json!(6), &[Some(json!(5))]).is_failure());
        assert!(!max(&json!(6), &[None]).is_failure());
    }

    #[test]
    fn test_integer() {
        assert!(!integer(&json!(3), &[]).is_failure());
        assert!(!integer(&json!(3.0), &[]).is_failure());
        assert_eq!(integer(&json!(3.5), &[]).errors[0].key, "number/integer");
    }
}
