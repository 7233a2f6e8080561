//! Boolean processors.

use serde_json::{Map, Value};
use sieve_core::StepResult;

use super::failure;
use crate::processor::ProcessorRegistry;

/// Register the `boolean/*` processors.
pub fn register(registry: &mut ProcessorRegistry) {
    registry.register_format("boolean/parse", parse);
}

/// Interpret common textual and numeric spellings of a boolean.
pub fn parse_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Format step: textual booleans become `true`/`false`.
pub fn parse(value: &Value, _args: &[Option<Value>]) -> StepResult {
    match parse_bool(value) {
        Some(b) => StepResult::transform(Value::Bool(b)),
        None => failure(value, "boolean/format", Map::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_spellings() {
        assert_eq!(parse(&json!("Yes"), &[]).value, json!(true));
        assert_eq!(parse(&json!(" off "), &[]).value, json!(false));
        assert_eq!(parse(&json!(1), &[]).value, json!(true));
        assert_eq!(parse(&json!(false), &[]).value, json!(false));
    }

    #[test]
    fn test_parse_rejects_other_values() {
        assert_eq!(parse(&json!("maybe"), &[]).errors[0].key, "boolean/format");
        assert_eq!(parse(&json!(2), &[]).errors[0].key, "boolean/format");
    }
}
