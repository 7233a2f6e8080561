//! Date processors.
//!
//! Dates are carried through a pipeline as ISO `YYYY-MM-DD` strings. The
//! `date/parse` format step turns other spellings into that canonical
//! form; comparisons parse both sides on demand.

use std::fmt::Write;

use chrono::{DateTime, NaiveDate};
use serde_json::{Map, Value};
use sieve_core::StepResult;

use super::{arg, args_of, failure};
use crate::processor::ProcessorRegistry;

/// Canonical date representation inside pipelines.
pub const ISO_DATE: &str = "%Y-%m-%d";

/// Register the `date/*` processors.
pub fn register(registry: &mut ProcessorRegistry) {
    registry.register_format("date/parse", parse);
    registry.register("date/min", min);
    registry.register("date/max", max);
}

/// Parse a canonical ISO date value.
pub fn parse_iso_date(value: &Value) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.as_str()?, ISO_DATE).ok()
}

/// Render a date with a `strftime`-style format.
///
/// Returns `None` if the format string contains an invalid specifier.
pub fn format_date(date: NaiveDate, format: &str) -> Option<String> {
    let mut out = String::new();
    write!(out, "{}", date.format(format)).ok()?;
    Some(out)
}

/// Format step: parse with `args[0]` (default ISO), falling back to
/// RFC 3339 timestamps, and emit the ISO date.
pub fn parse(value: &Value, args: &[Option<Value>]) -> StepResult {
    let format = arg(args, 0).and_then(Value::as_str).unwrap_or(ISO_DATE);
    let parsed = value.as_str().and_then(|s| {
        let s = s.trim();
        NaiveDate::parse_from_str(s, format)
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
    });
    match parsed.and_then(|d| format_date(d, ISO_DATE)) {
        Some(iso) => StepResult::transform(Value::String(iso)),
        None => failure(value, "date/format", args_of([("format", Value::from(format))])),
    }
}

/// Requires the date to be on or after `args[0]`.
pub fn min(value: &Value, args: &[Option<Value>]) -> StepResult {
    compare(value, args, "date/min", "min", |d, bound| d >= bound)
}

/// Requires the date to be on or before `args[0]`.
pub fn max(value: &Value, args: &[Option<Value>]) -> StepResult {
    compare(value, args, "date/max", "max", |d, bound| d <= bound)
}

fn compare(
    value: &Value,
    args: &[Option<Value>],
    key: &str,
    bound_name: &str,
    ok: impl Fn(NaiveDate, NaiveDate) -> bool,
) -> StepResult {
    let Some(date) = parse_iso_date(value) else {
        return failure(value, "date/type", Map::new());
    };
    match arg(args, 0).and_then(|raw| Some((raw, parse_iso_date(raw)?))) {
        Some((raw, bound)) if !ok(date, bound) => {
            failure(value, key, args_of([(bound_name, raw.clone())]))
        }
        _ => StepResult::pass(value.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_default_iso() {
        assert_eq!(parse(&json!("2024-02-29"), &[]).value, json!("2024-02-29"));
        assert!(parse(&json!("2023-02-29"), &[]).is_failure());
    }

    #[test]
    fn test_parse_custom_format() {
        let r = parse(&json!("31/12/2024"), &[Some(json!("%d/%m/%Y"))]);
        assert_eq!(r.value, json!("2024-12-31"));
    }

    #[test]
    fn test_parse_rfc3339_fallback() {
        let r = parse(&json!("2024-05-01T10:00:00Z"), &[]);
        assert_eq!(r.value, json!("2024-05-01"));
    }

    #[test]
    fn test_parse_failure_reports_format() {
        let r = parse(&json!("yesterday"), &[]);
        assert_eq!(r.errors[0].key, "date/format");
        assert_eq!(r.errors[0].args["format"], json!("%Y-%m-%d"));
    }

    #[test]
    fn test_min_max() {
        assert!(!min(&json!("2024-01-02"), &[Some(json!("2024-01-01"))]).is_failure());
        let r = min(&json!("2023-12-31"), &[Some(json!("2024-01-01"))]);
        assert_eq!(r.errors[0].key, "date/min");
        assert!(max(&json!("2024-01-02"), &[Some(json!("2024-01-01"))]).is_failure());
        assert!(!max(&json!("2024-01-02"), &[None]).is_failure());
    }

    #[test]
    fn test_format_date_rejects_bad_specifier() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(format_date(d, "%d.%m.%Y").as_deref(), Some("02.01.2024"));
        assert_eq!(format_date(d, "%Q"), None);
    }
}
