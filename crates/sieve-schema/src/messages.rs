//! # Message Catalogue
//!
//! Human-readable text for tracked errors and pipeline steps. Rendering
//! is advisory: validation never depends on it.
//!
//! ## Templates
//!
//! Error templates interpolate `{name}` from the error's arguments.
//! Step descriptions interpolate positional arguments as `{0}`, `{1}`, …
//! and all of them, comma-separated, as `{args}`. Names without a value
//! are left in place. String values render without quotes in messages
//! and with quotes in descriptions; references render as `ref(a.b)`.
//!
//! ## Overlays
//!
//! A YAML overlay with `messages:` and `descriptions:` maps replaces
//! individual entries of the standard catalogue:
//!
//! ```yaml
//! messages:
//!   generic/required: "must be filled in"
//! ```

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sieve_chain::{Arg, Chain, ChainKind, DefaultValue};
use sieve_core::{FieldError, TrackedError};

use crate::error::SchemaDocError;
use crate::source::{self, Format};

const STANDARD_MESSAGES: &[(&str, &str)] = &[
    ("generic/required", "is required"),
    ("generic/forbidden", "is not allowed"),
    ("generic/equals", "must equal {expected}"),
    ("generic/one-of", "must be one of {allowed}"),
    ("generic/failed", "was rejected by {processor}"),
    ("string/type", "must be a string"),
    ("string/not-empty", "must not be empty"),
    ("string/min-length", "must be at least {min} characters long (got {actual})"),
    ("string/max-length", "must be at most {max} characters long (got {actual})"),
    ("number/type", "must be a number"),
    ("number/format", "is not a number"),
    ("number/min", "must be at least {min}"),
    ("number/max", "must be at most {max}"),
    ("number/integer", "must be a whole number"),
    ("boolean/type", "must be true or false"),
    ("boolean/format", "is not a recognised yes/no value"),
    ("date/type", "must be a date (YYYY-MM-DD)"),
    ("date/format", "does not match the date format {format}"),
    ("date/min", "must be on or after {min}"),
    ("date/max", "must be on or before {max}"),
    ("array/type", "must be a list"),
    ("array/min-items", "must have at least {min} items (got {actual})"),
    ("array/max-items", "must have at most {max} items (got {actual})"),
    ("array/unique", "contains {duplicate} more than once"),
    ("array/items", "has invalid items at {indexes}"),
    ("object/type", "must be an object"),
    ("object/members", "has invalid fields: {fields}"),
    ("object/unknown-keys", "has unknown keys: {keys}"),
    ("object/schedule", "could not be processed: {reason}"),
];

const STANDARD_DESCRIPTIONS: &[(&str, &str)] = &[
    ("equals", "equals {0}"),
    ("one-of", "one of {args}"),
    ("string/trim", "trim surrounding whitespace"),
    ("string/lowercase", "convert to lower case"),
    ("string/uppercase", "convert to upper case"),
    ("string/not-empty", "not empty"),
    ("string/min-length", "at least {0} characters"),
    ("string/max-length", "at most {0} characters"),
    ("number/parse", "parse numeric text"),
    ("number/min", "at least {0}"),
    ("number/max", "at most {0}"),
    ("number/integer", "whole number"),
    ("boolean/parse", "parse yes/no text"),
    ("date/parse", "parse date {args}"),
    ("date/min", "on or after {0}"),
    ("date/max", "on or before {0}"),
    ("array/min-items", "at least {0} items"),
    ("array/max-items", "at most {0} items"),
    ("array/unique", "no duplicates"),
];

/// Error messages and step descriptions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MessageCatalogue {
    /// Error key → message template.
    #[serde(default)]
    pub messages: IndexMap<String, String>,
    /// Processor key → description template.
    #[serde(default)]
    pub descriptions: IndexMap<String, String>,
}

impl MessageCatalogue {
    /// English text for every standard error key and processor.
    pub fn standard() -> Self {
        fn owned(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        }
        Self {
            messages: owned(STANDARD_MESSAGES),
            descriptions: owned(STANDARD_DESCRIPTIONS),
        }
    }

    /// Parse an overlay from YAML.
    pub fn from_yaml_str(content: &str) -> Result<Self, SchemaDocError> {
        source::parse_str(content, Format::Yaml, "message catalogue")
    }

    /// Read an overlay file.
    pub fn from_path(path: &Path) -> Result<Self, SchemaDocError> {
        source::read_path(path)
    }

    /// Replace entries with those of `overlay`.
    pub fn overlay(mut self, overlay: MessageCatalogue) -> Self {
        self.messages.extend(overlay.messages);
        self.descriptions.extend(overlay.descriptions);
        self
    }

    /// The message for `error`, or its key when no template exists.
    pub fn render(&self, error: &TrackedError) -> String {
        match self.messages.get(&error.key) {
            Some(template) => interpolate(template, |name| error.args.get(name).map(message_value)),
            None => error.key.clone(),
        }
    }

    /// `path: message`, with `value` standing in for the root.
    pub fn render_field(&self, error: &FieldError) -> String {
        let path = if error.path.is_empty() { "value" } else { error.path.as_str() };
        format!("{path}: {}", self.render(&error.error))
    }

    /// One line per entity and pipeline step, recursing into items and
    /// fields.
    pub fn describe(&self, chain: &Chain) -> Vec<String> {
        let mut lines = Vec::new();
        self.describe_into(chain, "value", 0, &mut lines);
        lines
    }

    fn describe_into(&self, chain: &Chain, name: &str, depth: usize, out: &mut Vec<String>) {
        let indent = "  ".repeat(depth);
        let props = chain.props();

        let mut header = match chain.kind() {
            ChainKind::Reference(path) => format!("{indent}{name}: {path}"),
            _ => format!("{indent}{name}: {}", chain.tag()),
        };
        if let Some(label) = &props.label {
            header.push_str(&format!(" \"{label}\""));
        }
        if props.required {
            header.push_str(", required");
        }
        if props.forbidden {
            header.push_str(", forbidden");
        }
        match &props.default {
            Some(DefaultValue::Literal(v)) => header.push_str(&format!(", default {v}")),
            Some(DefaultValue::Ref(path)) => header.push_str(&format!(", default {path}")),
            None => {}
        }
        if let Some(format) = &props.output_format {
            header.push_str(&format!(", output {format}"));
        }
        out.push(header);

        for step in chain.pipeline() {
            let args: Vec<String> = step.args().iter().map(describe_arg).collect();
            let line = match self.descriptions.get(step.key()) {
                Some(template) => interpolate(template, |name| match name {
                    "args" => Some(args.join(", ")),
                    _ => name.parse::<usize>().ok().and_then(|i| args.get(i).cloned()),
                }),
                None if args.is_empty() => step.key().to_string(),
                None => format!("{} {}", step.key(), args.join(", ")),
            };
            out.push(format!("{indent}  - {}", line.trim_end()));
        }

        match chain.kind() {
            ChainKind::Array { items: Some(item) } => {
                self.describe_into(item, "[]", depth + 1, out);
            }
            ChainKind::Object { fields } => {
                for (field, member) in fields {
                    self.describe_into(member, field, depth + 1, out);
                }
            }
            _ => {}
        }
    }
}

fn describe_arg(arg: &Arg) -> String {
    match arg {
        Arg::Literal(v) => v.to_string(),
        Arg::Ref(path) => path.to_string(),
    }
}

fn message_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(message_value).collect::<Vec<_>>().join(", "),
        other => other.to_string(),
    }
}

/// Replace `{name}` placeholders using `lookup`.
fn interpolate(template: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let name = &after[..close];
                match lookup(name) {
                    Some(value) => out.push_str(&value),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sieve_chain::{ChainBuilder, Schema};
    use sieve_core::PathRef;

    #[test]
    fn test_render_interpolates_args() {
        let catalogue = MessageCatalogue::standard();
        let err = TrackedError::new("string/min-length").with_arg("min", 8).with_arg("actual", 5);
        assert_eq!(catalogue.render(&err), "must be at least 8 characters long (got 5)");

        let err = TrackedError::new("generic/one-of").with_arg("allowed", json!(["a", "b"]));
        assert_eq!(catalogue.render(&err), "must be one of a, b");
    }

    #[test]
    fn test_render_falls_back_to_key() {
        let catalogue = MessageCatalogue::standard();
        assert_eq!(catalogue.render(&TrackedError::new("custom/odd")), "custom/odd");
    }

    #[test]
    fn test_missing_arg_left_in_place() {
        let catalogue = MessageCatalogue::standard();
        assert_eq!(catalogue.render(&TrackedError::new("number/min")), "must be at least {min}");
    }

    #[test]
    fn test_overlay_replaces_entries() {
        let overlay = MessageCatalogue::from_yaml_str(
            "messages:\n  generic/required: must be filled in\n\
             descriptions:\n  equals: same as {0}\n",
        )
        .unwrap();
        let catalogue = MessageCatalogue::standard().overlay(overlay);
        assert_eq!(catalogue.render(&TrackedError::new("generic/required")), "must be filled in");
        assert_eq!(catalogue.render(&TrackedError::new("generic/forbidden")), "is not allowed");
        assert_eq!(catalogue.descriptions["equals"], "same as {0}");
    }

    #[test]
    fn test_overlay_rejects_unknown_sections() {
        assert!(MessageCatalogue::from_yaml_str("mesages: {}\n").is_err());
    }

    #[test]
    fn test_render_field_paths() {
        let catalogue = MessageCatalogue::standard();
        let root = FieldError {
            path: String::new(),
            error: TrackedError::new("object/type"),
        };
        let nested = FieldError {
            path: "user.age".into(),
            error: TrackedError::new("number/type"),
        };
        assert_eq!(catalogue.render_field(&root), "value: must be an object");
        assert_eq!(catalogue.render_field(&nested), "user.age: must be a number");
    }

    #[test]
    fn test_describe_recurses() {
        let schema = Schema::standard();
        let chain = schema
            .object()
            .field("password", schema.string().required().min_length(8).unwrap())
            .field("confirm", schema.string().equals(PathRef::parse("password")).unwrap())
            .field("tags", schema.array().items(schema.string().trim().unwrap()))
            .field("born", schema.date().parse().unwrap().output_format("%d/%m/%Y"))
            .field("copy", PathRef::parse("password"));
        let lines = MessageCatalogue::standard().describe(chain.chain());
        assert_eq!(
            lines,
            [
                "value: object",
                "  password: string, required",
                "    - at least 8 characters",
                "  confirm: string",
                "    - equals ref(password)",
                "  tags: array",
                "    []: string",
                "      - trim surrounding whitespace",
                "  born: date, output %d/%m/%Y",
                "    - parse date",
                "  copy: ref(password)",
            ]
        );
    }

    #[test]
    fn test_describe_unknown_processor_uses_key() {
        let mut registry = sieve_chain::ProcessorRegistry::standard();
        registry.register("custom/odd", |v, _| sieve_core::StepResult::pass(v.clone()));
        let schema = Schema::new(registry, Default::default());
        let chain = schema.number().step("custom/odd", vec![Arg::from(3)]).unwrap();
        let lines = MessageCatalogue::standard().describe(chain.chain());
        assert_eq!(lines[1], "  - custom/odd 3");
    }

    #[test]
    fn test_interpolate_unbalanced_brace() {
        assert_eq!(interpolate("a {b", |_| Some("x".into())), "a {b");
    }
}
