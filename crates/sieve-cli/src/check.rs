//! # `sieve check` — Validate and Transform an Input Document
//!
//! Compiles a schema document with the standard mapper, processes one
//! input document and renders the outcome as text or JSON.
//!
//! ## Exit Status
//!
//! `0` when the input is valid, `1` when it carries data errors. Schema
//! and I/O failures surface as `anyhow` errors.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, ValueEnum};
use serde::Serialize;
use serde_json::Value;
use sieve_core::FieldError;
use sieve_engine::Processed;
use sieve_schema::{MessageCatalogue, SchemaDocument};

/// Arguments for `sieve check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Schema document (YAML, or JSON with a `.json` extension).
    #[arg(long)]
    pub schema: PathBuf,

    /// Input document to process.
    #[arg(long)]
    pub input: PathBuf,

    /// Message catalogue overlay applied over the standard messages.
    #[arg(long)]
    pub messages: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// How `check` renders its outcome.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Transformed value when valid, one `path: message` line per error
    /// otherwise.
    Text,
    /// The full report with rendered messages.
    Json,
}

/// Rendered result of one check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub valid: bool,
    pub output: String,
}

#[derive(Serialize)]
struct RenderedError<'a> {
    #[serde(flatten)]
    error: &'a FieldError,
    message: String,
}

#[derive(Serialize)]
struct RenderedReport<'a> {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<&'a Value>,
    errors: Vec<RenderedError<'a>>,
}

/// Execute the check subcommand.
pub fn run_check(args: &CheckArgs) -> anyhow::Result<CheckOutcome> {
    let document = SchemaDocument::from_path(&args.schema)
        .with_context(|| format!("loading schema {}", args.schema.display()))?;
    let input: Value = sieve_schema::read_path(&args.input)
        .with_context(|| format!("loading input {}", args.input.display()))?;
    let catalogue = crate::load_catalogue(args.messages.as_deref())?;

    let processed = check_value(&document, input)?;
    tracing::info!(
        schema = %args.schema.display(),
        input = %args.input.display(),
        valid = processed.is_valid(),
        steps = processed.state().steps_executed(),
        "checked input"
    );
    render(&processed, &catalogue, args.format)
}

/// Compile `document` and process `input` with it.
pub fn check_value(document: &SchemaDocument, input: Value) -> anyhow::Result<Processed> {
    let chain = document.build_standard()?;
    let compiled = sieve_engine::compile(&chain)?;
    Ok(compiled.process_value(input))
}

/// Render a processed outcome in `format`.
pub fn render(
    processed: &Processed,
    catalogue: &MessageCatalogue,
    format: OutputFormat,
) -> anyhow::Result<CheckOutcome> {
    let errors = processed.all_errors();
    let valid = processed.is_valid();
    let output = match format {
        OutputFormat::Text if valid => {
            let value = match processed.value() {
                Some(value) => serde_json::to_string_pretty(value)?,
                None => "undefined".to_string(),
            };
            format!("{value}\n")
        }
        OutputFormat::Text => errors
            .iter()
            .map(|e| format!("{}\n", catalogue.render_field(e)))
            .collect(),
        OutputFormat::Json => {
            let report = RenderedReport {
                valid,
                value: processed.value(),
                errors: errors
                    .iter()
                    .map(|error| RenderedError {
                        error,
                        message: catalogue.render(&error.error),
                    })
                    .collect(),
            };
            format!("{}\n", serde_json::to_string_pretty(&report)?)
        }
    };
    Ok(CheckOutcome { valid, output })
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SCHEMA: &str = r#"
schema:
  type: object
  fields:
    name:
      type: string
      required: true
      steps:
        - name: string/trim
    age:
      type: number
      steps:
        - name: number/parse
        - name: number/min
          args: [18]
"#;

    fn processed(input: Value) -> Processed {
        let doc = SchemaDocument::from_yaml_str(SCHEMA).unwrap();
        check_value(&doc, input).unwrap()
    }

    #[test]
    fn test_text_output_for_valid_input() {
        let out = render(
            &processed(json!({"name": " Ada ", "age": "36"})),
            &MessageCatalogue::standard(),
            OutputFormat::Text,
        )
        .unwrap();
        assert!(out.valid);
        let value: Value = serde_json::from_str(&out.output).unwrap();
        assert_eq!(value, json!({"name": "Ada", "age": 36}));
    }

    #[test]
    fn test_text_output_lists_errors() {
        let out = render(
            &processed(json!({"age": 12})),
            &MessageCatalogue::standard(),
            OutputFormat::Text,
        )
        .unwrap();
        assert!(!out.valid);
        assert!(out.output.contains("age: must be at least 18\n"));
        assert!(out.output.starts_with("value: "));
    }

    #[test]
    fn test_json_output_carries_messages() {
        let out = render(
            &processed(json!({"name": "Ada", "age": 3})),
            &MessageCatalogue::standard(),
            OutputFormat::Json,
        )
        .unwrap();
        let report: Value = serde_json::from_str(&out.output).unwrap();
        assert_eq!(report["valid"], json!(false));
        let age = report["errors"]
            .as_array()
            .unwrap()
            .iter()
            .find(|e| e["path"] == json!("age"))
            .unwrap();
        assert_eq!(age["key"], json!("number/min"));
        assert_eq!(age["message"], json!("must be at least 18"));
    }
}
