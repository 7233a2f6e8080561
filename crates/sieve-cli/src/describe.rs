//! # `sieve describe` — Summarize a Schema
//!
//! Prints one line per field and one per pipeline step, using the
//! message catalogue's step descriptions.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use sieve_schema::SchemaDocument;

/// Arguments for `sieve describe`.
#[derive(Args, Debug)]
pub struct DescribeArgs {
    /// Schema document to describe.
    #[arg(long)]
    pub schema: PathBuf,

    /// Message catalogue overlay for step descriptions.
    #[arg(long)]
    pub messages: Option<PathBuf>,
}

/// Execute the describe subcommand.
pub fn run_describe(args: &DescribeArgs) -> anyhow::Result<String> {
    let document = SchemaDocument::from_path(&args.schema)
        .with_context(|| format!("loading schema {}", args.schema.display()))?;
    let catalogue = crate::load_catalogue(args.messages.as_deref())?;
    let chain = document.build_standard()?;
    Ok(catalogue
        .describe(&chain)
        .into_iter()
        .map(|line| line + "\n")
        .collect())
}
