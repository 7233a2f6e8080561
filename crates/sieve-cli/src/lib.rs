//! # sieve-cli — Sieve Command-Line Interface
//!
//! ## Subcommands
//!
//! - `check` — process an input document with a schema document; exit
//!   status 1 when the input has data errors.
//! - `describe` — list a schema's fields and pipeline steps.
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in `main.rs`; handlers return rendered output
//!   instead of printing, so they can be tested directly.
//! - Schema and I/O problems are `anyhow` errors; data errors are output.

use std::path::Path;

use anyhow::Context;
use sieve_schema::MessageCatalogue;

pub mod check;
pub mod describe;

/// The standard catalogue, with the overlay at `path` applied if given.
pub fn load_catalogue(path: Option<&Path>) -> anyhow::Result<MessageCatalogue> {
    let standard = MessageCatalogue::standard();
    match path {
        Some(path) => {
            let overlay = MessageCatalogue::from_path(path)
                .with_context(|| format!("loading message overlay {}", path.display()))?;
            Ok(standard.overlay(overlay))
        }
        None => Ok(standard),
    }
}
