//! # sieve-schema — Declarative Schema Documents
//!
//! Loads chain definitions from YAML or JSON documents and renders
//! tracked errors and pipelines as human-readable text.
//!
//! ## Modules
//!
//! - [`document`] — [`SchemaDocument`] and its field, step and argument specs.
//! - [`messages`] — [`MessageCatalogue`] with English defaults and YAML overlays.
//! - [`source`] — format detection and deserialization shared by both.
//! - [`error`] — [`SchemaDocError`].
//!
//! ## Crate Policy
//!
//! - Documents are strict: unknown keys are parse errors.
//! - Building a document performs the same checks as building a chain by
//!   hand; a document never produces a chain the builder API would reject.

pub mod document;
pub mod error;
pub mod messages;
pub mod source;

pub use document::{ArgSpec, FieldSpec, RefSpec, SchemaDocument, StepSpec};
pub use error::SchemaDocError;
pub use messages::MessageCatalogue;
pub use source::{parse_str, read_path, Format};
