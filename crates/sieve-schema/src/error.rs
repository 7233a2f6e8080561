//! # Error Types — Schema Documents
//!
//! Failures while reading a schema document, a message overlay or an
//! input file, or while turning a document into a chain. Like
//! [`BuildError`], these describe defects in what the author wrote,
//! never in the data being validated.

use sieve_core::BuildError;
use thiserror::Error;

/// Errors raised while loading or building schema documents.
#[derive(Error, Debug)]
pub enum SchemaDocError {
    /// The content is not valid YAML/JSON or does not match the expected
    /// document shape.
    #[error("cannot parse {source_name}: {reason}")]
    Parse {
        /// File path or other name of the content.
        source_name: String,
        /// Parser message.
        reason: String,
    },

    /// A field spec names a type this loader does not know.
    #[error("unknown field type '{type_name}' at {location}")]
    UnknownType {
        /// Dotted location of the field spec in the document.
        location: String,
        /// The unrecognised type name.
        type_name: String,
    },

    /// A `ref` field spec has no `path`.
    #[error("field of type 'ref' at {location} needs a 'path'")]
    MissingPath {
        /// Dotted location of the field spec in the document.
        location: String,
    },

    /// A field spec sets an option its type does not use.
    #[error("option '{option}' does not apply to type '{type_name}' at {location}")]
    UnusedOption {
        /// Dotted location of the field spec in the document.
        location: String,
        /// The option that was set.
        option: String,
        /// The field's type.
        type_name: String,
    },

    /// The chain could not be built from a well-formed document.
    #[error("schema build error: {0}")]
    Build(#[from] BuildError),

    /// The file could not be read.
    #[error("cannot read '{path}': {source}")]
    Io {
        /// The path that failed.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}
