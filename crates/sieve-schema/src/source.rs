//! # Loading YAML and JSON
//!
//! Schema documents, message overlays and input values share one loader.
//! The format is chosen from the file extension: `.json` is read as
//! JSON, anything else as YAML.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::SchemaDocError;

/// Text format of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// YAML 1.2 (a superset of JSON).
    Yaml,
    /// Strict JSON.
    Json,
}

impl Format {
    /// Choose a format from a path's extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }
}

/// Deserialize `content` as `format`.
///
/// # Errors
///
/// Returns [`SchemaDocError::Parse`] naming `source_name` if the content
/// is malformed or does not fit `T`.
pub fn parse_str<T: DeserializeOwned>(
    content: &str,
    format: Format,
    source_name: &str,
) -> Result<T, SchemaDocError> {
    let parsed = match format {
        Format::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
        Format::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
    };
    parsed.map_err(|reason| SchemaDocError::Parse {
        source_name: source_name.to_string(),
        reason,
    })
}

/// Read and deserialize the file at `path`.
///
/// # Errors
///
/// Returns [`SchemaDocError::Io`] if the file cannot be read and
/// [`SchemaDocError::Parse`] if it cannot be deserialized.
pub fn read_path<T: DeserializeOwned>(path: &Path) -> Result<T, SchemaDocError> {
    let content = std::fs::read_to_string(path).map_err(|source| SchemaDocError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let value = parse_str(&content, Format::from_path(path), &path.display().to_string())?;
    tracing::debug!(path = %path.display(), "loaded document");
    Ok(value)
}
