//! # Step Results
//!
//! Every processor returns a [`StepResult`]: the (possibly transformed)
//! value, a failure flag, and the ordered errors explaining the failure.
//! A transformer returns `fail = false` with a new value; a failed
//! validator returns `fail = true` and at least one error.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Named interpolation arguments carried by a tracked error.
pub type ErrorArgs = Map<String, Value>;

/// One structured data error: a namespaced key plus its arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedError {
    /// Namespaced error key, e.g. `generic/required` or `string/min-length`.
    pub key: String,
    /// Arguments available to message templates.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub args: ErrorArgs,
}

impl TrackedError {
    /// An error with no arguments.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            args: Map::new(),
        }
    }

    /// Add one named argument.
    pub fn with_arg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(name.into(), value.into());
        self
    }
}

impl std::fmt::Display for TrackedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.args.is_empty() {
            f.write_str(&self.key)
        } else {
            write!(f, "{} {}", self.key, Value::Object(self.args.clone()))
        }
    }
}

/// The return contract of one processing function.
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Value after this step. Kept even on failure so messages can refer
    /// to the partial transform.
    pub value: Value,
    /// Whether the step failed.
    pub fail: bool,
    /// Ordered errors; non-empty whenever `fail` is set.
    pub errors: Vec<TrackedError>,
}

impl StepResult {
    /// The value passed unchanged.
    pub fn pass(value: Value) -> Self {
        Self {
            value,
            fail: false,
            errors: Vec::new(),
        }
    }

    /// The value was transformed successfully.
    pub fn transform(value: Value) -> Self {
        Self::pass(value)
    }

    /// The step failed with a single error.
    pub fn fail(value: Value, error: TrackedError) -> Self {
        Self {
            value,
            fail: true,
            errors: vec![error],
        }
    }

    /// Whether this result carries any error.
    pub fn is_failure(&self) -> bool {
        self.fail || !self.errors.is_empty()
    }
}
