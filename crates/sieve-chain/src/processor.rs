//! # Processor Catalogue
//!
//! Named processing functions that pipeline steps refer to by key. A
//! processor receives the current value and its positional arguments
//! (already resolved; an unresolved path reference arrives as `None`)
//! and returns a [`StepResult`].
//!
//! ## Contract
//!
//! - Processors are total and side-effect-free. They never panic on
//!   malformed input; they report it as a failed result.
//! - `fail = true` must come with at least one error.
//! - *Format* processors parse raw input into the kind's canonical
//!   representation and must run first in their pipeline.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use sieve_core::StepResult;

/// Signature shared by every processor.
pub type ProcessorFn = dyn Fn(&Value, &[Option<Value>]) -> StepResult + Send + Sync;

/// One named processing function.
#[derive(Clone)]
pub struct Processor {
    key: String,
    func: Arc<ProcessorFn>,
    format: bool,
}

impl Processor {
    /// A validator or transformer.
    pub fn new<F>(key: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value, &[Option<Value>]) -> StepResult + Send + Sync + 'static,
    {
        Self {
            key: key.into(),
            func: Arc::new(func),
            format: false,
        }
    }

    /// A format-parsing processor, which must be the first pipeline step.
    pub fn format<F>(key: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value, &[Option<Value>]) -> StepResult + Send + Sync + 'static,
    {
        Self {
            format: true,
            ..Self::new(key, func)
        }
    }

    /// The catalogue key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether this is a format-parsing processor.
    pub fn is_format(&self) -> bool {
        self.format
    }

    /// Invoke the processor.
    pub fn call(&self, value: &Value, args: &[Option<Value>]) -> StepResult {
        (self.func)(value, args)
    }
}

impl std::fmt::Debug for Processor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Processor")
            .field("key", &self.key)
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Processor {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.format == other.format
    }
}

/// The catalogue chains resolve step keys against.
#[derive(Clone, Default)]
pub struct ProcessorRegistry {
    processors: HashMap<String, Processor>,
}

impl ProcessorRegistry {
    /// An empty catalogue.
    pub fn new() -> Self {
        Self::default()
    }

    /// The catalogue with every standard processor registered.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        crate::processors::register_standard(&mut registry);
        registry
    }

    /// Add or replace a processor.
    pub fn insert(&mut self, processor: Processor) -> &mut Self {
        self.processors.insert(processor.key.clone(), processor);
        self
    }

    /// Register a validator or transformer under `key`.
    pub fn register<F>(&mut self, key: impl Into<String>, func: F) -> &mut Self
    where
        F: Fn(&Value, &[Option<Value>]) -> StepResult + Send + Sync + 'static,
    {
        self.insert(Processor::new(key, func))
    }

    /// Register a format-parsing processor under `key`.
    pub fn register_format<F>(&mut self, key: impl Into<String>, func: F) -> &mut Self
    where
        F: Fn(&Value, &[Option<Value>]) -> StepResult + Send + Sync + 'static,
    {
        self.insert(Processor::format(key, func))
    }

    /// Look up a processor.
    pub fn get(&self, key: &str) -> Option<&Processor> {
        self.processors.get(key)
    }

    /// Whether `key` is registered.
    pub fn contains(&self, key: &str) -> bool {
        self.processors.contains_key(key)
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.processors.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Number of registered processors.
    pub fn len(&self) -> usize {
        self.processors.len()
    }

    /// Whether the catalogue is empty.
    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }
}

impl std::fmt::Debug for ProcessorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessorRegistry")
            .field("keys", &self.keys())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_register_and_call() {
        let mut registry = ProcessorRegistry::new();
        registry.register("double", |v, _| {
            StepResult::transform(json!(v.as_i64().unwrap_or(0) * 2))
        });
        let p = registry.get("double").unwrap();
        assert!(!p.is_format());
        assert_eq!(p.call(&json!(21), &[]).value, json!(42));
    }

    #[test]
    fn test_register_format_marks_processor() {
        let mut registry = ProcessorRegistry::new();
        registry.register_format("parse", |v, _| StepResult::pass(v.clone()));
        assert!(registry.get("parse").unwrap().is_format());
    }

    #[test]
    fn test_insert_replaces_existing_key() {
        let mut registry = ProcessorRegistry::new();
        registry.register("k", |_, _| StepResult::pass(json!(1)));
        registry.register("k", |_, _| StepResult::pass(json!(2)));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("k").unwrap().call(&json!(null), &[]).value, json!(2));
    }

    #[test]
    fn test_standard_catalogue_keys() {
        let registry = ProcessorRegistry::standard();
        let keys = [
            "equals",
            "one-of",
            "string/trim",
            "number/parse",
            "date/parse",
            "array/unique",
        ];
        for key in keys {
            assert!(registry.contains(key), "missing {key}");
        }
        assert!(registry.get("number/parse").unwrap().is_format());
        assert!(!registry.get("number/min").unwrap().is_format());
    }
}
