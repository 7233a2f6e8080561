//! # Schema Factory
//!
//! [`Schema`] hands out fresh builders that all resolve their steps
//! against one shared processor catalogue and start from the same
//! [`SchemaOptions`].

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sieve_core::PathRef;

use crate::chain::{Chain, ChainBuilder, ChainKind, UnknownKeys};
use crate::kinds::{ArrayChain, BooleanChain, DateChain, NumberChain, ObjectChain, StringChain};
use crate::processor::ProcessorRegistry;

/// Defaults applied to builders created by a [`Schema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchemaOptions {
    /// Unknown-key policy of new object builders.
    pub unknown_keys: UnknownKeys,
}

/// Factory for builders sharing one catalogue.
#[derive(Debug, Clone)]
pub struct Schema {
    registry: Arc<ProcessorRegistry>,
    options: SchemaOptions,
}

impl Default for Schema {
    fn default() -> Self {
        Self::standard()
    }
}

impl Schema {
    /// A factory over `registry`.
    pub fn new(registry: ProcessorRegistry, options: SchemaOptions) -> Self {
        Self {
            registry: Arc::new(registry),
            options,
        }
    }

    /// A factory over the standard catalogue with default options.
    pub fn standard() -> Self {
        Self::new(ProcessorRegistry::standard(), SchemaOptions::default())
    }

    /// The same catalogue with different options.
    pub fn with_options(&self, options: SchemaOptions) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            options,
        }
    }

    /// The shared catalogue.
    pub fn registry(&self) -> &Arc<ProcessorRegistry> {
        &self.registry
    }

    /// The options new builders start from.
    pub fn options(&self) -> SchemaOptions {
        self.options
    }

    fn chain(&self, kind: ChainKind) -> Chain {
        Chain::new(kind, Arc::clone(&self.registry))
    }

    /// Any value.
    pub fn any(&self) -> Chain {
        self.chain(ChainKind::Any)
    }

    /// A string.
    pub fn string(&self) -> StringChain {
        StringChain::from_chain(self.chain(ChainKind::String))
    }

    /// A number.
    pub fn number(&self) -> NumberChain {
        NumberChain::from_chain(self.chain(ChainKind::Number))
    }

    /// A boolean.
    pub fn boolean(&self) -> BooleanChain {
        BooleanChain::from_chain(self.chain(ChainKind::Boolean))
    }

    /// An ISO date.
    pub fn date(&self) -> DateChain {
        DateChain::from_chain(self.chain(ChainKind::Date))
    }

    /// An array with no item chain yet.
    pub fn array(&self) -> ArrayChain {
        ArrayChain::from_chain(self.chain(ChainKind::Array { items: None }))
    }

    /// An object with no members yet.
    pub fn object(&self) -> ObjectChain {
        let object = self.chain(ChainKind::Object {
            fields: IndexMap::new(),
        });
        let unknown_keys = self.options.unknown_keys;
        ObjectChain::from_chain(object.set_props(|p| p.unknown_keys = unknown_keys))
    }

    /// The value at `path`, looked up at processing time.
    pub fn reference(&self, path: impl Into<PathRef>) -> Chain {
        self.chain(ChainKind::Reference(path.into()))
    }

    /// An application-defined kind.
    pub fn custom(&self, name: impl Into<String>) -> Chain {
        self.chain(ChainKind::Custom(name.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::KindTag;

    #[test]
    fn test_object_starts_from_options() {
        let schema = Schema::standard().with_options(SchemaOptions {
            unknown_keys: UnknownKeys::Forbid,
        });
        assert_eq!(schema.object().chain().props().unknown_keys, UnknownKeys::Forbid);
        assert_eq!(Schema::standard().object().chain().props().unknown_keys, UnknownKeys::Strip);
    }

    #[test]
    fn test_builders_share_catalogue() {
        let schema = Schema::standard();
        let a = schema.string().into_chain();
        let b = schema.number().into_chain();
        assert!(Arc::ptr_eq(a.registry(), b.registry()));
    }

    #[test]
    fn test_reference_from_dotted_str() {
        let r = Schema::standard().reference("a.b");
        assert_eq!(r.tag(), KindTag::Reference);
        assert_eq!(r.kind(), &ChainKind::Reference(PathRef::new(["a", "b"])));
    }

    #[test]
    fn test_options_deserialize() {
        let opts: SchemaOptions = serde_json::from_str(r#"{"unknown_keys":"allow"}"#).unwrap();
        assert_eq!(opts.unknown_keys, UnknownKeys::Allow);
        let empty: SchemaOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, SchemaOptions::default());
    }
}
