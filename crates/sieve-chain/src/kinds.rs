//! # Typed Builders
//!
//! Thin wrappers over [`Chain`] that add the configuration and step
//! methods meaningful for one kind of value. They share presence rules,
//! defaults and labels through [`ChainBuilder`].

use sieve_core::BuildError;

use crate::chain::{Arg, Chain, ChainBuilder, ChainKind, UnknownKeys};

macro_rules! typed_chain {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name(Chain);

        impl ChainBuilder for $name {
            fn chain(&self) -> &Chain {
                &self.0
            }

            fn from_chain(chain: Chain) -> Self {
                Self(chain)
            }

            fn into_chain(self) -> Chain {
                self.0
            }
        }

        impl From<$name> for Chain {
            fn from(typed: $name) -> Chain {
                typed.0
            }
        }
    };
}

/// Builder for values of any shape. The untyped chain already carries
/// every shared method.
pub type AnyChain = Chain;

typed_chain!(
    /// Builder for string values.
    StringChain
);
typed_chain!(
    /// Builder for numeric values.
    NumberChain
);
typed_chain!(
    /// Builder for boolean values.
    BooleanChain
);
typed_chain!(
    /// Builder for ISO dates.
    DateChain
);
typed_chain!(
    /// Builder for arrays.
    ArrayChain
);
typed_chain!(
    /// Builder for objects with named members.
    ObjectChain
);

impl StringChain {
    /// Strip leading and trailing whitespace.
    pub fn trim(&self) -> Result<Self, BuildError> {
        self.step("string/trim", vec![])
    }

    /// Convert to lower case.
    pub fn lowercase(&self) -> Result<Self, BuildError> {
        self.step("string/lowercase", vec![])
    }

    /// Convert to upper case.
    pub fn uppercase(&self) -> Result<Self, BuildError> {
        self.step("string/uppercase", vec![])
    }

    /// Reject the empty string.
    pub fn not_empty(&self) -> Result<Self, BuildError> {
        self.step("string/not-empty", vec![])
    }

    /// At least `min` characters.
    pub fn min_length(&self, min: impl Into<Arg>) -> Result<Self, BuildError> {
        self.step("string/min-length", vec![min.into()])
    }

    /// At most `max` characters.
    pub fn max_length(&self, max: impl Into<Arg>) -> Result<Self, BuildError> {
        self.step("string/max-length", vec![max.into()])
    }
}

impl NumberChain {
    /// Accept numeric strings, converting them first.
    pub fn parse(&self) -> Result<Self, BuildError> {
        self.add_step("number/parse", vec![], true)
    }

    /// At least `min`.
    pub fn min(&self, min: impl Into<Arg>) -> Result<Self, BuildError> {
        self.step("number/min", vec![min.into()])
    }

    /// At most `max`.
    pub fn max(&self, max: impl Into<Arg>) -> Result<Self, BuildError> {
        self.step("number/max", vec![max.into()])
    }

    /// No fractional part.
    pub fn integer(&self) -> Result<Self, BuildError> {
        self.step("number/integer", vec![])
    }
}

impl BooleanChain {
    /// Accept textual spellings such as `"yes"` or `"off"`.
    pub fn parse(&self) -> Result<Self, BuildError> {
        self.add_step("boolean/parse", vec![], true)
    }
}

impl DateChain {
    /// Accept ISO dates and RFC 3339 timestamps.
    pub fn parse(&self) -> Result<Self, BuildError> {
        self.add_step("date/parse", vec![], true)
    }

    /// Accept dates in a `strftime`-style input format.
    pub fn parse_with(&self, input_format: &str) -> Result<Self, BuildError> {
        self.add_step("date/parse", vec![Arg::from(input_format)], true)
    }

    /// On or after `min`.
    pub fn min(&self, min: impl Into<Arg>) -> Result<Self, BuildError> {
        self.step("date/min", vec![min.into()])
    }

    /// On or before `max`.
    pub fn max(&self, max: impl Into<Arg>) -> Result<Self, BuildError> {
        self.step("date/max", vec![max.into()])
    }

    /// Render the validated date with a `strftime`-style format.
    pub fn output_format(&self, format: impl Into<String>) -> Self {
        let format = format.into();
        self.set_props(|p| p.output_format = Some(format))
    }
}

impl ArrayChain {
    /// Validate every item with `item`.
    pub fn items(&self, item: impl Into<Chain>) -> Self {
        let item = Box::new(item.into());
        Self(self.0.set_kind(|kind| *kind = ChainKind::Array { items: Some(item) }))
    }

    /// At least `min` items.
    pub fn min_items(&self, min: impl Into<Arg>) -> Result<Self, BuildError> {
        self.step("array/min-items", vec![min.into()])
    }

    /// At most `max` items.
    pub fn max_items(&self, max: impl Into<Arg>) -> Result<Self, BuildError> {
        self.step("array/max-items", vec![max.into()])
    }

    /// No value may appear twice.
    pub fn unique(&self) -> Result<Self, BuildError> {
        self.step("array/unique", vec![])
    }
}

impl ObjectChain {
    /// Add or replace the member `name`.
    pub fn field(&self, name: impl Into<String>, member: impl Into<Chain>) -> Self {
        let name = name.into();
        let member = member.into();
        Self(self.0.set_kind(|kind| {
            if let ChainKind::Object { fields } = kind {
                fields.insert(name, member);
            }
        }))
    }

    /// Member names in declaration order.
    pub fn field_names(&self) -> Vec<&str> {
        match self.0.kind() {
            ChainKind::Object { fields } => fields.keys().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// Drop unknown keys from the output.
    pub fn strip_unknown(&self) -> Self {
        self.set_props(|p| p.unknown_keys = UnknownKeys::Strip)
    }

    /// Copy unknown keys to the output.
    pub fn allow_unknown(&self) -> Self {
        self.set_props(|p| p.unknown_keys = UnknownKeys::Allow)
    }

    /// Reject unknown keys.
    pub fn forbid_unknown(&self) -> Self {
        self.set_props(|p| p.unknown_keys = UnknownKeys::Forbid)
    }
}

