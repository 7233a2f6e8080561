//! # Builder Entities
//!
//! A [`Chain`] is the immutable description of one validation and
//! transformation unit: which kind of value it expects, its presence
//! rules and options ([`Props`]), and an ordered pipeline of [`Step`]s.
//!
//! ## Immutability
//!
//! Every configuring call takes `&self` and returns a new chain. The
//! receiver is never altered, so a partially configured chain can be
//! shared as a base and specialised in several directions:
//!
//! ```text
//! let name = schema.string().trim()?;
//! let required_name = name.required();   // `name` is still optional
//! ```
//!
//! ## Pipeline Order
//!
//! Steps are appended, or prepended when `prioritize` is set. Format
//! steps (see [`Processor::is_format`]) must stay in first position; any
//! placement that would break this is rejected with
//! [`BuildError::MisplacedFormatStep`].

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sieve_core::{BuildError, PathRef};

use crate::processor::{Processor, ProcessorRegistry};

// ─── Arguments and Defaults ──────────────────────────────────────────

/// A positional step argument: a literal, or a lookup resolved when the
/// step runs.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// A fixed value.
    Literal(Value),
    /// A path reference resolved against the tracker tree.
    Ref(PathRef),
}

impl Arg {
    /// The path reference, if this argument is one.
    pub fn as_path(&self) -> Option<&PathRef> {
        match self {
            Self::Ref(path) => Some(path),
            Self::Literal(_) => None,
        }
    }
}

/// The value substituted when input is undefined.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    /// A fixed value.
    Literal(Value),
    /// Another value in the tree, looked up at processing time.
    Ref(PathRef),
}

impl DefaultValue {
    /// The path reference, if the default is one.
    pub fn as_path(&self) -> Option<&PathRef> {
        match self {
            Self::Ref(path) => Some(path),
            Self::Literal(_) => None,
        }
    }
}

macro_rules! literal_conversions {
    ($target:ident: $($t:ty),* $(,)?) => {
        $(
            impl From<$t> for $target {
                fn from(v: $t) -> Self {
                    Self::Literal(Value::from(v))
                }
            }
        )*

        impl From<PathRef> for $target {
            fn from(path: PathRef) -> Self {
                Self::Ref(path)
            }
        }
    };
}

literal_conversions!(Arg: Value, bool, i32, i64, u32, u64, f64, &str, String);
literal_conversions!(DefaultValue: Value, bool, i32, i64, u32, u64, f64, &str, String);

// ─── Props ───────────────────────────────────────────────────────────

/// How an object treats input keys it has no member for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownKeys {
    /// Drop them from the output.
    #[default]
    Strip,
    /// Copy them to the output unchanged.
    Allow,
    /// Record an `object/unknown-keys` error.
    Forbid,
}

/// Configuration record of a chain.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Props {
    /// Undefined input is an error.
    pub required: bool,
    /// Defined input is an error.
    pub forbidden: bool,
    /// Substituted for undefined input.
    pub default: Option<DefaultValue>,
    /// Human-readable name used in diagnostics.
    pub label: Option<String>,
    /// Unknown-key policy (objects only).
    pub unknown_keys: UnknownKeys,
    /// `strftime` output format (dates only).
    pub output_format: Option<String>,
}

// ─── Steps ───────────────────────────────────────────────────────────

/// One pipeline entry: a resolved processor and its arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    processor: Processor,
    args: Vec<Arg>,
    prioritize: bool,
}

impl Step {
    /// The processor this step runs.
    pub fn processor(&self) -> &Processor {
        &self.processor
    }

    /// The processor key.
    pub fn key(&self) -> &str {
        self.processor.key()
    }

    /// Positional arguments as declared.
    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    /// Whether the step was inserted at the front.
    pub fn prioritize(&self) -> bool {
        self.prioritize
    }

    /// Path references among the arguments.
    pub fn references(&self) -> impl Iterator<Item = &PathRef> + '_ {
        self.args.iter().filter_map(Arg::as_path)
    }
}

// ─── Kinds ───────────────────────────────────────────────────────────

/// The shape of value a chain describes.
#[derive(Debug, Clone, PartialEq)]
pub enum ChainKind {
    /// Any value; no type check.
    Any,
    /// A string.
    String,
    /// A finite number.
    Number,
    /// A boolean.
    Boolean,
    /// An ISO `YYYY-MM-DD` date string.
    Date,
    /// An array whose items are described by `items`, if set.
    Array {
        /// Chain applied to every item.
        items: Option<Box<Chain>>,
    },
    /// An object with named members, in declaration order.
    Object {
        /// Member chains keyed by field name.
        fields: IndexMap<String, Chain>,
    },
    /// The value found at a path elsewhere in the tree.
    Reference(PathRef),
    /// An application-defined kind, compiled by whatever the mapper
    /// registers for it.
    Custom(String),
}

impl ChainKind {
    /// The field-less discriminant used as the mapper's table key.
    pub fn tag(&self) -> KindTag {
        match self {
            Self::Any => KindTag::Any,
            Self::String => KindTag::String,
            Self::Number => KindTag::Number,
            Self::Boolean => KindTag::Boolean,
            Self::Date => KindTag::Date,
            Self::Array { .. } => KindTag::Array,
            Self::Object { .. } => KindTag::Object,
            Self::Reference(_) => KindTag::Reference,
            Self::Custom(name) => KindTag::Custom(name.clone()),
        }
    }
}

/// Discriminant of a [`ChainKind`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KindTag {
    Any,
    String,
    Number,
    Boolean,
    Date,
    Array,
    Object,
    Reference,
    Custom(String),
}

impl std::fmt::Display for KindTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Any => f.write_str("any"),
            Self::String => f.write_str("string"),
            Self::Number => f.write_str("number"),
            Self::Boolean => f.write_str("boolean"),
            Self::Date => f.write_str("date"),
            Self::Array => f.write_str("array"),
            Self::Object => f.write_str("object"),
            Self::Reference => f.write_str("ref"),
            Self::Custom(name) => write!(f, "custom:{name}"),
        }
    }
}

// ─── Chain ───────────────────────────────────────────────────────────

/// An immutable builder entity.
#[derive(Clone)]
pub struct Chain {
    kind: ChainKind,
    props: Props,
    pipeline: Vec<Step>,
    registry: Arc<ProcessorRegistry>,
}

impl Chain {
    /// A chain of `kind` whose steps resolve against `registry`.
    pub fn new(kind: ChainKind, registry: Arc<ProcessorRegistry>) -> Self {
        Self {
            kind,
            props: Props::default(),
            pipeline: Vec::new(),
            registry,
        }
    }

    /// The kind of value described.
    pub fn kind(&self) -> &ChainKind {
        &self.kind
    }

    /// The kind discriminant.
    pub fn tag(&self) -> KindTag {
        self.kind.tag()
    }

    /// The configuration record.
    pub fn props(&self) -> &Props {
        &self.props
    }

    /// The ordered pipeline.
    pub fn pipeline(&self) -> &[Step] {
        &self.pipeline
    }

    /// The processor catalogue steps are resolved against.
    pub fn registry(&self) -> &Arc<ProcessorRegistry> {
        &self.registry
    }

    /// Label if set, otherwise the kind name.
    pub fn display_name(&self) -> String {
        self.props
            .label
            .clone()
            .unwrap_or_else(|| self.tag().to_string())
    }

    /// A copy whose props are the old props with `delta` applied.
    pub fn set_props(&self, delta: impl FnOnce(&mut Props)) -> Self {
        let mut props = self.props.clone();
        delta(&mut props);
        Self {
            props,
            ..self.clone()
        }
    }

    /// A copy whose kind configuration is the old one with `delta` applied.
    pub fn set_kind(&self, delta: impl FnOnce(&mut ChainKind)) -> Self {
        let mut kind = self.kind.clone();
        delta(&mut kind);
        Self {
            kind,
            ..self.clone()
        }
    }

    /// A copy with one more step.
    ///
    /// # Errors
    ///
    /// - [`BuildError::UnknownProcessor`] if `key` is not in the catalogue.
    /// - [`BuildError::MisplacedFormatStep`] if the placement would leave a
    ///   format step anywhere but first.
    pub fn add_step(
        &self,
        key: &str,
        args: Vec<Arg>,
        prioritize: bool,
    ) -> Result<Self, BuildError> {
        let processor = self
            .registry
            .get(key)
            .cloned()
            .ok_or_else(|| BuildError::UnknownProcessor {
                key: key.to_string(),
            })?;
        self.check_placement(&processor, prioritize)?;
        tracing::trace!(key, prioritize, kind = %self.tag(), "adding pipeline step");

        let step = Step {
            processor,
            args,
            prioritize,
        };
        let mut pipeline = Vec::with_capacity(self.pipeline.len() + 1);
        if prioritize {
            pipeline.push(step);
            pipeline.extend(self.pipeline.iter().cloned());
        } else {
            pipeline.extend(self.pipeline.iter().cloned());
            pipeline.push(step);
        }
        Ok(Self {
            pipeline,
            ..self.clone()
        })
    }

    fn check_placement(&self, processor: &Processor, prioritize: bool) -> Result<(), BuildError> {
        let existing_format = self.pipeline.iter().find(|s| s.processor.is_format());
        if processor.is_format() {
            if let Some(existing) = existing_format {
                return Err(BuildError::MisplacedFormatStep {
                    key: processor.key().to_string(),
                    reason: format!(
                        "pipeline already starts with format step '{}'",
                        existing.key()
                    ),
                });
            }
            if !prioritize && !self.pipeline.is_empty() {
                return Err(BuildError::MisplacedFormatStep {
                    key: processor.key().to_string(),
                    reason: format!("declared after {} other step(s)", self.pipeline.len()),
                });
            }
        } else if prioritize {
            if let Some(existing) = existing_format {
                return Err(BuildError::MisplacedFormatStep {
                    key: existing.key().to_string(),
                    reason: format!("prioritized step '{}' would run before it", processor.key()),
                });
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain")
            .field("kind", &self.kind)
            .field("props", &self.props)
            .field("pipeline", &self.pipeline)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Chain {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.props == other.props && self.pipeline == other.pipeline
    }
}

impl From<PathRef> for Chain {
    fn from(path: PathRef) -> Self {
        Chain::new(ChainKind::Reference(path), Arc::default())
    }
}

// ─── Builder Trait ───────────────────────────────────────────────────

/// Shared configuring methods of every typed builder.
///
/// Implementors are thin wrappers over a [`Chain`]; every method returns
/// a new wrapper of the same concrete kind.
pub trait ChainBuilder: Sized {
    /// The wrapped chain.
    fn chain(&self) -> &Chain;

    /// Wrap a chain.
    fn from_chain(chain: Chain) -> Self;

    /// Unwrap into the untyped chain.
    fn into_chain(self) -> Chain;

    /// A copy with `delta` applied to the props.
    fn set_props(&self, delta: impl FnOnce(&mut Props)) -> Self {
        Self::from_chain(self.chain().set_props(delta))
    }

    /// A copy with one more step; see [`Chain::add_step`].
    fn add_step(&self, key: &str, args: Vec<Arg>, prioritize: bool) -> Result<Self, BuildError> {
        self.chain().add_step(key, args, prioritize).map(Self::from_chain)
    }

    /// Append a step by catalogue key.
    fn step(&self, key: &str, args: Vec<Arg>) -> Result<Self, BuildError> {
        self.add_step(key, args, false)
    }

    /// Undefined input becomes `generic/required`.
    fn required(&self) -> Self {
        self.set_props(|p| p.required = true)
    }

    /// Undefined input is accepted.
    fn optional(&self) -> Self {
        self.set_props(|p| p.required = false)
    }

    /// Defined input becomes `generic/forbidden`.
    fn forbidden(&self) -> Self {
        self.set_props(|p| p.forbidden = true)
    }

    /// Substitute `value` for undefined input.
    fn default_to(&self, value: impl Into<DefaultValue>) -> Self {
        let value = value.into();
        self.set_props(|p| p.default = Some(value))
    }

    /// Set the diagnostic label.
    fn label(&self, label: impl Into<String>) -> Self {
        let label = label.into();
        self.set_props(|p| p.label = Some(label))
    }

    /// Require equality with `expected` (literal or reference).
    fn equals(&self, expected: impl Into<Arg>) -> Result<Self, BuildError> {
        self.step("equals", vec![expected.into()])
    }

    /// Require one of `allowed`.
    fn one_of<I, V>(&self, allowed: I) -> Result<Self, BuildError>
    where
        I: IntoIterator<Item = V>,
        V: Into<Arg>,
    {
        self.step("one-of", allowed.into_iter().map(Into::into).collect())
    }
}

impl ChainBuilder for Chain {
    fn chain(&self) -> &Chain {
        self
    }

    fn from_chain(chain: Chain) -> Self {
        chain
    }

    fn into_chain(self) -> Chain {
        self
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
