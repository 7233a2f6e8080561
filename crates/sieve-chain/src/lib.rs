//! # sieve-chain — Immutable Builder Chains
//!
//! Application code describes values with chains: immutable builders
//! that accumulate presence rules, options and an ordered pipeline of
//! processing steps. A chain is compiled once by `sieve-engine` and then
//! run against any number of inputs.
//!
//! ```text
//! let schema = Schema::standard();
//! let signup = schema
//!     .object()
//!     .field("password", schema.string().required().min_length(8)?)
//!     .field("confirm", schema.string().required().equals(PathRef::parse("password"))?);
//! ```
//!
//! ## Modules
//!
//! - [`processor`] — the catalogue of named processing functions.
//! - [`processors`] — the standard catalogue entries.
//! - [`chain`] — [`Chain`], [`Step`], [`Props`] and the [`ChainBuilder`] trait.
//! - [`kinds`] — typed builders per value kind.
//! - [`schema`] — the [`Schema`] factory.
//!
//! ## Crate Policy
//!
//! - Every configuring call returns a new builder; none mutates its receiver.
//! - Unknown processor keys and misplaced format steps fail when the step
//!   is added, never later.

pub mod chain;
pub mod kinds;
pub mod processor;
pub mod processors;
pub mod schema;

pub use chain::{
    Arg, Chain, ChainBuilder, ChainKind, DefaultValue, KindTag, Props, Step, UnknownKeys,
};
pub use kinds::{
    AnyChain, ArrayChain, BooleanChain, DateChain, NumberChain, ObjectChain, StringChain,
};
pub use processor::{Processor, ProcessorFn, ProcessorRegistry};
pub use schema::{Schema, SchemaOptions};
