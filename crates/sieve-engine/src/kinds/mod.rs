//! # Built-in Kinds
//!
//! One factory per built-in chain kind, registered by
//! [`CompilationMapper::standard`](crate::CompilationMapper::standard).
//! Each wraps the chain's pipeline in a [`CompiledChain`](crate::CompiledChain)
//! with the hooks for that kind.

pub mod array;
pub mod date;
pub mod object;
pub mod scalar;
