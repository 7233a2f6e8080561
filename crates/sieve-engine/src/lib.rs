//! # sieve-engine — Compilation and Execution
//!
//! Compiles builder chains from `sieve-chain` into [`CompiledEntity`]
//! trees and runs them against input values.
//!
//! ```text
//! Chain ──▶ CompilationMapper::compile ──▶ Arc<CompiledEntity> ──▶ process(input) ──▶ Processed
//!                    │                              │
//!              KindTag ─▶ factory            presence rules, then kind behaviour
//! ```
//!
//! ## Modules
//!
//! - [`mapper`] — the kind table and compilation context.
//! - [`compiled`] — compiled entities and their presence state machine.
//! - [`generic`] — the pipeline executor and its kind hooks.
//! - [`kinds`] — hooks for the built-in kinds.
//! - [`outcome`] — [`Processed`] and its serializable [`Report`].
//! - [`state`] — per-call [`ProcessState`].
//!
//! ## Crate Policy
//!
//! - Schema defects surface as [`BuildError`] from compilation; data
//!   defects are recorded on trackers and never returned as `Err`.
//! - A compiled tree is immutable and may process inputs from several
//!   threads at once.

use std::sync::Arc;

use sieve_chain::Chain;
use sieve_core::BuildError;

pub mod compiled;
pub mod generic;
pub mod kinds;
pub mod mapper;
pub mod outcome;
pub mod state;

pub use compiled::{CompiledEntity, EntityBehavior};
pub use generic::{ChainHooks, CompiledChain, NoHooks};
pub use mapper::{BehaviorFactory, CompilationMapper, CompileContext};
pub use outcome::{Processed, Report};
pub use state::ProcessState;

/// Compile `chain` with the standard mapper.
///
/// # Errors
///
/// See [`CompilationMapper::compile`].
pub fn compile(chain: &Chain) -> Result<Arc<CompiledEntity>, BuildError> {
    Arc::new(CompilationMapper::standard()).compile(chain)
}
