//! # Entity Identity
//!
//! Compiled entities are numbered by a counter owned by the compilation
//! context, so two independently compiled trees never share a sequence
//! and test output stays reproducible.

use serde::{Deserialize, Serialize};

/// Identity of one compiled entity within its compiled tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl EntityId {
    /// Access the raw counter value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "entity#{}", self.0)
    }
}
