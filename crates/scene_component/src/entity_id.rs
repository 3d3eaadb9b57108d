//! Entity identifiers and their allocation.
//!
//! An [`EntityId`] is a lightweight `u64`. Components refer to their owner by
//! id only; the scene resolves ids to entities.

use serde::{Deserialize, Serialize};

/// A scene-unique entity identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl EntityId {
    /// The null / invalid entity sentinel.
    pub const INVALID: EntityId = EntityId(0);

    /// Create an id from a raw `u64`.
    #[must_use]
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` identifier.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }

    /// Returns `true` if this is a valid (non-zero) id.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for EntityId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// Allocates monotonically increasing entity ids. The scene skips ids that
/// were claimed explicitly.
#[derive(Debug)]
pub struct EntityAllocator {
    next_id: u64,
}

impl EntityAllocator {
    /// Creates an allocator whose first id is `first` (clamped to 1, since 0
    /// is reserved for [`EntityId::INVALID`]).
    #[must_use]
    pub fn starting_at(first: u64) -> Self {
        Self {
            next_id: first.max(1),
        }
    }

    /// Allocates a fresh id.
    pub fn allocate(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        EntityId(id)
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::starting_at(1)
    }
}
