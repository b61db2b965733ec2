use serde::{Deserialize, Serialize};
use std::fmt;

/// Generational handle into the world's entity arena.
///
/// A handle stays valid for as long as the entity it was issued for is alive.
/// Once the slot is freed and reused the generation changes, so stale handles
/// never resolve to the new occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId {
    pub index: u32,
    pub generation: u32,
}

impl EntityId {
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}
