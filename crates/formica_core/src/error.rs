//! Error types for the simulation core.
//!
//! Only contract violations surface here. Expected shortfalls (a nest that
//! cannot afford a spawn, a removal asking for more than is held) are normal
//! control flow and never produce an error.

use formica_data::{EntityId, GeometryError};
use thiserror::Error;

/// Main error type for formica_core operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    /// A state was entered by an entity whose body cannot run it
    #[error("state {state} requires {expected} entity, but '{entity}' is not one")]
    StateTypeMismatch {
        state: &'static str,
        expected: &'static str,
        entity: String,
    },

    /// Geometry that cannot produce a usable shape
    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(#[from] GeometryError),

    /// A handle that no longer refers to a live entity
    #[error("Stale entity handle: {0}")]
    StaleEntity(EntityId),

    /// The entity is currently being updated and cannot be borrowed again
    #[error("Entity {0} is checked out for update")]
    EntityCheckedOut(EntityId),
}

/// Result type alias for formica_core operations.
pub type Result<T> = std::result::Result<T, SimError>;

impl SimError {
    /// Creates a new state/type mismatch error.
    #[must_use]
    pub fn mismatch<S: Into<String>>(
        state: &'static str,
        expected: &'static str,
        entity: S,
    ) -> Self {
        Self::StateTypeMismatch {
            state,
            expected,
            entity: entity.into(),
        }
    }
}
