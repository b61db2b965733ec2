//! Core data structures for the Formica simulation.
//!
//! Plain, serializable value types shared by the simulation core and the
//! application layer: vectors, transforms, entity handles and resource
//! identities. Nothing in here knows about the world or its entities.

pub mod id;
pub mod math;
pub mod resource;
pub mod transform;

pub use id::EntityId;
pub use math::{direction, distance, polygon_vertices, GeometryError, Vec2};
pub use resource::Resource;
pub use transform::{normalize_rotation, Transform};
