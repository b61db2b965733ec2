//! # Formica Core
//!
//! The simulation core for Formica, a tick-driven foraging colony.
//!
//! This crate contains the deterministic simulation logic, including:
//! - A world with an `N × N` spatial partition and buffered entity lifecycle
//! - A collision kernel (SAT for circles and rectangles, occupancy grids)
//! - Entities with a closed set of bodies and a behavior state machine
//! - Scent perception maps and pluggable steering policies
//! - Resource ledgers, nest spawning and decay timers
//! - Metrics collection and structured logging
//!
//! ## Example
//!
//! ```
//! use formica_core::config::SimConfig;
//! use formica_core::economy::{Colony, Resource, ResourceInventory};
//! use formica_core::entity::{forager_factory, Entity};
//! use formica_core::world::World;
//! use formica_data::{Transform, Vec2};
//!
//! let mut world = World::new(SimConfig::default()).unwrap();
//! let food = Resource::new("food", "Food");
//! let colony = Colony::new(ResourceInventory::new().with(&food, 10), forager_factory())
//!     .with_stockpile(ResourceInventory::new().with(&food, 30));
//! let at = Transform::at(Vec2::new(100.0, 100.0));
//! let nest = world.insert(Entity::nest("nest", at, colony, 2.0));
//! world.apply_entity_buffers();
//!
//! let members = world.spawn_members(nest, 5).unwrap();
//! assert_eq!(members.len(), 3);
//! world.update().unwrap();
//! assert_eq!(world.entity_count(), 4);
//! ```

/// Circle, rectangle and occupancy-grid colliders with SAT tests
pub mod collider;
/// Configuration management for simulation parameters
pub mod config;
/// Tick-based countdown used by scent markers
pub mod decay;
/// Resource ledgers and nest spawning
pub mod economy;
/// Entity bodies, movement and builders
pub mod entity;
/// Error types for contract violations
pub mod error;
/// Run statistics and logging setup
pub mod metrics;
/// Scent perception maps
pub mod perception;
/// Behavior states and the state machine
pub mod state;
/// Steering policies
pub mod steering;
/// World partition, lifecycle buffers and spatial queries
pub mod world;

pub use error::{Result, SimError};
