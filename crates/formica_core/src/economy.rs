//! Resource types, quantity ledgers and nest spawning.

use crate::entity::Entity;
use crate::world::World;
use formica_data::{EntityId, Transform, Vec2};
use rand::Rng;
use std::collections::BTreeMap;
use std::f64::consts::TAU;
use std::fmt;

pub use formica_data::Resource;

/// Random placements tried per member before falling back to the nest itself.
const SPAWN_ATTEMPTS: usize = 8;

/// Registry of the resource kinds known to a simulation.
#[derive(Debug, Clone, Default)]
pub struct ResourceRegistry {
    by_key: BTreeMap<String, Resource>,
}

impl ResourceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a resource; an already-known key returns the existing entry.
    pub fn register(&mut self, key: &str, name: &str) -> Resource {
        self.by_key
            .entry(key.to_string())
            .or_insert_with(|| Resource::new(key, name))
            .clone()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Resource> {
        self.by_key.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.by_key.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

/// Quantities held per resource. Depleted entries are removed, so every
/// stored quantity is strictly positive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceInventory {
    items: BTreeMap<Resource, u32>,
}

/// Contents of a resource pile lying in the world.
pub type ResourceDeposit = ResourceInventory;

impl ResourceInventory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, resource: &Resource, amount: u32) -> Self {
        self.add_resource(resource, amount);
        self
    }

    pub fn add_resource(&mut self, resource: &Resource, amount: u32) {
        if amount == 0 {
            return;
        }
        let held = self.items.entry(resource.clone()).or_insert(0);
        *held = held.saturating_add(amount);
    }

    /// Removes up to `amount` and returns how much was actually removed.
    ///
    /// When the held quantity does not exceed `amount` the entry disappears.
    pub fn remove_resource(&mut self, resource: &Resource, amount: u32) -> u32 {
        let Some(held) = self.items.get_mut(resource) else {
            return 0;
        };
        if *held <= amount {
            let removed = *held;
            self.items.remove(resource);
            removed
        } else {
            *held -= amount;
            amount
        }
    }

    #[must_use]
    pub fn quantity(&self, resource: &Resource) -> u32 {
        self.items.get(resource).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn contains(&self, resource: &Resource) -> bool {
        self.items.contains_key(resource)
    }

    /// True when every entry of `cost` is held in at least that quantity.
    #[must_use]
    pub fn covers(&self, cost: &ResourceInventory) -> bool {
        cost.items.iter().all(|(r, &q)| self.quantity(r) >= q)
    }

    /// Deducts `cost` in full, or nothing at all when it is not covered.
    pub fn deduct(&mut self, cost: &ResourceInventory) -> bool {
        if !self.covers(cost) {
            return false;
        }
        for (r, &q) in &cost.items {
            self.remove_resource(r, q);
        }
        true
    }

    /// Moves every entry into `other`, returning the number of units moved.
    pub fn drain_into(&mut self, other: &mut ResourceInventory) -> u32 {
        let mut moved = 0u32;
        for (r, q) in std::mem::take(&mut self.items) {
            other.add_resource(&r, q);
            moved = moved.saturating_add(q);
        }
        moved
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.items.values().map(|&q| u64::from(q)).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Resource, u32)> {
        self.items.iter().map(|(r, &q)| (r, q))
    }
}

/// Builds a colony member: `(name, transform, world, colony) -> entity`.
pub type SpawnFactory = Box<dyn Fn(&str, Transform, &World, EntityId) -> Entity>;

/// Nest state: stockpile, spawn price and the members it produced.
pub struct Colony {
    pub stockpile: ResourceInventory,
    pub spawn_cost: ResourceInventory,
    /// Members are placed uniformly within this distance of the nest.
    pub spawn_radius: f64,
    pub member_prefix: String,
    /// Ticks between automatic single spawns; 0 disables them.
    pub auto_spawn_interval: u64,
    population: Vec<EntityId>,
    factory: SpawnFactory,
    ticks_since_spawn: u64,
}

impl fmt::Debug for Colony {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Colony")
            .field("stockpile", &self.stockpile)
            .field("spawn_cost", &self.spawn_cost)
            .field("population", &self.population.len())
            .finish_non_exhaustive()
    }
}

impl Colony {
    #[must_use]
    pub fn new(spawn_cost: ResourceInventory, factory: SpawnFactory) -> Self {
        Self {
            stockpile: ResourceInventory::new(),
            spawn_cost,
            spawn_radius: 2.0,
            member_prefix: "ant".to_string(),
            auto_spawn_interval: 0,
            population: Vec::new(),
            factory,
            ticks_since_spawn: 0,
        }
    }

    #[must_use]
    pub fn with_stockpile(mut self, stockpile: ResourceInventory) -> Self {
        self.stockpile = stockpile;
        self
    }

    /// Every member ever spawned, including ones that have since died.
    #[must_use]
    pub fn population(&self) -> &[EntityId] {
        &self.population
    }

    #[must_use]
    pub fn living_population(&self, world: &World) -> usize {
        self.population.iter().filter(|&&id| world.contains(id)).count()
    }

    /// Spawns up to `count` members while the stockpile covers the spawn cost.
    ///
    /// Stops at the first unaffordable spawn; fewer members than requested is
    /// a normal outcome. New members are queued into `world` and appear after
    /// the next buffer drain.
    pub fn spawn(
        &mut self,
        nest: EntityId,
        nest_transform: &Transform,
        count: usize,
        world: &mut World,
    ) -> Vec<EntityId> {
        let mut spawned = Vec::new();
        for _ in 0..count {
            if !self.stockpile.deduct(&self.spawn_cost) {
                break;
            }
            let name = format!("{}-{}", self.member_prefix, self.population.len() + 1);
            let transform = self.placement(nest_transform, world);
            let mut member = (self.factory)(&name, transform, world, nest);
            // Redraw members that land on an obstacle or outside the world.
            let mut attempts = 1;
            while member.blocked_by_boundary(world).unwrap_or(true) {
                if attempts == SPAWN_ATTEMPTS {
                    member.transform.position = nest_transform.position;
                    break;
                }
                member.transform = self.placement(nest_transform, world);
                attempts += 1;
            }
            member.set_home(nest);
            let id = world.insert(member);
            self.population.push(id);
            spawned.push(id);
        }
        if !spawned.is_empty() {
            tracing::debug!(
                nest = %nest,
                spawned = spawned.len(),
                requested = count,
                "Colony spawn"
            );
        }
        spawned
    }

    fn placement(&self, nest_transform: &Transform, world: &mut World) -> Transform {
        let angle = world.rng().gen_range(0.0..TAU);
        let dist = world.rng().gen_range(0.0..=self.spawn_radius.max(0.0));
        Transform::at(nest_transform.position + Vec2::from_angle(angle) * dist).with_rotation(angle)
    }

    /// Per-tick hook used by the nest's own update.
    pub(crate) fn tick(&mut self, nest: EntityId, nest_transform: &Transform, world: &mut World) {
        if self.auto_spawn_interval == 0 {
            return;
        }
        self.ticks_since_spawn += 1;
        if self.ticks_since_spawn >= self.auto_spawn_interval {
            self.ticks_since_spawn = 0;
            self.spawn(nest, nest_transform, 1, world);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn food() -> Resource {
        Resource::new("food", "Food")
    }

    #[test]
    fn test_remove_resource_partial() {
        let mut inv = ResourceInventory::new().with(&food(), 10);
        assert_eq!(inv.remove_resource(&food(), 4), 4);
        assert_eq!(inv.quantity(&food()), 6);
        assert!(inv.contains(&food()));
    }

    #[test]
    fn test_remove_resource_exact_drops_entry() {
        let mut inv = ResourceInventory::new().with(&food(), 10);
        assert_eq!(inv.remove_resource(&food(), 10), 10);
        assert!(!inv.contains(&food()));
    }

    #[test]
    fn test_remove_resource_more_than_held() {
        let mut inv = ResourceInventory::new().with(&food(), 3);
        assert_eq!(inv.remove_resource(&food(), 10), 3);
        assert!(inv.is_empty());
        assert_eq!(inv.remove_resource(&food(), 10), 0);
    }

    #[test]
    fn test_add_zero_is_noop() {
        let mut inv = ResourceInventory::new();
        inv.add_resource(&food(), 0);
        assert!(inv.is_empty());
    }

    #[test]
    fn test_deduct_all_or_nothing() {
        let leaf = Resource::new("leaf", "Leaf");
        let mut inv = ResourceInventory::new().with(&food(), 10).with(&leaf, 1);
        let cost = ResourceInventory::new().with(&food(), 5).with(&leaf, 2);
        assert!(!inv.deduct(&cost));
        assert_eq!(inv.quantity(&food()), 10);
        inv.add_resource(&leaf, 1);
        assert!(inv.deduct(&cost));
        assert_eq!(inv.quantity(&food()), 5);
        assert!(!inv.contains(&leaf));
    }

    #[test]
    fn test_drain_into() {
        let mut a = ResourceInventory::new().with(&food(), 7);
        let mut b = ResourceInventory::new().with(&food(), 1);
        assert_eq!(a.drain_into(&mut b), 7);
        assert!(a.is_empty());
        assert_eq!(b.quantity(&food()), 8);
        assert_eq!(b.total(), 8);
    }

    #[test]
    fn test_registry_register_is_idempotent() {
        let mut reg = ResourceRegistry::new();
        let a = reg.register("food", "Food");
        let b = reg.register("food", "Other");
        assert_eq!(a.name(), b.name());
        assert_eq!(reg.len(), 1);
        assert!(reg.get("leaf").is_none());
    }

    fn corner_world() -> (World, EntityId) {
        let mut config = crate::config::SimConfig::default();
        config.world.width = 100.0;
        config.world.height = 100.0;
        config.world.subdivisions = 10;
        config.world.seed = Some(3);
        let mut world = World::new(config).unwrap();
        let mut colony = Colony::new(
            ResourceInventory::new().with(&food(), 1),
            crate::entity::forager_factory(),
        )
        .with_stockpile(ResourceInventory::new().with(&food(), 40));
        colony.spawn_radius = 6.0;
        let at = Transform::at(Vec2::new(1.0, 1.0));
        let nest = world.insert(Entity::nest("nest", at, colony, 1.0));
        world.apply_entity_buffers();
        (world, nest)
    }

    #[test]
    fn test_spawn_never_places_members_in_the_boundary() {
        let (mut world, nest) = corner_world();
        let members = world.spawn_members(nest, 40).unwrap();
        world.apply_entity_buffers();
        assert_eq!(members.len(), 40);
        for id in members {
            let member = world.get(id).unwrap();
            assert!(!member.blocked_by_boundary(&world).unwrap(), "{} is stuck", member.name);
        }
    }

    #[test]
    fn test_living_population_drops_on_removal() {
        let (mut world, nest) = corner_world();
        let members = world.spawn_members(nest, 3).unwrap();
        world.apply_entity_buffers();
        world.remove_entity(members[0]);
        world.apply_entity_buffers();

        let colony = world.get(nest).and_then(Entity::as_colony).unwrap();
        assert_eq!(colony.population().len(), 3);
        assert_eq!(colony.living_population(&world), 2);
    }
}
