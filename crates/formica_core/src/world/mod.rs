//! The simulation world: entity arena, spatial partition and tick loop.
//!
//! Entities live in a generational arena. Registered entities are also filed
//! in exactly one [`Bucket`] of an `N × N` partition, chosen by floor-dividing
//! their position by the region size. All structural changes go through the
//! add/remove buffers and are applied once per tick, after every entity has
//! been updated.

mod bucket;
mod lifecycle;
mod query;

pub use bucket::Bucket;
pub use lifecycle::{WorldEvent, WorldObserver};
pub use query::ColliderHit;

use crate::collider::OccupancyGrid;
use crate::config::SimConfig;
use crate::entity::{Entity, RegionSlot};
use crate::error::{Result, SimError};
use formica_data::EntityId;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeSet;
use std::sync::Arc;

#[derive(Debug)]
enum SlotEntry {
    Vacant,
    /// Inserted but not yet registered by a buffer drain.
    Staged(Entity),
    Live(Entity),
    /// Registered, temporarily moved out while it updates.
    CheckedOut,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    entry: SlotEntry,
    queued_add: bool,
    queued_remove: bool,
}

pub struct World {
    width: f64,
    height: f64,
    subdivisions: usize,
    tick: u64,
    config: Arc<SimConfig>,
    slots: Vec<Slot>,
    free: Vec<u32>,
    live_count: usize,
    buckets: Vec<Bucket>,
    colliders: BTreeSet<EntityId>,
    boundary: OccupancyGrid,
    add_buffer: Vec<EntityId>,
    remove_buffer: Vec<EntityId>,
    observers: Vec<WorldObserver>,
    rng: ChaCha8Rng,
    in_update: bool,
}

impl World {
    /// Creates an empty world sized and seeded from `config`.
    pub fn new(config: SimConfig) -> Result<Self> {
        let width = config.world.width;
        let height = config.world.height;
        let subdivisions = config.world.subdivisions;
        let boundary = OccupancyGrid::new(subdivisions, width, height)?;
        let seed = config.world.seed.unwrap_or(0);
        tracing::debug!(width, height, subdivisions, seed, "World created");
        Ok(Self {
            width,
            height,
            subdivisions,
            tick: 0,
            config: Arc::new(config),
            slots: Vec::new(),
            free: Vec::new(),
            live_count: 0,
            buckets: vec![Bucket::default(); subdivisions * subdivisions],
            colliders: BTreeSet::new(),
            boundary,
            add_buffer: Vec::new(),
            remove_buffer: Vec::new(),
            observers: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            in_update: false,
        })
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }

    #[must_use]
    pub fn subdivisions(&self) -> usize {
        self.subdivisions
    }

    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Shared handle to the configuration; cheap to clone during updates.
    #[must_use]
    pub fn config(&self) -> &Arc<SimConfig> {
        &self.config
    }

    pub fn rng(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    /// Number of registered entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.live_count
    }

    /// Whether `id` refers to a registered entity.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        matches!(
            self.slot(id).map(|s| &s.entry),
            Some(SlotEntry::Live(_) | SlotEntry::CheckedOut)
        )
    }

    fn slot(&self, id: EntityId) -> Option<&Slot> {
        self.slots
            .get(id.index as usize)
            .filter(|s| s.generation == id.generation)
    }

    fn slot_mut(&mut self, id: EntityId) -> Option<&mut Slot> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|s| s.generation == id.generation)
    }

    /// A registered entity, unless it is the one currently updating.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        match &self.slot(id)?.entry {
            SlotEntry::Live(e) => Some(e),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        match &mut self.slot_mut(id)?.entry {
            SlotEntry::Live(e) => Some(e),
            _ => None,
        }
    }

    /// Like [`World::get_mut`] but reports why the entity is unavailable.
    pub fn try_get_mut(&mut self, id: EntityId) -> Result<&mut Entity> {
        match self.slot_mut(id).map(|s| &mut s.entry) {
            Some(SlotEntry::Live(e)) => Ok(e),
            Some(SlotEntry::CheckedOut) => Err(SimError::EntityCheckedOut(id)),
            _ => Err(SimError::StaleEntity(id)),
        }
    }

    /// An inserted entity still waiting for the add buffer to drain.
    #[must_use]
    pub fn staged(&self, id: EntityId) -> Option<&Entity> {
        match &self.slot(id)?.entry {
            SlotEntry::Staged(e) => Some(e),
            _ => None,
        }
    }

    /// Registered ids in ascending arena order.
    #[must_use]
    pub fn ids(&self) -> Vec<EntityId> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| matches!(s.entry, SlotEntry::Live(_) | SlotEntry::CheckedOut))
            .map(|(i, s)| EntityId::new(i as u32, s.generation))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.slots.iter().enumerate().filter_map(|(i, s)| match &s.entry {
            SlotEntry::Live(e) => Some((EntityId::new(i as u32, s.generation), e)),
            _ => None,
        })
    }

    /// Advances the simulation by one tick.
    ///
    /// Every entity registered at the start of the tick is updated once, in
    /// ascending id order, then the add buffer and the remove buffer are
    /// drained in that order. An error from any entity stops the tick before
    /// the buffers are drained.
    ///
    /// # Returns
    /// Lifecycle events produced by this tick's buffer drain
    pub fn update(&mut self) -> Result<Vec<WorldEvent>> {
        self.tick += 1;
        let snapshot = self.ids();

        self.in_update = true;
        let outcome = self.update_entities(&snapshot);
        self.in_update = false;
        outcome?;

        Ok(self.apply_entity_buffers())
    }

    fn update_entities(&mut self, snapshot: &[EntityId]) -> Result<()> {
        for &id in snapshot {
            let Some(mut entity) = self.check_out(id) else {
                continue;
            };
            let outcome = entity.update(id, self);
            self.check_in(id, entity);
            outcome?;
        }
        Ok(())
    }

    /// Temporarily takes a registered entity out of the arena.
    pub(crate) fn check_out(&mut self, id: EntityId) -> Option<Entity> {
        let slot = self.slot_mut(id)?;
        if !matches!(slot.entry, SlotEntry::Live(_)) {
            return None;
        }
        match std::mem::replace(&mut slot.entry, SlotEntry::CheckedOut) {
            SlotEntry::Live(e) => Some(e),
            _ => None,
        }
    }

    /// Returns a checked-out entity, moving it to another bucket if it changed region.
    pub(crate) fn check_in(&mut self, id: EntityId, mut entity: Entity) {
        let cell = self.region_index(entity.transform.position);
        if let Some(region) = entity.region {
            if region.cell != cell {
                self.buckets[region.cell].remove(region.slot);
                let slot = self.buckets[cell].insert(id);
                entity.region = Some(RegionSlot { cell, slot });
            }
        }
        if let Some(slot) = self.slot_mut(id) {
            slot.entry = SlotEntry::Live(entity);
        }
    }

    /// Spawns up to `count` members from the nest `nest`.
    ///
    /// Returns the ids of the queued members; fewer than `count` means the
    /// stockpile ran out.
    pub fn spawn_members(&mut self, nest: EntityId, count: usize) -> Result<Vec<EntityId>> {
        let mut entity = match self.check_out(nest) {
            Some(e) => e,
            None if self.contains(nest) => return Err(SimError::EntityCheckedOut(nest)),
            None => return Err(SimError::StaleEntity(nest)),
        };
        let transform = entity.transform;
        let spawned = match entity.as_colony_mut() {
            Some(colony) => Ok(colony.spawn(nest, &transform, count, self)),
            None => Err(SimError::mismatch("Spawn", "a nest", entity.name.clone())),
        };
        self.check_in(nest, entity);
        spawned
    }

    /// Emits a debug record for every registered entity.
    pub fn log_entities(&self) {
        for (id, entity) in self.iter() {
            entity.log(id);
        }
    }
}
