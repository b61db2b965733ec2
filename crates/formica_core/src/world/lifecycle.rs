//! Buffered registration and removal of entities.

use super::{Slot, SlotEntry, World};
use crate::entity::{BodyKind, Entity, RegionSlot};
use formica_data::{EntityId, Vec2};

/// Lifecycle notification emitted while the world drains its buffers.
#[derive(Debug, Clone, PartialEq)]
pub enum WorldEvent {
    Added {
        id: EntityId,
        name: String,
        kind: BodyKind,
        position: Vec2,
    },
    Removed {
        id: EntityId,
        name: String,
        kind: BodyKind,
        position: Vec2,
    },
}

impl WorldEvent {
    #[must_use]
    pub fn id(&self) -> EntityId {
        match self {
            Self::Added { id, .. } | Self::Removed { id, .. } => *id,
        }
    }

    #[must_use]
    pub fn kind(&self) -> BodyKind {
        match self {
            Self::Added { kind, .. } | Self::Removed { kind, .. } => *kind,
        }
    }

    #[must_use]
    pub fn is_added(&self) -> bool {
        matches!(self, Self::Added { .. })
    }

    fn added(id: EntityId, entity: &Entity) -> Self {
        Self::Added {
            id,
            name: entity.name.clone(),
            kind: entity.kind(),
            position: entity.transform.position,
        }
    }

    fn removed(id: EntityId, entity: &Entity) -> Self {
        Self::Removed {
            id,
            name: entity.name.clone(),
            kind: entity.kind(),
            position: entity.transform.position,
        }
    }
}

/// Synchronous subscriber to lifecycle events.
pub type WorldObserver = Box<dyn FnMut(&WorldEvent)>;

impl World {
    /// Stores `entity` in the arena and queues its registration.
    ///
    /// The entity becomes visible to queries after the next buffer drain.
    pub fn insert(&mut self, entity: Entity) -> EntityId {
        let id = if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.entry = SlotEntry::Staged(entity);
            EntityId::new(index, slot.generation)
        } else {
            self.slots.push(Slot {
                generation: 0,
                entry: SlotEntry::Staged(entity),
                queued_add: false,
                queued_remove: false,
            });
            EntityId::new((self.slots.len() - 1) as u32, 0)
        };
        self.add_entity(id);
        id
    }

    /// Queues a staged entity for registration.
    ///
    /// Ids that are already queued, already registered or stale are ignored.
    pub fn add_entity(&mut self, id: EntityId) {
        let Some(slot) = self.slot_mut(id) else {
            return;
        };
        if slot.queued_add || !matches!(slot.entry, SlotEntry::Staged(_)) {
            return;
        }
        slot.queued_add = true;
        self.add_buffer.push(id);
    }

    /// Queues an entity for removal; repeated requests collapse into one.
    pub fn remove_entity(&mut self, id: EntityId) {
        let Some(slot) = self.slot_mut(id) else {
            return;
        };
        if slot.queued_remove || matches!(slot.entry, SlotEntry::Vacant) {
            return;
        }
        slot.queued_remove = true;
        self.remove_buffer.push(id);
    }

    /// Whether a removal of `id` is waiting in the buffer.
    #[must_use]
    pub fn is_pending_removal(&self, id: EntityId) -> bool {
        self.slot(id).is_some_and(|s| s.queued_remove)
    }

    #[must_use]
    pub fn pending_additions(&self) -> usize {
        self.add_buffer.len()
    }

    #[must_use]
    pub fn pending_removals(&self) -> usize {
        self.remove_buffer.len()
    }

    /// Registers `observer` for every future lifecycle event.
    pub fn subscribe(&mut self, observer: impl FnMut(&WorldEvent) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Drains the add buffer, then the remove buffer.
    ///
    /// Called automatically at the end of [`World::update`]. Observers are
    /// notified in the order the events are produced, and the same events are
    /// returned to the caller.
    pub fn apply_entity_buffers(&mut self) -> Vec<WorldEvent> {
        if self.in_update {
            tracing::warn!("Buffer drain requested during entity updates, ignoring");
            return Vec::new();
        }
        let mut events = Vec::with_capacity(self.add_buffer.len() + self.remove_buffer.len());

        for id in std::mem::take(&mut self.add_buffer) {
            if let Some(event) = self.register(id) {
                events.push(event);
            }
        }
        for id in std::mem::take(&mut self.remove_buffer) {
            if let Some(event) = self.unregister(id) {
                events.push(event);
            }
        }

        for event in &events {
            for observer in &mut self.observers {
                observer(event);
            }
        }
        if !events.is_empty() {
            tracing::trace!(tick = self.tick, events = events.len(), "Applied entity buffers");
        }
        events
    }

    fn register(&mut self, id: EntityId) -> Option<WorldEvent> {
        let slot = self.slot_mut(id)?;
        slot.queued_add = false;
        let entry = std::mem::replace(&mut slot.entry, SlotEntry::Vacant);
        let SlotEntry::Staged(mut entity) = entry else {
            return None;
        };

        let cell = self.region_index(entity.transform.position);
        let bucket_slot = self.buckets[cell].insert(id);
        entity.region = Some(RegionSlot {
            cell,
            slot: bucket_slot,
        });
        if entity.collider.is_some() {
            self.colliders.insert(id);
        }
        self.live_count += 1;

        let event = WorldEvent::added(id, &entity);
        if let Some(slot) = self.slot_mut(id) {
            slot.entry = SlotEntry::Live(entity);
        }
        Some(event)
    }

    fn unregister(&mut self, id: EntityId) -> Option<WorldEvent> {
        let slot = self.slot_mut(id)?;
        slot.queued_remove = false;
        if matches!(slot.entry, SlotEntry::Vacant | SlotEntry::CheckedOut) {
            return None;
        }
        let event = match std::mem::replace(&mut slot.entry, SlotEntry::Vacant) {
            SlotEntry::Live(entity) => {
                if let Some(region) = entity.region {
                    self.buckets[region.cell].remove(region.slot);
                }
                self.colliders.remove(&id);
                self.live_count -= 1;
                Some(WorldEvent::removed(id, &entity))
            }
            // Never registered, nothing to notify.
            _ => None,
        };
        self.release(id);
        event
    }

    fn release(&mut self, id: EntityId) {
        if let Some(slot) = self.slots.get_mut(id.index as usize) {
            slot.generation = slot.generation.wrapping_add(1);
            slot.entry = SlotEntry::Vacant;
            slot.queued_add = false;
            slot.queued_remove = false;
            self.free.push(id.index);
        }
    }
}
