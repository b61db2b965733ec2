use formica_data::EntityId;

/// Entities located in one region of the partition.
///
/// Slot array with a free list: insertion returns a slot index that stays
/// valid until that slot is removed, and removal never shifts other entries.
#[derive(Debug, Clone, Default)]
pub struct Bucket {
    slots: Vec<Option<EntityId>>,
    free: Vec<usize>,
    len: usize,
}

impl Bucket {
    pub fn insert(&mut self, id: EntityId) -> usize {
        self.len += 1;
        if let Some(slot) = self.free.pop() {
            self.slots[slot] = Some(id);
            slot
        } else {
            self.slots.push(Some(id));
            self.slots.len() - 1
        }
    }

    pub fn remove(&mut self, slot: usize) -> Option<EntityId> {
        let removed = self.slots.get_mut(slot)?.take();
        if removed.is_some() {
            self.free.push(slot);
            self.len -= 1;
        }
        removed
    }

    #[must_use]
    pub fn get(&self, slot: usize) -> Option<EntityId> {
        self.slots.get(slot).copied().flatten()
    }

    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.slots.iter().filter_map(|s| *s)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
