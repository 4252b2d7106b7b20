//! Entity ids - registry slots with generations
//!
//! An [`EntityId`] is only meaningful to the registry that issued it.
//! Destroying an entity bumps the slot generation so old ids stop resolving.

use core::fmt;

/// Registry slot plus generation for ABA protection
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId {
    index: u32,
    generation: u32,
}

impl EntityId {
    #[inline]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// The id that never refers to a live entity
    #[inline]
    pub const fn null() -> Self {
        Self {
            index: u32::MAX,
            generation: u32::MAX,
        }
    }

    #[inline]
    pub const fn index(&self) -> u32 {
        self.index
    }

    #[inline]
    pub const fn generation(&self) -> u32 {
        self.generation
    }

    #[inline]
    pub const fn is_null(&self) -> bool {
        self.index == u32::MAX
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::null()
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "EntityId(null)")
        } else {
            write!(f, "EntityId({}v{})", self.index, self.generation)
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "null")
        } else {
            write!(f, "{}v{}", self.index, self.generation)
        }
    }
}

#[derive(Clone, Copy)]
struct Slot {
    generation: u32,
    alive: bool,
}

/// Hands out entity ids and recycles freed slots
#[derive(Default)]
pub struct EntityAllocator {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
    alive_count: usize,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new entity id, reusing a freed slot when one exists
    pub fn allocate(&mut self) -> EntityId {
        self.alive_count += 1;

        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.alive = true;
            EntityId::new(index, slot.generation)
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                alive: true,
            });
            EntityId::new(index, 0)
        }
    }

    /// Free an entity id. Returns false if it was already dead.
    pub fn deallocate(&mut self, entity: EntityId) -> bool {
        if !self.is_alive(entity) {
            return false;
        }

        let slot = &mut self.slots[entity.index as usize];
        slot.generation = slot.generation.wrapping_add(1);
        slot.alive = false;
        self.free_list.push(entity.index);
        self.alive_count -= 1;
        true
    }

    #[inline]
    pub fn is_alive(&self, entity: EntityId) -> bool {
        if entity.is_null() {
            return false;
        }
        self.slots
            .get(entity.index as usize)
            .map(|slot| slot.alive && slot.generation == entity.generation)
            .unwrap_or(false)
    }

    #[inline]
    pub fn alive_count(&self) -> usize {
        self.alive_count
    }

    /// Live ids in slot order
    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.alive)
            .map(|(index, slot)| EntityId::new(index as u32, slot.generation))
    }

    /// Drop every slot
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_list.clear();
        self.alive_count = 0;
    }
}
