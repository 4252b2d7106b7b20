//! Sparse set storage for a single component type
//!
//! `sparse[entity.index]` points into the packed `dense`/`data` arrays.
//! Removal swaps the last element into the hole so iteration stays contiguous.

use crate::entity::EntityId;
use core::any::Any;
use core::cmp::Ordering;

/// Packed storage for components of type `T`
pub struct SparseSet<T> {
    sparse: Vec<Option<usize>>,
    dense: Vec<EntityId>,
    data: Vec<T>,
}

impl<T> SparseSet<T> {
    pub fn new() -> Self {
        Self {
            sparse: Vec::new(),
            dense: Vec::new(),
            data: Vec::new(),
        }
    }

    #[inline]
    fn slot(&self, entity: EntityId) -> Option<usize> {
        let slot = (*self.sparse.get(entity.index() as usize)?)?;
        // A recycled index with a different generation is not ours
        (self.dense[slot] == entity).then_some(slot)
    }

    /// Insert or replace. Returns the previous value if there was one.
    pub fn insert(&mut self, entity: EntityId, value: T) -> Option<T> {
        if let Some(slot) = self.slot(entity) {
            return Some(core::mem::replace(&mut self.data[slot], value));
        }

        let index = entity.index() as usize;
        if index >= self.sparse.len() {
            self.sparse.resize(index + 1, None);
        }
        self.sparse[index] = Some(self.dense.len());
        self.dense.push(entity);
        self.data.push(value);
        None
    }

    /// Remove and return the value, keeping the arrays packed
    pub fn remove(&mut self, entity: EntityId) -> Option<T> {
        let slot = self.slot(entity)?;
        self.sparse[entity.index() as usize] = None;

        let last = self.dense.len() - 1;
        if slot != last {
            let moved = self.dense[last];
            self.sparse[moved.index() as usize] = Some(slot);
        }
        self.dense.swap_remove(slot);
        Some(self.data.swap_remove(slot))
    }

    #[inline]
    pub fn contains(&self, entity: EntityId) -> bool {
        self.slot(entity).is_some()
    }

    #[inline]
    pub fn get(&self, entity: EntityId) -> Option<&T> {
        self.slot(entity).map(|slot| &self.data[slot])
    }

    #[inline]
    pub fn get_mut(&mut self, entity: EntityId) -> Option<&mut T> {
        self.slot(entity).map(move |slot| &mut self.data[slot])
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    /// Entities in packed order
    #[inline]
    pub fn entities(&self) -> &[EntityId] {
        &self.dense
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.dense.iter().copied().zip(self.data.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> {
        self.dense.iter().copied().zip(self.data.iter_mut())
    }

    /// Reorder the packed arrays so iteration follows `compare`
    pub fn sort_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let mut order: Vec<usize> = (0..self.data.len()).collect();
        order.sort_by(|&a, &b| compare(&self.data[a], &self.data[b]));

        let mut packed: Vec<Option<(EntityId, T)>> = self
            .dense
            .drain(..)
            .zip(self.data.drain(..))
            .map(Some)
            .collect();

        for index in order {
            if let Some((entity, value)) = packed[index].take() {
                self.sparse[entity.index() as usize] = Some(self.dense.len());
                self.dense.push(entity);
                self.data.push(value);
            }
        }
    }

    pub fn clear(&mut self) {
        self.sparse.clear();
        self.dense.clear();
        self.data.clear();
    }
}

impl<T> Default for SparseSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Object-safe view of a [`SparseSet`] used by the registry
pub(crate) trait ErasedStorage: Send + Sync {
    fn remove_entity(&mut self, entity: EntityId) -> bool;
    fn contains_entity(&self, entity: EntityId) -> bool;
    fn len(&self) -> usize;
    fn clear(&mut self);
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Send + Sync + 'static> ErasedStorage for SparseSet<T> {
    fn remove_entity(&mut self, entity: EntityId) -> bool {
        self.remove(entity).is_some()
    }

    fn contains_entity(&self, entity: EntityId) -> bool {
        self.contains(entity)
    }

    fn len(&self) -> usize {
        SparseSet::len(self)
    }

    fn clear(&mut self) {
        SparseSet::clear(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
