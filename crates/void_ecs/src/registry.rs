//! Registry - entities plus one sparse set per component type
//!
//! The registry knows nothing about scenes or UUIDs. It answers
//! add/get/has/remove/view questions for whatever `'static` types are stored.

use crate::entity::{EntityAllocator, EntityId};
use crate::sparse_set::{ErasedStorage, SparseSet};
use core::any::TypeId;
use core::cmp::Ordering;
use std::collections::HashMap;

/// Entity storage with type-erased component pools
#[derive(Default)]
pub struct Registry {
    entities: EntityAllocator,
    storages: HashMap<TypeId, Box<dyn ErasedStorage>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== Entities ====================

    /// Allocate an entity with no components
    pub fn create(&mut self) -> EntityId {
        self.entities.allocate()
    }

    /// Destroy an entity and every component attached to it
    pub fn destroy(&mut self, entity: EntityId) -> bool {
        if !self.entities.is_alive(entity) {
            return false;
        }

        for storage in self.storages.values_mut() {
            storage.remove_entity(entity);
        }
        log::trace!("registry: destroyed {}", entity);
        self.entities.deallocate(entity)
    }

    #[inline]
    pub fn is_alive(&self, entity: EntityId) -> bool {
        self.entities.is_alive(entity)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entities.alive_count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every live entity in slot order
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.iter()
    }

    /// Remove all entities and components
    pub fn clear(&mut self) {
        for storage in self.storages.values_mut() {
            storage.clear();
        }
        self.entities.clear();
    }

    // ==================== Components ====================

    /// Store `component` on `entity`, replacing any existing value of the same type.
    ///
    /// # Panics
    ///
    /// Panics if `entity` is not alive.
    pub fn insert<T: Send + Sync + 'static>(&mut self, entity: EntityId, component: T) -> Option<T> {
        assert!(
            self.entities.is_alive(entity),
            "insert of {} on dead entity {}",
            core::any::type_name::<T>(),
            entity
        );
        self.storage_mut::<T>().insert(entity, component)
    }

    pub fn remove<T: Send + Sync + 'static>(&mut self, entity: EntityId) -> Option<T> {
        self.storages
            .get_mut(&TypeId::of::<T>())
            .and_then(|s| s.as_any_mut().downcast_mut::<SparseSet<T>>())
            .and_then(|s| s.remove(entity))
    }

    pub fn get<T: Send + Sync + 'static>(&self, entity: EntityId) -> Option<&T> {
        self.storage::<T>().and_then(|s| s.get(entity))
    }

    pub fn get_mut<T: Send + Sync + 'static>(&mut self, entity: EntityId) -> Option<&mut T> {
        self.storages
            .get_mut(&TypeId::of::<T>())
            .and_then(|s| s.as_any_mut().downcast_mut::<SparseSet<T>>())
            .and_then(|s| s.get_mut(entity))
    }

    pub fn contains<T: Send + Sync + 'static>(&self, entity: EntityId) -> bool {
        self.storages
            .get(&TypeId::of::<T>())
            .map(|s| s.contains_entity(entity))
            .unwrap_or(false)
    }

    /// Number of entities carrying `T`
    pub fn count<T: Send + Sync + 'static>(&self) -> usize {
        self.storages
            .get(&TypeId::of::<T>())
            .map(|s| s.len())
            .unwrap_or(0)
    }

    /// Pool for `T`, if any entity ever stored one
    pub fn storage<T: Send + Sync + 'static>(&self) -> Option<&SparseSet<T>> {
        self.storages
            .get(&TypeId::of::<T>())
            .and_then(|s| s.as_any().downcast_ref::<SparseSet<T>>())
    }

    /// Pool for `T`, created on first use
    pub fn storage_mut<T: Send + Sync + 'static>(&mut self) -> &mut SparseSet<T> {
        let storage = self
            .storages
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(SparseSet::<T>::new()));
        match storage.as_any_mut().downcast_mut::<SparseSet<T>>() {
            Some(set) => set,
            None => unreachable!("storage keyed by TypeId holds another type"),
        }
    }

    // ==================== Views ====================

    /// Iterate every `(entity, &T)`
    pub fn view<T: Send + Sync + 'static>(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.storage::<T>().into_iter().flat_map(|s| s.iter())
    }

    /// Iterate every `(entity, &mut T)`
    pub fn view_mut<T: Send + Sync + 'static>(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> {
        self.storages
            .get_mut(&TypeId::of::<T>())
            .and_then(|s| s.as_any_mut().downcast_mut::<SparseSet<T>>())
            .into_iter()
            .flat_map(|s| s.iter_mut())
    }

    /// Iterate entities carrying both `A` and `B`
    pub fn view2<A, B>(&self) -> impl Iterator<Item = (EntityId, &A, &B)>
    where
        A: Send + Sync + 'static,
        B: Send + Sync + 'static,
    {
        self.view::<A>()
            .filter_map(move |(e, a)| self.get::<B>(e).map(|b| (e, a, b)))
    }

    /// Snapshot of the entities carrying `T`, safe to hold across mutation
    pub fn entities_with<T: Send + Sync + 'static>(&self) -> Vec<EntityId> {
        self.storage::<T>()
            .map(|s| s.entities().to_vec())
            .unwrap_or_default()
    }

    /// Reorder the pool for `T` so views follow `compare`
    pub fn sort<T, F>(&mut self, compare: F)
    where
        T: Send + Sync + 'static,
        F: FnMut(&T, &T) -> Ordering,
    {
        if let Some(set) = self
            .storages
            .get_mut(&TypeId::of::<T>())
            .and_then(|s| s.as_any_mut().downcast_mut::<SparseSet<T>>())
        {
            set.sort_by(compare);
        }
    }
}
