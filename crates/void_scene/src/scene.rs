//! Scene - entity lifetime, components and the relationship graph
//!
//! The scene owns the registry and the UUID map. Runtime lifecycle lives in
//! `runtime.rs`, the physics and script bridges in their own modules; they
//! all extend [`Scene`] with further `impl` blocks.

use std::collections::HashMap;
use std::sync::Arc;

use glam::Mat4;
use parking_lot::Mutex;
use void_core::Uuid;
use void_ecs::Registry;
use void_physics::{LayerCollisionMask, PhysicsSettings, PhysicsWorld2D, PhysicsWorld3D};
use void_scripting::ScriptEngine;

use crate::camera::CameraComponent;
use crate::component::Component;
use crate::component_table::component_table;
use crate::components::{
    IdComponent, RelationshipComponent, SpriteRendererComponent, TagComponent, TransformComponent,
};
use crate::config::SceneConfig;
use crate::entity::{Entity, SceneId};
use crate::error::{Result, SceneError};

/// Script engine shared between a scene and its runtime copies
pub type SharedScriptEngine = Arc<Mutex<ScriptEngine>>;

/// Name given to entities created without one
pub const DEFAULT_ENTITY_NAME: &str = "Entity";

/// A set of entities plus everything needed to simulate and render them
pub struct Scene {
    id: SceneId,
    name: String,
    pub(crate) registry: Registry,
    entity_map: HashMap<Uuid, void_ecs::EntityId>,

    pub(crate) layers: LayerCollisionMask,
    pub(crate) physics_settings: PhysicsSettings,

    viewport_width: u32,
    viewport_height: u32,
    viewport_dirty: bool,

    pub(crate) running: bool,
    pub(crate) physics_2d: Option<PhysicsWorld2D>,
    pub(crate) physics_3d: Option<PhysicsWorld3D>,
    pub(crate) script_engine: Option<SharedScriptEngine>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

impl Scene {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, SceneConfig::default())
    }

    pub fn with_config(name: impl Into<String>, config: SceneConfig) -> Self {
        Self {
            id: SceneId::next(),
            name: name.into(),
            registry: Registry::new(),
            entity_map: HashMap::new(),
            layers: config.layers,
            physics_settings: config.physics,
            viewport_width: 0,
            viewport_height: 0,
            viewport_dirty: true,
            running: false,
            physics_2d: None,
            physics_3d: None,
            script_engine: None,
        }
    }

    #[inline]
    pub fn id(&self) -> SceneId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    // ==================== Configuration ====================

    pub fn layers(&self) -> &LayerCollisionMask {
        &self.layers
    }

    /// Changes apply to bodies created afterwards
    pub fn layers_mut(&mut self) -> &mut LayerCollisionMask {
        &mut self.layers
    }

    pub fn physics_settings(&self) -> &PhysicsSettings {
        &self.physics_settings
    }

    pub fn physics_settings_mut(&mut self) -> &mut PhysicsSettings {
        &mut self.physics_settings
    }

    pub fn config(&self) -> SceneConfig {
        SceneConfig {
            physics: self.physics_settings.clone(),
            layers: self.layers.clone(),
        }
    }

    pub fn set_config(&mut self, config: SceneConfig) {
        self.physics_settings = config.physics;
        self.layers = config.layers;
    }

    pub fn script_engine(&self) -> Option<&SharedScriptEngine> {
        self.script_engine.as_ref()
    }

    pub fn set_script_engine(&mut self, engine: Option<SharedScriptEngine>) {
        self.script_engine = engine;
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    // ==================== Entities ====================

    /// Create an entity with a fresh UUID
    pub fn create_entity(&mut self, name: &str) -> Entity {
        self.create_entity_with_uuid(Uuid::new(), name)
    }

    /// Create an entity that keeps a known UUID
    ///
    /// Every entity starts with id, relationship, transform and tag
    /// components. An empty name becomes [`DEFAULT_ENTITY_NAME`].
    ///
    /// # Panics
    ///
    /// Panics if `uuid` is nil or already used in this scene.
    pub fn create_entity_with_uuid(&mut self, uuid: Uuid, name: &str) -> Entity {
        assert!(!uuid.is_nil(), "cannot create an entity with a nil UUID");
        assert!(
            !self.entity_map.contains_key(&uuid),
            "entity {} already exists in scene '{}'",
            uuid,
            self.name
        );

        let id = self.registry.create();
        let name = if name.is_empty() {
            DEFAULT_ENTITY_NAME
        } else {
            name
        };
        self.registry.insert(id, IdComponent { id: uuid });
        self.registry.insert(id, RelationshipComponent::default());
        self.registry.insert(id, TransformComponent::default());
        self.registry.insert(id, TagComponent::new(name));
        self.entity_map.insert(uuid, id);

        log::trace!("Created entity '{}' ({}) in scene '{}'", name, uuid, self.name);
        Entity::new(id, self.id)
    }

    /// Destroy an entity and, depth first, all of its descendants
    pub fn destroy_entity(&mut self, entity: Entity) {
        self.assert_valid(entity);
        self.deparent(entity);

        let children = self
            .get_component::<RelationshipComponent>(entity)
            .children
            .clone();
        for child in children {
            let child = self.get_entity(child);
            if self.is_valid(child) {
                self.destroy_entity(child);
            }
        }

        if self.running {
            self.release_runtime_state(entity);
        }

        let uuid = self.uuid(entity);
        self.entity_map.remove(&uuid);
        self.registry.destroy(entity.id());
        log::trace!("Destroyed entity {}", uuid);
    }

    /// Look an entity up by UUID; the null entity when absent
    pub fn get_entity(&self, uuid: Uuid) -> Entity {
        self.entity_map
            .get(&uuid)
            .map(|&id| Entity::new(id, self.id))
            .unwrap_or(Entity::NULL)
    }

    pub fn has_entity(&self, uuid: Uuid) -> bool {
        self.entity_map.contains_key(&uuid)
    }

    /// First entity whose tag equals `name`, in registry order
    pub fn entity_by_name(&self, name: &str) -> Option<Entity> {
        self.view::<TagComponent>()
            .find(|(_, tag)| tag.tag == name)
            .map(|(entity, _)| entity)
    }

    /// True when the handle belongs to this scene and its slot is alive
    pub fn is_valid(&self, entity: Entity) -> bool {
        entity.scene() == self.id && self.registry.is_alive(entity.id())
    }

    #[track_caller]
    pub(crate) fn assert_valid(&self, entity: Entity) {
        assert!(
            self.is_valid(entity),
            "{:?} is not a live entity of scene '{}'",
            entity,
            self.name
        );
    }

    pub fn entity_count(&self) -> usize {
        self.entity_map.len()
    }

    /// Every live entity, in registry order
    pub fn entities(&self) -> Vec<Entity> {
        self.registry
            .entities()
            .map(|id| Entity::new(id, self.id))
            .collect()
    }

    pub fn uuid(&self, entity: Entity) -> Uuid {
        self.get_component::<IdComponent>(entity).id
    }

    pub fn tag(&self, entity: Entity) -> &str {
        &self.get_component::<TagComponent>(entity).tag
    }

    // ==================== Components ====================

    /// Store a component, replacing any existing one of the same type
    ///
    /// The previous value, if any, gets its removal hook before the new
    /// value gets its added hook.
    pub fn add_component<T: Component>(&mut self, entity: Entity, component: T) -> &mut T {
        self.assert_valid(entity);
        if let Some(mut previous) = self.registry.insert(entity.id(), component) {
            previous.on_removed(self, entity);
        }
        T::on_added(self, entity);
        self.get_component_mut::<T>(entity)
    }

    /// Add a default component unless one is present
    pub fn get_or_add_component<T: Component + Default>(&mut self, entity: Entity) -> &mut T {
        if !self.has_component::<T>(entity) {
            return self.add_component(entity, T::default());
        }
        self.get_component_mut::<T>(entity)
    }

    /// # Panics
    ///
    /// Panics if the entity is invalid or has no `T`.
    #[track_caller]
    pub fn get_component<T: Component>(&self, entity: Entity) -> &T {
        match self.try_get_component::<T>(entity) {
            Some(component) => component,
            None => panic!(
                "{:?} has no {}",
                entity,
                core::any::type_name::<T>()
            ),
        }
    }

    /// # Panics
    ///
    /// Panics if the entity is invalid or has no `T`.
    #[track_caller]
    pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> &mut T {
        let name = &self.name;
        match self.registry.get_mut::<T>(entity.id()) {
            Some(component) if entity.scene() == self.id => component,
            _ => panic!(
                "{:?} has no {} in scene '{}'",
                entity,
                core::any::type_name::<T>(),
                name
            ),
        }
    }

    pub fn try_get_component<T: Component>(&self, entity: Entity) -> Option<&T> {
        if entity.scene() != self.id {
            return None;
        }
        self.registry.get::<T>(entity.id())
    }

    pub fn try_get_component_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        if entity.scene() != self.id {
            return None;
        }
        self.registry.get_mut::<T>(entity.id())
    }

    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        entity.scene() == self.id && self.registry.contains::<T>(entity.id())
    }

    /// # Panics
    ///
    /// Panics if the entity has no `T`.
    #[track_caller]
    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> T {
        self.assert_valid(entity);
        let Some(mut component) = self.registry.remove::<T>(entity.id()) else {
            panic!(
                "cannot remove missing {} from {:?}",
                core::any::type_name::<T>(),
                entity
            );
        };
        component.on_removed(self, entity);
        component
    }

    /// Iterate every entity carrying `T`
    pub fn view<T: Component>(&self) -> impl Iterator<Item = (Entity, &T)> {
        let scene = self.id;
        self.registry
            .view::<T>()
            .map(move |(id, component)| (Entity::new(id, scene), component))
    }

    /// Snapshot of the entities carrying `T`
    pub fn entities_with<T: Component>(&self) -> Vec<Entity> {
        self.registry
            .entities_with::<T>()
            .into_iter()
            .map(|id| Entity::new(id, self.id))
            .collect()
    }

    // ==================== Relationships ====================

    /// Make `parent` the parent of `entity`, detaching it from any previous one
    pub fn set_parent(&mut self, entity: Entity, parent: Entity) -> Result<()> {
        self.assert_valid(entity);
        self.assert_valid(parent);

        let child_uuid = self.uuid(entity);
        let parent_uuid = self.uuid(parent);
        if entity == parent || self.is_ancestor(entity, parent) {
            return Err(SceneError::CycleDetected {
                child: child_uuid,
                parent: parent_uuid,
            });
        }

        self.deparent(entity);
        self.get_component_mut::<RelationshipComponent>(entity).parent = parent_uuid;
        let siblings = &mut self.get_component_mut::<RelationshipComponent>(parent).children;
        if !siblings.contains(&child_uuid) {
            siblings.push(child_uuid);
        }
        Ok(())
    }

    /// Detach from the parent; a no-op for roots
    pub fn deparent(&mut self, entity: Entity) {
        let uuid = self.uuid(entity);
        let parent = self.get_component::<RelationshipComponent>(entity).parent;
        if parent.is_nil() {
            return;
        }

        if let Some(&parent_id) = self.entity_map.get(&parent) {
            if let Some(relationship) = self.registry.get_mut::<RelationshipComponent>(parent_id) {
                relationship.children.retain(|child| *child != uuid);
            }
        }
        self.get_component_mut::<RelationshipComponent>(entity).parent = Uuid::NIL;
    }

    /// The parent entity, or null for roots
    pub fn parent(&self, entity: Entity) -> Entity {
        self.get_entity(self.get_component::<RelationshipComponent>(entity).parent)
    }

    /// Direct children in stored order
    pub fn children(&self, entity: Entity) -> Vec<Entity> {
        self.get_component::<RelationshipComponent>(entity)
            .children
            .iter()
            .map(|&child| self.get_entity(child))
            .filter(|child| !child.is_null())
            .collect()
    }

    /// Entities without a parent in this scene
    pub fn root_entities(&self) -> Vec<Entity> {
        self.view::<RelationshipComponent>()
            .filter(|(_, relationship)| !self.has_entity(relationship.parent))
            .map(|(entity, _)| entity)
            .collect()
    }

    /// True when `ancestor` is somewhere above `entity`
    pub fn is_ancestor(&self, ancestor: Entity, entity: Entity) -> bool {
        let target = self.uuid(ancestor);
        let mut current = self.get_component::<RelationshipComponent>(entity).parent;
        for _ in 0..self.entity_map.len() {
            if current.is_nil() {
                return false;
            }
            if current == target {
                return true;
            }
            current = match self
                .entity_map
                .get(&current)
                .and_then(|&id| self.registry.get::<RelationshipComponent>(id))
            {
                Some(relationship) => relationship.parent,
                None => return false,
            };
        }
        false
    }

    /// Local transform composed with every ancestor's, computed on each call
    pub fn world_transform(&self, entity: Entity) -> Mat4 {
        let mut transform = self.get_component::<TransformComponent>(entity).matrix();
        let mut parent = self.get_component::<RelationshipComponent>(entity).parent;

        for _ in 0..self.entity_map.len() {
            let Some(&parent_id) = self.entity_map.get(&parent) else {
                break;
            };
            let (Some(local), Some(relationship)) = (
                self.registry.get::<TransformComponent>(parent_id),
                self.registry.get::<RelationshipComponent>(parent_id),
            ) else {
                break;
            };
            transform = local.matrix() * transform;
            parent = relationship.parent;
        }
        transform
    }

    // ==================== Viewport ====================

    /// Store the viewport size and update every camera without a fixed aspect
    pub fn on_viewport_resize(&mut self, width: u32, height: u32) {
        self.viewport_width = width;
        self.viewport_height = height;

        for (_, camera) in self.registry.view_mut::<CameraComponent>() {
            if !camera.fixed_aspect_ratio {
                camera.camera.set_viewport_size(width, height);
            }
        }
        self.viewport_dirty = false;
    }

    pub fn viewport_size(&self) -> (u32, u32) {
        (self.viewport_width, self.viewport_height)
    }

    /// True until the first resize after creation or copy
    pub fn is_viewport_dirty(&self) -> bool {
        self.viewport_dirty
    }

    // ==================== Cameras & sprites ====================

    /// The enabled primary camera with the lowest UUID, or null
    pub fn primary_camera_entity(&self) -> Entity {
        self.view::<CameraComponent>()
            .filter(|(entity, camera)| {
                camera.primary && self.get_component::<TagComponent>(*entity).enabled
            })
            .min_by_key(|(entity, _)| self.uuid(*entity))
            .map(|(entity, _)| entity)
            .unwrap_or(Entity::NULL)
    }

    /// Reorder sprite storage by sorting order
    pub fn sort_for_sprites(&mut self) {
        self.registry
            .sort::<SpriteRendererComponent, _>(|a, b| a.sorting_order.cmp(&b.sorting_order));
    }

    // ==================== Copying ====================

    /// Copy every entity and every copyable component into `other`
    ///
    /// UUIDs, names and the relationship graph are preserved. Settings, the
    /// layer table, the viewport and the script engine are carried over.
    /// Components the component table marks as not copyable are dropped.
    ///
    /// # Panics
    ///
    /// Panics if `other` already holds one of the UUIDs.
    pub fn copy_to(&self, other: &mut Scene) {
        other.physics_settings = self.physics_settings.clone();
        other.layers = self.layers.clone();
        other.viewport_width = self.viewport_width;
        other.viewport_height = self.viewport_height;
        other.viewport_dirty = true;
        other.script_engine = self.script_engine.clone();

        let entities = self.entities();
        let mut pairs = Vec::with_capacity(entities.len());
        for &source in &entities {
            let uuid = self.uuid(source);
            let copy = other.create_entity_with_uuid(uuid, self.tag(source));
            pairs.push((source, copy));
        }

        for &(source, copy) in &pairs {
            let relationship = self.get_component::<RelationshipComponent>(source).clone();
            *other.get_component_mut::<RelationshipComponent>(copy) = relationship;
        }

        for &(source, copy) in &pairs {
            for entry in component_table().iter().filter(|e| e.is_copyable()) {
                entry.copy_between(self, source, other, copy);
            }
        }
        log::debug!(
            "Copied {} entities from scene '{}' into '{}'",
            pairs.len(),
            self.name,
            other.name
        );
    }

    /// A new scene holding a copy of this one
    pub fn copy(&self) -> Scene {
        let mut other = Scene::new(self.name.clone());
        self.copy_to(&mut other);
        other
    }

    /// Clone an entity under the same parent with a fresh UUID
    ///
    /// Script classes and children are not duplicated.
    pub fn duplicate(&mut self, entity: Entity) -> Entity {
        self.assert_valid(entity);
        let name = self.tag(entity).to_string();
        let copy = self.create_entity(&name);

        for entry in component_table()
            .iter()
            .filter(|e| e.is_copyable() && e.name != "ScriptComponent")
        {
            entry.copy_within(self, entity, copy);
        }

        let parent = self.parent(entity);
        if self.is_valid(parent) {
            if let Err(e) = self.set_parent(copy, parent) {
                log::error!("Failed to parent duplicate of '{}': {}", name, e);
            }
        }
        copy
    }
}
