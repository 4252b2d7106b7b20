//! Script bridge
//!
//! Keeps one live script object per (entity, class) pair while the scene
//! runs. Field access goes to the live object when one exists and to the
//! component's editor-time buffer otherwise.

use void_core::{Timestep, Uuid};
use void_scripting::{ComponentBridge, FieldValue, ScriptError};

use crate::component_table::component_table;
use crate::components::ScriptComponent;
use crate::entity::Entity;
use crate::error::Result;
use crate::Scene;

impl Scene {
    // ==================== Lifecycle ====================

    /// Create the objects of every class on `entity`, then call `OnCreate`
    ///
    /// Buffers are synced against the current class declarations first, so
    /// values whose declared type changed are dropped before seeding.
    pub(crate) fn instantiate_scripts(&mut self, entity: Entity) {
        let Some(engine) = self.script_engine.clone() else {
            return;
        };
        let uuid = self.uuid(entity);
        let Some(scripts) = self.try_get_component_mut::<ScriptComponent>(entity) else {
            return;
        };

        let mut engine = engine.lock();
        for class in &mut scripts.classes {
            engine.sync_field_buffer(&class.name, &mut class.fields);
            if let Err(e) = engine.create_instance(uuid, &class.name, &class.fields) {
                log::error!(
                    "Failed to instantiate script {} on entity {}: {}",
                    class.name,
                    uuid,
                    e
                );
            }
        }
        for class in scripts.class_names() {
            engine.invoke_on_create(uuid, class);
        }
    }

    /// Call `OnDestroy` on each class of `scripts` and release the objects
    ///
    /// The class list itself is left alone.
    pub(crate) fn destroy_scripts(&self, uuid: Uuid, scripts: &ScriptComponent) {
        let Some(engine) = self.script_engine.as_ref() else {
            return;
        };
        let mut engine = engine.lock();
        for class in scripts.class_names() {
            engine.invoke_on_destroy(uuid, class);
            engine.remove_instance(uuid, class);
        }
    }

    pub(crate) fn start_scripts(&mut self) {
        if self.script_engine.is_none() {
            return;
        }
        for entity in self.entities_with::<ScriptComponent>() {
            self.instantiate_scripts(entity);
        }
    }

    /// Call `OnUpdate` on every live object
    pub(crate) fn update_scripts(&self, ts: Timestep) {
        let Some(engine) = self.script_engine.as_ref() else {
            return;
        };
        let mut engine = engine.lock();
        for (entity, scripts) in self.view::<ScriptComponent>() {
            let uuid = self.uuid(entity);
            for class in scripts.class_names() {
                engine.invoke_on_update(uuid, class, ts.seconds());
            }
        }
    }

    pub(crate) fn stop_scripts(&self) {
        for (entity, scripts) in self.view::<ScriptComponent>() {
            self.destroy_scripts(self.uuid(entity), scripts);
        }
    }

    // ==================== Fields ====================

    /// Drop stale values and fill in defaults for every class on `entity`
    pub fn sync_script_fields(&mut self, entity: Entity) {
        let Some(engine) = self.script_engine.clone() else {
            return;
        };
        let Some(scripts) = self.try_get_component_mut::<ScriptComponent>(entity) else {
            return;
        };
        let engine = engine.lock();
        for class in &mut scripts.classes {
            engine.sync_field_buffer(&class.name, &mut class.fields);
        }
    }

    /// Current value of a script field, from the live object or the buffer
    pub fn get_script_field(&self, entity: Entity, class: &str, field: &str) -> Option<FieldValue> {
        let entry = self.try_get_component::<ScriptComponent>(entity)?.class(class)?;
        match self.script_engine.as_ref() {
            Some(engine) => engine
                .lock()
                .get_field(self.uuid(entity), class, field, &entry.fields),
            None => entry.fields.get(field).cloned(),
        }
    }

    pub fn set_script_field(
        &mut self,
        entity: Entity,
        class: &str,
        field: &str,
        value: FieldValue,
    ) -> Result<()> {
        let uuid = self.uuid(entity);
        let engine = self.script_engine.clone();
        let entry = self.script_class_mut(entity, class)?;
        match engine {
            Some(engine) => engine
                .lock()
                .set_field(uuid, class, field, value, &mut entry.fields)?,
            None => {
                entry.fields.insert(field.to_string(), value);
            }
        }
        Ok(())
    }

    pub fn get_script_field_string(&self, entity: Entity, class: &str, field: &str) -> Option<String> {
        let entry = self.try_get_component::<ScriptComponent>(entity)?.class(class)?;
        match self.script_engine.as_ref() {
            Some(engine) => engine
                .lock()
                .get_field_string(self.uuid(entity), class, field, &entry.fields),
            None => entry.fields.get(field).map(FieldValue::to_field_string),
        }
    }

    /// Write a field from text
    ///
    /// Without an engine the text is parsed as the type already stored in
    /// the buffer, so the field must have a value.
    pub fn set_script_field_string(
        &mut self,
        entity: Entity,
        class: &str,
        field: &str,
        value: &str,
    ) -> Result<()> {
        let uuid = self.uuid(entity);
        let engine = self.script_engine.clone();
        let entry = self.script_class_mut(entity, class)?;
        match engine {
            Some(engine) => engine
                .lock()
                .set_field_string(uuid, class, field, value, &mut entry.fields)?,
            None => {
                let ty = entry
                    .fields
                    .get(field)
                    .map(FieldValue::field_type)
                    .ok_or_else(|| ScriptError::FieldNotFound {
                        class: class.to_string(),
                        field: field.to_string(),
                    })?;
                let parsed = FieldValue::parse(ty, value).ok_or_else(|| {
                    ScriptError::CallError(format!("cannot parse {:?} from {:?}", ty, value))
                })?;
                entry.fields.insert(field.to_string(), parsed);
            }
        }
        Ok(())
    }

    fn script_class_mut(
        &mut self,
        entity: Entity,
        class: &str,
    ) -> Result<&mut crate::components::ScriptClassEntry> {
        self.try_get_component_mut::<ScriptComponent>(entity)
            .and_then(|scripts| scripts.class_mut(class))
            .ok_or_else(|| ScriptError::ClassNotFound(class.to_string()).into())
    }
}

/// Component access by type tag for script code
///
/// Built from the component table: every entry can be queried, serializable
/// entries can be read as JSON, addable entries can be added.
pub fn component_bridge() -> ComponentBridge<Scene> {
    let mut bridge = ComponentBridge::new();
    for entry in component_table() {
        bridge.register(
            entry.name,
            move |scene: &Scene, uuid| {
                let entity = scene.get_entity(uuid);
                scene.is_valid(entity) && entry.has(scene, entity)
            },
            move |scene: &mut Scene, uuid| {
                let entity = scene.get_entity(uuid);
                if !scene.is_valid(entity) || entry.has(scene, entity) {
                    return;
                }
                if !entry.add_default(scene, entity) {
                    log::warn!("{} cannot be added from scripts", entry.name);
                }
            },
            move |scene: &Scene, uuid| {
                let entity = scene.get_entity(uuid);
                if !scene.is_valid(entity) {
                    return None;
                }
                match entry.serialize(scene, entity)? {
                    Ok(value) => Some(value),
                    Err(e) => {
                        log::error!("Failed to read {} for scripts: {}", entry.name, e);
                        None
                    }
                }
            },
        );
    }
    bridge
}
