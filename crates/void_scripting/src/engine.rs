//! Script engine: class registry, live instances and field routing

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use void_core::Uuid;

use crate::field::{FieldBuffer, FieldValue, ScriptClass};
use crate::host::{Collision2DData, ScriptHost};
use crate::instance::{CollisionCallback, ScriptInstance};
use crate::{Result, ScriptError};

/// Owns the host, the class table and every live instance of one running scene
pub struct ScriptEngine {
    host: Box<dyn ScriptHost>,
    assemblies: Vec<PathBuf>,
    classes: HashMap<String, ScriptClass>,
    instances: HashMap<(Uuid, String), ScriptInstance>,
}

impl ScriptEngine {
    pub fn new(host: Box<dyn ScriptHost>) -> Self {
        Self {
            host,
            assemblies: Vec::new(),
            classes: HashMap::new(),
            instances: HashMap::new(),
        }
    }

    pub fn host(&self) -> &dyn ScriptHost {
        self.host.as_ref()
    }

    pub fn host_mut(&mut self) -> &mut dyn ScriptHost {
        self.host.as_mut()
    }

    // ==================== Assemblies & classes ====================

    /// Load an assembly and refresh the class table
    pub fn load_assembly(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.host.load_assembly(path)?;
        self.assemblies.push(path.to_path_buf());
        self.refresh_classes();
        log::info!(
            "Loaded assembly {} ({} classes)",
            path.display(),
            self.classes.len()
        );
        Ok(())
    }

    /// Unload every assembly and load them again
    ///
    /// Not allowed while instances are alive.
    pub fn reload(&mut self) -> Result<()> {
        if !self.instances.is_empty() {
            return Err(ScriptError::InvalidState(format!(
                "cannot reload with {} live instances",
                self.instances.len()
            )));
        }
        self.host.unload_assemblies();
        self.classes.clear();
        for path in &self.assemblies {
            self.host.load_assembly(path)?;
        }
        self.refresh_classes();
        log::info!("Reloaded {} assemblies", self.assemblies.len());
        Ok(())
    }

    fn refresh_classes(&mut self) {
        self.classes = self
            .host
            .classes()
            .into_iter()
            .map(|class| (class.name.clone(), class))
            .collect();
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn class(&self, name: &str) -> Option<&ScriptClass> {
        self.classes.get(name)
    }

    pub fn classes(&self) -> impl Iterator<Item = &ScriptClass> {
        self.classes.values()
    }

    /// Bring a buffer in line with the current class declaration
    ///
    /// Values whose declared type changed are dropped, not converted.
    /// Fields the class no longer declares are dropped. Declared fields
    /// missing from the buffer get their default.
    pub fn sync_field_buffer(&self, class: &str, buffer: &mut FieldBuffer) {
        let Some(class) = self.classes.get(class) else {
            return;
        };
        buffer.retain(|name, value| match class.fields.get(name) {
            Some(field) if field.ty == value.field_type() => true,
            Some(field) => {
                log::warn!(
                    "Discarding stale value of {}.{}: stored as {:?}, declared as {:?}",
                    class.name,
                    name,
                    value.field_type(),
                    field.ty
                );
                false
            }
            None => {
                log::debug!("Dropping removed field {}.{}", class.name, name);
                false
            }
        });
        for (name, field) in &class.fields {
            buffer
                .entry(name.clone())
                .or_insert_with(|| field.default.clone());
        }
    }

    // ==================== Instances ====================

    /// Create the live object for (entity, class), seeded from `buffer`
    pub fn create_instance(&mut self, entity: Uuid, class: &str, buffer: &FieldBuffer) -> Result<()> {
        let declared = self
            .classes
            .get(class)
            .ok_or_else(|| ScriptError::ClassNotFound(class.to_string()))?;

        let instance = ScriptInstance::new(self.host.as_mut(), class, entity)?;
        for (name, value) in buffer {
            match declared.fields.get(name) {
                Some(field) if field.ty == value.field_type() => {
                    self.host.set_field(instance.object(), name, value)?;
                }
                _ => log::warn!("Not seeding {}.{} on entity {}", class, name, entity),
            }
        }

        log::trace!("Created script instance {} for entity {}", class, entity);
        self.instances.insert((entity, class.to_string()), instance);
        Ok(())
    }

    pub fn has_instance(&self, entity: Uuid, class: &str) -> bool {
        self.instances.contains_key(&(entity, class.to_string()))
    }

    pub fn instance(&self, entity: Uuid, class: &str) -> Option<&ScriptInstance> {
        self.instances.get(&(entity, class.to_string()))
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Release the host object of one instance
    pub fn remove_instance(&mut self, entity: Uuid, class: &str) -> bool {
        match self.instances.remove(&(entity, class.to_string())) {
            Some(instance) => {
                self.host.release(instance.object());
                true
            }
            None => false,
        }
    }

    /// Release every instance
    pub fn clear_instances(&mut self) {
        for (_, instance) in self.instances.drain() {
            self.host.release(instance.object());
        }
    }

    pub fn invoke_on_create(&mut self, entity: Uuid, class: &str) {
        self.with_instance(entity, class, |instance, host| instance.invoke_on_create(host));
    }

    pub fn invoke_on_update(&mut self, entity: Uuid, class: &str, ts: f32) {
        self.with_instance(entity, class, |instance, host| {
            instance.invoke_on_update(host, ts)
        });
    }

    pub fn invoke_on_destroy(&mut self, entity: Uuid, class: &str) {
        self.with_instance(entity, class, |instance, host| instance.invoke_on_destroy(host));
    }

    pub fn invoke_collision(
        &mut self,
        entity: Uuid,
        class: &str,
        callback: CollisionCallback,
        data: Collision2DData,
    ) {
        self.with_instance(entity, class, |instance, host| {
            instance.invoke_collision(host, callback, data)
        });
    }

    /// Run a call on an instance, logging host failures
    fn with_instance<F>(&mut self, entity: Uuid, class: &str, call: F)
    where
        F: FnOnce(&ScriptInstance, &mut dyn ScriptHost) -> Result<()>,
    {
        let Some(instance) = self.instances.get(&(entity, class.to_string())) else {
            return;
        };
        if let Err(e) = call(instance, self.host.as_mut()) {
            log::error!("Script {} on entity {} failed: {}", class, entity, e);
        }
    }

    // ==================== Fields ====================

    /// Read a field from the live object if one exists, else from `buffer`
    pub fn get_field(
        &self,
        entity: Uuid,
        class: &str,
        field: &str,
        buffer: &FieldBuffer,
    ) -> Option<FieldValue> {
        match self.instance(entity, class) {
            Some(instance) => self.host.get_field(instance.object(), field),
            None => buffer.get(field).cloned(),
        }
    }

    /// Write a field to whichever store is authoritative
    pub fn set_field(
        &mut self,
        entity: Uuid,
        class: &str,
        field: &str,
        value: FieldValue,
        buffer: &mut FieldBuffer,
    ) -> Result<()> {
        self.check_field(class, field, &value)?;
        match self.instances.get(&(entity, class.to_string())) {
            Some(instance) => self.host.set_field(instance.object(), field, &value),
            None => {
                buffer.insert(field.to_string(), value);
                Ok(())
            }
        }
    }

    pub fn get_field_string(
        &self,
        entity: Uuid,
        class: &str,
        field: &str,
        buffer: &FieldBuffer,
    ) -> Option<String> {
        match self.instance(entity, class) {
            Some(instance) => self.host.get_field_string(instance.object(), field),
            None => buffer.get(field).map(FieldValue::to_field_string),
        }
    }

    /// Write a field from its text form
    pub fn set_field_string(
        &mut self,
        entity: Uuid,
        class: &str,
        field: &str,
        value: &str,
        buffer: &mut FieldBuffer,
    ) -> Result<()> {
        if let Some(instance) = self.instances.get(&(entity, class.to_string())) {
            return self.host.set_field_string(instance.object(), field, value);
        }
        let ty = self.declared(class, field)?.ty;
        let parsed = FieldValue::parse(ty, value).ok_or_else(|| {
            ScriptError::CallError(format!("cannot parse {:?} from {:?}", ty, value))
        })?;
        buffer.insert(field.to_string(), parsed);
        Ok(())
    }

    fn declared(&self, class: &str, field: &str) -> Result<&crate::field::ScriptField> {
        self.classes
            .get(class)
            .ok_or_else(|| ScriptError::ClassNotFound(class.to_string()))?
            .field(field)
            .ok_or_else(|| ScriptError::FieldNotFound {
                class: class.to_string(),
                field: field.to_string(),
            })
    }

    fn check_field(&self, class: &str, field: &str, value: &FieldValue) -> Result<()> {
        let declared = self.declared(class, field)?;
        if declared.ty != value.field_type() {
            return Err(ScriptError::FieldTypeMismatch {
                field: field.to_string(),
                expected: declared.ty,
                found: value.field_type(),
            });
        }
        Ok(())
    }
}

impl Drop for ScriptEngine {
    fn drop(&mut self) {
        self.clear_instances();
    }
}
