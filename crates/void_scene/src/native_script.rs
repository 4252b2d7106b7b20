//! Rust-side scripts
//!
//! A [`NativeScriptComponent`] stores a constructor. The live object exists
//! only while the scene runs and is stepped right after managed scripts.

use core::fmt;

use void_core::Timestep;

use crate::entity::Entity;
use crate::Scene;

/// Behaviour attached to an entity from Rust code
pub trait NativeScript: Send + Sync {
    fn on_create(&mut self, _scene: &mut Scene, _entity: Entity) {}

    fn on_update(&mut self, _scene: &mut Scene, _entity: Entity, _ts: Timestep) {}

    fn on_destroy(&mut self, _scene: &mut Scene, _entity: Entity) {}
}

/// Constructor for a native script object
pub type NativeScriptFactory = fn() -> Box<dyn NativeScript>;

pub struct NativeScriptComponent {
    factory: NativeScriptFactory,
    pub(crate) instance: Option<Box<dyn NativeScript>>,
}

impl NativeScriptComponent {
    pub fn new(factory: NativeScriptFactory) -> Self {
        Self {
            factory,
            instance: None,
        }
    }

    /// Component for a script type with a `Default` constructor
    pub fn bind<S: NativeScript + Default + 'static>() -> Self {
        Self::new(|| -> Box<dyn NativeScript> { Box::new(S::default()) })
    }

    pub fn is_instantiated(&self) -> bool {
        self.instance.is_some()
    }

    pub(crate) fn instantiate(&self) -> Box<dyn NativeScript> {
        (self.factory)()
    }
}

// Copies never share the live object
impl Clone for NativeScriptComponent {
    fn clone(&self) -> Self {
        Self::new(self.factory)
    }
}

impl fmt::Debug for NativeScriptComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeScriptComponent")
            .field("instantiated", &self.is_instantiated())
            .finish()
    }
}

impl Scene {
    /// Construct and create the native script of one entity
    pub(crate) fn create_native_script(&mut self, entity: Entity) {
        let Some(native) = self.try_get_component::<NativeScriptComponent>(entity) else {
            return;
        };
        if native.is_instantiated() {
            return;
        }
        let mut instance = native.instantiate();
        instance.on_create(self, entity);
        self.restore_native_script(entity, instance);
    }

    pub(crate) fn start_native_scripts(&mut self) {
        for entity in self.entities_with::<NativeScriptComponent>() {
            self.create_native_script(entity);
        }
    }

    /// Step every live native script
    ///
    /// The object is taken out of its component for the call so it can
    /// borrow the scene mutably.
    pub(crate) fn update_native_scripts(&mut self, ts: Timestep) {
        for entity in self.entities_with::<NativeScriptComponent>() {
            if !self.is_valid(entity) {
                continue;
            }
            let Some(mut instance) = self
                .try_get_component_mut::<NativeScriptComponent>(entity)
                .and_then(|native| native.instance.take())
            else {
                continue;
            };
            instance.on_update(self, entity, ts);
            self.restore_native_script(entity, instance);
        }
    }

    pub(crate) fn stop_native_scripts(&mut self) {
        for entity in self.entities_with::<NativeScriptComponent>() {
            self.destroy_native_script(entity);
        }
    }

    pub(crate) fn destroy_native_script(&mut self, entity: Entity) {
        let Some(mut instance) = self
            .try_get_component_mut::<NativeScriptComponent>(entity)
            .and_then(|native| native.instance.take())
        else {
            return;
        };
        instance.on_destroy(self, entity);
    }

    /// Put the object back into its component
    ///
    /// If the script destroyed its entity or removed or replaced the
    /// component while it was out, nothing will destroy it later, so it is
    /// destroyed here.
    fn restore_native_script(&mut self, entity: Entity, mut instance: Box<dyn NativeScript>) {
        let slot = self
            .is_valid(entity)
            .then(|| self.try_get_component_mut::<NativeScriptComponent>(entity))
            .flatten()
            .filter(|native| native.instance.is_none());
        match slot {
            Some(native) => native.instance = Some(instance),
            None => instance.on_destroy(self, entity),
        }
    }
}
