//! Live script objects

use void_core::Uuid;

use crate::host::{Collision2DData, MethodHandle, ObjectHandle, ScriptArg, ScriptHost};
use crate::Result;

/// Which collision callback to invoke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollisionCallback {
    CollisionEnter2D,
    CollisionExit2D,
    SensorEnter2D,
    SensorExit2D,
}

impl CollisionCallback {
    pub fn method_name(self) -> &'static str {
        match self {
            CollisionCallback::CollisionEnter2D => "OnCollisionEnter2D",
            CollisionCallback::CollisionExit2D => "OnCollisionExit2D",
            CollisionCallback::SensorEnter2D => "OnSensorEnter2D",
            CollisionCallback::SensorExit2D => "OnSensorExit2D",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct MethodCache {
    on_create: Option<MethodHandle>,
    on_update: Option<MethodHandle>,
    on_destroy: Option<MethodHandle>,
    collision_enter_2d: Option<MethodHandle>,
    collision_exit_2d: Option<MethodHandle>,
    sensor_enter_2d: Option<MethodHandle>,
    sensor_exit_2d: Option<MethodHandle>,
}

/// One host object for one (entity, class) pair
///
/// Method handles are resolved once at creation. A missing method is
/// skipped on every call.
#[derive(Debug, Clone)]
pub struct ScriptInstance {
    entity: Uuid,
    class: String,
    object: ObjectHandle,
    methods: MethodCache,
}

impl ScriptInstance {
    /// Create the host object and resolve its callbacks
    pub fn new(host: &mut dyn ScriptHost, class: &str, entity: Uuid) -> Result<Self> {
        let object = host.instantiate(class, entity)?;
        let find = |name: &str, params: usize| host.find_method(class, name, params);
        let methods = MethodCache {
            on_create: find("OnCreate", 0),
            on_update: find("OnUpdate", 1),
            on_destroy: find("OnDestroy", 0),
            collision_enter_2d: find(CollisionCallback::CollisionEnter2D.method_name(), 1),
            collision_exit_2d: find(CollisionCallback::CollisionExit2D.method_name(), 1),
            sensor_enter_2d: find(CollisionCallback::SensorEnter2D.method_name(), 1),
            sensor_exit_2d: find(CollisionCallback::SensorExit2D.method_name(), 1),
        };
        Ok(Self {
            entity,
            class: class.to_string(),
            object,
            methods,
        })
    }

    pub fn entity(&self) -> Uuid {
        self.entity
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn object(&self) -> ObjectHandle {
        self.object
    }

    pub fn has_on_update(&self) -> bool {
        self.methods.on_update.is_some()
    }

    pub fn invoke_on_create(&self, host: &mut dyn ScriptHost) -> Result<()> {
        self.call(host, self.methods.on_create, &[])
    }

    pub fn invoke_on_update(&self, host: &mut dyn ScriptHost, ts: f32) -> Result<()> {
        self.call(host, self.methods.on_update, &[ScriptArg::Float(ts)])
    }

    pub fn invoke_on_destroy(&self, host: &mut dyn ScriptHost) -> Result<()> {
        self.call(host, self.methods.on_destroy, &[])
    }

    pub fn invoke_collision(
        &self,
        host: &mut dyn ScriptHost,
        callback: CollisionCallback,
        data: Collision2DData,
    ) -> Result<()> {
        let method = match callback {
            CollisionCallback::CollisionEnter2D => self.methods.collision_enter_2d,
            CollisionCallback::CollisionExit2D => self.methods.collision_exit_2d,
            CollisionCallback::SensorEnter2D => self.methods.sensor_enter_2d,
            CollisionCallback::SensorExit2D => self.methods.sensor_exit_2d,
        };
        self.call(host, method, &[ScriptArg::Collision2D(data)])
    }

    fn call(
        &self,
        host: &mut dyn ScriptHost,
        method: Option<MethodHandle>,
        args: &[ScriptArg],
    ) -> Result<()> {
        match method {
            Some(method) => host.invoke(self.object, method, args),
            None => Ok(()),
        }
    }
}
