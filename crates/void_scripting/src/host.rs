//! The managed script host interface
//!
//! A host owns the assemblies and the objects created from their classes.
//! The engine only ever sees opaque object and method handles.

use std::path::Path;

use glam::Vec2;
use void_core::Uuid;

use crate::field::{FieldValue, ScriptClass};
use crate::Result;

/// A live object inside the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectHandle(pub u64);

/// A resolved method of a script class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodHandle(pub u64);

/// Payload of the 2D collision callbacks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collision2DData {
    /// The other entity in the contact
    pub entity_id: Uuid,
    pub relative_velocity: Vec2,
}

/// Argument passed to a script method
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptArg {
    Float(f32),
    Collision2D(Collision2DData),
}

/// An external runtime that hosts script classes
pub trait ScriptHost: Send {
    /// Load an assembly and make its classes available
    fn load_assembly(&mut self, path: &Path) -> Result<()>;

    /// Drop every loaded assembly, called before a reload
    fn unload_assemblies(&mut self);

    /// Classes exported by the loaded assemblies
    fn classes(&self) -> Vec<ScriptClass>;

    /// Create an object of `class` bound to `entity`
    fn instantiate(&mut self, class: &str, entity: Uuid) -> Result<ObjectHandle>;

    /// Release an object created by `instantiate`
    fn release(&mut self, object: ObjectHandle);

    /// Look up a method by name and parameter count
    fn find_method(&self, class: &str, name: &str, param_count: usize) -> Option<MethodHandle>;

    fn invoke(&mut self, object: ObjectHandle, method: MethodHandle, args: &[ScriptArg])
        -> Result<()>;

    fn get_field(&self, object: ObjectHandle, field: &str) -> Option<FieldValue>;

    fn set_field(&mut self, object: ObjectHandle, field: &str, value: &FieldValue) -> Result<()>;

    fn get_field_string(&self, object: ObjectHandle, field: &str) -> Option<String>;

    fn set_field_string(&mut self, object: ObjectHandle, field: &str, value: &str) -> Result<()>;
}
