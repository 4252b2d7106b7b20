//! # Void Scripting
//!
//! Bridge between scene entities and an external managed script host.
//!
//! ## Overview
//!
//! Script classes live in assemblies loaded by a [`ScriptHost`]. Each entity
//! with a script component gets one live object per class while the scene is
//! running. Outside of runtime, field values live in a [`FieldBuffer`] owned
//! by the component; [`ScriptEngine`] routes reads and writes to whichever
//! store is authoritative.
//!
//! Host methods the engine calls on script objects, when the class defines them:
//! - `OnCreate()` - after the object is created at runtime start
//! - `OnUpdate(ts)` - every runtime frame
//! - `OnDestroy()` - at runtime stop
//! - `OnCollisionEnter2D(data)` / `OnCollisionExit2D(data)`
//! - `OnSensorEnter2D(data)` / `OnSensorExit2D(data)`
//!
//! ## Example
//!
//! ```ignore
//! use void_scripting::{FieldBuffer, ScriptEngine};
//!
//! let mut engine = ScriptEngine::new(Box::new(my_host));
//! engine.load_assembly("Scripts/Game.dll")?;
//!
//! let buffer = FieldBuffer::new();
//! engine.create_instance(entity_uuid, "Game.Player", &buffer)?;
//! engine.invoke_on_create(entity_uuid, "Game.Player");
//! ```

mod bridge;
mod engine;
mod error;
mod field;
mod host;
mod instance;

pub use bridge::{ComponentBridge, ComponentFns};
pub use engine::ScriptEngine;
pub use error::{Result, ScriptError};
pub use field::{FieldBuffer, FieldType, FieldValue, ScriptClass, ScriptField};
pub use host::{Collision2DData, MethodHandle, ObjectHandle, ScriptArg, ScriptHost};
pub use instance::{CollisionCallback, ScriptInstance};
