//! Scene error types

use thiserror::Error;
use void_core::Uuid;

/// Errors raised by scene operations and (de)serialization
#[derive(Debug, Error)]
pub enum SceneError {
    /// Re-parenting would make an entity its own ancestor
    #[error("Parenting {child} under {parent} would create a cycle")]
    CycleDetected { child: Uuid, parent: Uuid },

    /// A document is missing a required key
    #[error("Document is missing key '{0}'")]
    MissingKey(&'static str),

    /// The entity is already the root of a prefab
    #[error("Entity {0} is already a prefab instance")]
    AlreadyPrefab(Uuid),

    /// Malformed document content
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Config write error: {0}")]
    TomlWrite(#[from] toml::ser::Error),

    #[error("Physics error: {0}")]
    Physics(#[from] void_physics::PhysicsError),

    #[error("Script error: {0}")]
    Script(#[from] void_scripting::ScriptError),
}

/// Result type for scene operations
pub type Result<T> = std::result::Result<T, SceneError>;
