//! Error types for the physics bridge

use thiserror::Error;
use void_core::Uuid;

/// Physics bridge errors
#[derive(Debug, Error)]
pub enum PhysicsError {
    /// Rigid body not found
    #[error("Rigid body not found for entity {0}")]
    BodyNotFound(Uuid),

    /// Collider not found in the world
    #[error("Collider not found")]
    ColliderNotFound,

    /// Joint not found in the world
    #[error("Joint not found")]
    JointNotFound,

    /// Invalid configuration
    #[error("Invalid physics configuration: {0}")]
    InvalidConfig(String),

    /// The world already holds the configured maximum number of bodies
    #[error("Body limit of {0} reached")]
    BodyLimitReached(u32),

    /// Invalid collision layer
    #[error("Invalid collision layer: {0}")]
    InvalidLayer(String),

    /// Shape creation failed
    #[error("Failed to create collision shape: {0}")]
    ShapeCreationFailed(String),
}

/// Result type for physics operations
pub type Result<T> = std::result::Result<T, PhysicsError>;
