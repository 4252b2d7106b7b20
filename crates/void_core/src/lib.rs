//! # void_core - Void Engine Core
//!
//! Small primitives shared by every scene crate:
//! - [`Uuid`]: the durable 64-bit identity of an entity
//! - [`Timestep`]: elapsed frame time handed to update callbacks

pub mod id;
pub mod time;

pub use id::Uuid;
pub use time::Timestep;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::id::Uuid;
    pub use crate::time::Timestep;
}
