//! # void_ecs - Sparse-set Entity Component Registry
//!
//! Storage layer underneath a scene:
//! - Generational [`EntityId`]s so stale handles are detected after a slot is reused
//! - One [`SparseSet`] per component type: dense arrays, swap-remove on erase
//! - A type-erased [`Registry`] exposing add/get/has/remove/view by component type
//!
//! ## Example
//!
//! ```
//! use void_ecs::prelude::*;
//!
//! #[derive(Debug, PartialEq)]
//! struct Position(f32, f32);
//!
//! let mut registry = Registry::new();
//! let entity = registry.create();
//! registry.insert(entity, Position(1.0, 2.0));
//!
//! assert!(registry.contains::<Position>(entity));
//! assert_eq!(registry.get::<Position>(entity), Some(&Position(1.0, 2.0)));
//!
//! registry.destroy(entity);
//! assert!(!registry.is_alive(entity));
//! ```

pub mod entity;
pub mod registry;
pub mod sparse_set;

pub use entity::{EntityAllocator, EntityId};
pub use registry::Registry;
pub use sparse_set::SparseSet;

/// Prelude - commonly used types
pub mod prelude {
    pub use crate::entity::{EntityAllocator, EntityId};
    pub use crate::registry::Registry;
    pub use crate::sparse_set::SparseSet;
}
