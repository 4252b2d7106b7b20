//! Entity handles
//!
//! An [`Entity`] is a registry slot plus the id of the scene that owns it.
//! It holds no data; every operation goes through the owning [`Scene`].
//!
//! [`Scene`]: crate::Scene

use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};
use void_ecs::EntityId;

/// Identifies one scene instance for the lifetime of the process
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SceneId(u64);

static NEXT_SCENE_ID: AtomicU64 = AtomicU64::new(1);

impl SceneId {
    /// No scene
    pub const NONE: Self = Self(0);

    pub(crate) fn next() -> Self {
        Self(NEXT_SCENE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn is_none(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SceneId({})", self.0)
    }
}

/// Handle to an entity inside a scene
///
/// Two handles are equal when they name the same slot of the same scene.
/// The default handle is null and never valid.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Entity {
    id: EntityId,
    scene: SceneId,
}

impl Entity {
    /// The null handle
    pub const NULL: Self = Self {
        id: EntityId::null(),
        scene: SceneId::NONE,
    };

    #[inline]
    pub(crate) fn new(id: EntityId, scene: SceneId) -> Self {
        Self { id, scene }
    }

    #[inline]
    pub fn id(&self) -> EntityId {
        self.id
    }

    #[inline]
    pub fn scene(&self) -> SceneId {
        self.scene
    }

    /// True for handles that were never bound to a scene
    ///
    /// A non-null handle can still be stale; use `Scene::is_valid` for that.
    #[inline]
    pub fn is_null(&self) -> bool {
        self.scene.is_none() || self.id.is_null()
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "Entity(null)")
        } else {
            write!(f, "Entity({}, {:?})", self.id, self.scene)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_entity() {
        assert!(Entity::default().is_null());
        assert_eq!(Entity::default(), Entity::NULL);
    }

    #[test]
    fn test_scene_ids_are_unique() {
        let a = SceneId::next();
        let b = SceneId::next();
        assert_ne!(a, b);
        assert!(!a.is_none());
    }
}
