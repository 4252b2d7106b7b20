//! Rigid body components
//!
//! Field defaults match what an entity gets when a rigidbody is added in the
//! editor. Runtime handles are skipped by serde and only populated while a
//! physics world exists.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// How a body responds to the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BodyType {
    /// Never moves, infinite mass
    Static,
    /// Moved by velocity only, pushes dynamic bodies
    Kinematic,
    /// Fully simulated
    #[default]
    Dynamic,
}

impl From<BodyType> for rapier2d::prelude::RigidBodyType {
    fn from(t: BodyType) -> Self {
        match t {
            BodyType::Static => rapier2d::prelude::RigidBodyType::Fixed,
            BodyType::Kinematic => rapier2d::prelude::RigidBodyType::KinematicVelocityBased,
            BodyType::Dynamic => rapier2d::prelude::RigidBodyType::Dynamic,
        }
    }
}

impl From<BodyType> for rapier3d::prelude::RigidBodyType {
    fn from(t: BodyType) -> Self {
        match t {
            BodyType::Static => rapier3d::prelude::RigidBodyType::Fixed,
            BodyType::Kinematic => rapier3d::prelude::RigidBodyType::KinematicVelocityBased,
            BodyType::Dynamic => rapier3d::prelude::RigidBodyType::Dynamic,
        }
    }
}

/// Handle to a body in a [`PhysicsWorld2D`](crate::world2d::PhysicsWorld2D)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle2D(pub(crate) rapier2d::prelude::RigidBodyHandle);

/// Handle to a body in a [`PhysicsWorld3D`](crate::world3d::PhysicsWorld3D)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle3D(pub(crate) rapier3d::prelude::RigidBodyHandle);

/// Live state of a 2D body, owned by the component while the scene runs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body2DRuntime {
    pub handle: BodyHandle2D,
    /// (x, y, angle) after the previous fixed step
    pub previous: Vec3,
    /// (x, y, angle) after the latest fixed step
    pub current: Vec3,
}

impl Body2DRuntime {
    pub fn new(handle: BodyHandle2D, translation_rotation: Vec3) -> Self {
        Self {
            handle,
            previous: translation_rotation,
            current: translation_rotation,
        }
    }

    /// Record a new simulated state
    pub fn push(&mut self, translation_rotation: Vec3) {
        self.previous = self.current;
        self.current = translation_rotation;
    }

    /// Blend between the last two states
    pub fn lerp(&self, factor: f32) -> Vec3 {
        self.previous.lerp(self.current, factor.clamp(0.0, 1.0))
    }
}

/// Live state of a 3D body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body3DRuntime {
    pub handle: BodyHandle3D,
    pub previous_translation: Vec3,
    pub previous_rotation: Quat,
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Body3DRuntime {
    pub fn new(handle: BodyHandle3D, translation: Vec3, rotation: Quat) -> Self {
        Self {
            handle,
            previous_translation: translation,
            previous_rotation: rotation,
            translation,
            rotation,
        }
    }

    pub fn push(&mut self, translation: Vec3, rotation: Quat) {
        self.previous_translation = self.translation;
        self.previous_rotation = self.rotation;
        self.translation = translation;
        self.rotation = rotation;
    }

    pub fn lerp(&self, factor: f32) -> (Vec3, Quat) {
        let t = factor.clamp(0.0, 1.0);
        (
            self.previous_translation.lerp(self.translation, t),
            self.previous_rotation.slerp(self.rotation, t),
        )
    }
}

/// 2D rigid body settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Rigidbody2DComponent {
    #[serde(rename = "BodyType")]
    pub body_type: BodyType,
    /// Used when `auto_mass` is off
    pub mass: f32,
    pub linear_drag: f32,
    pub angular_drag: f32,
    pub gravity_scale: f32,
    /// Derive mass from fixture densities
    pub auto_mass: bool,
    pub allow_sleep: bool,
    pub awake: bool,
    /// Continuous collision detection
    pub continuous: bool,
    /// Blend transform read-back between fixed steps
    pub interpolation: bool,
    pub freeze_rotation: bool,

    #[serde(skip)]
    pub runtime: Option<Body2DRuntime>,
}

impl Default for Rigidbody2DComponent {
    fn default() -> Self {
        Self {
            body_type: BodyType::Dynamic,
            mass: 1.0,
            linear_drag: 0.0,
            angular_drag: 0.05,
            gravity_scale: 1.0,
            auto_mass: true,
            allow_sleep: true,
            awake: true,
            continuous: false,
            interpolation: true,
            freeze_rotation: false,
            runtime: None,
        }
    }
}

impl Rigidbody2DComponent {
    /// A dynamic body
    pub fn dynamic() -> Self {
        Self::default()
    }

    /// A static body
    pub fn fixed() -> Self {
        Self {
            body_type: BodyType::Static,
            ..Default::default()
        }
    }

    /// Mass is set explicitly rather than derived from fixtures
    pub fn overrides_mass(&self) -> bool {
        !self.auto_mass && self.mass > 0.01
    }

    /// Copy of the settings with no runtime state
    pub fn detached(&self) -> Self {
        Self {
            runtime: None,
            ..self.clone()
        }
    }
}

/// 3D rigid body settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RigidbodyComponent {
    #[serde(rename = "BodyType")]
    pub body_type: BodyType,
    pub mass: f32,
    pub linear_drag: f32,
    pub angular_drag: f32,
    pub gravity_scale: f32,
    pub auto_mass: bool,
    pub allow_sleep: bool,
    pub awake: bool,
    pub continuous: bool,
    pub interpolation: bool,
    /// Every shape on the body becomes a trigger volume
    pub is_sensor: bool,

    #[serde(skip)]
    pub runtime: Option<Body3DRuntime>,
}

impl Default for RigidbodyComponent {
    fn default() -> Self {
        Self {
            body_type: BodyType::Dynamic,
            mass: 1.0,
            linear_drag: 0.0,
            angular_drag: 0.05,
            gravity_scale: 1.0,
            auto_mass: true,
            allow_sleep: true,
            awake: true,
            continuous: false,
            interpolation: true,
            is_sensor: false,
            runtime: None,
        }
    }
}

impl RigidbodyComponent {
    pub fn overrides_mass(&self) -> bool {
        !self.auto_mass
    }

    pub fn detached(&self) -> Self {
        Self {
            runtime: None,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rigidbody2d_defaults() {
        let rb = Rigidbody2DComponent::default();
        assert_eq!(rb.body_type, BodyType::Dynamic);
        assert!(rb.auto_mass);
        assert!(!rb.overrides_mass());
        assert!(rb.runtime.is_none());
    }

    #[test]
    fn test_overrides_mass_threshold() {
        let mut rb = Rigidbody2DComponent {
            auto_mass: false,
            mass: 2.0,
            ..Default::default()
        };
        assert!(rb.overrides_mass());
        rb.mass = 0.001;
        assert!(!rb.overrides_mass());
    }

    #[test]
    fn test_runtime_lerp() {
        let mut runtime = Body2DRuntime::new(
            BodyHandle2D(rapier2d::prelude::RigidBodyHandle::invalid()),
            Vec3::ZERO,
        );
        runtime.push(Vec3::new(2.0, 4.0, 1.0));
        let mid = runtime.lerp(0.5);
        assert_relative_eq!(mid.x, 1.0);
        assert_relative_eq!(mid.y, 2.0);
        assert_relative_eq!(mid.z, 0.5);
    }
}
