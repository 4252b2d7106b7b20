//! 2D joint components
//!
//! A joint lives on the entity whose body is the first joint body and names
//! the second body by the UUID of its entity. Anchors are in the local
//! space of the body they belong to. Joints are created once both bodies
//! exist and are flattened into a [`Joint2DDesc`] first, like colliders.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use void_core::Uuid;

/// Handle to a joint in a [`PhysicsWorld2D`](crate::world2d::PhysicsWorld2D)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JointHandle2D(pub(crate) rapier2d::prelude::ImpulseJointHandle);

/// A velocity motor capped at `max_force` (a torque for angular motors)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointMotor {
    pub speed: f32,
    pub max_force: f32,
}

/// A spring given as frequency in Hz and damping ratio
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointSpring {
    pub frequency: f32,
    pub damping_ratio: f32,
}

/// The constraint a joint applies
#[derive(Debug, Clone, PartialEq)]
pub enum JointKind2D {
    /// Keeps the anchors at a distance, rigidly or through a spring
    Distance {
        anchor: Vec2,
        connected_anchor: Vec2,
        /// `None` uses the anchor distance at creation
        distance: Option<f32>,
        min_distance: f32,
        max_distance_by: f32,
        spring: Option<JointSpring>,
    },
    /// Pins both bodies at one point, leaving rotation free
    Hinge {
        anchor: Vec2,
        /// Angle limits relative to the pose at creation
        limits: Option<[f32; 2]>,
        motor: Option<JointMotor>,
    },
    /// Slides along the world X axis with rotation locked
    Slider {
        anchor: Vec2,
        /// Rotation of the connected body relative to this one
        reference_angle: f32,
        limits: Option<[f32; 2]>,
        motor: Option<JointMotor>,
    },
    /// Sprung travel along the world Y axis, free rotation
    Wheel {
        anchor: Vec2,
        spring: JointSpring,
        limits: Option<[f32; 2]>,
        motor: Option<JointMotor>,
    },
}

/// Everything needed to create one joint
#[derive(Debug, Clone, PartialEq)]
pub struct Joint2DDesc {
    pub kind: JointKind2D,
    pub enable_collision: bool,
    /// The joint is removed once its reaction force exceeds this
    pub break_force: f32,
    pub break_torque: f32,
}

fn limits(enabled: bool, lower: f32, upper: f32) -> Option<[f32; 2]> {
    enabled.then_some([lower, upper])
}

fn motor(enabled: bool, speed: f32, max_force: f32) -> Option<JointMotor> {
    enabled.then_some(JointMotor { speed, max_force })
}

/// Rigid distance constraint between two anchors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DistanceJoint2DComponent {
    pub connected_rigidbody: Uuid,
    pub anchor: Vec2,
    pub connected_anchor: Vec2,
    /// Used when `auto_distance` is off
    pub distance: f32,
    pub min_distance: f32,
    pub max_distance_by: f32,
    pub break_force: f32,
    pub auto_distance: bool,
    pub enable_collision: bool,

    #[serde(skip)]
    pub runtime_joint: Option<JointHandle2D>,
}

impl Default for DistanceJoint2DComponent {
    fn default() -> Self {
        Self {
            connected_rigidbody: Uuid::NIL,
            anchor: Vec2::ZERO,
            connected_anchor: Vec2::ZERO,
            distance: 0.0,
            min_distance: 0.0,
            max_distance_by: 2.0,
            break_force: f32::MAX,
            auto_distance: true,
            enable_collision: false,
            runtime_joint: None,
        }
    }
}

impl DistanceJoint2DComponent {
    pub fn to_desc(&self) -> Joint2DDesc {
        Joint2DDesc {
            kind: JointKind2D::Distance {
                anchor: self.anchor,
                connected_anchor: self.connected_anchor,
                distance: (!self.auto_distance).then_some(self.distance),
                min_distance: self.min_distance,
                max_distance_by: self.max_distance_by,
                spring: None,
            },
            enable_collision: self.enable_collision,
            break_force: self.break_force,
            break_torque: f32::MAX,
        }
    }
}

/// Distance joint that springs back towards its length
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SpringJoint2DComponent {
    pub connected_rigidbody: Uuid,
    pub anchor: Vec2,
    pub connected_anchor: Vec2,
    pub distance: f32,
    pub min_distance: f32,
    pub max_distance_by: f32,
    /// Hz
    pub frequency: f32,
    pub damping_ratio: f32,
    pub break_force: f32,
    pub auto_distance: bool,
    pub enable_collision: bool,

    #[serde(skip)]
    pub runtime_joint: Option<JointHandle2D>,
}

impl Default for SpringJoint2DComponent {
    fn default() -> Self {
        Self {
            connected_rigidbody: Uuid::NIL,
            anchor: Vec2::ZERO,
            connected_anchor: Vec2::ZERO,
            distance: 0.0,
            min_distance: 0.0,
            max_distance_by: 2.0,
            frequency: 4.0,
            damping_ratio: 0.5,
            break_force: f32::MAX,
            auto_distance: true,
            enable_collision: false,
            runtime_joint: None,
        }
    }
}

impl SpringJoint2DComponent {
    pub fn to_desc(&self) -> Joint2DDesc {
        Joint2DDesc {
            kind: JointKind2D::Distance {
                anchor: self.anchor,
                connected_anchor: self.connected_anchor,
                distance: (!self.auto_distance).then_some(self.distance),
                min_distance: self.min_distance,
                max_distance_by: self.max_distance_by,
                spring: Some(JointSpring {
                    frequency: self.frequency,
                    damping_ratio: self.damping_ratio,
                }),
            },
            enable_collision: self.enable_collision,
            break_force: self.break_force,
            break_torque: f32::MAX,
        }
    }
}

/// Revolute joint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct HingeJoint2DComponent {
    pub connected_rigidbody: Uuid,
    pub anchor: Vec2,
    /// Radians
    pub lower_angle: f32,
    pub upper_angle: f32,
    pub motor_speed: f32,
    pub max_motor_torque: f32,
    pub break_force: f32,
    pub break_torque: f32,
    pub use_limits: bool,
    pub use_motor: bool,
    pub enable_collision: bool,

    #[serde(skip)]
    pub runtime_joint: Option<JointHandle2D>,
}

impl Default for HingeJoint2DComponent {
    fn default() -> Self {
        Self {
            connected_rigidbody: Uuid::NIL,
            anchor: Vec2::ZERO,
            lower_angle: 0.0,
            upper_angle: 359.0_f32.to_radians(),
            motor_speed: 5.0,
            max_motor_torque: 10000.0,
            break_force: f32::MAX,
            break_torque: f32::MAX,
            use_limits: false,
            use_motor: false,
            enable_collision: false,
            runtime_joint: None,
        }
    }
}

impl HingeJoint2DComponent {
    pub fn to_desc(&self) -> Joint2DDesc {
        Joint2DDesc {
            kind: JointKind2D::Hinge {
                anchor: self.anchor,
                limits: limits(self.use_limits, self.lower_angle, self.upper_angle),
                motor: motor(self.use_motor, self.motor_speed, self.max_motor_torque),
            },
            enable_collision: self.enable_collision,
            break_force: self.break_force,
            break_torque: self.break_torque,
        }
    }
}

/// Prismatic joint along the world X axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SliderJoint2DComponent {
    pub connected_rigidbody: Uuid,
    pub anchor: Vec2,
    pub angle: f32,
    pub lower_translation: f32,
    pub upper_translation: f32,
    pub motor_speed: f32,
    pub max_motor_force: f32,
    pub break_force: f32,
    pub break_torque: f32,
    pub use_limits: bool,
    pub use_motor: bool,
    pub enable_collision: bool,

    #[serde(skip)]
    pub runtime_joint: Option<JointHandle2D>,
}

impl Default for SliderJoint2DComponent {
    fn default() -> Self {
        Self {
            connected_rigidbody: Uuid::NIL,
            anchor: Vec2::ZERO,
            angle: 0.0,
            lower_translation: 0.0,
            upper_translation: 0.0,
            motor_speed: 5.0,
            max_motor_force: 20.0,
            break_force: f32::MAX,
            break_torque: f32::MAX,
            use_limits: false,
            use_motor: false,
            enable_collision: false,
            runtime_joint: None,
        }
    }
}

impl SliderJoint2DComponent {
    pub fn to_desc(&self) -> Joint2DDesc {
        Joint2DDesc {
            kind: JointKind2D::Slider {
                anchor: self.anchor,
                reference_angle: self.angle,
                limits: limits(self.use_limits, self.lower_translation, self.upper_translation),
                motor: motor(self.use_motor, self.motor_speed, self.max_motor_force),
            },
            enable_collision: self.enable_collision,
            break_force: self.break_force,
            break_torque: self.break_torque,
        }
    }
}

/// Suspension with a driven wheel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct WheelJoint2DComponent {
    pub connected_rigidbody: Uuid,
    pub anchor: Vec2,
    pub frequency: f32,
    pub damping_ratio: f32,
    pub lower_translation: f32,
    pub upper_translation: f32,
    pub motor_speed: f32,
    pub max_motor_torque: f32,
    pub break_force: f32,
    pub break_torque: f32,
    pub use_limits: bool,
    pub use_motor: bool,
    pub enable_collision: bool,

    #[serde(skip)]
    pub runtime_joint: Option<JointHandle2D>,
}

impl Default for WheelJoint2DComponent {
    fn default() -> Self {
        Self {
            connected_rigidbody: Uuid::NIL,
            anchor: Vec2::ZERO,
            frequency: 4.0,
            damping_ratio: 0.7,
            lower_translation: -0.25,
            upper_translation: 0.25,
            motor_speed: 10.0,
            max_motor_torque: 20.0,
            break_force: f32::MAX,
            break_torque: f32::MAX,
            use_limits: true,
            use_motor: true,
            enable_collision: false,
            runtime_joint: None,
        }
    }
}

impl WheelJoint2DComponent {
    pub fn to_desc(&self) -> Joint2DDesc {
        Joint2DDesc {
            kind: JointKind2D::Wheel {
                anchor: self.anchor,
                spring: JointSpring {
                    frequency: self.frequency,
                    damping_ratio: self.damping_ratio,
                },
                limits: limits(self.use_limits, self.lower_translation, self.upper_translation),
                motor: motor(self.use_motor, self.motor_speed, self.max_motor_torque),
            },
            enable_collision: self.enable_collision,
            break_force: self.break_force,
            break_torque: self.break_torque,
        }
    }
}

macro_rules! impl_joint_component {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $ty {
                /// Copy of the settings with no runtime state
                pub fn detached(&self) -> Self {
                    Self {
                        runtime_joint: None,
                        ..self.clone()
                    }
                }
            }
        )*
    };
}

impl_joint_component!(
    DistanceJoint2DComponent,
    SpringJoint2DComponent,
    HingeJoint2DComponent,
    SliderJoint2DComponent,
    WheelJoint2DComponent,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_distance_leaves_length_open() {
        let joint = DistanceJoint2DComponent {
            distance: 3.0,
            ..Default::default()
        };
        let JointKind2D::Distance { distance, spring, .. } = joint.to_desc().kind else {
            panic!("expected a distance joint");
        };
        assert_eq!(distance, None);
        assert_eq!(spring, None);

        let fixed = DistanceJoint2DComponent {
            auto_distance: false,
            ..joint
        };
        let JointKind2D::Distance { distance, .. } = fixed.to_desc().kind else {
            panic!("expected a distance joint");
        };
        assert_eq!(distance, Some(3.0));
    }

    #[test]
    fn test_disabled_limits_and_motor_are_dropped() {
        let desc = HingeJoint2DComponent::default().to_desc();
        assert_eq!(
            desc.kind,
            JointKind2D::Hinge {
                anchor: Vec2::ZERO,
                limits: None,
                motor: None,
            }
        );
        assert_eq!(desc.break_torque, f32::MAX);

        let wheel = WheelJoint2DComponent::default().to_desc();
        let JointKind2D::Wheel { limits, motor, .. } = wheel.kind else {
            panic!("expected a wheel joint");
        };
        assert_eq!(limits, Some([-0.25, 0.25]));
        assert_eq!(
            motor,
            Some(JointMotor {
                speed: 10.0,
                max_force: 20.0
            })
        );
    }

    #[test]
    fn test_runtime_handle_is_not_serialized() {
        let json = serde_json::to_value(SliderJoint2DComponent::default()).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        assert!(keys.contains(&"ConnectedRigidbody"));
        assert!(keys.contains(&"MaxMotorForce"));
        assert!(!keys.iter().any(|k| k.contains("Runtime")));
    }
}
