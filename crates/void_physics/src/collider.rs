//! Collider components and shape descriptions
//!
//! Components hold editor-facing data. Before a fixture is created the
//! component is flattened into a `Collider2DDesc`/`Collider3DDesc` with the
//! owning entity's scale already applied.

use crate::error::{PhysicsError, Result};
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Handle to a fixture in a [`PhysicsWorld2D`](crate::world2d::PhysicsWorld2D)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColliderHandle2D(pub(crate) rapier2d::prelude::ColliderHandle);

/// A 2D fixture shape, already scaled
#[derive(Debug, Clone, PartialEq)]
pub enum Shape2D {
    Box { half_extents: Vec2, offset: Vec2 },
    Circle { radius: f32, offset: Vec2 },
    /// Convex polygon, counter-clockwise
    Polygon { points: Vec<Vec2> },
}

impl Shape2D {
    pub(crate) fn to_rapier(&self) -> Result<rapier2d::prelude::SharedShape> {
        use rapier2d::prelude::{Point, SharedShape};
        match self {
            Self::Box { half_extents, .. } => Ok(SharedShape::cuboid(half_extents.x, half_extents.y)),
            Self::Circle { radius, .. } => Ok(SharedShape::ball(*radius)),
            Self::Polygon { points } => {
                let points: Vec<_> = points.iter().map(|p| Point::new(p.x, p.y)).collect();
                SharedShape::convex_polyline(points).ok_or_else(|| {
                    PhysicsError::ShapeCreationFailed("polygon is not convex".to_string())
                })
            }
        }
    }

    pub(crate) fn offset(&self) -> Vec2 {
        match self {
            Self::Box { offset, .. } | Self::Circle { offset, .. } => *offset,
            Self::Polygon { .. } => Vec2::ZERO,
        }
    }
}

/// Everything needed to attach one fixture to a 2D body
#[derive(Debug, Clone, PartialEq)]
pub struct Collider2DDesc {
    pub shape: Shape2D,
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
    pub is_sensor: bool,
}

/// Axis-aligned box fixture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct BoxCollider2DComponent {
    pub offset: Vec2,
    /// Half extents before scale
    pub size: Vec2,
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
    pub is_sensor: bool,

    #[serde(skip)]
    pub runtime_fixture: Option<ColliderHandle2D>,
}

impl Default for BoxCollider2DComponent {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            size: Vec2::splat(0.5),
            density: 1.0,
            friction: 0.2,
            restitution: 0.0,
            is_sensor: false,
            runtime_fixture: None,
        }
    }
}

impl BoxCollider2DComponent {
    pub fn to_desc(&self, scale: Vec3) -> Collider2DDesc {
        Collider2DDesc {
            shape: Shape2D::Box {
                half_extents: self.size * scale.truncate(),
                offset: self.offset,
            },
            density: self.density,
            friction: self.friction,
            restitution: self.restitution,
            is_sensor: self.is_sensor,
        }
    }

    pub fn detached(&self) -> Self {
        Self {
            runtime_fixture: None,
            ..self.clone()
        }
    }
}

/// Circle fixture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CircleCollider2DComponent {
    pub offset: Vec2,
    pub radius: f32,
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
    pub is_sensor: bool,

    #[serde(skip)]
    pub runtime_fixture: Option<ColliderHandle2D>,
}

impl Default for CircleCollider2DComponent {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            radius: 0.5,
            density: 1.0,
            friction: 0.2,
            restitution: 0.0,
            is_sensor: false,
            runtime_fixture: None,
        }
    }
}

impl CircleCollider2DComponent {
    /// The radius follows the larger of the two planar scale axes
    pub fn to_desc(&self, scale: Vec3) -> Collider2DDesc {
        Collider2DDesc {
            shape: Shape2D::Circle {
                radius: self.radius * scale.x.max(scale.y),
                offset: self.offset,
            },
            density: self.density,
            friction: self.friction,
            restitution: self.restitution,
            is_sensor: self.is_sensor,
        }
    }

    pub fn detached(&self) -> Self {
        Self {
            runtime_fixture: None,
            ..self.clone()
        }
    }
}

/// Convex polygon fixture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PolygonCollider2DComponent {
    pub vertices: Vec<Vec2>,
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
    pub is_sensor: bool,

    #[serde(skip)]
    pub runtime_fixture: Option<ColliderHandle2D>,
}

impl Default for PolygonCollider2DComponent {
    fn default() -> Self {
        Self {
            vertices: vec![Vec2::ZERO, Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)],
            density: 1.0,
            friction: 0.2,
            restitution: 0.0,
            is_sensor: false,
            runtime_fixture: None,
        }
    }
}

impl PolygonCollider2DComponent {
    /// Fails when fewer than three vertices are present
    pub fn to_desc(&self, scale: Vec3) -> Result<Collider2DDesc> {
        if self.vertices.len() < 3 {
            return Err(PhysicsError::ShapeCreationFailed(format!(
                "polygon needs at least 3 vertices, got {}",
                self.vertices.len()
            )));
        }
        let scale = scale.truncate();
        Ok(Collider2DDesc {
            shape: Shape2D::Polygon {
                points: self.vertices.iter().map(|v| *v * scale).collect(),
            },
            density: self.density,
            friction: self.friction,
            restitution: self.restitution,
            is_sensor: self.is_sensor,
        })
    }

    pub fn detached(&self) -> Self {
        Self {
            runtime_fixture: None,
            ..self.clone()
        }
    }
}

/// A 3D collision shape, already scaled
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape3D {
    Box { half_extents: Vec3 },
    Sphere { radius: f32 },
    /// Y-aligned capsule
    Capsule { half_height: f32, radius: f32 },
    /// Y-aligned cylinder
    Cylinder { half_height: f32, radius: f32 },
}

impl Shape3D {
    pub(crate) fn to_rapier(self) -> rapier3d::prelude::SharedShape {
        use rapier3d::prelude::SharedShape;
        match self {
            Self::Box { half_extents } => {
                SharedShape::cuboid(half_extents.x, half_extents.y, half_extents.z)
            }
            Self::Sphere { radius } => SharedShape::ball(radius),
            Self::Capsule {
                half_height,
                radius,
            } => SharedShape::capsule_y(half_height, radius),
            Self::Cylinder {
                half_height,
                radius,
            } => SharedShape::cylinder(half_height, radius),
        }
    }
}

/// Everything needed to attach one shape to a 3D body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider3DDesc {
    pub shape: Shape3D,
    pub offset: Vec3,
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
}

fn default_density() -> f32 {
    1.0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct BoxColliderComponent {
    pub half_size: Vec3,
    pub offset: Vec3,
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
}

impl Default for BoxColliderComponent {
    fn default() -> Self {
        Self {
            half_size: Vec3::splat(0.5),
            offset: Vec3::ZERO,
            density: default_density(),
            friction: 0.5,
            restitution: 0.0,
        }
    }
}

impl BoxColliderComponent {
    pub fn to_desc(&self, scale: Vec3) -> Collider3DDesc {
        Collider3DDesc {
            shape: Shape3D::Box {
                half_extents: self.half_size * scale,
            },
            offset: self.offset,
            density: self.density,
            friction: self.friction,
            restitution: self.restitution,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SphereColliderComponent {
    pub radius: f32,
    pub offset: Vec3,
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
}

impl Default for SphereColliderComponent {
    fn default() -> Self {
        Self {
            radius: 0.5,
            offset: Vec3::ZERO,
            density: default_density(),
            friction: 0.5,
            restitution: 0.0,
        }
    }
}

impl SphereColliderComponent {
    pub fn to_desc(&self, scale: Vec3) -> Collider3DDesc {
        Collider3DDesc {
            shape: Shape3D::Sphere {
                radius: self.radius * scale.max_element(),
            },
            offset: self.offset,
            density: self.density,
            friction: self.friction,
            restitution: self.restitution,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CapsuleColliderComponent {
    pub radius: f32,
    /// Half height of the cylindrical section
    pub half_height: f32,
    pub offset: Vec3,
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
}

impl Default for CapsuleColliderComponent {
    fn default() -> Self {
        Self {
            radius: 0.5,
            half_height: 0.5,
            offset: Vec3::ZERO,
            density: default_density(),
            friction: 0.5,
            restitution: 0.0,
        }
    }
}

impl CapsuleColliderComponent {
    pub fn to_desc(&self, scale: Vec3) -> Collider3DDesc {
        Collider3DDesc {
            shape: Shape3D::Capsule {
                half_height: self.half_height * scale.y,
                radius: self.radius * scale.x.max(scale.z),
            },
            offset: self.offset,
            density: self.density,
            friction: self.friction,
            restitution: self.restitution,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CylinderColliderComponent {
    pub radius: f32,
    pub half_height: f32,
    pub offset: Vec3,
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
}

impl Default for CylinderColliderComponent {
    fn default() -> Self {
        Self {
            radius: 0.5,
            half_height: 0.5,
            offset: Vec3::ZERO,
            density: default_density(),
            friction: 0.5,
            restitution: 0.0,
        }
    }
}

impl CylinderColliderComponent {
    pub fn to_desc(&self, scale: Vec3) -> Collider3DDesc {
        Collider3DDesc {
            shape: Shape3D::Cylinder {
                half_height: self.half_height * scale.y,
                radius: self.radius * scale.x.max(scale.z),
            },
            offset: self.offset,
            density: self.density,
            friction: self.friction,
            restitution: self.restitution,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_box_scaled_by_entity() {
        let desc = BoxCollider2DComponent::default().to_desc(Vec3::new(2.0, 4.0, 1.0));
        match desc.shape {
            Shape2D::Box { half_extents, .. } => {
                assert_relative_eq!(half_extents.x, 1.0);
                assert_relative_eq!(half_extents.y, 2.0);
            }
            other => panic!("unexpected shape {:?}", other),
        }
    }

    #[test]
    fn test_circle_uses_largest_axis() {
        let desc = CircleCollider2DComponent::default().to_desc(Vec3::new(1.0, 3.0, 1.0));
        assert_eq!(
            desc.shape,
            Shape2D::Circle {
                radius: 1.5,
                offset: Vec2::ZERO
            }
        );
    }

    #[test]
    fn test_polygon_needs_three_points() {
        let poly = PolygonCollider2DComponent {
            vertices: vec![Vec2::ZERO, Vec2::X],
            ..Default::default()
        };
        assert!(matches!(
            poly.to_desc(Vec3::ONE),
            Err(PhysicsError::ShapeCreationFailed(_))
        ));
        assert!(PolygonCollider2DComponent::default().to_desc(Vec3::ONE).is_ok());
    }

    #[test]
    fn test_polygon_defaults_round_trip_through_json() {
        let json = r#"{ "Density": 3.0 }"#;
        let poly: PolygonCollider2DComponent = serde_json::from_str(json).unwrap();
        assert_eq!(poly.vertices.len(), 3);
        assert_relative_eq!(poly.density, 3.0);
        assert_relative_eq!(poly.friction, 0.2);
    }

    #[test]
    fn test_detached_drops_fixture() {
        let mut bx = BoxCollider2DComponent::default();
        bx.runtime_fixture = Some(ColliderHandle2D(
            rapier2d::prelude::ColliderHandle::invalid(),
        ));
        assert!(bx.detached().runtime_fixture.is_none());
    }
}
