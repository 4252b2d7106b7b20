//! Scene cameras
//!
//! A [`SceneCamera`] only knows its projection. Its view comes from the
//! world transform of the entity carrying the [`CameraComponent`].

use glam::Mat4;
use serde::{Deserialize, Serialize};

/// Camera projection mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProjectionType {
    #[default]
    Perspective,
    Orthographic,
}

/// Projection settings of a scene camera
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SceneCamera {
    pub projection_type: ProjectionType,

    /// Vertical field of view in radians
    #[serde(rename = "PerspectiveFOV")]
    pub perspective_fov: f32,
    pub perspective_near: f32,
    pub perspective_far: f32,

    /// Full height of the orthographic view volume
    pub orthographic_size: f32,
    pub orthographic_near: f32,
    pub orthographic_far: f32,

    /// Width over height, driven by the viewport unless fixed
    pub aspect_ratio: f32,
}

impl Default for SceneCamera {
    fn default() -> Self {
        Self {
            projection_type: ProjectionType::Perspective,
            perspective_fov: 45f32.to_radians(),
            perspective_near: 0.01,
            perspective_far: 1000.0,
            orthographic_size: 10.0,
            orthographic_near: -1.0,
            orthographic_far: 1.0,
            aspect_ratio: 1.0,
        }
    }
}

impl SceneCamera {
    /// Perspective camera with the FOV given in radians
    pub fn perspective(fov: f32, near: f32, far: f32) -> Self {
        Self {
            projection_type: ProjectionType::Perspective,
            perspective_fov: fov,
            perspective_near: near,
            perspective_far: far,
            ..Default::default()
        }
    }

    pub fn orthographic(size: f32, near: f32, far: f32) -> Self {
        Self {
            projection_type: ProjectionType::Orthographic,
            orthographic_size: size,
            orthographic_near: near,
            orthographic_far: far,
            ..Default::default()
        }
    }

    /// Set the aspect ratio from a viewport size in pixels
    ///
    /// A zero height leaves the ratio unchanged.
    pub fn set_viewport_size(&mut self, width: u32, height: u32) {
        if height == 0 {
            return;
        }
        self.aspect_ratio = width as f32 / height as f32;
    }

    /// Projection matrix for the current settings
    pub fn projection(&self) -> Mat4 {
        match self.projection_type {
            ProjectionType::Perspective => Mat4::perspective_rh(
                self.perspective_fov,
                self.aspect_ratio,
                self.perspective_near,
                self.perspective_far,
            ),
            ProjectionType::Orthographic => {
                let half_height = self.orthographic_size * 0.5;
                let half_width = half_height * self.aspect_ratio;
                Mat4::orthographic_rh(
                    -half_width,
                    half_width,
                    -half_height,
                    half_height,
                    self.orthographic_near,
                    self.orthographic_far,
                )
            }
        }
    }
}

/// Camera attached to an entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CameraComponent {
    pub camera: SceneCamera,
    /// Candidate for rendering the running scene
    pub primary: bool,
    /// Ignore viewport resizes
    pub fixed_aspect_ratio: bool,
}

impl Default for CameraComponent {
    fn default() -> Self {
        Self {
            camera: SceneCamera::default(),
            primary: true,
            fixed_aspect_ratio: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_viewport_sets_aspect() {
        let mut camera = SceneCamera::default();
        camera.set_viewport_size(1600, 900);
        assert_relative_eq!(camera.aspect_ratio, 1600.0 / 900.0);

        camera.set_viewport_size(100, 0);
        assert_relative_eq!(camera.aspect_ratio, 1600.0 / 900.0);
    }

    #[test]
    fn test_orthographic_projection_maps_edges() {
        let mut camera = SceneCamera::orthographic(10.0, -1.0, 1.0);
        camera.set_viewport_size(200, 100);

        let right_edge = camera.projection().project_point3(glam::Vec3::new(10.0, 5.0, 0.0));
        assert_relative_eq!(right_edge.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(right_edge.y, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_camera_component_defaults() {
        let component: CameraComponent = serde_json::from_str("{}").unwrap();
        assert!(component.primary);
        assert!(!component.fixed_aspect_ratio);
        assert_eq!(component.camera.projection_type, ProjectionType::Perspective);
    }
}
