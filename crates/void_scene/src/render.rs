//! Render submission
//!
//! The scene does not draw anything itself. Each frame it gathers cameras,
//! lights, meshes and sprites and hands them to a [`SceneRenderer`]:
//!
//! ```text
//! begin_scene(camera, sky, lights)
//!     submit_mesh(mesh, world) ...
//! end_scene()
//! begin_2d(view_projection)
//!     draw_quad(sprite, world) ...   (ascending sorting order)
//! end_2d()
//! ```

use glam::{Mat4, Vec3};

use crate::components::{LightComponent, MeshComponent, SkyLightComponent, SpriteRendererComponent};
use crate::entity::Entity;

/// View and projection of the camera a frame is rendered from
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraData {
    pub view: Mat4,
    pub projection: Mat4,
    pub position: Vec3,
}

impl CameraData {
    /// Camera placed by a world transform
    pub fn new(projection: Mat4, transform: Mat4) -> Self {
        Self {
            view: transform.inverse(),
            projection,
            position: transform.w_axis.truncate(),
        }
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}

/// A light with its world transform
#[derive(Clone, Debug)]
pub struct LightSubmission {
    pub entity: Entity,
    pub transform: Mat4,
    pub light: LightComponent,
}

#[derive(Clone, Debug)]
pub struct SkyLightSubmission {
    pub entity: Entity,
    pub sky_light: SkyLightComponent,
}

/// Receives a scene's draw data once per frame
pub trait SceneRenderer {
    fn begin_scene(
        &mut self,
        camera: &CameraData,
        sky_light: Option<&SkyLightSubmission>,
        lights: &[LightSubmission],
    );

    fn submit_mesh(&mut self, mesh: &MeshComponent, transform: &Mat4);

    fn end_scene(&mut self);

    fn begin_2d(&mut self, view_projection: &Mat4);

    fn draw_quad(&mut self, sprite: &SpriteRendererComponent, transform: &Mat4);

    fn end_2d(&mut self);
}

/// Renderer that discards everything, for headless simulation
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl SceneRenderer for NullRenderer {
    fn begin_scene(&mut self, _: &CameraData, _: Option<&SkyLightSubmission>, _: &[LightSubmission]) {}
    fn submit_mesh(&mut self, _: &MeshComponent, _: &Mat4) {}
    fn end_scene(&mut self) {}
    fn begin_2d(&mut self, _: &Mat4) {}
    fn draw_quad(&mut self, _: &SpriteRendererComponent, _: &Mat4) {}
    fn end_2d(&mut self) {}
}
