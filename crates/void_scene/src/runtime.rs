//! Runtime lifecycle and per-frame update
//!
//! A frame runs in a fixed order:
//!
//! 1. managed script `OnUpdate`
//! 2. native scripts
//! 3. physics step, contact callbacks, transform read-back
//! 4. primary camera lookup
//! 5. render submission
//!
//! Scripts run before physics so impulses they apply are seen by the step,
//! and rendering sees post-physics transforms.

use void_core::Timestep;
use void_physics::{Rigidbody2DComponent, RigidbodyComponent};

use crate::camera::CameraComponent;
use crate::components::{
    LightComponent, MeshComponent, ScriptComponent, SkyLightComponent, SpriteRendererComponent,
    TagComponent,
};
use crate::entity::Entity;
use crate::error::Result;
use crate::render::{CameraData, LightSubmission, SceneRenderer, SkyLightSubmission};
use crate::Scene;

impl Scene {
    /// Enter runtime mode
    ///
    /// Creates the physics worlds and their bodies, then script objects
    /// (with `OnCreate`), then native scripts. If the worlds cannot be
    /// created the scene stays in edit mode.
    ///
    /// # Panics
    ///
    /// Panics if the scene is already running.
    pub fn on_runtime_start(&mut self) -> Result<()> {
        assert!(!self.running, "scene '{}' is already running", self.name());

        self.sort_for_sprites();
        if let Err(e) = self.start_physics() {
            self.stop_physics();
            log::error!("Failed to start physics for scene '{}': {}", self.name(), e);
            return Err(e);
        }
        self.running = true;

        self.start_scripts();
        self.start_native_scripts();

        log::info!(
            "Scene '{}' started with {} entities",
            self.name(),
            self.entity_count()
        );
        Ok(())
    }

    /// Leave runtime mode
    ///
    /// Calls `OnDestroy` on every script object, destroys native scripts and
    /// drops the physics worlds. Afterwards no component holds a runtime
    /// handle. Transforms keep whatever the simulation wrote into them.
    pub fn on_runtime_stop(&mut self) {
        if !self.running {
            return;
        }
        self.stop_scripts();
        self.stop_native_scripts();
        self.stop_physics();
        self.running = false;

        log::info!("Scene '{}' stopped", self.name());
    }

    /// Simulate and render one runtime frame
    ///
    /// Nothing is rendered when the scene has no enabled primary camera.
    pub fn on_update_runtime(&mut self, ts: Timestep, renderer: &mut dyn SceneRenderer) {
        if self.running {
            self.update_scripts(ts);
            self.update_native_scripts(ts);
            self.step_physics(ts.seconds());
        }

        let camera = self.primary_camera_entity();
        if !self.is_valid(camera) {
            return;
        }
        let projection = self.get_component::<CameraComponent>(camera).camera.projection();
        let camera = CameraData::new(projection, self.world_transform(camera));
        self.render(&camera, renderer);
    }

    /// Render one edit-mode frame from an external camera
    pub fn on_update_editor(
        &mut self,
        _ts: Timestep,
        camera: &CameraData,
        renderer: &mut dyn SceneRenderer,
    ) {
        self.render(camera, renderer);
    }

    /// Release physics bodies and script objects of an entity being destroyed
    pub(crate) fn release_runtime_state(&mut self, entity: Entity) {
        if let Some(runtime) = self
            .try_get_component_mut::<Rigidbody2DComponent>(entity)
            .and_then(|rb| rb.runtime.take())
        {
            self.release_body_2d(entity, runtime.handle);
        }
        if let Some(runtime) = self
            .try_get_component_mut::<RigidbodyComponent>(entity)
            .and_then(|rb| rb.runtime.take())
        {
            self.release_body_3d(runtime.handle);
        }

        let uuid = self.uuid(entity);
        if let Some(scripts) = self.try_get_component::<ScriptComponent>(entity) {
            self.destroy_scripts(uuid, scripts);
        }
        self.destroy_native_script(entity);
    }

    fn is_enabled(&self, entity: Entity) -> bool {
        self.get_component::<TagComponent>(entity).enabled
    }

    /// Submit lights and meshes, then sprites in ascending sorting order
    fn render(&self, camera: &CameraData, renderer: &mut dyn SceneRenderer) {
        let sky_light = self
            .view::<SkyLightComponent>()
            .find(|(entity, _)| self.is_enabled(*entity))
            .map(|(entity, sky_light)| SkyLightSubmission {
                entity,
                sky_light: sky_light.clone(),
            });
        let lights: Vec<LightSubmission> = self
            .view::<LightComponent>()
            .filter(|(entity, _)| self.is_enabled(*entity))
            .map(|(entity, light)| LightSubmission {
                entity,
                transform: self.world_transform(entity),
                light: light.clone(),
            })
            .collect();

        renderer.begin_scene(camera, sky_light.as_ref(), &lights);
        for (entity, mesh) in self.view::<MeshComponent>() {
            if self.is_enabled(entity) {
                renderer.submit_mesh(mesh, &self.world_transform(entity));
            }
        }
        renderer.end_scene();

        let mut sprites: Vec<(Entity, &SpriteRendererComponent)> = self
            .view::<SpriteRendererComponent>()
            .filter(|(entity, _)| self.is_enabled(*entity))
            .collect();
        sprites.sort_by_key(|(_, sprite)| sprite.sorting_order);

        renderer.begin_2d(&camera.view_projection());
        for (entity, sprite) in sprites {
            renderer.draw_quad(sprite, &self.world_transform(entity));
        }
        renderer.end_2d();
    }
}
