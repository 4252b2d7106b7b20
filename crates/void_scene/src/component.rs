//! The component trait and per-type lifecycle hooks

use void_physics::{
    BoxCollider2DComponent, BoxColliderComponent, CapsuleColliderComponent,
    CircleCollider2DComponent, CylinderColliderComponent, DistanceJoint2DComponent,
    HingeJoint2DComponent, PolygonCollider2DComponent, Rigidbody2DComponent, RigidbodyComponent,
    SliderJoint2DComponent, SphereColliderComponent, SpringJoint2DComponent,
    WheelJoint2DComponent,
};

use crate::camera::CameraComponent;
use crate::components::{
    AudioListenerComponent, AudioSourceComponent, IdComponent, LightComponent, MeshComponent,
    PrefabComponent, RelationshipComponent, ScriptComponent, SkyLightComponent,
    SpriteRendererComponent, TagComponent, TransformComponent,
};
use crate::entity::Entity;
use crate::native_script::NativeScriptComponent;
use crate::physics_bridge::{Collider2D, Joint2D};
use crate::Scene;

/// Data that can be stored on a scene entity
///
/// Hooks default to no-ops. Only cameras and the runtime-backed physics and
/// script components override them.
pub trait Component: Clone + Send + Sync + 'static {
    /// Called after the component is stored on `entity`
    fn on_added(_scene: &mut Scene, _entity: Entity) {}

    /// Called with the value after it left the registry
    fn on_removed(&mut self, _scene: &mut Scene, _entity: Entity) {}

    /// A copy that shares no runtime handles with `self`
    fn without_runtime(&self) -> Self {
        self.clone()
    }
}

impl Component for IdComponent {}
impl Component for TagComponent {}
impl Component for TransformComponent {}
impl Component for RelationshipComponent {}
impl Component for PrefabComponent {}
impl Component for SpriteRendererComponent {}
impl Component for MeshComponent {}
impl Component for SkyLightComponent {}
impl Component for LightComponent {}
impl Component for AudioSourceComponent {}
impl Component for AudioListenerComponent {}

impl Component for CameraComponent {
    fn on_added(scene: &mut Scene, entity: Entity) {
        let (width, height) = scene.viewport_size();
        if width > 0 && height > 0 {
            scene
                .get_component_mut::<CameraComponent>(entity)
                .camera
                .set_viewport_size(width, height);
        }
    }
}

impl Component for ScriptComponent {
    fn on_added(scene: &mut Scene, entity: Entity) {
        if scene.is_running() {
            scene.instantiate_scripts(entity);
        }
    }

    fn on_removed(&mut self, scene: &mut Scene, entity: Entity) {
        if scene.is_running() {
            let uuid = scene.uuid(entity);
            scene.destroy_scripts(uuid, self);
        }
    }
}

impl Component for NativeScriptComponent {
    fn on_added(scene: &mut Scene, entity: Entity) {
        if scene.is_running() {
            scene.create_native_script(entity);
        }
    }

    fn on_removed(&mut self, scene: &mut Scene, entity: Entity) {
        if let Some(mut instance) = self.instance.take() {
            instance.on_destroy(scene, entity);
        }
    }
}

// ============================================================================
// 2D physics
// ============================================================================

impl Component for Rigidbody2DComponent {
    fn on_added(scene: &mut Scene, entity: Entity) {
        if scene.physics_2d.is_some() {
            scene.create_body_2d(entity);
        }
    }

    fn on_removed(&mut self, scene: &mut Scene, entity: Entity) {
        if let Some(runtime) = self.runtime.take() {
            scene.release_body_2d(entity, runtime.handle);
        }
    }

    fn without_runtime(&self) -> Self {
        self.detached()
    }
}

macro_rules! impl_collider_2d_component {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Component for $ty {
                fn on_added(scene: &mut Scene, entity: Entity) {
                    if scene.is_running() {
                        scene.attach_fixture_2d::<$ty>(entity);
                    }
                }

                fn on_removed(&mut self, scene: &mut Scene, entity: Entity) {
                    if let Some(fixture) = self.fixture_mut().take() {
                        scene.release_fixture_2d(entity, fixture);
                    }
                }

                fn without_runtime(&self) -> Self {
                    self.detached()
                }
            }
        )*
    };
}

impl_collider_2d_component!(
    BoxCollider2DComponent,
    CircleCollider2DComponent,
    PolygonCollider2DComponent,
);

// Joints added while the world exists connect right away
macro_rules! impl_joint_2d_component {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Component for $ty {
                fn on_added(scene: &mut Scene, entity: Entity) {
                    if scene.physics_2d.is_some() {
                        scene.create_joint_2d::<$ty>(entity);
                    }
                }

                fn on_removed(&mut self, scene: &mut Scene, _entity: Entity) {
                    if let Some(joint) = self.joint_mut().take() {
                        scene.release_joint_2d(joint);
                    }
                }

                fn without_runtime(&self) -> Self {
                    self.detached()
                }
            }
        )*
    };
}

impl_joint_2d_component!(
    DistanceJoint2DComponent,
    SpringJoint2DComponent,
    HingeJoint2DComponent,
    SliderJoint2DComponent,
    WheelJoint2DComponent,
);

// ============================================================================
// 3D physics
// ============================================================================

impl Component for RigidbodyComponent {
    fn on_added(scene: &mut Scene, entity: Entity) {
        if scene.physics_3d.is_some() {
            scene.create_body_3d(entity);
        }
    }

    fn on_removed(&mut self, scene: &mut Scene, _entity: Entity) {
        if let Some(runtime) = self.runtime.take() {
            scene.release_body_3d(runtime.handle);
        }
    }

    fn without_runtime(&self) -> Self {
        self.detached()
    }
}

// A 3D body is one compound shape, so any collider change rebuilds it
macro_rules! impl_collider_3d_component {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Component for $ty {
                fn on_added(scene: &mut Scene, entity: Entity) {
                    scene.rebuild_body_3d(entity);
                }

                fn on_removed(&mut self, scene: &mut Scene, entity: Entity) {
                    scene.rebuild_body_3d(entity);
                }
            }
        )*
    };
}

impl_collider_3d_component!(
    BoxColliderComponent,
    SphereColliderComponent,
    CapsuleColliderComponent,
    CylinderColliderComponent,
);
