//! # void_scene - Entity Scene Core
//!
//! Entities, components and the per-frame simulation of one scene:
//!
//! - [`Scene`] owns a sparse-set registry, the UUID map and the
//!   parent/child graph
//! - [`Entity`] is a copyable handle into one scene
//! - Runtime mode drives scripts, native scripts and the rapier 2D/3D worlds
//!   (bodies, colliders and 2D joints), then submits draw data to a
//!   [`SceneRenderer`]
//! - [`EntitySerializer`] and [`SceneSerializer`] read and write JSON entity,
//!   prefab and scene documents
//!
//! Copying, serialization and script access by type tag all go through one
//! [`component_table`].
//!
//! ## Example
//!
//! ```
//! use void_core::Timestep;
//! use void_scene::prelude::*;
//!
//! let mut scene = Scene::new("Level 1");
//! let camera = scene.create_entity("Camera");
//! scene.add_component(camera, CameraComponent::default());
//!
//! let player = scene.create_entity("Player");
//! scene.add_component(player, Rigidbody2DComponent::default());
//! scene.add_component(player, BoxCollider2DComponent::default());
//!
//! scene.on_runtime_start().unwrap();
//! scene.on_update_runtime(Timestep::from_seconds(1.0 / 60.0), &mut NullRenderer);
//! scene.on_runtime_stop();
//! ```

mod camera;
mod component;
mod component_table;
mod components;
mod config;
mod entity;
mod error;
mod native_script;
mod physics_bridge;
mod render;
mod runtime;
mod scene;
mod scene_serializer;
mod script_bridge;
mod serializer;

pub use camera::{CameraComponent, ProjectionType, SceneCamera};
pub use component::Component;
pub use component_table::{component_entry, component_table, ComponentEntry};
pub use components::{
    AttenuationModel, AudioListenerComponent, AudioSourceComponent, CullMode, IdComponent,
    LightComponent, LightType, MeshComponent, PrefabComponent, RelationshipComponent,
    ScriptClassEntry, ScriptComponent, ShadowQuality, SkyLightComponent, SpriteRendererComponent,
    TagComponent, TransformComponent,
};
pub use config::SceneConfig;
pub use entity::{Entity, SceneId};
pub use error::{Result, SceneError};
pub use native_script::{NativeScript, NativeScriptComponent, NativeScriptFactory};
pub use render::{CameraData, LightSubmission, NullRenderer, SceneRenderer, SkyLightSubmission};
pub use scene::{Scene, SharedScriptEngine, DEFAULT_ENTITY_NAME};
pub use scene_serializer::SceneSerializer;
pub use script_bridge::component_bridge;
pub use serializer::EntitySerializer;

pub use void_physics::{
    BodyType, BoxCollider2DComponent, BoxColliderComponent, CapsuleColliderComponent,
    CircleCollider2DComponent, CylinderColliderComponent, DistanceJoint2DComponent,
    HingeJoint2DComponent, PolygonCollider2DComponent, Rigidbody2DComponent, RigidbodyComponent,
    SliderJoint2DComponent, SphereColliderComponent, SpringJoint2DComponent,
    WheelJoint2DComponent,
};

/// Prelude - commonly used types
pub mod prelude {
    pub use crate::{
        BodyType, BoxCollider2DComponent, BoxColliderComponent, CameraComponent,
        CircleCollider2DComponent, Component, DistanceJoint2DComponent, Entity, EntitySerializer,
        HingeJoint2DComponent, LightComponent, MeshComponent, NativeScript, NativeScriptComponent,
        NullRenderer, PrefabComponent, RelationshipComponent, Rigidbody2DComponent,
        RigidbodyComponent, Scene, SceneConfig, SceneRenderer, SceneSerializer, ScriptComponent,
        SphereColliderComponent, SpriteRendererComponent, TagComponent, TransformComponent,
    };
}
