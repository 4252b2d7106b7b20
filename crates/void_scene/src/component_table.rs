//! The component table
//!
//! One entry per component type that copying, serialization or script
//! access needs to know about. [`Scene::copy_to`], [`Scene::duplicate`], the
//! entity serializer and the script component bridge all read this table, so
//! a new component type is registered exactly once.

use std::sync::OnceLock;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use void_physics::{
    BoxCollider2DComponent, BoxColliderComponent, CapsuleColliderComponent,
    CircleCollider2DComponent, CylinderColliderComponent, DistanceJoint2DComponent,
    HingeJoint2DComponent, PolygonCollider2DComponent, Rigidbody2DComponent, RigidbodyComponent,
    SliderJoint2DComponent, SphereColliderComponent, SpringJoint2DComponent,
    WheelJoint2DComponent,
};

use crate::camera::CameraComponent;
use crate::component::Component;
use crate::components::{
    AudioListenerComponent, AudioSourceComponent, LightComponent, MeshComponent, PrefabComponent,
    RelationshipComponent, ScriptComponent, SkyLightComponent, SpriteRendererComponent,
    TagComponent, TransformComponent,
};
use crate::entity::Entity;
use crate::error::Result;
use crate::native_script::NativeScriptComponent;
use crate::serializer;
use crate::Scene;

type HasFn = fn(&Scene, Entity) -> bool;
type CopyBetweenFn = fn(&Scene, Entity, &mut Scene, Entity);
type CopyWithinFn = fn(&mut Scene, Entity, Entity);
type AddDefaultFn = fn(&mut Scene, Entity);
type SerializeFn = fn(&Scene, Entity) -> Result<Value>;
type DeserializeFn = fn(&mut Scene, Entity, &Value) -> Result<()>;

/// What the scene can do with one component type
pub struct ComponentEntry {
    /// Document key and script type tag
    pub name: &'static str,
    has: HasFn,
    copy_between: Option<CopyBetweenFn>,
    copy_within: Option<CopyWithinFn>,
    add_default: Option<AddDefaultFn>,
    serialize: Option<SerializeFn>,
    deserialize: Option<DeserializeFn>,
}

impl ComponentEntry {
    fn new<T: Component>(name: &'static str) -> Self {
        Self {
            name,
            has: has_component::<T>,
            copy_between: None,
            copy_within: None,
            add_default: None,
            serialize: None,
            deserialize: None,
        }
    }

    fn with_copy<T: Component>(mut self) -> Self {
        self.copy_between = Some(copy_between::<T>);
        self.copy_within = Some(copy_within::<T>);
        self
    }

    fn with_serialization<T>(mut self) -> Self
    where
        T: Component + Default + Serialize + DeserializeOwned,
    {
        self.serialize = Some(serialize_component::<T>);
        self.deserialize = Some(deserialize_component::<T>);
        self
    }

    fn with_serde(mut self, serialize: SerializeFn, deserialize: DeserializeFn) -> Self {
        self.serialize = Some(serialize);
        self.deserialize = Some(deserialize);
        self
    }

    /// Allow scripts to add the component by tag
    fn with_add<T: Component + Default>(mut self) -> Self {
        self.add_default = Some(add_default::<T>);
        self
    }

    pub fn is_copyable(&self) -> bool {
        self.copy_between.is_some()
    }

    pub fn is_serializable(&self) -> bool {
        self.serialize.is_some()
    }

    pub fn is_addable(&self) -> bool {
        self.add_default.is_some()
    }

    pub fn has(&self, scene: &Scene, entity: Entity) -> bool {
        (self.has)(scene, entity)
    }

    /// Copy from one scene to another if the source has the component
    pub fn copy_between(&self, src: &Scene, src_entity: Entity, dst: &mut Scene, dst_entity: Entity) {
        if let Some(copy) = self.copy_between {
            if self.has(src, src_entity) {
                copy(src, src_entity, dst, dst_entity);
            }
        }
    }

    /// Copy between two entities of one scene if the source has the component
    pub fn copy_within(&self, scene: &mut Scene, src: Entity, dst: Entity) {
        if let Some(copy) = self.copy_within {
            if self.has(scene, src) {
                copy(scene, src, dst);
            }
        }
    }

    /// Returns false when the type cannot be added by tag
    pub fn add_default(&self, scene: &mut Scene, entity: Entity) -> bool {
        match self.add_default {
            Some(add) => {
                add(scene, entity);
                true
            }
            None => false,
        }
    }

    /// `None` when the entity lacks the component or the type is not serializable
    pub fn serialize(&self, scene: &Scene, entity: Entity) -> Option<Result<Value>> {
        let serialize = self.serialize?;
        if !self.has(scene, entity) {
            return None;
        }
        Some(serialize(scene, entity))
    }

    pub fn deserialize(&self, scene: &mut Scene, entity: Entity, node: &Value) -> Result<()> {
        match self.deserialize {
            Some(deserialize) => deserialize(scene, entity, node),
            None => Ok(()),
        }
    }
}

fn has_component<T: Component>(scene: &Scene, entity: Entity) -> bool {
    scene.has_component::<T>(entity)
}

fn copy_between<T: Component>(src: &Scene, src_entity: Entity, dst: &mut Scene, dst_entity: Entity) {
    let component = src.get_component::<T>(src_entity).without_runtime();
    dst.add_component(dst_entity, component);
}

fn copy_within<T: Component>(scene: &mut Scene, src: Entity, dst: Entity) {
    let component = scene.get_component::<T>(src).without_runtime();
    scene.add_component(dst, component);
}

fn add_default<T: Component + Default>(scene: &mut Scene, entity: Entity) {
    scene.add_component(entity, T::default());
}

fn serialize_component<T: Component + Serialize>(scene: &Scene, entity: Entity) -> Result<Value> {
    Ok(serde_json::to_value(scene.get_component::<T>(entity))?)
}

fn deserialize_component<T>(scene: &mut Scene, entity: Entity, node: &Value) -> Result<()>
where
    T: Component + Default + Serialize + DeserializeOwned,
{
    let component: T = serializer::read_permissive(node);
    scene.add_component(entity, component);
    Ok(())
}

/// Every registered component type, in copy and document order
///
/// Rigid bodies precede their colliders so fixtures find their body.
pub fn component_table() -> &'static [ComponentEntry] {
    static TABLE: OnceLock<Vec<ComponentEntry>> = OnceLock::new();
    TABLE.get_or_init(|| {
        vec![
            ComponentEntry::new::<TagComponent>("TagComponent")
                .with_copy::<TagComponent>()
                .with_serialization::<TagComponent>(),
            ComponentEntry::new::<TransformComponent>("TransformComponent")
                .with_copy::<TransformComponent>()
                .with_serialization::<TransformComponent>(),
            ComponentEntry::new::<RelationshipComponent>("RelationshipComponent")
                .with_serialization::<RelationshipComponent>(),
            ComponentEntry::new::<PrefabComponent>("PrefabComponent")
                .with_copy::<PrefabComponent>()
                .with_serialization::<PrefabComponent>(),
            ComponentEntry::new::<CameraComponent>("CameraComponent")
                .with_copy::<CameraComponent>()
                .with_serialization::<CameraComponent>()
                .with_add::<CameraComponent>(),
            ComponentEntry::new::<SpriteRendererComponent>("SpriteRendererComponent")
                .with_copy::<SpriteRendererComponent>()
                .with_serialization::<SpriteRendererComponent>()
                .with_add::<SpriteRendererComponent>(),
            ComponentEntry::new::<MeshComponent>("MeshComponent")
                .with_copy::<MeshComponent>()
                .with_serialization::<MeshComponent>()
                .with_add::<MeshComponent>(),
            ComponentEntry::new::<SkyLightComponent>("SkyLightComponent")
                .with_copy::<SkyLightComponent>()
                .with_serialization::<SkyLightComponent>()
                .with_add::<SkyLightComponent>(),
            ComponentEntry::new::<LightComponent>("LightComponent")
                .with_copy::<LightComponent>()
                .with_serialization::<LightComponent>()
                .with_add::<LightComponent>(),
            ComponentEntry::new::<AudioSourceComponent>("AudioSourceComponent")
                .with_serialization::<AudioSourceComponent>()
                .with_add::<AudioSourceComponent>(),
            ComponentEntry::new::<AudioListenerComponent>("AudioListenerComponent")
                .with_serialization::<AudioListenerComponent>()
                .with_add::<AudioListenerComponent>(),
            ComponentEntry::new::<ScriptComponent>("ScriptComponent")
                .with_copy::<ScriptComponent>()
                .with_serde(
                    serializer::serialize_script_component,
                    serializer::deserialize_script_component,
                ),
            ComponentEntry::new::<NativeScriptComponent>("NativeScriptComponent")
                .with_copy::<NativeScriptComponent>(),
            ComponentEntry::new::<Rigidbody2DComponent>("Rigidbody2DComponent")
                .with_copy::<Rigidbody2DComponent>()
                .with_serialization::<Rigidbody2DComponent>()
                .with_add::<Rigidbody2DComponent>(),
            ComponentEntry::new::<BoxCollider2DComponent>("BoxCollider2DComponent")
                .with_copy::<BoxCollider2DComponent>()
                .with_serialization::<BoxCollider2DComponent>()
                .with_add::<BoxCollider2DComponent>(),
            ComponentEntry::new::<CircleCollider2DComponent>("CircleCollider2DComponent")
                .with_copy::<CircleCollider2DComponent>()
                .with_serialization::<CircleCollider2DComponent>()
                .with_add::<CircleCollider2DComponent>(),
            ComponentEntry::new::<PolygonCollider2DComponent>("PolygonCollider2DComponent")
                .with_copy::<PolygonCollider2DComponent>()
                .with_serialization::<PolygonCollider2DComponent>()
                .with_add::<PolygonCollider2DComponent>(),
            ComponentEntry::new::<DistanceJoint2DComponent>("DistanceJoint2DComponent")
                .with_copy::<DistanceJoint2DComponent>()
                .with_serialization::<DistanceJoint2DComponent>()
                .with_add::<DistanceJoint2DComponent>(),
            ComponentEntry::new::<SpringJoint2DComponent>("SpringJoint2DComponent")
                .with_copy::<SpringJoint2DComponent>()
                .with_serialization::<SpringJoint2DComponent>()
                .with_add::<SpringJoint2DComponent>(),
            ComponentEntry::new::<HingeJoint2DComponent>("HingeJoint2DComponent")
                .with_copy::<HingeJoint2DComponent>()
                .with_serialization::<HingeJoint2DComponent>()
                .with_add::<HingeJoint2DComponent>(),
            ComponentEntry::new::<SliderJoint2DComponent>("SliderJoint2DComponent")
                .with_copy::<SliderJoint2DComponent>()
                .with_serialization::<SliderJoint2DComponent>()
                .with_add::<SliderJoint2DComponent>(),
            ComponentEntry::new::<WheelJoint2DComponent>("WheelJoint2DComponent")
                .with_copy::<WheelJoint2DComponent>()
                .with_serialization::<WheelJoint2DComponent>()
                .with_add::<WheelJoint2DComponent>(),
            ComponentEntry::new::<RigidbodyComponent>("RigidbodyComponent")
                .with_copy::<RigidbodyComponent>()
                .with_serialization::<RigidbodyComponent>()
                .with_add::<RigidbodyComponent>(),
            ComponentEntry::new::<BoxColliderComponent>("BoxColliderComponent")
                .with_copy::<BoxColliderComponent>()
                .with_serialization::<BoxColliderComponent>()
                .with_add::<BoxColliderComponent>(),
            ComponentEntry::new::<SphereColliderComponent>("SphereColliderComponent")
                .with_copy::<SphereColliderComponent>()
                .with_serialization::<SphereColliderComponent>()
                .with_add::<SphereColliderComponent>(),
            ComponentEntry::new::<CapsuleColliderComponent>("CapsuleColliderComponent")
                .with_copy::<CapsuleColliderComponent>()
                .with_serialization::<CapsuleColliderComponent>()
                .with_add::<CapsuleColliderComponent>(),
            ComponentEntry::new::<CylinderColliderComponent>("CylinderColliderComponent")
                .with_copy::<CylinderColliderComponent>()
                .with_serialization::<CylinderColliderComponent>()
                .with_add::<CylinderColliderComponent>(),
        ]
    })
}

/// Look an entry up by its name
pub fn component_entry(name: &str) -> Option<&'static ComponentEntry> {
    component_table().iter().find(|entry| entry.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_is_not_copyable() {
        let source = component_entry("AudioSourceComponent").unwrap();
        assert!(!source.is_copyable());
        assert!(source.is_serializable());
        assert!(!component_entry("AudioListenerComponent").unwrap().is_copyable());
    }

    #[test]
    fn test_native_scripts_are_not_serialized() {
        let native = component_entry("NativeScriptComponent").unwrap();
        assert!(native.is_copyable());
        assert!(!native.is_serializable());
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<_> = component_table().iter().map(|e| e.name).collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
    }

    #[test]
    fn test_rigidbodies_precede_colliders() {
        let position = |name| {
            component_table()
                .iter()
                .position(|e| e.name == name)
                .unwrap()
        };
        assert!(position("Rigidbody2DComponent") < position("BoxCollider2DComponent"));
        assert!(position("RigidbodyComponent") < position("SphereColliderComponent"));
        assert!(position("Rigidbody2DComponent") < position("HingeJoint2DComponent"));
    }
}
