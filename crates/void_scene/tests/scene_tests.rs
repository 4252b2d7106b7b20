//! Integration tests for void_scene entities and the relationship graph

use approx::assert_relative_eq;
use glam::Vec3;
use void_core::Uuid;
use void_scene::prelude::*;
use void_scene::{AudioSourceComponent, SceneError};

/// Every child listed by a parent points back at it, and vice versa
fn assert_graph_consistent(scene: &Scene) {
    for entity in scene.entities() {
        let uuid = scene.uuid(entity);
        let relationship = scene.get_component::<RelationshipComponent>(entity);
        if !relationship.parent.is_nil() {
            let parent = scene.get_entity(relationship.parent);
            assert!(scene.is_valid(parent), "dangling parent of {}", uuid);
            let siblings = &scene.get_component::<RelationshipComponent>(parent).children;
            assert_eq!(siblings.iter().filter(|&&c| c == uuid).count(), 1);
        }
        for child in &relationship.children {
            let child = scene.get_entity(*child);
            assert!(scene.is_valid(child), "dangling child of {}", uuid);
            assert_eq!(scene.get_component::<RelationshipComponent>(child).parent, uuid);
        }
    }
}

#[test]
fn test_required_components_present() {
    let mut scene = Scene::new("Test");
    let e = scene.create_entity("");
    assert!(scene.has_component::<RelationshipComponent>(e));
    assert!(scene.has_component::<TransformComponent>(e));
    assert!(scene.has_component::<TagComponent>(e));
    assert_eq!(scene.tag(e), "Entity");
    assert!(scene.has_entity(scene.uuid(e)));
}

#[test]
fn test_world_transform_follows_parent() {
    let mut scene = Scene::new("Test");
    let a = scene.create_entity("A");
    let b = scene.create_entity("B");
    scene.get_component_mut::<TransformComponent>(b).translation = Vec3::new(1.0, 0.0, 0.0);
    scene.set_parent(b, a).unwrap();

    let world = scene.world_transform(b);
    assert_relative_eq!(world.w_axis.x, 1.0);
    assert_relative_eq!(world.w_axis.y, 0.0);

    scene.get_component_mut::<TransformComponent>(a).translation = Vec3::new(5.0, 0.0, 0.0);
    let world = scene.world_transform(b);
    assert_relative_eq!(world.w_axis.x, 6.0);
    assert_relative_eq!(world.w_axis.z, 0.0);
}

#[test]
fn test_deparent_is_idempotent() {
    let mut scene = Scene::new("Test");
    let a = scene.create_entity("A");
    let b = scene.create_entity("B");
    scene.set_parent(b, a).unwrap();

    scene.deparent(b);
    scene.deparent(b);
    assert!(scene.get_component::<RelationshipComponent>(b).parent.is_nil());
    assert!(scene.children(a).is_empty());
    assert_graph_consistent(&scene);
}

#[test]
fn test_cycle_rejected_without_change() {
    let mut scene = Scene::new("Test");
    let a = scene.create_entity("A");
    let b = scene.create_entity("B");
    let c = scene.create_entity("C");
    scene.set_parent(b, a).unwrap();
    scene.set_parent(c, b).unwrap();

    assert!(matches!(
        scene.set_parent(a, c),
        Err(SceneError::CycleDetected { .. })
    ));
    assert!(scene.get_component::<RelationshipComponent>(a).parent.is_nil());
    assert!(scene.is_ancestor(a, c));
    assert_graph_consistent(&scene);
}

#[test]
fn test_destroy_removes_whole_subtree() {
    let mut scene = Scene::new("Test");
    let keep = scene.create_entity("Keep");
    let root = scene.create_entity("Root");
    scene.set_parent(root, keep).unwrap();

    let mut removed: Vec<Uuid> = vec![scene.uuid(root)];
    for i in 0..3 {
        let child = scene.create_entity(&format!("Child {}", i));
        scene.set_parent(child, root).unwrap();
        removed.push(scene.uuid(child));
        let grandchild = scene.create_entity(&format!("Grandchild {}", i));
        scene.set_parent(grandchild, child).unwrap();
        removed.push(scene.uuid(grandchild));
    }
    let before = scene.entity_count();

    scene.destroy_entity(root);
    assert_eq!(scene.entity_count(), before - removed.len());
    for uuid in &removed {
        assert!(!scene.has_entity(*uuid));
    }
    assert!(scene.children(keep).is_empty());
    assert_graph_consistent(&scene);
}

#[test]
fn test_copy_to_drops_components_not_on_copy_list() {
    let mut source = Scene::new("Source");
    let parent = source.create_entity("Parent");
    let child = source.create_entity("Child");
    source.set_parent(child, parent).unwrap();
    source.add_component(child, AudioSourceComponent::default());
    source.add_component(child, SpriteRendererComponent::default());
    source.get_component_mut::<TransformComponent>(child).translation = Vec3::new(2.0, 3.0, 4.0);

    let copy = source.copy();
    assert_eq!(copy.entity_count(), 2);

    let copied_child = copy.get_entity(source.uuid(child));
    assert!(copy.is_valid(copied_child));
    assert!(!copy.has_component::<AudioSourceComponent>(copied_child));
    assert!(copy.has_component::<SpriteRendererComponent>(copied_child));
    assert_eq!(
        copy.get_component::<TransformComponent>(copied_child).translation,
        Vec3::new(2.0, 3.0, 4.0)
    );
    assert_eq!(copy.parent(copied_child), copy.get_entity(source.uuid(parent)));
    assert_graph_consistent(&copy);

    // The source is untouched
    assert!(source.has_component::<AudioSourceComponent>(child));
}

#[test]
fn test_copy_carries_layers_and_settings() {
    let mut source = Scene::new("Source");
    source
        .layers_mut()
        .set_layer(6, "Projectiles", 0x0002)
        .unwrap();
    source.physics_settings_mut().velocity_iterations = 20;

    let copy = source.copy();
    assert_eq!(copy.layers(), source.layers());
    assert_eq!(copy.physics_settings().velocity_iterations, 20);
    assert_ne!(copy.id(), source.id());
}

#[test]
fn test_handles_do_not_cross_scenes() {
    let mut first = Scene::new("First");
    let second = Scene::new("Second");
    let e = first.create_entity("E");
    assert!(first.is_valid(e));
    assert!(!second.is_valid(e));
    assert!(second.try_get_component::<TagComponent>(e).is_none());
}
