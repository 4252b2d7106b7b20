//! Integration tests for void_scene scene and prefab documents

mod common;

use std::collections::HashSet;

use glam::{Vec2, Vec3, Vec4};
use serde_json::{json, Value};
use tempfile::tempdir;
use void_core::Uuid;
use void_scene::prelude::*;
use void_scene::{
    AttenuationModel, AudioListenerComponent, AudioSourceComponent, CapsuleColliderComponent,
    CullMode, CylinderColliderComponent, LightType, PolygonCollider2DComponent, ProjectionType,
    SceneCamera, ShadowQuality, SkyLightComponent, SliderJoint2DComponent,
    SpringJoint2DComponent, WheelJoint2DComponent,
};
use void_scripting::FieldValue;

fn build_level() -> (Scene, Entity, Entity) {
    let mut scene = Scene::new("Level 1");
    let parent = scene.create_entity("Parent");
    let child = scene.create_entity("Child");
    scene.set_parent(child, parent).unwrap();
    scene.add_component(
        child,
        SpriteRendererComponent {
            color: Vec4::new(0.2, 0.4, 0.6, 1.0),
            sorting_order: 3,
            ..Default::default()
        },
    );
    scene.add_component(child, Rigidbody2DComponent::default());
    scene.add_component(child, BoxCollider2DComponent::default());
    scene.layers_mut().set_layer(4, "Enemies", 0x0001).unwrap();
    scene.physics_settings_mut().gravity_2d = [0.0, -3.0];
    (scene, parent, child)
}

#[test]
fn test_scene_file_round_trip() {
    common::init_logging();
    let dir = tempdir().unwrap();
    let path = dir.path().join("level.json");
    let (scene, parent, child) = build_level();
    SceneSerializer::save(&scene, &path).unwrap();
    assert!(SceneSerializer::config_path(&path).exists());

    let mut loaded = Scene::new("Untitled");
    SceneSerializer::load(&mut loaded, &path).unwrap();

    assert_eq!(loaded.name(), "Level 1");
    assert_eq!(loaded.entity_count(), 2);
    assert_eq!(loaded.config(), scene.config());

    let loaded_parent = loaded.get_entity(scene.uuid(parent));
    let loaded_child = loaded.get_entity(scene.uuid(child));
    assert!(loaded.is_valid(loaded_parent));
    assert!(loaded.is_valid(loaded_child));
    assert_eq!(loaded.parent(loaded_child), loaded_parent);
    assert_eq!(loaded.tag(loaded_child), "Child");

    let sprite = loaded.get_component::<SpriteRendererComponent>(loaded_child);
    assert_eq!(sprite.color, Vec4::new(0.2, 0.4, 0.6, 1.0));
    assert_eq!(sprite.sorting_order, 3);
    assert!(loaded.has_component::<BoxCollider2DComponent>(loaded_child));
    assert!(loaded
        .get_component::<Rigidbody2DComponent>(loaded_child)
        .runtime
        .is_none());
}

#[test]
fn test_loading_twice_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("level.json");
    let (scene, _, _) = build_level();
    SceneSerializer::save(&scene, &path).unwrap();

    let mut loaded = Scene::new("Untitled");
    SceneSerializer::load(&mut loaded, &path).unwrap();
    assert!(SceneSerializer::load(&mut loaded, &path).is_err());
    assert_eq!(loaded.entity_count(), 2);
}

#[test]
fn test_runtime_state_is_not_written() {
    let (mut scene, _, child) = build_level();
    scene.on_runtime_start().unwrap();
    let node = EntitySerializer::serialize_entity(&scene, child).unwrap();
    scene.on_runtime_stop();

    let body = node["Rigidbody2DComponent"].as_object().unwrap();
    assert!(!body.contains_key("Runtime"));
    assert_eq!(body["BodyType"], json!("Dynamic"));
}

#[test]
fn test_prefab_instances_get_fresh_ids() {
    common::init_logging();
    let dir = tempdir().unwrap();
    let path = dir.path().join("tree.prefab");

    let mut source = Scene::new("Source");
    let outside = source.create_entity("Outside");
    let root = source.create_entity("Root");
    source.set_parent(root, outside).unwrap();
    let left = source.create_entity("Left");
    let right = source.create_entity("Right");
    let leaf = source.create_entity("Leaf");
    source.set_parent(left, root).unwrap();
    source.set_parent(right, root).unwrap();
    source.set_parent(leaf, left).unwrap();

    EntitySerializer::save_prefab(&mut source, root, &path).unwrap();
    let document: Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let prefab_id = Uuid::from_u64(document["Prefab"].as_u64().unwrap());
    assert_eq!(source.get_component::<PrefabComponent>(root).id, prefab_id);
    assert_eq!(document["Entities"].as_array().unwrap().len(), 4);

    let source_ids: HashSet<Uuid> = source.entities().into_iter().map(|e| source.uuid(e)).collect();
    let mut target = Scene::new("Target");
    let first = EntitySerializer::load_prefab(&path, &mut target).unwrap();
    let second = EntitySerializer::load_prefab(&path, &mut target).unwrap();
    assert_eq!(target.entity_count(), 8);

    let target_ids: HashSet<Uuid> = target.entities().into_iter().map(|e| target.uuid(e)).collect();
    assert_eq!(target_ids.len(), 8);
    assert!(target_ids.is_disjoint(&source_ids));

    for instance in [first, second] {
        assert_eq!(target.tag(instance), "Root");
        assert_eq!(target.get_component::<PrefabComponent>(instance).id, prefab_id);
        assert!(target
            .get_component::<RelationshipComponent>(instance)
            .parent
            .is_nil());

        let children = target.children(instance);
        let names: Vec<&str> = children.iter().map(|&c| target.tag(c)).collect();
        assert_eq!(names, ["Left", "Right"]);
        let leaves = target.children(children[0]);
        assert_eq!(leaves.len(), 1);
        assert_eq!(target.tag(leaves[0]), "Leaf");
        assert_eq!(target.parent(leaves[0]), children[0]);
        assert!(target.children(children[1]).is_empty());
    }
    assert_ne!(target.uuid(first), target.uuid(second));
}

#[test]
fn test_prefab_document_validated_before_creation() {
    let mut scene = Scene::new("Target");
    let document = json!({
        "Prefab": 9,
        "Entities": [{ "Entity": 1 }, { "TagComponent": { "Tag": "No id" } }],
    });
    assert!(EntitySerializer::deserialize_entity_as_prefab(&document, &mut scene).is_err());
    assert_eq!(scene.entity_count(), 0);

    let empty = json!({ "Prefab": 9, "Entities": [] });
    assert!(EntitySerializer::deserialize_entity_as_prefab(&empty, &mut scene).is_err());
}

#[test]
fn test_dangling_prefab_child_is_dropped() {
    common::init_logging();
    let mut scene = Scene::new("Target");
    let document = json!({
        "Prefab": 9,
        "Entities": [
            {
                "Entity": 100,
                "TagComponent": { "Tag": "Root" },
                "RelationshipComponent": { "Parent": 0, "Children": [101, 555] },
            },
            {
                "Entity": 101,
                "TagComponent": { "Tag": "Kid" },
                "RelationshipComponent": { "Parent": 100, "Children": [] },
            },
        ],
    });

    let root = EntitySerializer::deserialize_entity_as_prefab(&document, &mut scene).unwrap();
    let children = scene.children(root);
    assert_eq!(children.len(), 1);
    assert_eq!(scene.tag(children[0]), "Kid");
    assert_eq!(scene.parent(children[0]), root);
}

#[test]
fn test_script_documents_follow_class_declarations() {
    common::init_logging();
    let (engine, _) = common::script_engine();
    let mut scene = Scene::new("Level");
    scene.set_script_engine(Some(engine));

    let player = scene.create_entity("Player");
    scene.add_component(player, ScriptComponent::new("Game.Player"));
    scene.sync_script_fields(player);
    let node = EntitySerializer::serialize_entity(&scene, player).unwrap();
    let fields = &node["ScriptComponent"]["Scripts"][0]["Fields"];
    assert!(fields.get("Speed").is_some());
    assert!(fields.get("Secret").is_none());

    let document = json!({
        "Entity": 4242,
        "ScriptComponent": {
            "Scripts": [
                { "Name": "Game.Removed", "Fields": {} },
                { "Name": "Game.Enemy", "Fields": { "Health": { "Int": 3 } } },
            ],
        },
    });
    let enemy = EntitySerializer::deserialize_entity(&document, &mut scene, true).unwrap();
    let scripts = scene.get_component::<ScriptComponent>(enemy);
    assert_eq!(scripts.class_names().collect::<Vec<_>>(), ["Game.Enemy"]);
    assert_eq!(
        scripts.class("Game.Enemy").unwrap().fields.get("Health"),
        Some(&FieldValue::Int(3))
    );
}

fn assert_survives<T: Component + PartialEq + std::fmt::Debug>(
    scene: &Scene,
    loaded: &Scene,
    entity: Entity,
) {
    let copy = loaded.get_entity(scene.uuid(entity));
    assert!(loaded.is_valid(copy));
    assert_eq!(
        loaded.get_component::<T>(copy),
        scene.get_component::<T>(entity),
        "{} on {}",
        std::any::type_name::<T>(),
        scene.tag(entity)
    );
}

#[test]
fn test_every_component_keeps_its_fields() {
    common::init_logging();
    let dir = tempdir().unwrap();
    let path = dir.path().join("everything.json");
    let mut scene = Scene::new("Everything");

    let props = scene.create_entity("Props");
    scene.add_component(
        props,
        CameraComponent {
            camera: SceneCamera {
                projection_type: ProjectionType::Orthographic,
                perspective_fov: 1.25,
                perspective_near: 0.5,
                perspective_far: 250.0,
                orthographic_size: 18.0,
                orthographic_near: -4.0,
                orthographic_far: 6.0,
                aspect_ratio: 1.5,
            },
            primary: false,
            fixed_aspect_ratio: true,
        },
    );
    scene.add_component(
        props,
        MeshComponent {
            filepath: "assets/meshes/crate.fbx".into(),
            submesh_index: 2,
            cull_mode: CullMode::Front,
        },
    );
    scene.add_component(
        props,
        SkyLightComponent {
            texture: Some("assets/env/dusk.hdr".into()),
            intensity: 1.75,
            rotation: 0.5,
        },
    );
    scene.add_component(
        props,
        LightComponent {
            light_type: LightType::Spot,
            use_color_temperature_mode: true,
            temperature: 3200,
            color: Vec3::new(1.0, 0.5, 0.25),
            intensity: 8.0,
            range: 12.0,
            cut_off_angle: 20.0,
            outer_cut_off_angle: 30.0,
            shadow_quality: ShadowQuality::Hard,
        },
    );
    scene.add_component(
        props,
        AudioSourceComponent {
            filepath: "assets/audio/hum.wav".into(),
            volume_multiplier: 0.5,
            pitch_multiplier: 1.5,
            play_on_awake: false,
            looping: true,
            spatialization: true,
            attenuation_model: AttenuationModel::Exponential,
            roll_off: 2.0,
            min_gain: 0.25,
            max_gain: 0.75,
            min_distance: 2.0,
            max_distance: 40.0,
            cone_inner_angle: 1.0,
            cone_outer_angle: 2.0,
            cone_outer_gain: 0.5,
            doppler_factor: 0.25,
        },
    );
    scene.add_component(
        props,
        AudioListenerComponent {
            active: false,
            cone_inner_angle: 1.5,
            cone_outer_angle: 3.0,
            cone_outer_gain: 0.125,
        },
    );
    scene.add_component(props, PrefabComponent { id: Uuid::from_u64(777) });
    let mut scripts = ScriptComponent::new("Game.Player");
    scripts
        .add_class("Game.Enemy")
        .fields
        .insert("Health".into(), FieldValue::Int(3));
    scene.add_component(props, scripts);

    let body_2d = scene.create_entity("Body2D");
    scene.add_component(
        body_2d,
        Rigidbody2DComponent {
            body_type: BodyType::Kinematic,
            mass: 4.0,
            linear_drag: 0.5,
            angular_drag: 0.25,
            gravity_scale: 2.0,
            auto_mass: false,
            allow_sleep: false,
            awake: false,
            continuous: true,
            interpolation: false,
            freeze_rotation: true,
            ..Default::default()
        },
    );
    scene.add_component(
        body_2d,
        BoxCollider2DComponent {
            offset: Vec2::new(0.5, -0.5),
            size: Vec2::new(2.0, 0.25),
            density: 3.0,
            friction: 0.125,
            restitution: 0.75,
            is_sensor: true,
            ..Default::default()
        },
    );
    scene.add_component(
        body_2d,
        CircleCollider2DComponent {
            offset: Vec2::new(-1.0, 1.0),
            radius: 0.75,
            density: 2.0,
            friction: 0.25,
            restitution: 0.5,
            is_sensor: true,
            ..Default::default()
        },
    );
    scene.add_component(
        body_2d,
        PolygonCollider2DComponent {
            vertices: vec![Vec2::new(0.0, 0.0), Vec2::new(2.0, 0.0), Vec2::new(1.0, 1.5)],
            density: 0.5,
            friction: 0.75,
            restitution: 0.25,
            is_sensor: true,
            ..Default::default()
        },
    );

    let body_3d = scene.create_entity("Body3D");
    scene.add_component(
        body_3d,
        RigidbodyComponent {
            body_type: BodyType::Static,
            mass: 9.0,
            linear_drag: 0.5,
            angular_drag: 0.25,
            gravity_scale: 0.5,
            auto_mass: false,
            allow_sleep: false,
            awake: false,
            continuous: true,
            interpolation: false,
            is_sensor: true,
            ..Default::default()
        },
    );
    scene.add_component(
        body_3d,
        BoxColliderComponent {
            half_size: Vec3::new(1.0, 2.0, 3.0),
            offset: Vec3::new(0.5, 0.0, -0.5),
            density: 2.0,
            friction: 0.25,
            restitution: 0.5,
        },
    );
    scene.add_component(
        body_3d,
        SphereColliderComponent {
            radius: 1.5,
            offset: Vec3::new(0.0, 1.0, 0.0),
            density: 3.0,
            friction: 0.75,
            restitution: 0.125,
        },
    );
    scene.add_component(
        body_3d,
        CapsuleColliderComponent {
            radius: 0.25,
            half_height: 1.25,
            offset: Vec3::new(0.0, -1.0, 0.0),
            density: 4.0,
            friction: 0.5,
            restitution: 0.25,
        },
    );
    scene.add_component(
        body_3d,
        CylinderColliderComponent {
            radius: 0.5,
            half_height: 2.5,
            offset: Vec3::new(1.0, 0.0, 1.0),
            density: 5.0,
            friction: 0.125,
            restitution: 0.75,
        },
    );

    let anchor = scene.uuid(body_2d);
    let joints = scene.create_entity("Joints");
    scene.add_component(
        joints,
        DistanceJoint2DComponent {
            connected_rigidbody: anchor,
            anchor: Vec2::new(0.5, 0.0),
            connected_anchor: Vec2::new(-0.5, 0.0),
            distance: 3.0,
            min_distance: 1.0,
            max_distance_by: 0.5,
            break_force: 40.0,
            auto_distance: false,
            enable_collision: true,
            ..Default::default()
        },
    );
    scene.add_component(
        joints,
        SpringJoint2DComponent {
            connected_rigidbody: anchor,
            anchor: Vec2::new(0.0, 0.5),
            connected_anchor: Vec2::new(0.0, -0.5),
            distance: 2.0,
            min_distance: 0.5,
            max_distance_by: 1.5,
            frequency: 6.0,
            damping_ratio: 0.25,
            break_force: 30.0,
            auto_distance: false,
            enable_collision: true,
            ..Default::default()
        },
    );
    scene.add_component(
        joints,
        HingeJoint2DComponent {
            connected_rigidbody: anchor,
            anchor: Vec2::new(1.0, 1.0),
            lower_angle: -0.5,
            upper_angle: 0.75,
            motor_speed: 2.0,
            max_motor_torque: 15.0,
            break_force: 50.0,
            break_torque: 25.0,
            use_limits: true,
            use_motor: true,
            enable_collision: true,
            ..Default::default()
        },
    );
    scene.add_component(
        joints,
        SliderJoint2DComponent {
            connected_rigidbody: anchor,
            anchor: Vec2::new(-1.0, 0.0),
            angle: 0.5,
            lower_translation: -2.0,
            upper_translation: 3.0,
            motor_speed: 1.5,
            max_motor_force: 12.0,
            break_force: 60.0,
            break_torque: 35.0,
            use_limits: true,
            use_motor: true,
            enable_collision: true,
            ..Default::default()
        },
    );
    scene.add_component(
        joints,
        WheelJoint2DComponent {
            connected_rigidbody: anchor,
            anchor: Vec2::new(0.0, -1.0),
            frequency: 3.0,
            damping_ratio: 0.5,
            lower_translation: -0.25,
            upper_translation: 0.25,
            motor_speed: 4.0,
            max_motor_torque: 20.0,
            break_force: 70.0,
            break_torque: 45.0,
            use_limits: true,
            use_motor: true,
            enable_collision: true,
            ..Default::default()
        },
    );

    SceneSerializer::save(&scene, &path).unwrap();
    let mut loaded = Scene::new("Untitled");
    SceneSerializer::load(&mut loaded, &path).unwrap();
    assert_eq!(loaded.entity_count(), 4);

    assert_survives::<CameraComponent>(&scene, &loaded, props);
    assert_survives::<MeshComponent>(&scene, &loaded, props);
    assert_survives::<SkyLightComponent>(&scene, &loaded, props);
    assert_survives::<LightComponent>(&scene, &loaded, props);
    assert_survives::<AudioSourceComponent>(&scene, &loaded, props);
    assert_survives::<AudioListenerComponent>(&scene, &loaded, props);
    assert_survives::<PrefabComponent>(&scene, &loaded, props);
    assert_survives::<ScriptComponent>(&scene, &loaded, props);

    assert_survives::<Rigidbody2DComponent>(&scene, &loaded, body_2d);
    assert_survives::<BoxCollider2DComponent>(&scene, &loaded, body_2d);
    assert_survives::<CircleCollider2DComponent>(&scene, &loaded, body_2d);
    assert_survives::<PolygonCollider2DComponent>(&scene, &loaded, body_2d);

    assert_survives::<RigidbodyComponent>(&scene, &loaded, body_3d);
    assert_survives::<BoxColliderComponent>(&scene, &loaded, body_3d);
    assert_survives::<SphereColliderComponent>(&scene, &loaded, body_3d);
    assert_survives::<CapsuleColliderComponent>(&scene, &loaded, body_3d);
    assert_survives::<CylinderColliderComponent>(&scene, &loaded, body_3d);

    assert_survives::<DistanceJoint2DComponent>(&scene, &loaded, joints);
    assert_survives::<SpringJoint2DComponent>(&scene, &loaded, joints);
    assert_survives::<HingeJoint2DComponent>(&scene, &loaded, joints);
    assert_survives::<SliderJoint2DComponent>(&scene, &loaded, joints);
    assert_survives::<WheelJoint2DComponent>(&scene, &loaded, joints);
}

#[test]
fn test_prefab_joints_follow_their_instance() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cart.prefab");

    let mut source = Scene::new("Source");
    let outside = source.create_entity("Outside");
    let cart = source.create_entity("Cart");
    let wheel = source.create_entity("Wheel");
    source.set_parent(wheel, cart).unwrap();
    source.add_component(
        wheel,
        WheelJoint2DComponent {
            connected_rigidbody: source.uuid(cart),
            ..Default::default()
        },
    );
    source.add_component(
        cart,
        HingeJoint2DComponent {
            connected_rigidbody: source.uuid(outside),
            ..Default::default()
        },
    );
    EntitySerializer::save_prefab(&mut source, cart, &path).unwrap();

    let mut target = Scene::new("Target");
    let instance = EntitySerializer::load_prefab(&path, &mut target).unwrap();
    let new_wheel = target.children(instance)[0];
    assert_eq!(
        target
            .get_component::<WheelJoint2DComponent>(new_wheel)
            .connected_rigidbody,
        target.uuid(instance)
    );
    assert_eq!(
        target
            .get_component::<HingeJoint2DComponent>(instance)
            .connected_rigidbody,
        source.uuid(outside)
    );
}
