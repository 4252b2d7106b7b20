//! Physics bridge
//!
//! Mirrors rigid body and collider components into the 2D and 3D worlds
//! while the scene runs, and writes simulated poses back into transforms.
//! The worlds exist only between runtime start and stop; every runtime
//! handle on a component is `None` outside that window.

use std::collections::HashMap;

use glam::{Vec2, Vec3};
use void_core::Uuid;
use void_physics::{
    Body2DRuntime, Body3DRuntime, BodyHandle2D, BodyHandle3D, BodyState2D, BodyType,
    BoxCollider2DComponent, BoxColliderComponent, CapsuleColliderComponent,
    CircleCollider2DComponent, Collider2DDesc, Collider3DDesc, ColliderHandle2D, ContactEvent2D,
    ContactKind, CylinderColliderComponent, DistanceJoint2DComponent, HingeJoint2DComponent,
    Joint2DDesc, JointHandle2D, PhysicsError, PhysicsWorld2D, PhysicsWorld3D,
    PolygonCollider2DComponent, Rigidbody2DComponent, RigidbodyComponent,
    SliderJoint2DComponent, SphereColliderComponent, SpringJoint2DComponent,
    WheelJoint2DComponent,
};
use void_scripting::{Collision2DData, CollisionCallback};

use crate::component::Component;
use crate::components::{ScriptComponent, TagComponent, TransformComponent};
use crate::entity::Entity;
use crate::error::Result;
use crate::Scene;

/// A 2D collider component that becomes one fixture on its entity's body
pub(crate) trait Collider2D: Component {
    fn fixture_desc(&self, scale: Vec3) -> void_physics::Result<Collider2DDesc>;
    fn fixture_mut(&mut self) -> &mut Option<ColliderHandle2D>;
}

impl Collider2D for BoxCollider2DComponent {
    fn fixture_desc(&self, scale: Vec3) -> void_physics::Result<Collider2DDesc> {
        Ok(self.to_desc(scale))
    }

    fn fixture_mut(&mut self) -> &mut Option<ColliderHandle2D> {
        &mut self.runtime_fixture
    }
}

impl Collider2D for CircleCollider2DComponent {
    fn fixture_desc(&self, scale: Vec3) -> void_physics::Result<Collider2DDesc> {
        Ok(self.to_desc(scale))
    }

    fn fixture_mut(&mut self) -> &mut Option<ColliderHandle2D> {
        &mut self.runtime_fixture
    }
}

impl Collider2D for PolygonCollider2DComponent {
    fn fixture_desc(&self, scale: Vec3) -> void_physics::Result<Collider2DDesc> {
        self.to_desc(scale)
    }

    fn fixture_mut(&mut self) -> &mut Option<ColliderHandle2D> {
        &mut self.runtime_fixture
    }
}

/// A 2D joint component, created between its entity's body and the body
/// of the entity it names
pub(crate) trait Joint2D: Component {
    fn connected_rigidbody(&self) -> Uuid;
    fn connected_rigidbody_mut(&mut self) -> &mut Uuid;
    fn joint_desc(&self) -> Joint2DDesc;
    fn joint_mut(&mut self) -> &mut Option<JointHandle2D>;
}

macro_rules! impl_joint_2d {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Joint2D for $ty {
                fn connected_rigidbody(&self) -> Uuid {
                    self.connected_rigidbody
                }

                fn connected_rigidbody_mut(&mut self) -> &mut Uuid {
                    &mut self.connected_rigidbody
                }

                fn joint_desc(&self) -> Joint2DDesc {
                    self.to_desc()
                }

                fn joint_mut(&mut self) -> &mut Option<JointHandle2D> {
                    &mut self.runtime_joint
                }
            }
        )*
    };
}

impl_joint_2d!(
    DistanceJoint2DComponent,
    SpringJoint2DComponent,
    HingeJoint2DComponent,
    SliderJoint2DComponent,
    WheelJoint2DComponent,
);

impl Scene {
    // ==================== World lifetime ====================

    /// Create both worlds and a body for every rigid body component
    pub(crate) fn start_physics(&mut self) -> Result<()> {
        let world_3d = PhysicsWorld3D::new(&self.physics_settings)?;
        let world_2d = PhysicsWorld2D::new(&self.physics_settings)?;

        self.physics_3d = Some(world_3d);
        for entity in self.entities_with::<RigidbodyComponent>() {
            self.create_body_3d(entity);
        }

        self.physics_2d = Some(world_2d);
        for entity in self.entities_with::<Rigidbody2DComponent>() {
            self.create_body_2d(entity);
        }
        self.create_joints_2d::<DistanceJoint2DComponent>();
        self.create_joints_2d::<SpringJoint2DComponent>();
        self.create_joints_2d::<HingeJoint2DComponent>();
        self.create_joints_2d::<SliderJoint2DComponent>();
        self.create_joints_2d::<WheelJoint2DComponent>();

        log::debug!(
            "Physics started: {} 2D bodies, {} 3D bodies",
            self.physics_2d.as_ref().map_or(0, PhysicsWorld2D::body_count),
            self.physics_3d.as_ref().map_or(0, PhysicsWorld3D::body_count)
        );
        Ok(())
    }

    /// Drop both worlds and clear every runtime handle
    pub(crate) fn stop_physics(&mut self) {
        self.physics_2d = None;
        self.physics_3d = None;

        for (_, rb) in self.registry.view_mut::<Rigidbody2DComponent>() {
            rb.runtime = None;
        }
        for (_, collider) in self.registry.view_mut::<BoxCollider2DComponent>() {
            collider.runtime_fixture = None;
        }
        for (_, collider) in self.registry.view_mut::<CircleCollider2DComponent>() {
            collider.runtime_fixture = None;
        }
        for (_, collider) in self.registry.view_mut::<PolygonCollider2DComponent>() {
            collider.runtime_fixture = None;
        }
        for (_, rb) in self.registry.view_mut::<RigidbodyComponent>() {
            rb.runtime = None;
        }
        self.forget_joints_2d::<DistanceJoint2DComponent>(|_| false);
        self.forget_joints_2d::<SpringJoint2DComponent>(|_| false);
        self.forget_joints_2d::<HingeJoint2DComponent>(|_| false);
        self.forget_joints_2d::<SliderJoint2DComponent>(|_| false);
        self.forget_joints_2d::<WheelJoint2DComponent>(|_| false);
    }

    pub fn physics_world_2d(&self) -> Option<&PhysicsWorld2D> {
        self.physics_2d.as_ref()
    }

    pub fn physics_world_2d_mut(&mut self) -> Option<&mut PhysicsWorld2D> {
        self.physics_2d.as_mut()
    }

    pub fn physics_world_3d(&self) -> Option<&PhysicsWorld3D> {
        self.physics_3d.as_ref()
    }

    pub fn physics_world_3d_mut(&mut self) -> Option<&mut PhysicsWorld3D> {
        self.physics_3d.as_mut()
    }

    // ==================== 2D bodies ====================

    fn body_handle_2d(&self, entity: Entity) -> Option<BodyHandle2D> {
        self.try_get_component::<Rigidbody2DComponent>(entity)
            .and_then(|rb| rb.runtime.as_ref())
            .map(|runtime| runtime.handle)
    }

    /// Create the body of one entity, then a fixture per collider component
    pub(crate) fn create_body_2d(&mut self, entity: Entity) {
        let Some(rb) = self.try_get_component::<Rigidbody2DComponent>(entity).cloned() else {
            return;
        };
        if let Some(runtime) = rb.runtime {
            self.release_body_2d(entity, runtime.handle);
        }

        let uuid = self.uuid(entity);
        let transform = *self.get_component::<TransformComponent>(entity);
        let position = Vec2::new(transform.translation.x, transform.translation.y);
        let angle = transform.rotation.z;

        let Some(world) = self.physics_2d.as_mut() else {
            return;
        };
        let handle = match world.create_body(uuid, &rb, position, angle) {
            Ok(handle) => handle,
            Err(e) => {
                log::error!("Failed to create 2D body for entity {}: {}", uuid, e);
                return;
            }
        };
        self.get_component_mut::<Rigidbody2DComponent>(entity).runtime = Some(
            Body2DRuntime::new(handle, Vec3::new(position.x, position.y, angle)),
        );

        self.attach_fixture_2d::<BoxCollider2DComponent>(entity);
        self.attach_fixture_2d::<CircleCollider2DComponent>(entity);
        self.attach_fixture_2d::<PolygonCollider2DComponent>(entity);
    }

    /// Attach the `T` collider of an entity to its body, if both exist
    ///
    /// The fixture joins the entity's layer and collides with that layer's
    /// flags. Mass is recomputed afterwards.
    pub(crate) fn attach_fixture_2d<T: Collider2D>(&mut self, entity: Entity) {
        let Some(body) = self.body_handle_2d(entity) else {
            return;
        };
        let Some(collider) = self.try_get_component::<T>(entity) else {
            return;
        };
        let scale = self.get_component::<TransformComponent>(entity).scale;
        let desc = match collider.fixture_desc(scale) {
            Ok(desc) => desc,
            Err(e) => {
                log::warn!("Skipping collider on entity {}: {}", self.uuid(entity), e);
                return;
            }
        };
        let filter = self
            .layers
            .filter_2d(self.get_component::<TagComponent>(entity).layer);

        if let Some(previous) = self.get_component_mut::<T>(entity).fixture_mut().take() {
            self.release_fixture_2d(entity, previous);
        }

        let Some(world) = self.physics_2d.as_mut() else {
            return;
        };
        let attached = world
            .attach_collider(body, &desc, filter)
            .and_then(|fixture| world.finalize_mass(body).map(|_| fixture));
        match attached {
            Ok(fixture) => *self.get_component_mut::<T>(entity).fixture_mut() = Some(fixture),
            Err(e) => log::error!("Failed to attach collider to entity {}: {}", self.uuid(entity), e),
        }
    }

    /// Remove a body and forget the fixtures that went with it
    pub(crate) fn release_body_2d(&mut self, entity: Entity, body: BodyHandle2D) {
        if let Some(world) = self.physics_2d.as_mut() {
            if let Err(e) = world.remove_body(body) {
                log::warn!("Failed to remove 2D body: {}", e);
            }
        }
        if let Some(c) = self.try_get_component_mut::<BoxCollider2DComponent>(entity) {
            c.runtime_fixture = None;
        }
        if let Some(c) = self.try_get_component_mut::<CircleCollider2DComponent>(entity) {
            c.runtime_fixture = None;
        }
        if let Some(c) = self.try_get_component_mut::<PolygonCollider2DComponent>(entity) {
            c.runtime_fixture = None;
        }
    }

    pub(crate) fn release_fixture_2d(&mut self, entity: Entity, fixture: ColliderHandle2D) {
        let body = self.body_handle_2d(entity);
        let Some(world) = self.physics_2d.as_mut() else {
            return;
        };
        if let Err(e) = world.remove_collider(fixture) {
            log::warn!("Failed to remove 2D fixture: {}", e);
        }
        if let Some(body) = body {
            if let Err(e) = world.finalize_mass(body) {
                log::warn!("Failed to update mass after fixture removal: {}", e);
            }
        }
    }

    pub fn body_state_2d(&self, entity: Entity) -> Option<BodyState2D> {
        let body = self.body_handle_2d(entity)?;
        self.physics_2d.as_ref()?.body_state(body)
    }

    pub fn body_mass_2d(&self, entity: Entity) -> Option<f32> {
        let body = self.body_handle_2d(entity)?;
        self.physics_2d.as_ref()?.body_mass(body)
    }

    pub fn apply_impulse_2d(&mut self, entity: Entity, impulse: Vec2) -> Result<()> {
        let uuid = self.uuid(entity);
        let body = self
            .body_handle_2d(entity)
            .ok_or(PhysicsError::BodyNotFound(uuid))?;
        let world = self
            .physics_2d
            .as_mut()
            .ok_or(PhysicsError::BodyNotFound(uuid))?;
        world.apply_impulse(body, impulse)?;
        Ok(())
    }

    // ==================== 2D joints ====================

    fn create_joints_2d<T: Joint2D>(&mut self) {
        for entity in self.entities_with::<T>() {
            self.create_joint_2d::<T>(entity);
        }
    }

    /// Join the body of `entity` to the body its `T` joint names
    ///
    /// Skipped with a warning when either body is missing.
    pub(crate) fn create_joint_2d<T: Joint2D>(&mut self, entity: Entity) {
        let Some(joint) = self.try_get_component::<T>(entity) else {
            return;
        };
        let connected_id = joint.connected_rigidbody();
        let desc = joint.joint_desc();
        let uuid = self.uuid(entity);

        let Some(body) = self.body_handle_2d(entity) else {
            log::warn!("Skipping joint on entity {}: it has no 2D body", uuid);
            return;
        };
        let connected = self.get_entity(connected_id);
        let connected_body = if self.is_valid(connected) && connected != entity {
            self.body_handle_2d(connected)
        } else {
            None
        };
        let Some(connected_body) = connected_body else {
            log::warn!(
                "Skipping joint on entity {}: connected rigidbody {} not found",
                uuid,
                connected_id
            );
            return;
        };

        if let Some(previous) = self.get_component_mut::<T>(entity).joint_mut().take() {
            self.release_joint_2d(previous);
        }
        let Some(world) = self.physics_2d.as_mut() else {
            return;
        };
        match world.create_joint(body, connected_body, &desc) {
            Ok(handle) => *self.get_component_mut::<T>(entity).joint_mut() = Some(handle),
            Err(e) => log::error!("Failed to create joint on entity {}: {}", uuid, e),
        }
    }

    pub(crate) fn release_joint_2d(&mut self, joint: JointHandle2D) {
        if let Some(world) = self.physics_2d.as_mut() {
            // Gone already when it broke or a joined body was removed
            if world.has_joint(joint) {
                if let Err(e) = world.remove_joint(joint) {
                    log::warn!("Failed to remove 2D joint: {}", e);
                }
            }
        }
    }

    /// Rewrite the connected rigidbody of every joint on `entity` through
    /// `remap`; references missing from it are kept
    pub(crate) fn remap_joints_2d(&mut self, entity: Entity, remap: &HashMap<Uuid, Uuid>) {
        self.remap_joint_2d::<DistanceJoint2DComponent>(entity, remap);
        self.remap_joint_2d::<SpringJoint2DComponent>(entity, remap);
        self.remap_joint_2d::<HingeJoint2DComponent>(entity, remap);
        self.remap_joint_2d::<SliderJoint2DComponent>(entity, remap);
        self.remap_joint_2d::<WheelJoint2DComponent>(entity, remap);
    }

    fn remap_joint_2d<T: Joint2D>(&mut self, entity: Entity, remap: &HashMap<Uuid, Uuid>) {
        let Some(joint) = self.try_get_component_mut::<T>(entity) else {
            return;
        };
        let connected = joint.connected_rigidbody_mut();
        let Some(&new) = remap.get(&*connected) else {
            return;
        };
        *connected = new;
        // A joint made before the rewrite points at the old entity
        if let Some(stale) = joint.joint_mut().take() {
            self.release_joint_2d(stale);
        }
        if self.physics_2d.is_some() {
            self.create_joint_2d::<T>(entity);
        }
    }

    /// Clear `T` joint handles unless `keep` accepts them
    fn forget_joints_2d<T: Joint2D>(&mut self, keep: impl Fn(JointHandle2D) -> bool) {
        for (_, joint) in self.registry.view_mut::<T>() {
            let slot = joint.joint_mut();
            if slot.is_some_and(|handle| !keep(handle)) {
                *slot = None;
            }
        }
    }

    /// Clear handles of joints the world no longer has
    fn forget_broken_joints_2d(&mut self) {
        let Some(world) = self.physics_2d.take() else {
            return;
        };
        let alive = |handle| world.has_joint(handle);
        self.forget_joints_2d::<DistanceJoint2DComponent>(alive);
        self.forget_joints_2d::<SpringJoint2DComponent>(alive);
        self.forget_joints_2d::<HingeJoint2DComponent>(alive);
        self.forget_joints_2d::<SliderJoint2DComponent>(alive);
        self.forget_joints_2d::<WheelJoint2DComponent>(alive);
        self.physics_2d = Some(world);
    }

    // ==================== 3D bodies ====================

    fn collider_descs_3d(&self, entity: Entity, scale: Vec3) -> Vec<Collider3DDesc> {
        let mut descs = Vec::new();
        if let Some(c) = self.try_get_component::<BoxColliderComponent>(entity) {
            descs.push(c.to_desc(scale));
        }
        if let Some(c) = self.try_get_component::<SphereColliderComponent>(entity) {
            descs.push(c.to_desc(scale));
        }
        if let Some(c) = self.try_get_component::<CapsuleColliderComponent>(entity) {
            descs.push(c.to_desc(scale));
        }
        if let Some(c) = self.try_get_component::<CylinderColliderComponent>(entity) {
            descs.push(c.to_desc(scale));
        }
        descs
    }

    /// Create (or re-create) the compound body of one entity
    pub(crate) fn create_body_3d(&mut self, entity: Entity) {
        let Some(rb) = self.try_get_component::<RigidbodyComponent>(entity).cloned() else {
            return;
        };
        if let Some(runtime) = rb.runtime {
            self.release_body_3d(runtime.handle);
        }

        let uuid = self.uuid(entity);
        let transform = *self.get_component::<TransformComponent>(entity);
        let rotation = transform.rotation_quat();
        let filter = self
            .layers
            .filter_3d(self.get_component::<TagComponent>(entity).layer);
        let descs = self.collider_descs_3d(entity, transform.scale);

        let Some(world) = self.physics_3d.as_mut() else {
            return;
        };
        let handle = match world.create_body(uuid, &rb, transform.translation, rotation, filter) {
            Ok(handle) => handle,
            Err(e) => {
                log::error!("Failed to create 3D body for entity {}: {}", uuid, e);
                return;
            }
        };
        for desc in &descs {
            if let Err(e) = world.attach_collider(handle, desc) {
                log::error!("Failed to attach 3D collider to entity {}: {}", uuid, e);
            }
        }
        if let Err(e) = world.finalize_mass(handle) {
            log::error!("Failed to compute mass for entity {}: {}", uuid, e);
        }

        self.get_component_mut::<RigidbodyComponent>(entity).runtime =
            Some(Body3DRuntime::new(handle, transform.translation, rotation));
    }

    /// Rebuild after a collider change, when a body exists to rebuild
    pub(crate) fn rebuild_body_3d(&mut self, entity: Entity) {
        if self.physics_3d.is_some() && self.has_component::<RigidbodyComponent>(entity) {
            self.create_body_3d(entity);
        }
    }

    pub(crate) fn release_body_3d(&mut self, body: BodyHandle3D) {
        if let Some(world) = self.physics_3d.as_mut() {
            if let Err(e) = world.remove_body(body) {
                log::warn!("Failed to remove 3D body: {}", e);
            }
        }
    }

    pub fn body_mass_3d(&self, entity: Entity) -> Option<f32> {
        let body = self
            .try_get_component::<RigidbodyComponent>(entity)?
            .runtime
            .as_ref()?
            .handle;
        self.physics_3d.as_ref()?.body_mass(body)
    }

    // ==================== Stepping ====================

    /// Advance both worlds by `dt` and write the results back
    pub(crate) fn step_physics(&mut self, dt: f32) {
        if let Some(world) = self.physics_3d.as_mut() {
            let steps = world.step(dt);
            let factor = world.interpolation_factor();
            self.read_back_3d(steps > 0, factor);
        }

        if let Some(world) = self.physics_2d.as_mut() {
            let steps = world.step(dt);
            let factor = world.interpolation_factor();
            let contacts = world.drain_contacts();
            self.dispatch_contacts_2d(&contacts);
            self.read_back_2d(steps > 0, factor);
            if steps > 0 {
                self.forget_broken_joints_2d();
            }
        }
    }

    /// Copy 2D poses into translation x/y and rotation z
    ///
    /// Sleeping and static bodies are left alone. With interpolation on, the
    /// written pose blends the last two simulated states.
    fn read_back_2d(&mut self, stepped: bool, factor: f32) {
        let Some(world) = self.physics_2d.as_ref() else {
            return;
        };

        for id in self.registry.entities_with::<Rigidbody2DComponent>() {
            let Some(rb) = self.registry.get_mut::<Rigidbody2DComponent>(id) else {
                continue;
            };
            if rb.body_type == BodyType::Static {
                continue;
            }
            let interpolation = rb.interpolation;
            let Some(runtime) = rb.runtime.as_mut() else {
                continue;
            };
            let Some(state) = world.body_state(runtime.handle) else {
                continue;
            };
            if state.sleeping {
                continue;
            }

            let simulated = Vec3::new(state.position.x, state.position.y, state.angle);
            let pose = if interpolation {
                if stepped {
                    runtime.push(simulated);
                }
                runtime.lerp(factor)
            } else {
                runtime.push(simulated);
                simulated
            };

            if let Some(transform) = self.registry.get_mut::<TransformComponent>(id) {
                transform.translation.x = pose.x;
                transform.translation.y = pose.y;
                transform.rotation.z = pose.z;
            }
        }
    }

    fn read_back_3d(&mut self, stepped: bool, factor: f32) {
        let Some(world) = self.physics_3d.as_ref() else {
            return;
        };

        for id in self.registry.entities_with::<RigidbodyComponent>() {
            let Some(rb) = self.registry.get_mut::<RigidbodyComponent>(id) else {
                continue;
            };
            if rb.body_type == BodyType::Static {
                continue;
            }
            let interpolation = rb.interpolation;
            let Some(runtime) = rb.runtime.as_mut() else {
                continue;
            };
            let Some(state) = world.body_state(runtime.handle) else {
                continue;
            };
            if state.sleeping {
                continue;
            }

            let (translation, rotation) = if interpolation {
                if stepped {
                    runtime.push(state.translation, state.rotation);
                }
                runtime.lerp(factor)
            } else {
                runtime.push(state.translation, state.rotation);
                (state.translation, state.rotation)
            };

            if let Some(transform) = self.registry.get_mut::<TransformComponent>(id) {
                transform.translation = translation;
                transform.set_rotation_quat(rotation);
            }
        }
    }

    /// Deliver contact begin/end to every script class on both entities
    ///
    /// Each side sees the other entity and the velocity of the other body
    /// relative to its own. The sensor variants fire when the other fixture
    /// is a sensor.
    fn dispatch_contacts_2d(&mut self, contacts: &[ContactEvent2D]) {
        if contacts.is_empty() {
            return;
        }
        let Some(engine) = self.script_engine.clone() else {
            return;
        };
        let mut engine = engine.lock();

        for event in contacts {
            for seen in [*event, event.swapped()] {
                let callback = match (seen.kind, seen.sensor_b) {
                    (ContactKind::Begin, false) => CollisionCallback::CollisionEnter2D,
                    (ContactKind::End, false) => CollisionCallback::CollisionExit2D,
                    (ContactKind::Begin, true) => CollisionCallback::SensorEnter2D,
                    (ContactKind::End, true) => CollisionCallback::SensorExit2D,
                };
                let data = Collision2DData {
                    entity_id: seen.entity_b,
                    relative_velocity: seen.relative_velocity,
                };

                let entity = self.get_entity(seen.entity_a);
                let Some(scripts) = self.try_get_component::<ScriptComponent>(entity) else {
                    continue;
                };
                for class in scripts.class_names() {
                    engine.invoke_collision(seen.entity_a, class, callback, data);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn falling_box(scene: &mut Scene, interpolation: bool) -> Entity {
        let e = scene.create_entity("Box");
        scene.get_component_mut::<TransformComponent>(e).translation = Vec3::new(0.0, 10.0, 0.0);
        scene.add_component(
            e,
            Rigidbody2DComponent {
                interpolation,
                ..Default::default()
            },
        );
        scene.add_component(e, BoxCollider2DComponent::default());
        e
    }

    #[test]
    fn test_fixtures_follow_components() {
        let mut scene = Scene::new("Test");
        let e = falling_box(&mut scene, false);
        scene.start_physics().unwrap();
        assert_eq!(scene.physics_world_2d().unwrap().collider_count(), 1);
        assert!(scene
            .get_component::<BoxCollider2DComponent>(e)
            .runtime_fixture
            .is_some());

        scene.running = true;
        scene.add_component(e, CircleCollider2DComponent::default());
        assert_eq!(scene.physics_world_2d().unwrap().collider_count(), 2);

        scene.remove_component::<BoxCollider2DComponent>(e);
        assert_eq!(scene.physics_world_2d().unwrap().collider_count(), 1);

        scene.remove_component::<Rigidbody2DComponent>(e);
        let world = scene.physics_world_2d().unwrap();
        assert_eq!(world.body_count(), 0);
        assert_eq!(world.collider_count(), 0);
        assert!(scene
            .get_component::<CircleCollider2DComponent>(e)
            .runtime_fixture
            .is_none());
    }

    #[test]
    fn test_read_back_moves_dynamic_body() {
        let mut scene = Scene::new("Test");
        let e = falling_box(&mut scene, false);
        scene.start_physics().unwrap();

        for _ in 0..10 {
            scene.step_physics(1.0 / 50.0);
        }
        let transform = scene.get_component::<TransformComponent>(e);
        assert!(transform.translation.y < 10.0);
        assert_relative_eq!(transform.translation.x, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_interpolated_read_back_lags_simulation() {
        let mut scene = Scene::new("Test");
        let e = falling_box(&mut scene, true);
        scene.start_physics().unwrap();

        for _ in 0..10 {
            scene.step_physics(1.0 / 50.0);
        }
        let written = scene.get_component::<TransformComponent>(e).translation.y;
        let simulated = scene.body_state_2d(e).unwrap().position.y;
        assert!(written < 10.0);
        assert!(written >= simulated);
    }

    #[test]
    fn test_stop_clears_runtime_handles() {
        let mut scene = Scene::new("Test");
        let e = falling_box(&mut scene, false);
        let body = scene.create_entity("Body3D");
        scene.add_component(body, RigidbodyComponent::default());
        scene.add_component(body, SphereColliderComponent::default());

        scene.start_physics().unwrap();
        assert!(scene.get_component::<Rigidbody2DComponent>(e).runtime.is_some());
        assert!(scene.get_component::<RigidbodyComponent>(body).runtime.is_some());

        scene.stop_physics();
        assert!(scene.physics_world_2d().is_none());
        assert!(scene.physics_world_3d().is_none());
        assert!(scene.get_component::<Rigidbody2DComponent>(e).runtime.is_none());
        assert!(scene
            .get_component::<BoxCollider2DComponent>(e)
            .runtime_fixture
            .is_none());
        assert!(scene.get_component::<RigidbodyComponent>(body).runtime.is_none());
    }

    #[test]
    fn test_3d_collider_change_rebuilds_body() {
        let mut scene = Scene::new("Test");
        let e = scene.create_entity("Body3D");
        scene.add_component(
            e,
            RigidbodyComponent {
                interpolation: false,
                ..Default::default()
            },
        );
        scene.start_physics().unwrap();
        assert_eq!(scene.physics_world_3d().unwrap().collider_count(), 0);

        scene.add_component(e, BoxColliderComponent::default());
        scene.add_component(e, SphereColliderComponent::default());
        let world = scene.physics_world_3d().unwrap();
        assert_eq!(world.body_count(), 1);
        assert_eq!(world.collider_count(), 2);

        scene.step_physics(0.1);
        assert!(scene.get_component::<TransformComponent>(e).translation.y < 0.0);
        assert!(scene.body_mass_3d(e).unwrap() > 0.0);
    }

    #[test]
    fn test_zero_dt_frames_after_slow_frame_do_not_step() {
        let mut scene = Scene::new("Test");
        let e = falling_box(&mut scene, false);
        scene.start_physics().unwrap();

        scene.step_physics(1.0);
        let after_slow = scene.body_state_2d(e).unwrap().position;
        for _ in 0..5 {
            scene.step_physics(0.0);
        }
        assert_eq!(scene.body_state_2d(e).unwrap().position, after_slow);
        assert_eq!(
            scene.get_component::<TransformComponent>(e).translation.y,
            after_slow.y
        );
    }
}
