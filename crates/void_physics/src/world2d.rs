//! 2D simulation world backed by rapier2d

use std::collections::HashMap;
use std::num::NonZeroUsize;

use glam::Vec2;
use rapier2d::prelude as rapier;
use void_core::Uuid;

use crate::body::{BodyHandle2D, Rigidbody2DComponent};
use crate::collider::{Collider2DDesc, ColliderHandle2D};
use crate::config::PhysicsSettings;
use crate::error::{PhysicsError, Result};
use crate::events::{ChannelEventCollector, ContactEvent2D, ContactKind};
use crate::joint::{Joint2DDesc, JointHandle2D, JointKind2D, JointMotor, JointSpring};
use crate::layers::CollisionFilter;

/// Damping gain of joint velocity motors
const MOTOR_FACTOR: f32 = 1.0;

/// Snapshot of a body after a step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState2D {
    pub position: Vec2,
    /// Rotation about Z in radians
    pub angle: f32,
    pub linear_velocity: Vec2,
    pub sleeping: bool,
}

struct JointInfo {
    break_force: f32,
    break_torque: f32,
}

struct BodyInfo {
    entity: Uuid,
    /// Explicit body mass, when the component does not derive it
    mass_override: Option<f32>,
}

/// The 2D physics world a running scene steps
pub struct PhysicsWorld2D {
    settings: PhysicsSettings,
    gravity: rapier::Vector<f32>,
    integration_params: rapier::IntegrationParameters,
    pipeline: rapier::PhysicsPipeline,
    islands: rapier::IslandManager,
    broad_phase: rapier::DefaultBroadPhase,
    narrow_phase: rapier::NarrowPhase,
    impulse_joints: rapier::ImpulseJointSet,
    multibody_joints: rapier::MultibodyJointSet,
    ccd_solver: rapier::CCDSolver,
    bodies: rapier::RigidBodySet,
    colliders: rapier::ColliderSet,
    body_info: HashMap<rapier::RigidBodyHandle, BodyInfo>,
    joint_info: HashMap<rapier::ImpulseJointHandle, JointInfo>,
    contacts: Vec<ContactEvent2D>,
    accumulated_time: f32,
}

impl PhysicsWorld2D {
    /// Create an empty world
    pub fn new(settings: &PhysicsSettings) -> Result<Self> {
        settings.validate()?;

        let mut integration_params = rapier::IntegrationParameters::default();
        integration_params.dt = settings.fixed_timestep;
        integration_params.num_solver_iterations =
            NonZeroUsize::new(settings.velocity_iterations).unwrap_or(NonZeroUsize::MIN);
        integration_params.num_internal_stabilization_iterations = settings.position_iterations;

        log::debug!(
            "Creating 2D physics world (gravity {:?}, step {}s)",
            settings.gravity_2d,
            settings.fixed_timestep
        );

        Ok(Self {
            settings: settings.clone(),
            gravity: rapier::Vector::new(settings.gravity_2d[0], settings.gravity_2d[1]),
            integration_params,
            pipeline: rapier::PhysicsPipeline::new(),
            islands: rapier::IslandManager::new(),
            broad_phase: rapier::DefaultBroadPhase::new(),
            narrow_phase: rapier::NarrowPhase::new(),
            impulse_joints: rapier::ImpulseJointSet::new(),
            multibody_joints: rapier::MultibodyJointSet::new(),
            ccd_solver: rapier::CCDSolver::new(),
            bodies: rapier::RigidBodySet::new(),
            colliders: rapier::ColliderSet::new(),
            body_info: HashMap::new(),
            joint_info: HashMap::new(),
            contacts: Vec::new(),
            accumulated_time: 0.0,
        })
    }

    pub fn settings(&self) -> &PhysicsSettings {
        &self.settings
    }

    pub fn gravity(&self) -> Vec2 {
        Vec2::new(self.gravity.x, self.gravity.y)
    }

    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = rapier::Vector::new(gravity.x, gravity.y);
    }

    pub fn fixed_timestep(&self) -> f32 {
        self.settings.fixed_timestep
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    pub fn joint_count(&self) -> usize {
        self.impulse_joints.len()
    }

    // ==================== Bodies ====================

    /// Create a body for `entity` mirroring the component settings
    pub fn create_body(
        &mut self,
        entity: Uuid,
        rb: &Rigidbody2DComponent,
        position: Vec2,
        angle: f32,
    ) -> Result<BodyHandle2D> {
        if self.bodies.len() as u32 >= self.settings.max_bodies {
            return Err(PhysicsError::BodyLimitReached(self.settings.max_bodies));
        }

        let mass_override = rb.overrides_mass().then_some(rb.mass);
        let mut builder = rapier::RigidBodyBuilder::new(rb.body_type.into())
            .translation(rapier::Vector::new(position.x, position.y))
            .rotation(angle)
            .linear_damping(rb.linear_drag)
            .angular_damping(rb.angular_drag)
            .gravity_scale(rb.gravity_scale)
            .can_sleep(rb.allow_sleep)
            .sleeping(!rb.awake)
            .ccd_enabled(rb.continuous)
            .user_data(entity.to_user_data());
        if rb.freeze_rotation {
            builder = builder.lock_rotations();
        }

        let handle = self.bodies.insert(builder);
        self.body_info.insert(
            handle,
            BodyInfo {
                entity,
                mass_override,
            },
        );
        log::trace!("Created 2D body for entity {}", entity);
        Ok(BodyHandle2D(handle))
    }

    /// Attach a fixture to an existing body
    pub fn attach_collider(
        &mut self,
        body: BodyHandle2D,
        desc: &Collider2DDesc,
        filter: CollisionFilter,
    ) -> Result<ColliderHandle2D> {
        let info = self
            .body_info
            .get(&body.0)
            .ok_or(PhysicsError::BodyNotFound(Uuid::NIL))?;
        let entity = info.entity;

        let offset = desc.shape.offset();
        let collider = rapier::ColliderBuilder::new(desc.shape.to_rapier()?)
            .translation(rapier::Vector::new(offset.x, offset.y))
            .density(desc.density)
            .friction(desc.friction)
            .restitution(desc.restitution)
            .sensor(desc.is_sensor)
            .collision_groups(interaction_groups(filter))
            .active_events(rapier::ActiveEvents::COLLISION_EVENTS)
            .user_data(entity.to_user_data())
            .build();

        let handle = self
            .colliders
            .insert_with_parent(collider, body.0, &mut self.bodies);
        Ok(ColliderHandle2D(handle))
    }

    /// Detach and drop one fixture
    pub fn remove_collider(&mut self, collider: ColliderHandle2D) -> Result<()> {
        self.colliders
            .remove(collider.0, &mut self.islands, &mut self.bodies, true)
            .map(|_| ())
            .ok_or(PhysicsError::ColliderNotFound)
    }

    /// Recompute mass after all fixtures of a body are attached
    ///
    /// A body with an explicit mass keeps the inertia its fixtures give,
    /// scaled so the total mass matches. Without fixtures the mass sits at
    /// the body origin.
    pub fn finalize_mass(&mut self, body: BodyHandle2D) -> Result<()> {
        let missing = self_missing(&self.body_info, body);
        let mass_override = self.body_info.get(&body.0).and_then(|info| info.mass_override);
        let rb = self.bodies.get_mut(body.0).ok_or(missing)?;
        if let Some(mass) = mass_override {
            let fixture_mass = rescale_densities(rb.colliders(), &mut self.colliders, mass);
            let point_mass = if fixture_mass > 0.0 { 0.0 } else { mass };
            rb.set_additional_mass(point_mass, false);
        }
        rb.recompute_mass_properties_from_colliders(&self.colliders);
        Ok(())
    }

    /// Rotational inertia about the center of mass
    pub fn body_inertia(&self, body: BodyHandle2D) -> Option<f32> {
        self.bodies
            .get(body.0)
            .map(|b| b.mass_properties().local_mprops.principal_inertia())
    }

    pub fn remove_body(&mut self, body: BodyHandle2D) -> Result<()> {
        let info = self
            .body_info
            .remove(&body.0)
            .ok_or(PhysicsError::BodyNotFound(Uuid::NIL))?;
        self.bodies.remove(
            body.0,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
        let joints = &self.impulse_joints;
        self.joint_info.retain(|handle, _| joints.get(*handle).is_some());
        log::trace!("Removed 2D body for entity {}", info.entity);
        Ok(())
    }

    pub fn entity_of(&self, body: BodyHandle2D) -> Option<Uuid> {
        self.body_info.get(&body.0).map(|info| info.entity)
    }

    pub fn body_state(&self, body: BodyHandle2D) -> Option<BodyState2D> {
        self.bodies.get(body.0).map(|b| {
            let translation = b.translation();
            let linvel = b.linvel();
            BodyState2D {
                position: Vec2::new(translation.x, translation.y),
                angle: b.rotation().angle(),
                linear_velocity: Vec2::new(linvel.x, linvel.y),
                sleeping: b.is_sleeping(),
            }
        })
    }

    pub fn body_mass(&self, body: BodyHandle2D) -> Option<f32> {
        self.bodies.get(body.0).map(|b| b.mass())
    }

    pub fn set_transform(&mut self, body: BodyHandle2D, position: Vec2, angle: f32) -> Result<()> {
        let missing = self_missing(&self.body_info, body);
        let b = self.bodies.get_mut(body.0).ok_or(missing)?;
        b.set_translation(rapier::Vector::new(position.x, position.y), true);
        b.set_rotation(rapier::Rotation::new(angle), true);
        Ok(())
    }

    pub fn set_linear_velocity(&mut self, body: BodyHandle2D, velocity: Vec2) -> Result<()> {
        let missing = self_missing(&self.body_info, body);
        let b = self.bodies.get_mut(body.0).ok_or(missing)?;
        b.set_linvel(rapier::Vector::new(velocity.x, velocity.y), true);
        Ok(())
    }

    pub fn apply_force(&mut self, body: BodyHandle2D, force: Vec2) -> Result<()> {
        let missing = self_missing(&self.body_info, body);
        let b = self.bodies.get_mut(body.0).ok_or(missing)?;
        b.add_force(rapier::Vector::new(force.x, force.y), true);
        Ok(())
    }

    pub fn apply_impulse(&mut self, body: BodyHandle2D, impulse: Vec2) -> Result<()> {
        let missing = self_missing(&self.body_info, body);
        let b = self.bodies.get_mut(body.0).ok_or(missing)?;
        b.apply_impulse(rapier::Vector::new(impulse.x, impulse.y), true);
        Ok(())
    }

    // ==================== Joints ====================

    /// Join two bodies
    ///
    /// Anchors are resolved against the current body poses, so joints are
    /// created after both bodies are placed.
    pub fn create_joint(
        &mut self,
        body: BodyHandle2D,
        connected: BodyHandle2D,
        desc: &Joint2DDesc,
    ) -> Result<JointHandle2D> {
        let b1 = self
            .bodies
            .get(body.0)
            .ok_or_else(|| self_missing(&self.body_info, body))?;
        let b2 = self
            .bodies
            .get(connected.0)
            .ok_or_else(|| self_missing(&self.body_info, connected))?;
        let pose1 = *b1.position();
        let pose2 = *b2.position();
        let (mass1, mass2) = (b1.mass(), b2.mass());

        let point = |v: Vec2| rapier::Point::new(v.x, v.y);
        // A world point in the local space of the connected body
        let local2 = |p: rapier::Point<f32>| pose2.inverse_transform_point(&p);

        let mut joint: rapier::GenericJoint = match desc.kind {
            JointKind2D::Distance {
                anchor,
                connected_anchor,
                distance,
                min_distance,
                max_distance_by,
                spring,
            } => {
                let length = distance.unwrap_or_else(|| {
                    (pose2 * point(connected_anchor) - pose1 * point(anchor)).norm()
                });
                match spring {
                    Some(spring) => {
                        let (stiffness, damping) =
                            linear_stiffness(spring, effective_mass(mass1, mass2));
                        let mut joint: rapier::GenericJoint =
                            rapier::SpringJointBuilder::new(length, stiffness, damping)
                                .local_anchor1(point(anchor))
                                .local_anchor2(point(connected_anchor))
                                .build()
                                .into();
                        joint.set_limits(
                            rapier::JointAxis::LinX,
                            [length.min(min_distance), length + max_distance_by.max(0.0)],
                        );
                        joint
                    }
                    None => {
                        let mut joint: rapier::GenericJoint = rapier::RopeJointBuilder::new(length)
                            .local_anchor1(point(anchor))
                            .local_anchor2(point(connected_anchor))
                            .build()
                            .into();
                        // Without a spring the length is held exactly
                        joint.set_limits(rapier::JointAxis::LinX, [length, length]);
                        joint
                    }
                }
            }
            JointKind2D::Hinge { anchor, limits, motor } => {
                let world_anchor = pose1 * point(anchor);
                let mut builder = rapier::RevoluteJointBuilder::new()
                    .local_anchor1(point(anchor))
                    .local_anchor2(local2(world_anchor));
                if let Some([lower, upper]) = limits {
                    let rest = pose2.rotation.angle() - pose1.rotation.angle();
                    builder = builder.limits([lower + rest, upper + rest]);
                }
                if let Some(JointMotor { speed, max_force }) = motor {
                    builder = builder
                        .motor_velocity(speed, MOTOR_FACTOR)
                        .motor_max_force(max_force);
                }
                builder.build().into()
            }
            JointKind2D::Slider {
                anchor,
                reference_angle,
                limits,
                motor,
            } => {
                let world_anchor = pose1 * point(anchor);
                let angle1 = pose1.rotation.angle();
                let mut builder = rapier::PrismaticJointBuilder::new(unit_at(-angle1))
                    .local_axis2(unit_at(-angle1 - reference_angle))
                    .local_anchor1(point(anchor))
                    .local_anchor2(local2(world_anchor));
                if let Some(limits) = limits {
                    builder = builder.limits(limits);
                }
                if let Some(JointMotor { speed, max_force }) = motor {
                    builder = builder
                        .motor_velocity(speed, MOTOR_FACTOR)
                        .motor_max_force(max_force);
                }
                builder.build().into()
            }
            JointKind2D::Wheel {
                anchor,
                spring,
                limits,
                motor,
            } => {
                // Frame X is world X, so the free travel axis Y is world up
                let world_anchor = pose1 * point(anchor);
                let (stiffness, damping) = linear_stiffness(spring, mass1);
                let mut builder = rapier::GenericJointBuilder::new(rapier::JointAxesMask::LIN_X)
                    .local_axis1(unit_at(-pose1.rotation.angle()))
                    .local_axis2(unit_at(-pose2.rotation.angle()))
                    .local_anchor1(point(anchor))
                    .local_anchor2(local2(world_anchor))
                    .motor_position(rapier::JointAxis::LinY, 0.0, stiffness, damping)
                    .motor_model(rapier::JointAxis::LinY, rapier::MotorModel::ForceBased);
                if let Some(limits) = limits {
                    builder = builder.limits(rapier::JointAxis::LinY, limits);
                }
                if let Some(JointMotor { speed, max_force }) = motor {
                    builder = builder
                        .motor_velocity(rapier::JointAxis::AngX, speed, MOTOR_FACTOR)
                        .motor_max_force(rapier::JointAxis::AngX, max_force);
                }
                builder.build()
            }
        };

        joint.set_contacts_enabled(desc.enable_collision);
        let handle = self.impulse_joints.insert(body.0, connected.0, joint, true);
        self.joint_info.insert(
            handle,
            JointInfo {
                break_force: desc.break_force,
                break_torque: desc.break_torque,
            },
        );
        Ok(JointHandle2D(handle))
    }

    pub fn remove_joint(&mut self, joint: JointHandle2D) -> Result<()> {
        self.joint_info.remove(&joint.0);
        self.impulse_joints
            .remove(joint.0, true)
            .map(|_| ())
            .ok_or(PhysicsError::JointNotFound)
    }

    /// False once the joint broke or one of its bodies was removed
    pub fn has_joint(&self, joint: JointHandle2D) -> bool {
        self.impulse_joints.get(joint.0).is_some()
    }

    /// Remove joints whose last step needed more than their break limits
    fn break_joints(&mut self) {
        let dt = self.integration_params.dt;
        let broken: Vec<_> = self
            .joint_info
            .iter()
            .filter(|(handle, info)| {
                self.impulse_joints.get(**handle).is_some_and(|joint| {
                    let impulse = joint.impulses;
                    let force = Vec2::new(impulse.x, impulse.y).length() / dt;
                    let torque = impulse.z.abs() / dt;
                    force > info.break_force || torque > info.break_torque
                })
            })
            .map(|(handle, _)| *handle)
            .collect();

        for handle in broken {
            log::debug!("2D joint broke under load");
            self.joint_info.remove(&handle);
            self.impulse_joints.remove(handle, true);
        }
    }

    // ==================== Simulation ====================

    /// Advance by `delta_time`, running as many fixed steps as fit
    ///
    /// Returns the number of fixed steps taken.
    pub fn step(&mut self, delta_time: f32) -> u32 {
        self.accumulated_time += delta_time;

        let mut steps = 0;
        while self.accumulated_time >= self.settings.fixed_timestep
            && steps < self.settings.max_substeps
        {
            self.step_fixed();
            self.accumulated_time -= self.settings.fixed_timestep;
            steps += 1;
        }
        // Time the substep cap could not absorb is dropped
        if self.accumulated_time >= self.settings.fixed_timestep {
            self.accumulated_time %= self.settings.fixed_timestep;
        }
        steps
    }

    /// Fraction of a fixed step left in the accumulator
    pub fn interpolation_factor(&self) -> f32 {
        self.accumulated_time / self.settings.fixed_timestep
    }

    /// Run exactly one fixed step and collect contact events
    pub fn step_fixed(&mut self) {
        let (collision_send, collision_recv) = crossbeam_channel::unbounded();
        let event_handler = ChannelEventCollector {
            collision_events: collision_send,
        };

        self.pipeline.step(
            &self.gravity,
            &self.integration_params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &(),
            &event_handler,
        );
        self.break_joints();

        while let Ok(event) = collision_recv.try_recv() {
            let (h1, h2, kind) = match event {
                rapier::CollisionEvent::Started(h1, h2, _) => (h1, h2, ContactKind::Begin),
                rapier::CollisionEvent::Stopped(h1, h2, _) => (h1, h2, ContactKind::End),
            };
            let (Some(c1), Some(c2)) = (self.colliders.get(h1), self.colliders.get(h2)) else {
                continue;
            };

            let velocity_of = |c: &rapier::Collider| {
                c.parent()
                    .and_then(|h| self.bodies.get(h))
                    .map(|b| Vec2::new(b.linvel().x, b.linvel().y))
                    .unwrap_or(Vec2::ZERO)
            };

            self.contacts.push(ContactEvent2D {
                entity_a: Uuid::from_user_data(c1.user_data),
                entity_b: Uuid::from_user_data(c2.user_data),
                kind,
                sensor_a: c1.is_sensor(),
                sensor_b: c2.is_sensor(),
                relative_velocity: velocity_of(c2) - velocity_of(c1),
            });
        }
    }

    /// Take every contact event collected since the last drain
    pub fn drain_contacts(&mut self) -> Vec<ContactEvent2D> {
        std::mem::take(&mut self.contacts)
    }
}

/// Unit vector at `angle` radians from +X
fn unit_at(angle: f32) -> rapier::UnitVector<f32> {
    rapier::UnitVector::new_normalize(rapier::Vector::new(angle.cos(), angle.sin()))
}

/// Mass a spring between two bodies acts on; a zero mass stands for a fixed body
fn effective_mass(mass1: f32, mass2: f32) -> f32 {
    if mass1 > 0.0 && mass2 > 0.0 {
        mass1 * mass2 / (mass1 + mass2)
    } else if mass1 > 0.0 {
        mass1
    } else {
        mass2
    }
}

/// Stiffness and damping giving `spring` on `mass`
fn linear_stiffness(spring: JointSpring, mass: f32) -> (f32, f32) {
    let omega = std::f32::consts::TAU * spring.frequency;
    (
        mass * omega * omega,
        2.0 * mass * spring.damping_ratio * omega,
    )
}

fn interaction_groups(filter: CollisionFilter) -> rapier::InteractionGroups {
    rapier::InteractionGroups::new(
        rapier::Group::from_bits_truncate(filter.memberships),
        rapier::Group::from_bits_truncate(filter.filter),
    )
}

/// Scale fixture densities so the fixtures weigh `mass` in total
///
/// Returns the mass the fixtures had before scaling.
fn rescale_densities(
    handles: &[rapier::ColliderHandle],
    colliders: &mut rapier::ColliderSet,
    mass: f32,
) -> f32 {
    let fixture_mass: f32 = handles
        .iter()
        .filter_map(|h| colliders.get(*h))
        .map(|c| c.shape().mass_properties(c.density()).mass())
        .sum();
    if fixture_mass > 0.0 {
        let scale = mass / fixture_mass;
        for handle in handles {
            if let Some(collider) = colliders.get_mut(*handle) {
                collider.set_density(collider.density() * scale);
            }
        }
    }
    fixture_mass
}

fn self_missing(
    info: &HashMap<rapier::RigidBodyHandle, BodyInfo>,
    body: BodyHandle2D,
) -> PhysicsError {
    PhysicsError::BodyNotFound(info.get(&body.0).map(|i| i.entity).unwrap_or(Uuid::NIL))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodyType;
    use crate::collider::{BoxCollider2DComponent, CircleCollider2DComponent};
    use crate::joint::{
        DistanceJoint2DComponent, HingeJoint2DComponent, SliderJoint2DComponent,
        WheelJoint2DComponent,
    };
    use approx::assert_relative_eq;
    use glam::Vec3;

    fn world() -> PhysicsWorld2D {
        PhysicsWorld2D::new(&PhysicsSettings::default()).unwrap()
    }

    #[test]
    fn test_dynamic_body_falls() {
        let mut world = world();
        let body = world
            .create_body(Uuid::from_u64(1), &Rigidbody2DComponent::default(), Vec2::ZERO, 0.0)
            .unwrap();
        let desc = BoxCollider2DComponent::default().to_desc(Vec3::ONE);
        world
            .attach_collider(body, &desc, CollisionFilter::ALL)
            .unwrap();
        world.finalize_mass(body).unwrap();

        for _ in 0..10 {
            world.step_fixed();
        }

        let state = world.body_state(body).unwrap();
        assert!(state.position.y < 0.0);
        assert!(state.linear_velocity.y < 0.0);
    }

    #[test]
    fn test_static_body_stays_put() {
        let mut world = world();
        let body = world
            .create_body(
                Uuid::from_u64(1),
                &Rigidbody2DComponent::fixed(),
                Vec2::new(3.0, 4.0),
                0.0,
            )
            .unwrap();
        world.step(0.5);
        let state = world.body_state(body).unwrap();
        assert_relative_eq!(state.position.x, 3.0);
        assert_relative_eq!(state.position.y, 4.0);
    }

    #[test]
    fn test_mass_override() {
        let mut world = world();
        let rb = Rigidbody2DComponent {
            auto_mass: false,
            mass: 2.0,
            ..Default::default()
        };
        let body = world
            .create_body(Uuid::from_u64(7), &rb, Vec2::ZERO, 0.0)
            .unwrap();
        let desc = BoxCollider2DComponent {
            density: 50.0,
            ..Default::default()
        }
        .to_desc(Vec3::ONE);
        world
            .attach_collider(body, &desc, CollisionFilter::ALL)
            .unwrap();
        world.finalize_mass(body).unwrap();

        assert_relative_eq!(world.body_mass(body).unwrap(), 2.0, epsilon = 1e-4);
    }

    #[test]
    fn test_explicit_mass_keeps_fixture_inertia() {
        let mut world = world();
        let desc = BoxCollider2DComponent::default().to_desc(Vec3::ONE);

        let auto = world
            .create_body(Uuid::from_u64(1), &Rigidbody2DComponent::default(), Vec2::ZERO, 0.0)
            .unwrap();
        world.attach_collider(auto, &desc, CollisionFilter::ALL).unwrap();
        world.finalize_mass(auto).unwrap();

        let rb = Rigidbody2DComponent {
            auto_mass: false,
            mass: 1.0,
            ..Default::default()
        };
        let explicit = world
            .create_body(Uuid::from_u64(2), &rb, Vec2::new(5.0, 0.0), 0.0)
            .unwrap();
        world.attach_collider(explicit, &desc, CollisionFilter::ALL).unwrap();
        world.finalize_mass(explicit).unwrap();

        let inertia = world.body_inertia(explicit).unwrap();
        assert!(inertia > 0.0);
        assert_relative_eq!(inertia, world.body_inertia(auto).unwrap(), epsilon = 1e-4);
        assert_relative_eq!(world.body_mass(explicit).unwrap(), 1.0, epsilon = 1e-4);

        // Finalizing again does not compound the scaling
        world.finalize_mass(explicit).unwrap();
        assert_relative_eq!(world.body_mass(explicit).unwrap(), 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_explicit_mass_without_fixtures() {
        let mut world = world();
        let rb = Rigidbody2DComponent {
            auto_mass: false,
            mass: 3.0,
            ..Default::default()
        };
        let body = world.create_body(Uuid::from_u64(4), &rb, Vec2::ZERO, 0.0).unwrap();
        world.finalize_mass(body).unwrap();
        assert_relative_eq!(world.body_mass(body).unwrap(), 3.0, epsilon = 1e-4);
    }

    #[test]
    fn test_auto_mass_uses_density() {
        let mut world = world();
        let body = world
            .create_body(Uuid::from_u64(7), &Rigidbody2DComponent::default(), Vec2::ZERO, 0.0)
            .unwrap();
        // 1x1 box at density 1
        let desc = BoxCollider2DComponent::default().to_desc(Vec3::ONE);
        world
            .attach_collider(body, &desc, CollisionFilter::ALL)
            .unwrap();
        world.finalize_mass(body).unwrap();

        assert_relative_eq!(world.body_mass(body).unwrap(), 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_remove_collider_updates_mass() {
        let mut world = world();
        let body = world
            .create_body(Uuid::from_u64(3), &Rigidbody2DComponent::default(), Vec2::ZERO, 0.0)
            .unwrap();
        let desc = BoxCollider2DComponent::default().to_desc(Vec3::ONE);
        let first = world
            .attach_collider(body, &desc, CollisionFilter::ALL)
            .unwrap();
        world
            .attach_collider(body, &desc, CollisionFilter::ALL)
            .unwrap();
        world.finalize_mass(body).unwrap();
        assert_relative_eq!(world.body_mass(body).unwrap(), 2.0, epsilon = 1e-4);

        world.remove_collider(first).unwrap();
        world.finalize_mass(body).unwrap();
        assert_eq!(world.collider_count(), 1);
        assert_relative_eq!(world.body_mass(body).unwrap(), 1.0, epsilon = 1e-4);
        assert!(world.remove_collider(first).is_err());
    }

    #[test]
    fn test_step_uses_accumulator() {
        let mut world = world();
        assert_eq!(world.step(0.015), 0);
        assert_eq!(world.step(0.015), 1);
        assert!(world.interpolation_factor() < 1.0);
    }

    #[test]
    fn test_slow_frame_leaves_no_step_debt() {
        let mut world = world();
        assert_eq!(world.step(1.0), world.settings().max_substeps);
        assert!(world.interpolation_factor() < 1.0);
        for _ in 0..5 {
            assert_eq!(world.step(0.0), 0);
        }
    }

    #[test]
    fn test_body_limit() {
        let settings = PhysicsSettings {
            max_bodies: 1,
            ..Default::default()
        };
        let mut world = PhysicsWorld2D::new(&settings).unwrap();
        let rb = Rigidbody2DComponent::default();
        world.create_body(Uuid::from_u64(1), &rb, Vec2::ZERO, 0.0).unwrap();
        assert!(matches!(
            world.create_body(Uuid::from_u64(2), &rb, Vec2::ZERO, 0.0),
            Err(PhysicsError::BodyLimitReached(1))
        ));
    }

    #[test]
    fn test_contact_events_carry_entities() {
        let mut world = world();
        let ground = world
            .create_body(
                Uuid::from_u64(10),
                &Rigidbody2DComponent::fixed(),
                Vec2::ZERO,
                0.0,
            )
            .unwrap();
        let ground_desc = BoxCollider2DComponent {
            size: Vec2::new(10.0, 0.5),
            ..Default::default()
        }
        .to_desc(Vec3::ONE);
        world
            .attach_collider(ground, &ground_desc, CollisionFilter::ALL)
            .unwrap();

        let ball = world
            .create_body(
                Uuid::from_u64(20),
                &Rigidbody2DComponent {
                    body_type: BodyType::Dynamic,
                    ..Default::default()
                },
                Vec2::new(0.0, 1.5),
                0.0,
            )
            .unwrap();
        let ball_desc = CircleCollider2DComponent::default().to_desc(Vec3::ONE);
        world
            .attach_collider(ball, &ball_desc, CollisionFilter::ALL)
            .unwrap();
        world.finalize_mass(ball).unwrap();

        let mut contacts = Vec::new();
        for _ in 0..100 {
            world.step_fixed();
            contacts.extend(world.drain_contacts());
        }

        let begin = contacts
            .iter()
            .find(|c| c.is_begin())
            .expect("ball should land on the ground");
        let ids = [begin.entity_a, begin.entity_b];
        assert!(ids.contains(&Uuid::from_u64(10)));
        assert!(ids.contains(&Uuid::from_u64(20)));
    }

    // Fixtures that collide with nothing, so only joints act between bodies
    const GHOST: CollisionFilter = CollisionFilter {
        memberships: 0,
        filter: 0,
    };

    fn boxed_body(
        world: &mut PhysicsWorld2D,
        id: u64,
        rb: &Rigidbody2DComponent,
        at: Vec2,
    ) -> BodyHandle2D {
        let body = world.create_body(Uuid::from_u64(id), rb, at, 0.0).unwrap();
        let desc = BoxCollider2DComponent::default().to_desc(Vec3::ONE);
        world.attach_collider(body, &desc, GHOST).unwrap();
        world.finalize_mass(body).unwrap();
        body
    }

    #[test]
    fn test_hinge_keeps_pivot_distance() {
        let mut world = world();
        let pivot = boxed_body(&mut world, 1, &Rigidbody2DComponent::fixed(), Vec2::ZERO);
        let arm = boxed_body(&mut world, 2, &Rigidbody2DComponent::dynamic(), Vec2::new(2.0, 0.0));
        let hinge = HingeJoint2DComponent {
            anchor: Vec2::new(-2.0, 0.0),
            ..Default::default()
        };
        let joint = world.create_joint(arm, pivot, &hinge.to_desc()).unwrap();
        assert_eq!(world.joint_count(), 1);

        for _ in 0..30 {
            world.step_fixed();
        }
        assert!(world.has_joint(joint));
        let state = world.body_state(arm).unwrap();
        assert!(state.position.y < -0.5);
        assert_relative_eq!(state.position.length(), 2.0, epsilon = 0.05);
    }

    #[test]
    fn test_distance_joint_holds_auto_length() {
        let mut world = world();
        let ceiling = boxed_body(&mut world, 1, &Rigidbody2DComponent::fixed(), Vec2::ZERO);
        let weight = boxed_body(
            &mut world,
            2,
            &Rigidbody2DComponent::dynamic(),
            Vec2::new(0.0, -3.0),
        );
        world
            .create_joint(weight, ceiling, &DistanceJoint2DComponent::default().to_desc())
            .unwrap();

        for _ in 0..100 {
            world.step_fixed();
        }
        let state = world.body_state(weight).unwrap();
        assert_relative_eq!(state.position.y, -3.0, epsilon = 0.05);
    }

    #[test]
    fn test_slider_locks_vertical_travel() {
        let mut world = world();
        let rail = boxed_body(&mut world, 1, &Rigidbody2DComponent::fixed(), Vec2::ZERO);
        let carriage = boxed_body(
            &mut world,
            2,
            &Rigidbody2DComponent::dynamic(),
            Vec2::new(1.0, 0.0),
        );
        world
            .create_joint(carriage, rail, &SliderJoint2DComponent::default().to_desc())
            .unwrap();
        world.apply_impulse(carriage, Vec2::new(2.0, 0.0)).unwrap();

        for _ in 0..50 {
            world.step_fixed();
        }
        let state = world.body_state(carriage).unwrap();
        assert!(state.position.x > 1.0);
        assert_relative_eq!(state.position.y, 0.0, epsilon = 0.05);
        assert_relative_eq!(state.angle, 0.0, epsilon = 0.05);
    }

    #[test]
    fn test_overloaded_joint_breaks() {
        let mut world = world();
        let ceiling = boxed_body(&mut world, 1, &Rigidbody2DComponent::fixed(), Vec2::ZERO);
        let weight = boxed_body(
            &mut world,
            2,
            &Rigidbody2DComponent::dynamic(),
            Vec2::new(0.0, -2.0),
        );
        let rope = DistanceJoint2DComponent {
            break_force: 0.5,
            ..Default::default()
        };
        let joint = world.create_joint(weight, ceiling, &rope.to_desc()).unwrap();

        for _ in 0..20 {
            world.step_fixed();
        }
        assert!(!world.has_joint(joint));
        assert_eq!(world.joint_count(), 0);
        assert!(world.body_state(weight).unwrap().position.y < -2.1);
    }

    #[test]
    fn test_removing_a_body_drops_its_joints() {
        let mut world = world();
        let chassis = boxed_body(&mut world, 1, &Rigidbody2DComponent::dynamic(), Vec2::ZERO);
        let wheel = boxed_body(
            &mut world,
            2,
            &Rigidbody2DComponent::dynamic(),
            Vec2::new(0.0, -1.0),
        );
        let joint = world
            .create_joint(chassis, wheel, &WheelJoint2DComponent::default().to_desc())
            .unwrap();
        assert!(world.has_joint(joint));

        world.remove_body(wheel).unwrap();
        assert!(!world.has_joint(joint));
        assert!(world.remove_joint(joint).is_err());
    }

    #[test]
    fn test_filtered_layers_do_not_touch() {
        let mut world = world();
        let ground = world
            .create_body(Uuid::from_u64(1), &Rigidbody2DComponent::fixed(), Vec2::ZERO, 0.0)
            .unwrap();
        let desc = BoxCollider2DComponent {
            size: Vec2::new(10.0, 0.5),
            ..Default::default()
        }
        .to_desc(Vec3::ONE);
        world
            .attach_collider(
                ground,
                &desc,
                CollisionFilter {
                    memberships: 0b01,
                    filter: 0b01,
                },
            )
            .unwrap();

        let ball = world
            .create_body(
                Uuid::from_u64(2),
                &Rigidbody2DComponent::dynamic(),
                Vec2::new(0.0, 1.5),
                0.0,
            )
            .unwrap();
        world
            .attach_collider(
                ball,
                &CircleCollider2DComponent::default().to_desc(Vec3::ONE),
                CollisionFilter {
                    memberships: 0b10,
                    filter: 0b10,
                },
            )
            .unwrap();
        world.finalize_mass(ball).unwrap();

        for _ in 0..100 {
            world.step_fixed();
        }
        assert!(world.drain_contacts().is_empty());
        assert!(world.body_state(ball).unwrap().position.y < -1.0);
    }
}
