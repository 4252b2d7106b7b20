//! 3D simulation world backed by rapier3d

use std::collections::HashMap;
use std::num::NonZeroUsize;

use glam::{Quat, Vec3};
use rapier3d::na::{Isometry3, Quaternion, Translation3, UnitQuaternion};
use rapier3d::prelude as rapier;
use void_core::Uuid;

use crate::body::{BodyHandle3D, RigidbodyComponent};
use crate::collider::Collider3DDesc;
use crate::config::PhysicsSettings;
use crate::error::{PhysicsError, Result};
use crate::layers::CollisionFilter;

/// Snapshot of a body after a step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState3D {
    pub translation: Vec3,
    pub rotation: Quat,
    pub linear_velocity: Vec3,
    pub sleeping: bool,
}

struct BodyInfo {
    entity: Uuid,
    mass_override: Option<f32>,
    is_sensor: bool,
    filter: CollisionFilter,
}

/// The 3D physics world a running scene steps
pub struct PhysicsWorld3D {
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
    accumulated_time: f32,
}

impl PhysicsWorld3D {
    pub fn new(settings: &PhysicsSettings) -> Result<Self> {
        settings.validate()?;

        let mut integration_params = rapier::IntegrationParameters::default();
        integration_params.dt = settings.fixed_timestep;
        integration_params.num_solver_iterations =
            NonZeroUsize::new(settings.velocity_iterations).unwrap_or(NonZeroUsize::MIN);
        integration_params.num_internal_stabilization_iterations = settings.position_iterations;

        let [gx, gy, gz] = settings.gravity_3d;
        log::debug!("Creating 3D physics world (gravity [{gx}, {gy}, {gz}])");

        Ok(Self {
            settings: settings.clone(),
            gravity: rapier::Vector::new(gx, gy, gz),
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
            accumulated_time: 0.0,
        })
    }

    pub fn settings(&self) -> &PhysicsSettings {
        &self.settings
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

    /// Create a body for `entity`
    ///
    /// `filter` is the body's layer filter. Every shape attached later
    /// inherits it.
    pub fn create_body(
        &mut self,
        entity: Uuid,
        rb: &RigidbodyComponent,
        translation: Vec3,
        rotation: Quat,
        filter: CollisionFilter,
    ) -> Result<BodyHandle3D> {
        if self.bodies.len() as u32 >= self.settings.max_bodies {
            return Err(PhysicsError::BodyLimitReached(self.settings.max_bodies));
        }

        let rotation = UnitQuaternion::from_quaternion(Quaternion::new(
            rotation.w, rotation.x, rotation.y, rotation.z,
        ));
        let position = Isometry3::from_parts(
            Translation3::new(translation.x, translation.y, translation.z),
            rotation,
        );

        let mass_override = rb.overrides_mass().then_some(rb.mass);
        let mut builder = rapier::RigidBodyBuilder::new(rb.body_type.into())
            .position(position)
            .linear_damping(rb.linear_drag)
            .angular_damping(rb.angular_drag)
            .gravity_scale(rb.gravity_scale)
            .can_sleep(rb.allow_sleep)
            .sleeping(!rb.awake)
            .ccd_enabled(rb.continuous)
            .user_data(entity.to_user_data());

        let handle = self.bodies.insert(builder);
        self.body_info.insert(
            handle,
            BodyInfo {
                entity,
                mass_override,
                is_sensor: rb.is_sensor,
                filter,
            },
        );
        Ok(BodyHandle3D(handle))
    }

    /// Attach one shape of a compound body
    pub fn attach_collider(&mut self, body: BodyHandle3D, desc: &Collider3DDesc) -> Result<()> {
        let info = self
            .body_info
            .get(&body.0)
            .ok_or(PhysicsError::BodyNotFound(Uuid::NIL))?;

        let collider = rapier::ColliderBuilder::new(desc.shape.to_rapier())
            .translation(rapier::Vector::new(desc.offset.x, desc.offset.y, desc.offset.z))
            .density(desc.density)
            .friction(desc.friction)
            .restitution(desc.restitution)
            .sensor(info.is_sensor)
            .collision_groups(rapier::InteractionGroups::new(
                rapier::Group::from_bits_truncate(info.filter.memberships),
                rapier::Group::from_bits_truncate(info.filter.filter),
            ))
            .user_data(info.entity.to_user_data())
            .build();
        self.colliders
            .insert_with_parent(collider, body.0, &mut self.bodies);
        Ok(())
    }

    /// Explicit masses scale the shape densities, so inertia follows the shapes
    pub fn finalize_mass(&mut self, body: BodyHandle3D) -> Result<()> {
        let entity = self.entity_of(body).unwrap_or(Uuid::NIL);
        let mass_override = self.body_info.get(&body.0).and_then(|info| info.mass_override);
        let rb = self
            .bodies
            .get_mut(body.0)
            .ok_or(PhysicsError::BodyNotFound(entity))?;
        if let Some(mass) = mass_override {
            let handles = rb.colliders();
            let shape_mass: f32 = handles
                .iter()
                .filter_map(|h| self.colliders.get(*h))
                .map(|c| c.shape().mass_properties(c.density()).mass())
                .sum();
            if shape_mass > 0.0 {
                for handle in handles {
                    if let Some(collider) = self.colliders.get_mut(*handle) {
                        collider.set_density(collider.density() * mass / shape_mass);
                    }
                }
            }
            rb.set_additional_mass(if shape_mass > 0.0 { 0.0 } else { mass }, false);
        }
        rb.recompute_mass_properties_from_colliders(&self.colliders);
        Ok(())
    }

    pub fn remove_body(&mut self, body: BodyHandle3D) -> Result<()> {
        self.body_info
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
        Ok(())
    }

    pub fn entity_of(&self, body: BodyHandle3D) -> Option<Uuid> {
        self.body_info.get(&body.0).map(|info| info.entity)
    }

    pub fn collision_filter(&self, body: BodyHandle3D) -> Option<CollisionFilter> {
        self.body_info.get(&body.0).map(|info| info.filter)
    }

    pub fn body_state(&self, body: BodyHandle3D) -> Option<BodyState3D> {
        self.bodies.get(body.0).map(|b| {
            let t = b.translation();
            let r = b.rotation();
            let v = b.linvel();
            BodyState3D {
                translation: Vec3::new(t.x, t.y, t.z),
                rotation: Quat::from_xyzw(r.i, r.j, r.k, r.w),
                linear_velocity: Vec3::new(v.x, v.y, v.z),
                sleeping: b.is_sleeping(),
            }
        })
    }

    pub fn body_mass(&self, body: BodyHandle3D) -> Option<f32> {
        self.bodies.get(body.0).map(|b| b.mass())
    }

    /// Principal inertia in the body's local frame
    pub fn body_inertia(&self, body: BodyHandle3D) -> Option<Vec3> {
        self.bodies.get(body.0).map(|b| {
            let inertia = b.mass_properties().local_mprops.principal_inertia();
            Vec3::new(inertia.x, inertia.y, inertia.z)
        })
    }

    pub fn apply_impulse(&mut self, body: BodyHandle3D, impulse: Vec3) -> Result<()> {
        let entity = self.entity_of(body).unwrap_or(Uuid::NIL);
        let b = self
            .bodies
            .get_mut(body.0)
            .ok_or(PhysicsError::BodyNotFound(entity))?;
        b.apply_impulse(rapier::Vector::new(impulse.x, impulse.y, impulse.z), true);
        Ok(())
    }

    /// Returns the number of fixed steps taken
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
        if self.accumulated_time >= self.settings.fixed_timestep {
            self.accumulated_time %= self.settings.fixed_timestep;
        }
        steps
    }

    /// Fraction of a fixed step left in the accumulator
    pub fn interpolation_factor(&self) -> f32 {
        self.accumulated_time / self.settings.fixed_timestep
    }

    pub fn step_fixed(&mut self) {
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
            &(),
        );
    }
}
