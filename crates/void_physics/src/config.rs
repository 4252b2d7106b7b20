//! Physics configuration

use crate::error::{PhysicsError, Result};
use serde::{Deserialize, Serialize};

/// Simulation settings shared by the 2D and 3D worlds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSettings {
    /// Gravity for the 2D world
    pub gravity_2d: [f32; 2],

    /// Gravity for the 3D world
    pub gravity_3d: [f32; 3],

    /// Fixed simulation step in seconds
    pub fixed_timestep: f32,

    /// Maximum fixed steps taken in one frame before the accumulator is dropped
    pub max_substeps: u32,

    /// Solver iterations for velocity
    pub velocity_iterations: usize,

    /// Solver iterations for position correction
    pub position_iterations: usize,

    /// Body capacity of the 3D world
    pub max_bodies: u32,

    /// Broad-phase pair capacity of the 3D world
    pub max_body_pairs: u32,

    /// Contact constraint capacity of the 3D world
    pub max_contact_constraints: u32,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity_2d: [0.0, -9.8],
            gravity_3d: [0.0, -9.81, 0.0],
            fixed_timestep: 1.0 / 50.0,
            max_substeps: 8,
            velocity_iterations: 8,
            position_iterations: 3,
            max_bodies: 65536,
            max_body_pairs: 65536,
            max_contact_constraints: 10240,
        }
    }
}

impl PhysicsSettings {
    /// Set the 2D gravity
    pub fn with_gravity_2d(mut self, x: f32, y: f32) -> Self {
        self.gravity_2d = [x, y];
        self
    }

    /// Set the 3D gravity
    pub fn with_gravity_3d(mut self, x: f32, y: f32, z: f32) -> Self {
        self.gravity_3d = [x, y, z];
        self
    }

    /// Set the fixed timestep
    pub fn with_fixed_timestep(mut self, timestep: f32) -> Self {
        self.fixed_timestep = timestep;
        self
    }

    /// Set solver iteration counts
    pub fn with_iterations(mut self, velocity: usize, position: usize) -> Self {
        self.velocity_iterations = velocity;
        self.position_iterations = position;
        self
    }

    /// Reject settings the solver cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.fixed_timestep.is_nan() || self.fixed_timestep <= 0.0 {
            return Err(PhysicsError::InvalidConfig(format!(
                "fixed_timestep must be positive, got {}",
                self.fixed_timestep
            )));
        }
        if self.velocity_iterations == 0 {
            return Err(PhysicsError::InvalidConfig(
                "velocity_iterations must be at least 1".into(),
            ));
        }
        if self.max_bodies == 0 {
            return Err(PhysicsError::InvalidConfig("max_bodies must be at least 1".into()));
        }
        Ok(())
    }
}
