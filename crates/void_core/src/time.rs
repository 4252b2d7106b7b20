//! Frame time

use core::ops::{Add, Mul};

/// Elapsed time in seconds since the previous frame
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Timestep(f32);

impl Timestep {
    #[inline]
    pub const fn from_seconds(seconds: f32) -> Self {
        Self(seconds)
    }

    #[inline]
    pub const fn seconds(&self) -> f32 {
        self.0
    }

    #[inline]
    pub fn milliseconds(&self) -> f32 {
        self.0 * 1000.0
    }
}

impl From<f32> for Timestep {
    fn from(seconds: f32) -> Self {
        Self(seconds)
    }
}

impl From<Timestep> for f32 {
    fn from(ts: Timestep) -> Self {
        ts.0
    }
}

impl Add for Timestep {
    type Output = Timestep;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Mul<f32> for Timestep {
    type Output = Timestep;

    fn mul(self, rhs: f32) -> Self {
        Self(self.0 * rhs)
    }
}
