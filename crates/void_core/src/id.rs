//! Durable entity identity
//!
//! Registry slots are recycled, so anything that has to survive a save/load
//! cycle or cross a scene boundary refers to an entity by its [`Uuid`].

use core::fmt;
use serde::{Deserialize, Serialize};

/// A 64-bit random identifier. Zero is reserved as "none".
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uuid(u64);

impl Uuid {
    /// The reserved "no entity" value
    pub const NIL: Self = Self(0);

    /// Generate a fresh identifier (never NIL)
    pub fn new() -> Self {
        loop {
            let bits: u64 = rand::random();
            if bits != 0 {
                return Self(bits);
            }
        }
    }

    /// Wrap raw bits
    #[inline]
    pub const fn from_u64(bits: u64) -> Self {
        Self(bits)
    }

    /// Raw bits
    #[inline]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn is_nil(&self) -> bool {
        self.0 == 0
    }

    /// Widened form used as physics collider user data
    #[inline]
    pub const fn to_user_data(&self) -> u128 {
        self.0 as u128
    }

    /// Inverse of [`Uuid::to_user_data`]
    #[inline]
    pub const fn from_user_data(data: u128) -> Self {
        Self(data as u64)
    }
}

impl From<u64> for Uuid {
    fn from(bits: u64) -> Self {
        Self(bits)
    }
}

impl From<Uuid> for u64 {
    fn from(id: Uuid) -> Self {
        id.0
    }
}

impl fmt::Debug for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Uuid({})", self.0)
    }
}

impl fmt::Display for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
