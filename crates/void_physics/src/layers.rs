//! Collision layers and filtering
//!
//! Each layer is one of 16 bits. A layer's `flags` lists the layers it is
//! willing to touch; a pair collides only when both sides list each other.
//! The table belongs to a scene, so two scenes can disagree about it.

use crate::error::{PhysicsError, Result};
use serde::{Deserialize, Serialize};

/// Number of addressable layers
pub const MAX_LAYERS: u8 = 16;

/// Every layer bit set
pub const ALL_LAYERS: u16 = 0xFFFF;

/// A named layer entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerInfo {
    /// Bit position, 0..16
    pub index: u8,
    /// Display name
    pub name: String,
    /// Layers this one collides with
    #[serde(default = "default_flags")]
    pub flags: u16,
}

fn default_flags() -> u16 {
    ALL_LAYERS
}

impl LayerInfo {
    /// The layer as a single-bit mask
    #[inline]
    pub fn bit(&self) -> u16 {
        1 << self.index
    }
}

/// Membership and filter bits handed to the physics engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionFilter {
    pub memberships: u32,
    pub filter: u32,
}

impl CollisionFilter {
    /// Collides with everything
    pub const ALL: Self = Self {
        memberships: u32::MAX,
        filter: u32::MAX,
    };

    /// Check if two filters accept each other
    pub fn can_collide(&self, other: &CollisionFilter) -> bool {
        (self.memberships & other.filter) != 0 && (other.memberships & self.filter) != 0
    }
}

impl Default for CollisionFilter {
    fn default() -> Self {
        Self::ALL
    }
}

/// Per-scene layer collision table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerCollisionMask {
    #[serde(default)]
    layers: Vec<LayerInfo>,
}

impl LayerCollisionMask {
    /// Bit of the built-in static layer
    pub const STATIC_LAYER: u16 = 1 << 0;
    /// Bit assigned to new entities
    pub const DEFAULT_LAYER: u16 = 1 << 1;
    /// Bit of the built-in player layer
    pub const PLAYER_LAYER: u16 = 1 << 2;
    /// Bit of the built-in sensor layer
    pub const SENSOR_LAYER: u16 = 1 << 3;

    /// Index used when an entity's layer is not in the table
    pub const DEFAULT_LAYER_INDEX: u8 = 1;

    /// A table with no layers
    pub fn empty() -> Self {
        Self { layers: Vec::new() }
    }

    /// Register or overwrite the layer at `index`
    pub fn set_layer(&mut self, index: u8, name: impl Into<String>, flags: u16) -> Result<()> {
        if index >= MAX_LAYERS {
            return Err(PhysicsError::InvalidLayer(format!(
                "index {} is outside 0..{}",
                index, MAX_LAYERS
            )));
        }

        let name = name.into();
        match self.layers.iter_mut().find(|l| l.index == index) {
            Some(layer) => {
                layer.name = name;
                layer.flags = flags;
            }
            None => {
                self.layers.push(LayerInfo { index, name, flags });
                self.layers.sort_by_key(|l| l.index);
            }
        }
        Ok(())
    }

    /// Register a layer at the first free index, returning its bit
    pub fn add_layer(&mut self, name: impl Into<String>) -> Result<u16> {
        let index = (0..MAX_LAYERS)
            .find(|i| !self.layers.iter().any(|l| l.index == *i))
            .ok_or_else(|| PhysicsError::InvalidLayer("all 16 layers are in use".into()))?;
        self.set_layer(index, name, ALL_LAYERS)?;
        Ok(1 << index)
    }

    /// Remove the layer with the given bit
    pub fn remove_layer(&mut self, bit: u16) -> Option<LayerInfo> {
        let position = self.layers.iter().position(|l| l.bit() == bit)?;
        Some(self.layers.remove(position))
    }

    /// Look up a layer by bit
    pub fn get(&self, bit: u16) -> Option<&LayerInfo> {
        self.layers.iter().find(|l| l.bit() == bit)
    }

    /// Look up a layer by name
    pub fn by_name(&self, name: &str) -> Option<&LayerInfo> {
        self.layers.iter().find(|l| l.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LayerInfo> {
        self.layers.iter()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// The bit to use for `bit`, falling back to the default layer when unknown
    pub fn resolve(&self, bit: u16) -> u16 {
        if self.get(bit).is_some() {
            bit
        } else {
            Self::DEFAULT_LAYER
        }
    }

    /// Index of the layer for `bit`, falling back to the default layer index
    pub fn index_of(&self, bit: u16) -> u8 {
        self.get(bit)
            .map(|l| l.index)
            .unwrap_or(Self::DEFAULT_LAYER_INDEX)
    }

    fn flags_at(&self, index: u8) -> u16 {
        self.layers
            .iter()
            .find(|l| l.index == index)
            .map(|l| l.flags)
            .unwrap_or(ALL_LAYERS)
    }

    /// Symmetric pair test by layer index
    pub fn should_collide(&self, a: u8, b: u8) -> bool {
        if a >= MAX_LAYERS || b >= MAX_LAYERS {
            return false;
        }
        (self.flags_at(a) & (1 << b)) != 0 && (self.flags_at(b) & (1 << a)) != 0
    }

    /// Enable or disable collisions between two layers, both directions
    pub fn set_collides(&mut self, a: u8, b: u8, collides: bool) {
        for (this, other) in [(a, b), (b, a)] {
            if let Some(layer) = self.layers.iter_mut().find(|l| l.index == this) {
                if collides {
                    layer.flags |= 1 << other;
                } else {
                    layer.flags &= !(1 << other);
                }
            }
        }
    }

    /// Category/mask filter for a 2D fixture on layer `bit`
    pub fn filter_2d(&self, bit: u16) -> CollisionFilter {
        let bit = self.resolve(bit);
        let flags = self.get(bit).map(|l| l.flags).unwrap_or(ALL_LAYERS);
        CollisionFilter {
            memberships: bit as u32,
            filter: flags as u32,
        }
    }

    /// Filter for a 3D body on layer `bit`, built from the 16x16 pair matrix
    pub fn filter_3d(&self, bit: u16) -> CollisionFilter {
        let index = self.index_of(bit);
        let filter = (0..MAX_LAYERS)
            .filter(|other| self.should_collide(index, *other))
            .fold(0u32, |acc, other| acc | (1 << other));
        CollisionFilter {
            memberships: 1 << index,
            filter,
        }
    }
}

impl Default for LayerCollisionMask {
    fn default() -> Self {
        let layer = |index: u8, name: &str| LayerInfo {
            index,
            name: name.to_string(),
            flags: ALL_LAYERS,
        };
        Self {
            layers: vec![
                layer(0, "Static"),
                layer(1, "Default"),
                layer(2, "Player"),
                layer(3, "Sensor"),
            ],
        }
    }
}
