//! Contact events reported by the 2D world

use glam::Vec2;
use rapier2d::prelude as rapier;
use void_core::Uuid;

/// Whether a contact started or ended during a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    Begin,
    End,
}

/// A contact between two fixtures, tagged with the owning entities
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactEvent2D {
    pub entity_a: Uuid,
    pub entity_b: Uuid,
    pub kind: ContactKind,
    pub sensor_a: bool,
    pub sensor_b: bool,
    /// Velocity of B relative to A at the time of the event
    pub relative_velocity: Vec2,
}

impl ContactEvent2D {
    pub fn is_begin(&self) -> bool {
        self.kind == ContactKind::Begin
    }

    /// The same contact as seen from entity B
    pub fn swapped(&self) -> Self {
        Self {
            entity_a: self.entity_b,
            entity_b: self.entity_a,
            kind: self.kind,
            sensor_a: self.sensor_b,
            sensor_b: self.sensor_a,
            relative_velocity: -self.relative_velocity,
        }
    }
}

/// Forwards Rapier collision events into a channel
pub(crate) struct ChannelEventCollector {
    pub(crate) collision_events: crossbeam_channel::Sender<rapier::CollisionEvent>,
}

impl rapier::EventHandler for ChannelEventCollector {
    fn handle_collision_event(
        &self,
        _bodies: &rapier::RigidBodySet,
        _colliders: &rapier::ColliderSet,
        event: rapier::CollisionEvent,
        _contact_pair: Option<&rapier::ContactPair>,
    ) {
        let _ = self.collision_events.send(event);
    }

    fn handle_contact_force_event(
        &self,
        _dt: f32,
        _bodies: &rapier::RigidBodySet,
        _colliders: &rapier::ColliderSet,
        _contact_pair: &rapier::ContactPair,
        _total_force_magnitude: f32,
    ) {
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swapped_contact() {
        let event = ContactEvent2D {
            entity_a: Uuid::from_u64(1),
            entity_b: Uuid::from_u64(2),
            kind: ContactKind::Begin,
            sensor_a: false,
            sensor_b: true,
            relative_velocity: Vec2::new(1.0, -2.0),
        };
        let other = event.swapped();
        assert_eq!(other.entity_a, Uuid::from_u64(2));
        assert!(other.sensor_a);
        assert!(!other.sensor_b);
        assert_eq!(other.relative_velocity, Vec2::new(-1.0, 2.0));
        assert!(other.is_begin());
    }
}
