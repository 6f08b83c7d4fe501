//! Contact data produced by the narrow phase

use crate::ecs::Entity;
use crate::foundation::math::Vec3;

/// Single-point contact between two objects
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactPoint {
    /// Contact point relative to A's position
    pub local_a: Vec3,
    /// Contact point relative to B's position
    pub local_b: Vec3,
    /// World contact normal, pointing from A to B
    pub normal: Vec3,
    /// Overlap depth along `normal`
    pub penetration: f32,
}

/// Canonical key for an unordered object pair (smaller id first)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CollisionPair {
    /// Entity with the smaller id
    pub entity_a: Entity,
    /// Entity with the larger id
    pub entity_b: Entity,
}

impl CollisionPair {
    /// Create a new collision pair (always stores smaller entity ID first for consistency)
    pub fn new(entity_a: Entity, entity_b: Entity) -> Self {
        if entity_a <= entity_b {
            Self { entity_a, entity_b }
        } else {
            Self { entity_a: entity_b, entity_b: entity_a }
        }
    }

    /// Whether `entity` is one of the two
    pub fn involves(&self, entity: Entity) -> bool {
        self.entity_a == entity || self.entity_b == entity
    }
}

/// A detected overlap and its lifetime countdown
///
/// `a` and `b` are in the order the contact was computed for; `normal` points
/// from `a` to `b`. Use [`CollisionInfo::pair`] for the canonical key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionInfo {
    /// First object of the contact
    pub a: Entity,
    /// Second object of the contact
    pub b: Entity,
    /// Contact geometry
    pub point: ContactPoint,
    /// Ticks left before the pair ends without re-detection
    pub frames_left: i32,
}

impl CollisionInfo {
    /// New contact with its countdown unset
    pub const fn new(a: Entity, b: Entity, point: ContactPoint) -> Self {
        Self { a, b, point, frames_left: 0 }
    }

    /// Canonical key of this pair
    pub fn pair(&self) -> CollisionPair {
        CollisionPair::new(self.a, self.b)
    }

    /// The same contact seen from the other object
    pub fn swapped(self) -> Self {
        Self {
            a: self.b,
            b: self.a,
            point: ContactPoint {
                local_a: self.point.local_b,
                local_b: self.point.local_a,
                normal: -self.point.normal,
                penetration: self.point.penetration,
            },
            frames_left: self.frames_left,
        }
    }
}
