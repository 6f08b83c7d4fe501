//! Ray primitive and ray-cast results

use crate::ecs::Entity;
use crate::foundation::math::Vec3;
use crate::physics::collision_layers::CollisionLayers;

/// Ray for ray casting and picking
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Ray origin in world space
    pub origin: Vec3,
    /// Ray direction (normalized)
    pub direction: Vec3,
    /// Layers this ray is allowed to hit
    pub mask: CollisionLayers,
}

impl Ray {
    /// Create a new ray hitting every layer; the direction is normalized
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self::with_mask(origin, direction, CollisionLayers::all())
    }

    /// Create a ray restricted to `mask`
    pub fn with_mask(origin: Vec3, direction: Vec3, mask: CollisionLayers) -> Self {
        Self {
            origin,
            direction: direction.try_normalize(f32::EPSILON).unwrap_or_else(Vec3::zeros),
            mask,
        }
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Result of a successful ray test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayCollision {
    /// Object that was hit, when the test went through the world
    pub entity: Option<Entity>,
    /// World-space hit point
    pub point: Vec3,
    /// Distance along the ray
    pub distance: f32,
}

impl RayCollision {
    /// Hit at `distance` along `ray`
    pub fn along(ray: &Ray, distance: f32) -> Self {
        Self {
            entity: None,
            point: ray.point_at(distance),
            distance,
        }
    }
}
