//! Collision layer system for filtering pair generation and ray casts
//!
//! Based on Game Engine Architecture 3rd Edition, Section 13.3.8:
//! "Most games need to filter collisions... This is typically done via
//! collision layers or groups."
//!
//! Every object carries a single mask. Two objects may pair when their masks
//! share a bit; a ray may hit an object when the ray's mask and the object's
//! mask share a bit and the object is not tagged [`CollisionLayers::IGNORE_RAYCAST`].

use bitflags::bitflags;

bitflags! {
    /// Layer bitmask carried by objects and rays
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CollisionLayers: u32 {
        /// Layer every object starts on
        const DEFAULT = 1 << 0;
        /// Objects with this bit are invisible to ray casts
        const IGNORE_RAYCAST = 1 << 1;
        /// Player character layer
        const PLAYER = 1 << 2;
        /// Enemy character layer
        const ENEMY = 1 << 3;
        /// Projectiles (bullets, missiles, etc.)
        const PROJECTILE = 1 << 4;
        /// Static environment geometry
        const ENVIRONMENT = 1 << 5;
        /// Trigger volumes
        const TRIGGER = 1 << 6;
        /// Debris and small physics objects
        const DEBRIS = 1 << 7;
    }
}

impl Default for CollisionLayers {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl CollisionLayers {
    /// Check if two objects may form a collision pair
    ///
    /// # Example
    /// ```
    /// use rust_physics::physics::CollisionLayers;
    ///
    /// let crate_box = CollisionLayers::DEFAULT | CollisionLayers::DEBRIS;
    /// let floor = CollisionLayers::DEFAULT | CollisionLayers::ENVIRONMENT;
    /// assert!(CollisionLayers::should_collide(crate_box, floor));
    /// assert!(!CollisionLayers::should_collide(CollisionLayers::PLAYER, CollisionLayers::ENEMY));
    /// ```
    pub const fn should_collide(a: Self, b: Self) -> bool {
        a.intersects(b)
    }

    /// Check if a ray carrying `ray_mask` may hit an object carrying `object_mask`
    pub const fn ray_can_hit(ray_mask: Self, object_mask: Self) -> bool {
        ray_mask.intersects(object_mask) && !object_mask.contains(Self::IGNORE_RAYCAST)
    }

    /// Helper to create a mask from multiple layers
    pub fn mask(layers: &[Self]) -> Self {
        layers.iter().fold(Self::empty(), |acc, &layer| acc | layer)
    }

    /// Custom game layer `n` (bits 8-31 are free for game-specific use)
    pub const fn custom(n: u32) -> Self {
        Self::from_bits_retain(1 << (n & 31))
    }
}
