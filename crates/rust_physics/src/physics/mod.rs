//! Physics module: rigid bodies, collision detection and response
//!
//! Provides volume tests for boxes, spheres and capsules, impulse and
//! penalty contact resolution, pairwise constraints and the fixed-step
//! [`PhysicsSystem`] that drives them.

pub mod collision;
pub mod collision_layers;
pub mod collision_system;
pub mod constraints;
pub mod physics_object;
pub mod resolution;
pub mod step_rate;
pub mod system;

pub use collision::{
    CollisionInfo,
    CollisionPair,
    CollisionVolume,
    ContactPoint,
    Ray,
    RayCollision,
    VolumeType,
};
pub use collision_layers::CollisionLayers;
pub use collision_system::CollisionTracker;
pub use constraints::{Constraint, PositionConstraint, PositionOrientationConstraint};
pub use physics_object::PhysicsObject;
pub use step_rate::{RateChange, StepRate};
pub use system::PhysicsSystem;
