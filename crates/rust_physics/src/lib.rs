//! # Rust Physics
//!
//! A small rigid-body physics core for games.
//!
//! ## Features
//!
//! - **Collision Volumes**: AABB, OBB, sphere and capsule narrow-phase tests
//! - **Contact Response**: Impulses with restitution and friction, or penalty springs
//! - **Broadphase**: Quad-tree over the ground plane, or brute force
//! - **Sleeping**: Resting bodies drop out of integration and pair generation
//! - **Adaptive Stepping**: The fixed step lengthens when steps get expensive
//! - **Events**: Begin, end and trigger notifications through per-entity handlers
//!
//! ## Quick Start
//!
//! ```rust
//! use rust_physics::prelude::*;
//!
//! let mut physics = PhysicsSystem::new(PhysicsConfig::default());
//! let mut world = World::new();
//!
//! world.add_object(
//!     GameObject::new("floor")
//!         .at(Vec3::new(0.0, -1.0, 0.0))
//!         .with_volume(CollisionVolume::aabb(Vec3::new(10.0, 1.0, 10.0)))
//!         .with_physics(PhysicsObject::new_static()),
//! );
//! let ball = world.add_object(
//!     GameObject::new("ball")
//!         .at(Vec3::new(0.0, 3.0, 0.0))
//!         .with_volume(CollisionVolume::sphere(0.5))
//!         .with_physics(physics.create_physics_object(1.0)),
//! );
//!
//! for _ in 0..120 {
//!     physics.update(&mut world, 1.0 / 60.0);
//! }
//! assert!(world.object(ball).unwrap().transform.position.y > 0.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod ecs;
pub mod events;
pub mod foundation;
pub mod physics;
pub mod spatial;

/// Common imports for physics users
pub mod prelude {
    pub use crate::{
        config::{BroadphaseConfig, Config, ConfigError, PhysicsConfig},
        ecs::{Entity, GameObject, World},
        events::{CollisionEvent, CollisionEventKind, CollisionHandler, HandlerResponse},
        foundation::{
            math::{Quat, Transform, Vec3},
            time::Stopwatch,
        },
        physics::{
            CollisionLayers, CollisionVolume, Constraint, PhysicsObject, PhysicsSystem,
            PositionConstraint, PositionOrientationConstraint, Ray, RayCollision,
        },
    };
}
