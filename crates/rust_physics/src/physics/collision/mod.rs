//! Collision volumes, rays, contacts and the narrow-phase tests

pub mod contact;
pub mod detection;
pub mod ray;
pub mod raycast;
pub mod volume;

pub use contact::{CollisionInfo, CollisionPair, ContactPoint};
pub use detection::{
    aabb_intersection, aabb_sphere_intersection, aabb_test, capsule_sphere_intersection,
    obb_intersection, obb_sphere_intersection, object_intersection, sphere_intersection,
    OrientedBox,
};
pub use ray::{Ray, RayCollision};
pub use raycast::{
    ray_box_intersection, ray_capsule_intersection, ray_intersection, ray_obb_intersection,
    ray_sphere_intersection,
};
pub use volume::{CollisionVolume, VolumeType};
