//! Abstract spatial query interface for broad-phase collision detection
//!
//! Based on Game Engine Architecture 3rd Edition, Section 13.3.2:
//! "Spatial partitioning schemes... allow us to quickly cull out pairs of
//! objects that cannot possibly be colliding."
//!
//! Implementations are filled from scratch every physics step and emptied
//! with [`SpatialQuery::clear`] before the next one.

use std::collections::BTreeSet;
use std::fmt::Debug;

use crate::ecs::{Entity, GameObject};
use crate::foundation::math::Vec3;
use crate::physics::collision::{CollisionPair, Ray};
use crate::physics::collision_layers::CollisionLayers;

/// One object as the broadphase sees it for the current step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BroadphaseEntry {
    /// Object id
    pub entity: Entity,
    /// World position
    pub position: Vec3,
    /// Half size of the object's bounding box
    pub half_extents: Vec3,
    /// Layer mask used to filter pairs
    pub layers: CollisionLayers,
    /// Sleeping objects do not keep a region awake
    pub is_asleep: bool,
}

impl BroadphaseEntry {
    /// Entry for an object, if it has a collision volume
    pub fn from_object(object: &GameObject) -> Option<Self> {
        Some(Self {
            entity: object.entity(),
            position: object.transform.position,
            half_extents: object.broadphase_half_extents()?,
            layers: object.layers,
            is_asleep: object.is_asleep(),
        })
    }

    /// Whether two entries may form a candidate pair
    pub fn may_pair(&self, other: &Self) -> bool {
        self.entity != other.entity
            && !(self.is_asleep && other.is_asleep)
            && CollisionLayers::should_collide(self.layers, other.layers)
    }
}

/// Abstract interface for spatial partitioning used in broad-phase collision detection
///
/// GEA 13.3.2: "The broad phase quickly identifies pairs of objects that might
/// be colliding using some kind of spatial partitioning scheme."
pub trait SpatialQuery: Debug + Send + Sync {
    /// Remove every entry
    fn clear(&mut self);

    /// Add an entry; returns false if the structure cannot hold it
    fn insert(&mut self, entry: BroadphaseEntry) -> bool;

    /// Add every candidate pair to `pairs`, deduplicated by the set
    fn collect_pairs(&self, pairs: &mut BTreeSet<CollisionPair>);

    /// Objects a ray might hit, a superset of the real hits
    fn query_ray(&self, ray: &Ray) -> Vec<Entity>;

    /// Number of distinct entries inserted since the last clear
    fn entry_count(&self) -> usize;
}
