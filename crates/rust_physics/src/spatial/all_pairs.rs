//! Brute-force broadphase

use std::collections::BTreeSet;

use super::spatial_query::{BroadphaseEntry, SpatialQuery};
use crate::ecs::Entity;
use crate::physics::collision::{CollisionPair, Ray};

/// Pairs every entry with every other entry
///
/// Used when the quad-tree is disabled and as a reference in tests.
#[derive(Debug, Default, Clone)]
pub struct AllPairs {
    entries: Vec<BroadphaseEntry>,
}

impl AllPairs {
    /// Create an empty broadphase
    pub fn new() -> Self {
        Self::default()
    }
}

impl SpatialQuery for AllPairs {
    fn clear(&mut self) {
        self.entries.clear();
    }

    fn insert(&mut self, entry: BroadphaseEntry) -> bool {
        self.entries.push(entry);
        true
    }

    fn collect_pairs(&self, pairs: &mut BTreeSet<CollisionPair>) {
        for (i, a) in self.entries.iter().enumerate() {
            for b in &self.entries[i + 1..] {
                if a.may_pair(b) {
                    pairs.insert(CollisionPair::new(a.entity, b.entity));
                }
            }
        }
    }

    fn query_ray(&self, _ray: &Ray) -> Vec<Entity> {
        self.entries.iter().map(|e| e.entity).collect()
    }

    fn entry_count(&self) -> usize {
        self.entries.len()
    }
}
