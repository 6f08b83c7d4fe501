//! Quad-tree over the XZ ground plane
//!
//! Regions split on X and Z only; every node extends without limit along Y.
//! An object is inserted into every leaf its bounding box overlaps, so
//! objects straddling a boundary appear in several leaves. That guarantees
//! no missed pairs; the duplicates it produces are removed by the pair set.

use std::collections::BTreeSet;

use super::spatial_query::{BroadphaseEntry, SpatialQuery};
use crate::config::BroadphaseConfig;
use crate::ecs::Entity;
use crate::foundation::math::Vec2;
use crate::physics::collision::{CollisionPair, Ray};

/// Configuration for quad-tree behavior
#[derive(Debug, Clone, PartialEq)]
pub struct QuadTreeConfig {
    /// Half size of the root region, centred on the origin
    pub half_size: Vec2,

    /// Maximum subdivision depth
    pub max_depth: u32,

    /// Entries a leaf may hold before subdivision
    pub max_entries_per_leaf: usize,
}

impl Default for QuadTreeConfig {
    fn default() -> Self {
        Self::from(&BroadphaseConfig::default())
    }
}

impl From<&BroadphaseConfig> for QuadTreeConfig {
    fn from(config: &BroadphaseConfig) -> Self {
        Self {
            half_size: config.half_size,
            max_depth: config.max_depth,
            max_entries_per_leaf: config.max_entries_per_leaf,
        }
    }
}

#[derive(Debug, Clone)]
enum NodeContents {
    Leaf(Vec<BroadphaseEntry>),
    Internal(Box<[QuadTreeNode; 4]>),
}

/// Single node in the quad-tree hierarchy
#[derive(Debug, Clone)]
pub struct QuadTreeNode {
    center: Vec2,
    half_size: Vec2,
    depth: u32,
    contents: NodeContents,
    awake_entries: usize,
}

impl QuadTreeNode {
    /// Create a new empty leaf
    pub const fn new(center: Vec2, half_size: Vec2, depth: u32) -> Self {
        Self {
            center,
            half_size,
            depth,
            contents: NodeContents::Leaf(Vec::new()),
            awake_entries: 0,
        }
    }

    /// Centre of the region on the XZ plane
    pub const fn center(&self) -> Vec2 {
        self.center
    }

    /// Half size of the region on the XZ plane
    pub const fn half_size(&self) -> Vec2 {
        self.half_size
    }

    /// Depth in the tree (0 = root)
    pub const fn depth(&self) -> u32 {
        self.depth
    }

    /// Check if this node is a leaf (has no children)
    pub const fn is_leaf(&self) -> bool {
        matches!(self.contents, NodeContents::Leaf(_))
    }

    /// Entries of a leaf; empty for internal nodes
    pub fn entries(&self) -> &[BroadphaseEntry] {
        match &self.contents {
            NodeContents::Leaf(entries) => entries,
            NodeContents::Internal(_) => &[],
        }
    }

    /// A leaf sleeps when everything inserted into it this step was asleep
    pub fn is_asleep(&self) -> bool {
        self.is_leaf() && self.awake_entries == 0
    }

    /// Whether an entry's box touches this region (Y ignored)
    ///
    /// Boundaries count as inside so entries on a split line land in every
    /// child they touch.
    fn overlaps(&self, entry: &BroadphaseEntry) -> bool {
        (entry.position.x - self.center.x).abs() <= entry.half_extents.x + self.half_size.x
            && (entry.position.z - self.center.y).abs() <= entry.half_extents.z + self.half_size.y
    }

    /// Insert an entry into every overlapping leaf below this node
    pub fn insert(&mut self, entry: BroadphaseEntry, config: &QuadTreeConfig) -> bool {
        if !self.overlaps(&entry) {
            return false;
        }
        if !entry.is_asleep {
            self.awake_entries += 1;
        }

        match &mut self.contents {
            NodeContents::Internal(children) => {
                for child in children.iter_mut() {
                    child.insert(entry, config);
                }
            }
            NodeContents::Leaf(entries) => {
                entries.push(entry);
                if entries.len() > config.max_entries_per_leaf && self.depth < config.max_depth {
                    self.subdivide(config);
                }
            }
        }
        true
    }

    /// Split into four quadrants and push this leaf's entries down
    fn subdivide(&mut self, config: &QuadTreeConfig) {
        let half = self.half_size * 0.5;
        let depth = self.depth + 1;
        let quadrant = |dx: f32, dz: f32| {
            Self::new(self.center + Vec2::new(dx * half.x, dz * half.y), half, depth)
        };
        let mut children = Box::new([
            quadrant(-1.0, -1.0),
            quadrant(1.0, -1.0),
            quadrant(-1.0, 1.0),
            quadrant(1.0, 1.0),
        ]);

        let previous = std::mem::replace(&mut self.contents, NodeContents::Leaf(Vec::new()));
        if let NodeContents::Leaf(entries) = previous {
            for entry in entries {
                for child in children.iter_mut() {
                    child.insert(entry, config);
                }
            }
        }
        self.contents = NodeContents::Internal(children);
    }

    /// Call `f` with the entries of every awake, non-empty leaf
    pub fn operate_on_contents<F>(&self, f: &mut F)
    where
        F: FnMut(&[BroadphaseEntry]),
    {
        match &self.contents {
            NodeContents::Internal(children) => {
                for child in children.iter() {
                    child.operate_on_contents(f);
                }
            }
            NodeContents::Leaf(entries) => {
                if !entries.is_empty() && self.awake_entries > 0 {
                    f(entries);
                }
            }
        }
    }

    /// Collect the contents of every leaf the ray passes over
    fn query_ray(&self, ray: &Ray, results: &mut BTreeSet<Entity>) {
        if !self.ray_crosses_region(ray) {
            return;
        }
        match &self.contents {
            NodeContents::Internal(children) => {
                for child in children.iter() {
                    child.query_ray(ray, results);
                }
            }
            NodeContents::Leaf(entries) => {
                results.extend(entries.iter().map(|e| e.entity));
            }
        }
    }

    /// Slab test of the ray against this region's XZ rectangle
    fn ray_crosses_region(&self, ray: &Ray) -> bool {
        let origin = Vec2::new(ray.origin.x, ray.origin.z);
        let direction = Vec2::new(ray.direction.x, ray.direction.z);
        let min = self.center - self.half_size;
        let max = self.center + self.half_size;

        let mut t_min = 0.0_f32;
        let mut t_max = f32::INFINITY;
        for i in 0..2 {
            if direction[i].abs() <= f32::EPSILON {
                if origin[i] < min[i] || origin[i] > max[i] {
                    return false;
                }
            } else {
                let inv = 1.0 / direction[i];
                let t1 = (min[i] - origin[i]) * inv;
                let t2 = (max[i] - origin[i]) * inv;
                t_min = t_min.max(t1.min(t2));
                t_max = t_max.min(t1.max(t2));
            }
        }
        t_max >= t_min
    }

    /// Get all leaf nodes
    pub fn leaves<'a>(&'a self, leaves: &mut Vec<&'a QuadTreeNode>) {
        match &self.contents {
            NodeContents::Leaf(_) => leaves.push(self),
            NodeContents::Internal(children) => {
                for child in children.iter() {
                    child.leaves(leaves);
                }
            }
        }
    }
}

/// Quad-tree spatial partitioning structure
#[derive(Debug, Clone)]
pub struct QuadTree {
    root: QuadTreeNode,
    config: QuadTreeConfig,
    entry_count: usize,
}

impl QuadTree {
    /// Create an empty tree covering `config.half_size` around the origin
    pub fn new(config: QuadTreeConfig) -> Self {
        Self {
            root: QuadTreeNode::new(Vec2::zeros(), config.half_size, 0),
            config,
            entry_count: 0,
        }
    }

    /// Root node
    pub const fn root(&self) -> &QuadTreeNode {
        &self.root
    }

    /// Configuration
    pub const fn config(&self) -> &QuadTreeConfig {
        &self.config
    }

    /// Call `f` with the entries of every awake, non-empty leaf
    pub fn operate_on_contents<F>(&self, mut f: F)
    where
        F: FnMut(&[BroadphaseEntry]),
    {
        self.root.operate_on_contents(&mut f);
    }

    /// Get all leaf nodes
    pub fn leaves(&self) -> Vec<&QuadTreeNode> {
        let mut leaves = Vec::new();
        self.root.leaves(&mut leaves);
        leaves
    }
}

impl SpatialQuery for QuadTree {
    fn clear(&mut self) {
        self.root = QuadTreeNode::new(Vec2::zeros(), self.config.half_size, 0);
        self.entry_count = 0;
    }

    fn insert(&mut self, entry: BroadphaseEntry) -> bool {
        let inserted = self.root.insert(entry, &self.config);
        if inserted {
            self.entry_count += 1;
        }
        inserted
    }

    fn collect_pairs(&self, pairs: &mut BTreeSet<CollisionPair>) {
        self.operate_on_contents(|entries| {
            for (i, a) in entries.iter().enumerate() {
                for b in &entries[i + 1..] {
                    if a.may_pair(b) {
                        pairs.insert(CollisionPair::new(a.entity, b.entity));
                    }
                }
            }
        });
    }

    fn query_ray(&self, ray: &Ray) -> Vec<Entity> {
        let mut results = BTreeSet::new();
        self.root.query_ray(ray, &mut results);
        results.into_iter().collect()
    }

    fn entry_count(&self) -> usize {
        self.entry_count
    }
}
