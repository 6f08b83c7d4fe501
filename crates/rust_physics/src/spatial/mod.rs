//! Spatial partitioning data structures
//!
//! Broadphase structures that turn all-pairs collision testing into a
//! candidate set the narrow phase can afford.

pub mod all_pairs;
pub mod quadtree;
pub mod spatial_query;

pub use all_pairs::AllPairs;
pub use quadtree::{QuadTree, QuadTreeConfig, QuadTreeNode};
pub use spatial_query::{BroadphaseEntry, SpatialQuery};
