//! Implicit sparse voxel octree

pub mod octree;
pub mod node;
pub mod field;
pub mod populate;
pub mod leaves;

pub use octree::{OctreeStore, MAX_DEPTH};
pub use node::NodeHandle;
pub use field::{SdfField, PointField, ContainmentField, NoField};
pub use populate::{populate, PopulateStats, SdfPopulator};
pub use leaves::{leaves, LeafVoxel, Leaves};
