//! Voxel data structures and operations

pub mod material;
pub mod sdf;
pub mod svo;
pub mod object;

pub use material::{MaterialId, MaterialRegistry};
pub use object::{UpdateListener, VoxelObject};
pub use sdf::Shape;
