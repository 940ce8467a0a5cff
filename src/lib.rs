//! Voxcarve - sparse voxel octrees carved from signed distance fields
//!
//! The pipeline is: an empty [`voxel::svo::OctreeStore`], one or more carve
//! passes, the leaf cubes, then cube geometry built sequentially or with rayon.

pub mod core;
pub mod math;
pub mod voxel;
pub mod mesh;
pub mod scene;
