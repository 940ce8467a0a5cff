//! Cube meshing of octree leaves

pub mod buffers;
pub mod builder;
pub mod cube;
pub mod parallel;

pub use buffers::MeshBuffers;
pub use builder::MeshBuilder;
pub use cube::{CUBE_CORNERS, CUBE_TRIANGLES, INDICES_PER_LEAF, MAX_LEAVES, VERTICES_PER_LEAF};
pub use parallel::ParallelMeshBuilder;

use serde::{Deserialize, Serialize};

use crate::core::types::Result;
use crate::voxel::material::MaterialRegistry;
use crate::voxel::svo::LeafVoxel;

/// Which mesh builder to run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum MeshMode {
    Sequential,
    /// `threads: None` uses rayon's global pool
    Parallel { threads: Option<usize> },
}

impl Default for MeshMode {
    fn default() -> Self {
        MeshMode::Parallel { threads: None }
    }
}

/// Build a cube mesh with the selected builder
pub fn build_mesh<I>(leaves: I, registry: &MaterialRegistry, mode: MeshMode) -> Result<MeshBuffers>
where
    I: IntoIterator<Item = LeafVoxel>,
{
    match mode {
        MeshMode::Sequential => MeshBuilder::new(registry).build(leaves),
        MeshMode::Parallel { threads: None } => ParallelMeshBuilder::new(registry).build(leaves),
        MeshMode::Parallel { threads: Some(n) } => {
            ParallelMeshBuilder::new(registry).with_threads(n)?.build(leaves)
        }
    }
}
