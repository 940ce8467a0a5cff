//! Data-parallel cube mesher.
//!
//! The output buffers are sized up front; leaf `i` owns vertices
//! `[8i, 8i + 8)` and indices `[36i, 36i + 36)`. Rayon hands every worker a
//! disjoint `par_chunks_mut` slice per leaf, so no locking is involved, and
//! the parallel iterator only returns once every leaf has been written.

use std::sync::Arc;

use rayon::prelude::*;

use super::buffers::MeshBuffers;
use super::cube::{check_leaf_count, write_cube, CubeSlots, INDICES_PER_LEAF, VERTICES_PER_LEAF};
use crate::core::error::Error;
use crate::core::types::Result;
use crate::voxel::material::MaterialRegistry;
use crate::voxel::svo::LeafVoxel;

/// Emits one cube per leaf using one rayon task per leaf slot
pub struct ParallelMeshBuilder<'r> {
    registry: &'r MaterialRegistry,
    /// Dedicated pool; `None` runs on rayon's global pool
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl<'r> ParallelMeshBuilder<'r> {
    pub fn new(registry: &'r MaterialRegistry) -> Self {
        Self { registry, pool: None }
    }

    /// Run on a dedicated pool of `threads` workers
    pub fn with_threads(self, threads: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("mesh-worker-{}", i))
            .build()
            .map_err(|e| Error::ThreadPool(e.to_string()))?;
        Ok(self.with_pool(Arc::new(pool)))
    }

    /// Run on an existing pool
    pub fn with_pool(mut self, pool: Arc<rayon::ThreadPool>) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Materialize the leaf sequence, then mesh it in parallel
    pub fn build<I>(&self, leaves: I) -> Result<MeshBuffers>
    where
        I: IntoIterator<Item = LeafVoxel>,
    {
        let leaves: Vec<LeafVoxel> = leaves.into_iter().collect();
        self.build_from_slice(&leaves)
    }

    /// Mesh an already materialized leaf array.
    ///
    /// Fails as a whole if any leaf fails; no partial buffers are returned.
    pub fn build_from_slice(&self, leaves: &[LeafVoxel]) -> Result<MeshBuffers> {
        check_leaf_count(leaves.len())?;

        let mut mesh = MeshBuffers::zeroed(leaves.len());
        match &self.pool {
            Some(pool) => pool.install(|| self.fill(leaves, &mut mesh))?,
            None => self.fill(leaves, &mut mesh)?,
        }

        log::debug!(
            "Parallel mesh: {} leaves -> {} vertices, {} triangles",
            leaves.len(),
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        Ok(mesh)
    }

    fn fill(&self, leaves: &[LeafVoxel], mesh: &mut MeshBuffers) -> Result<()> {
        let MeshBuffers { positions, indices, colors, uvs, .. } = mesh;
        let registry = self.registry;

        positions
            .par_chunks_mut(VERTICES_PER_LEAF)
            .zip(colors.par_chunks_mut(VERTICES_PER_LEAF))
            .zip(uvs.par_chunks_mut(VERTICES_PER_LEAF))
            .zip(indices.par_chunks_mut(INDICES_PER_LEAF))
            .zip(leaves.par_iter())
            .enumerate()
            .try_for_each(|(i, ((((positions, colors), uvs), indices), leaf))| {
                let color = registry.color_of(leaf.material)?;
                let base_vertex = (i * VERTICES_PER_LEAF) as u32;
                write_cube(leaf, color, base_vertex, CubeSlots { positions, colors, uvs, indices });
                Ok(())
            })
    }
}
