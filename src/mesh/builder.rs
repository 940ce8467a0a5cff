//! Sequential cube mesher

use super::buffers::MeshBuffers;
use super::cube::{check_leaf_count, write_cube, CubeSlots, INDICES_PER_LEAF, VERTICES_PER_LEAF};
use crate::core::types::{Result, Vec2, Vec3, Vec4};
use crate::voxel::material::MaterialRegistry;
use crate::voxel::svo::LeafVoxel;

/// Emits one cube per leaf, in leaf order, into growable buffers
pub struct MeshBuilder<'r> {
    registry: &'r MaterialRegistry,
}

impl<'r> MeshBuilder<'r> {
    pub fn new(registry: &'r MaterialRegistry) -> Self {
        Self { registry }
    }

    /// Build a mesh from a leaf sequence
    pub fn build<I>(&self, leaves: I) -> Result<MeshBuffers>
    where
        I: IntoIterator<Item = LeafVoxel>,
    {
        let leaves = leaves.into_iter();
        let mut mesh = MeshBuffers::with_leaf_capacity(leaves.size_hint().0);

        for (i, leaf) in leaves.enumerate() {
            check_leaf_count(i + 1)?;
            let color = self.registry.color_of(leaf.material)?;

            let vertex_start = mesh.positions.len();
            let index_start = mesh.indices.len();
            mesh.positions.resize(vertex_start + VERTICES_PER_LEAF, Vec3::ZERO);
            mesh.colors.resize(vertex_start + VERTICES_PER_LEAF, Vec4::ZERO);
            mesh.uvs.resize(vertex_start + VERTICES_PER_LEAF, Vec2::ZERO);
            mesh.indices.resize(index_start + INDICES_PER_LEAF, 0);

            write_cube(&leaf, color, vertex_start as u32, CubeSlots {
                positions: &mut mesh.positions[vertex_start..],
                colors: &mut mesh.colors[vertex_start..],
                uvs: &mut mesh.uvs[vertex_start..],
                indices: &mut mesh.indices[index_start..],
            });
        }

        log::debug!(
            "Sequential mesh: {} vertices, {} triangles",
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        Ok(mesh)
    }
}
