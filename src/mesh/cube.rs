//! Canonical cube geometry emitted for every leaf

use glam::{Vec2, Vec3, Vec4};

use crate::core::error::Error;
use crate::core::types::Result;
use crate::voxel::svo::LeafVoxel;

/// Vertices written per leaf
pub const VERTICES_PER_LEAF: usize = 8;
/// Triangle indices written per leaf (6 faces x 2 triangles x 3)
pub const INDICES_PER_LEAF: usize = 36;

/// Corner directions; the corner is `position + direction * size / 2`
pub const CUBE_CORNERS: [Vec3; VERTICES_PER_LEAF] = [
    Vec3::new(-1.0, -1.0, 1.0),
    Vec3::new(1.0, -1.0, 1.0),
    Vec3::new(-1.0, 1.0, 1.0),
    Vec3::new(1.0, 1.0, 1.0),
    Vec3::new(-1.0, -1.0, -1.0),
    Vec3::new(1.0, -1.0, -1.0),
    Vec3::new(-1.0, 1.0, -1.0),
    Vec3::new(1.0, 1.0, -1.0),
];

/// Counter-clockwise when seen from outside (right-handed)
pub const CUBE_TRIANGLES: [u32; INDICES_PER_LEAF] = [
    0, 1, 3, 0, 3, 2, // +z
    4, 7, 5, 4, 6, 7, // -z
    1, 5, 7, 1, 7, 3, // +x
    0, 6, 4, 0, 2, 6, // -x
    2, 3, 7, 2, 7, 6, // +y
    0, 5, 1, 0, 4, 5, // -y
];

/// Largest leaf count whose vertices are still addressable by `u32` indices
pub const MAX_LEAVES: usize = (u32::MAX as usize + 1) / VERTICES_PER_LEAF;

/// Fail when `leaves` cubes would overflow 32-bit indices
pub fn check_leaf_count(leaves: usize) -> Result<()> {
    if leaves > MAX_LEAVES {
        return Err(Error::MeshTooLarge { leaves });
    }
    Ok(())
}

/// Output slots owned by exactly one leaf
pub(crate) struct CubeSlots<'a> {
    pub positions: &'a mut [Vec3],
    pub colors: &'a mut [Vec4],
    pub uvs: &'a mut [Vec2],
    pub indices: &'a mut [u32],
}

/// Write one leaf cube whose first vertex lands at `base_vertex`
pub(crate) fn write_cube(leaf: &LeafVoxel, color: Vec4, base_vertex: u32, slots: CubeSlots<'_>) {
    let half = leaf.size * 0.5;
    for (slot, corner) in slots.positions.iter_mut().zip(CUBE_CORNERS) {
        *slot = leaf.position + corner * half;
    }
    slots.colors[..VERTICES_PER_LEAF].fill(color);
    // UVs are not defined for cube meshing yet
    slots.uvs[..VERTICES_PER_LEAF].fill(Vec2::ZERO);
    for (slot, local) in slots.indices.iter_mut().zip(CUBE_TRIANGLES) {
        *slot = base_vertex + local;
    }
}
