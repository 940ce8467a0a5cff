//! CPU-side geometry buffers handed to the renderer

use glam::{Vec2, Vec3, Vec4};

use super::cube::{INDICES_PER_LEAF, VERTICES_PER_LEAF};
use crate::math::Aabb;

/// Parallel-indexed vertex streams plus a 32-bit triangle list.
///
/// `positions`, `colors` and `uvs` always have the same length. `normals`
/// stays empty until [`MeshBuffers::recalculate_normals`] is called.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshBuffers {
    pub positions: Vec<Vec3>,
    pub indices: Vec<u32>,
    pub normals: Vec<Vec3>,
    pub colors: Vec<Vec4>,
    pub uvs: Vec<Vec2>,
}

impl MeshBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty buffers with room for `leaves` cubes
    pub fn with_leaf_capacity(leaves: usize) -> Self {
        Self {
            positions: Vec::with_capacity(leaves * VERTICES_PER_LEAF),
            indices: Vec::with_capacity(leaves * INDICES_PER_LEAF),
            normals: Vec::new(),
            colors: Vec::with_capacity(leaves * VERTICES_PER_LEAF),
            uvs: Vec::with_capacity(leaves * VERTICES_PER_LEAF),
        }
    }

    /// Buffers sized exactly for `leaves` cubes, every slot zeroed
    pub fn zeroed(leaves: usize) -> Self {
        Self {
            positions: vec![Vec3::ZERO; leaves * VERTICES_PER_LEAF],
            indices: vec![0; leaves * INDICES_PER_LEAF],
            normals: Vec::new(),
            colors: vec![Vec4::ZERO; leaves * VERTICES_PER_LEAF],
            uvs: vec![Vec2::ZERO; leaves * VERTICES_PER_LEAF],
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Bounds of all vertices, `None` for an empty mesh
    pub fn bounds(&self) -> Option<Aabb> {
        let (first, rest) = self.positions.split_first()?;
        let mut aabb = Aabb::new(*first, *first);
        for p in rest {
            aabb.min = aabb.min.min(*p);
            aabb.max = aabb.max.max(*p);
        }
        Some(aabb)
    }

    /// Area-weighted smooth vertex normals from the triangle list
    pub fn recalculate_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.positions.len()];
        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let face = (self.positions[b] - self.positions[a])
                .cross(self.positions[c] - self.positions[a]);
            normals[a] += face;
            normals[b] += face;
            normals[c] += face;
        }
        for n in &mut normals {
            *n = n.normalize_or_zero();
        }
        self.normals = normals;
    }

    /// Raw bytes of the position stream (tightly packed `f32 x 3`)
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Raw bytes of the index stream (`u32`)
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Raw bytes of the color stream (`f32 x 4`)
    pub fn color_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.colors)
    }

    /// Raw bytes of the UV stream (`f32 x 2`)
    pub fn uv_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.uvs)
    }

    /// Calculate memory usage in bytes
    pub fn memory_usage(&self) -> usize {
        self.position_bytes().len()
            + self.index_bytes().len()
            + self.color_bytes().len()
            + self.uv_bytes().len()
            + std::mem::size_of::<Vec3>() * self.normals.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::cube::{CUBE_CORNERS, CUBE_TRIANGLES};

    fn unit_cube() -> MeshBuffers {
        MeshBuffers {
            positions: CUBE_CORNERS.to_vec(),
            indices: CUBE_TRIANGLES.to_vec(),
            normals: Vec::new(),
            colors: vec![Vec4::ONE; 8],
            uvs: vec![Vec2::ZERO; 8],
        }
    }

    #[test]
    fn test_zeroed_sizes() {
        let mesh = MeshBuffers::zeroed(3);
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.index_count(), 108);
        assert_eq!(mesh.triangle_count(), 36);
        assert!(mesh.normals.is_empty());
        assert!(MeshBuffers::new().is_empty());
    }

    #[test]
    fn test_recalculate_normals_point_outward() {
        let mut mesh = unit_cube();
        mesh.recalculate_normals();
        assert_eq!(mesh.normals.len(), 8);
        for (p, n) in mesh.positions.iter().zip(&mesh.normals) {
            assert!(n.dot(*p) > 0.0);
            assert!((n.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_byte_views() {
        let mesh = unit_cube();
        assert_eq!(mesh.position_bytes().len(), 8 * 12);
        assert_eq!(mesh.index_bytes().len(), 36 * 4);
        assert_eq!(mesh.color_bytes().len(), 8 * 16);
        assert_eq!(mesh.uv_bytes().len(), 8 * 8);
        assert_eq!(mesh.memory_usage(), 96 + 144 + 128 + 64);
    }

    #[test]
    fn test_bounds() {
        let mesh = unit_cube();
        let aabb = mesh.bounds().unwrap();
        assert_eq!(aabb.min, Vec3::splat(-1.0));
        assert_eq!(aabb.max, Vec3::ONE);
        assert!(MeshBuffers::new().bounds().is_none());
    }
}
