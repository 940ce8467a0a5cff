//! Implicit sparse voxel octree container
//!
//! The whole tree lives in one flat buffer of material ids laid out like a
//! heap: the root is index 0 and the children of node `i` occupy
//! `8i + 1 ..= 8i + 8`. Nothing is stored besides the ids; depth, size and
//! position of a node are all derived from its index.

use glam::Vec3;

use super::node::NodeHandle;
use crate::core::error::Error;
use crate::core::types::Result;
use crate::math::morton::{encode_morton_3d, octant_bits};
use crate::math::Aabb;
use crate::voxel::material::{MaterialId, MaterialRegistry};

/// Deepest tree the store will allocate (~153M nodes)
pub const MAX_DEPTH: u8 = 9;

/// Number of nodes in a complete 8-ary tree of the given depth
pub const fn node_count_for_depth(depth: u8) -> usize {
    (8usize.pow(depth as u32 + 1) - 1) / 7
}

/// Index of the first node on a level
pub const fn level_start(depth: u8) -> usize {
    (8usize.pow(depth as u32) - 1) / 7
}

/// Level of a node index, i.e. `floor(log8(7i + 1))` in integer arithmetic
pub fn depth_of_index(index: usize) -> u8 {
    let mut depth = 0u8;
    let mut level_end = 1usize;
    while index >= level_end {
        depth += 1;
        level_end = level_end * 8 + 1;
    }
    depth
}

/// Index of child `code` (0-7) of `index`; may be past the end of a store
#[inline]
pub const fn child_index(index: usize, code: u8) -> usize {
    8 * index + code as usize + 1
}

/// Parent index, `None` for the root
#[inline]
pub const fn parent_index(index: usize) -> Option<usize> {
    if index == 0 { None } else { Some((index - 1) / 8) }
}

/// Which child of its parent a node is, `None` for the root
#[inline]
pub const fn child_code(index: usize) -> Option<u8> {
    if index == 0 { None } else { Some(((index - 1) % 8) as u8) }
}

/// Fixed-capacity implicit octree of material ids
#[derive(Debug, Clone, PartialEq)]
pub struct OctreeStore {
    /// One material id per node of a complete tree (root at index 0)
    buffer: Vec<MaterialId>,
    /// Maximum tree depth
    depth: u8,
    /// Edge length of a node at maximum depth
    unit_size: f32,
}

impl OctreeStore {
    /// Create an empty store; every node starts as `MaterialId::EMPTY`
    pub fn new(depth: u8, unit_size: f32) -> Result<Self> {
        if depth > MAX_DEPTH {
            return Err(Error::InvalidConfig(format!(
                "octree depth {} exceeds maximum {}",
                depth, MAX_DEPTH
            )));
        }
        if !unit_size.is_finite() || unit_size <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "unit size must be positive and finite, got {}",
                unit_size
            )));
        }

        let len = node_count_for_depth(depth);
        log::debug!("Allocating octree store: depth {}, {} nodes", depth, len);

        Ok(Self {
            buffer: vec![MaterialId::EMPTY; len],
            depth,
            unit_size,
        })
    }

    /// Maximum depth
    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// Edge length of a max-depth node
    pub fn unit_size(&self) -> f32 {
        self.unit_size
    }

    /// Edge length of the root node
    pub fn root_size(&self) -> f32 {
        self.unit_size * (1u32 << self.depth) as f32
    }

    /// Local-space bounds of the whole tree (centered at the origin)
    pub fn bounds(&self) -> Aabb {
        Aabb::cube(Vec3::ZERO, self.root_size())
    }

    /// Number of nodes (always a complete tree)
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// True when the whole tree is empty space
    pub fn is_empty(&self) -> bool {
        self.buffer[0].is_empty()
    }

    /// Raw material buffer
    pub fn as_slice(&self) -> &[MaterialId] {
        &self.buffer
    }

    /// Calculate memory usage in bytes
    pub fn memory_usage(&self) -> usize {
        std::mem::size_of::<MaterialId>() * self.buffer.len()
    }

    /// Get a node handle, failing past the end of the buffer
    pub fn node(&self, index: usize) -> Result<NodeHandle<'_>> {
        if index >= self.buffer.len() {
            return Err(Error::OutOfRange { index, len: self.buffer.len() });
        }
        Ok(NodeHandle::new(self, index))
    }

    /// Root node
    pub fn root(&self) -> NodeHandle<'_> {
        NodeHandle::new(self, 0)
    }

    /// Material at `index`, `None` past the end
    pub fn material(&self, index: usize) -> Option<MaterialId> {
        self.buffer.get(index).copied()
    }

    /// Child `code` of `index`, `None` when it would fall past the last level
    pub fn child(&self, index: usize, code: u8) -> Option<usize> {
        debug_assert!(code < 8);
        let child = child_index(index, code);
        (child < self.buffer.len()).then_some(child)
    }

    /// Levels between `index` and the max-depth level
    pub fn height_of(&self, index: usize) -> u8 {
        self.depth - depth_of_index(index)
    }

    /// Edge length of the node at `index`
    pub fn size_of(&self, index: usize) -> f32 {
        self.unit_size * (1u32 << self.height_of(index)) as f32
    }

    /// Node reached by following child codes from the root
    pub fn index_of_path(&self, path: &[u8]) -> Option<usize> {
        path.iter().try_fold(0usize, |index, &code| {
            if code >= 8 {
                return None;
            }
            self.child(index, code)
        })
    }

    /// Node at `depth` covering integer cell `(x, y, z)` of that level,
    /// counted from the negative corner of the root
    pub fn index_of_cell(&self, depth: u8, x: u32, y: u32, z: u32) -> Option<usize> {
        let side = 1u32 << depth;
        if depth > self.depth || x >= side || y >= side || z >= side {
            return None;
        }
        Some(level_start(depth) + encode_morton_3d(x, y, z) as usize)
    }

    /// Index of the node at `depth` whose cube contains `point`.
    /// Points exactly on a split plane go to the positive side.
    pub fn locate(&self, point: Vec3, depth: u8) -> Option<usize> {
        if depth > self.depth || !self.bounds().contains_point(point) {
            return None;
        }

        let mut index = 0usize;
        let mut center = Vec3::ZERO;
        let mut half = self.root_size() * 0.5;
        for _ in 0..depth {
            let code = octant_of(point, center);
            let quarter = half * 0.5;
            center += octant_offset(code) * quarter;
            half = quarter;
            index = child_index(index, code);
        }
        Some(index)
    }

    /// Material of the leaf covering `point`; `EMPTY` outside the tree
    pub fn sample(&self, point: Vec3) -> MaterialId {
        if !self.bounds().contains_point(point) {
            return MaterialId::EMPTY;
        }

        let mut index = 0usize;
        let mut center = Vec3::ZERO;
        let mut half = self.root_size() * 0.5;
        loop {
            let material = self.buffer[index];
            if !material.is_full() {
                return material;
            }
            let code = octant_of(point, center);
            match self.child(index, code) {
                Some(child) => {
                    let quarter = half * 0.5;
                    center += octant_offset(code) * quarter;
                    half = quarter;
                    index = child;
                }
                // A max-depth node marked Full carries no geometry
                None => return MaterialId::EMPTY,
            }
        }
    }

    /// Check that every live solid leaf uses a registered material
    pub fn validate(&self, registry: &MaterialRegistry) -> Result<()> {
        for leaf in self.leaves() {
            if !registry.contains(leaf.material) {
                return Err(Error::UnregisteredMaterial(leaf.material.0));
            }
        }
        Ok(())
    }

    /// Reset every node to empty
    pub fn clear(&mut self) {
        self.buffer.fill(MaterialId::EMPTY);
    }

    pub(crate) fn set(&mut self, index: usize, material: MaterialId) {
        self.buffer[index] = material;
    }

    /// The 8 children of `index`; the node must not be at max depth
    pub(crate) fn children_of(&self, index: usize) -> &[MaterialId] {
        let first = child_index(index, 0);
        &self.buffer[first..first + 8]
    }

    pub(crate) fn node_unchecked(&self, index: usize) -> NodeHandle<'_> {
        debug_assert!(index < self.buffer.len());
        NodeHandle::new(self, index)
    }
}

/// Child code of the octant of `point` relative to `center`
#[inline]
fn octant_of(point: Vec3, center: Vec3) -> u8 {
    (if point.x >= center.x { 1 } else { 0 })
        | (if point.y >= center.y { 2 } else { 0 })
        | (if point.z >= center.z { 4 } else { 0 })
}

/// Unit offset (each component ±1) of octant `code`
#[inline]
pub(crate) fn octant_offset(code: u8) -> Vec3 {
    let (x, y, z) = octant_bits(code);
    Vec3::new(x as f32, y as f32, z as f32) * 2.0 - Vec3::ONE
}
