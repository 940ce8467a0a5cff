//! Borrowed view of a single octree node

use glam::Vec3;

use super::octree::{child_code, depth_of_index, level_start, octant_offset, parent_index, OctreeStore};
use crate::math::Aabb;
use crate::math::morton::decode_morton_3d;
use crate::voxel::material::MaterialId;

/// A (store, index) pair exposing derived node geometry.
///
/// Handles are cheap `Copy` views; they own nothing and are only valid
/// while the store is borrowed.
#[derive(Clone, Copy, Debug)]
pub struct NodeHandle<'a> {
    store: &'a OctreeStore,
    index: usize,
}

impl<'a> NodeHandle<'a> {
    pub(crate) fn new(store: &'a OctreeStore, index: usize) -> Self {
        Self { store, index }
    }

    pub fn store(&self) -> &'a OctreeStore {
        self.store
    }

    /// Position of this node in the flat buffer
    pub fn index(&self) -> usize {
        self.index
    }

    /// Stored material id
    pub fn material(&self) -> MaterialId {
        self.store.as_slice()[self.index]
    }

    /// Level of this node (root = 0)
    pub fn depth(&self) -> u8 {
        depth_of_index(self.index)
    }

    /// Levels below this node down to max depth
    pub fn height(&self) -> u8 {
        self.store.depth() - self.depth()
    }

    /// Edge length: `unit_size * 2^height`
    pub fn size(&self) -> f32 {
        self.store.unit_size() * (1u32 << self.height()) as f32
    }

    /// Morton code of this node among the nodes of its level
    pub fn level_index(&self) -> u64 {
        (self.index - level_start(self.depth())) as u64
    }

    /// Center of this node relative to the root center.
    ///
    /// Consumes the level index three bits at a time, starting with the
    /// node's own child selector, and steps half an edge per axis toward
    /// the selected side; the step doubles on every level toward the root.
    pub fn position(&self) -> Vec3 {
        let mut code = self.level_index();
        let mut half = self.size() * 0.5;
        let mut position = Vec3::ZERO;
        for _ in 0..self.depth() {
            position += octant_offset((code & 0b111) as u8) * half;
            code >>= 3;
            half *= 2.0;
        }
        position
    }

    /// Integer cell coordinates of this node on its own level
    pub fn cell(&self) -> (u32, u32, u32) {
        decode_morton_3d(self.level_index())
    }

    /// Local-space cube covered by this node
    pub fn bounds(&self) -> Aabb {
        Aabb::cube(self.position(), self.size())
    }

    /// Child `code`, `None` below max depth
    pub fn child(&self, code: u8) -> Option<NodeHandle<'a>> {
        self.store
            .child(self.index, code)
            .map(|index| NodeHandle::new(self.store, index))
    }

    /// All existing children in child-code order (none at max depth)
    pub fn children(&self) -> impl Iterator<Item = NodeHandle<'a>> + 'a {
        let node = *self;
        (0..8u8).filter_map(move |code| node.child(code))
    }

    pub fn parent(&self) -> Option<NodeHandle<'a>> {
        parent_index(self.index).map(|index| NodeHandle::new(self.store, index))
    }

    /// Child codes from the root down to this node
    pub fn path(&self) -> Vec<u8> {
        let mut path = Vec::with_capacity(self.depth() as usize);
        let mut index = self.index;
        while let Some(code) = child_code(index) {
            path.push(code);
            index = (index - 1) / 8;
        }
        path.reverse();
        path
    }

    /// True when nothing below this node is live data: either it sits at
    /// max depth or it stores a non-Full material.
    pub fn is_leaf(&self) -> bool {
        self.height() == 0 || !self.material().is_full()
    }
}
