//! Enumeration of the homogeneous cubes stored in an octree

use std::iter::FusedIterator;

use glam::Vec3;

use super::octree::OctreeStore;
use crate::core::types::Result;
use crate::math::Aabb;
use crate::voxel::material::MaterialId;

/// A solid, uniform cube of the tree
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LeafVoxel {
    /// Center relative to the root center
    pub position: Vec3,
    /// Edge length
    pub size: f32,
    pub material: MaterialId,
}

impl LeafVoxel {
    pub fn bounds(&self) -> Aabb {
        Aabb::cube(self.position, self.size)
    }

    pub fn volume(&self) -> f32 {
        self.size * self.size * self.size
    }
}

/// Depth-first, child-ascending iterator over the solid leaves of a store.
///
/// Full nodes are expanded into their children; Empty nodes are skipped.
#[derive(Clone, Debug)]
pub struct Leaves<'a> {
    store: &'a OctreeStore,
    stack: Vec<usize>,
}

impl<'a> Leaves<'a> {
    fn new(store: &'a OctreeStore, root: usize) -> Self {
        let mut stack = Vec::with_capacity(8 * store.depth() as usize + 1);
        stack.push(root);
        Self { store, stack }
    }
}

impl Iterator for Leaves<'_> {
    type Item = LeafVoxel;

    fn next(&mut self) -> Option<LeafVoxel> {
        while let Some(index) = self.stack.pop() {
            let node = self.store.node_unchecked(index);
            let material = node.material();

            if material.is_full() {
                // Reverse push so child 0 is visited first
                for code in (0..8u8).rev() {
                    if let Some(child) = self.store.child(index, code) {
                        self.stack.push(child);
                    }
                }
            }

            if material.is_solid() {
                return Some(LeafVoxel {
                    position: node.position(),
                    size: node.size(),
                    material,
                });
            }
        }
        None
    }
}

impl FusedIterator for Leaves<'_> {}

/// Leaves below `root`, failing if `root` is past the end of the store
pub fn leaves(store: &OctreeStore, root: usize) -> Result<Leaves<'_>> {
    store.node(root)?;
    Ok(Leaves::new(store, root))
}

impl OctreeStore {
    /// Leaves of the whole tree
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves::new(self, 0)
    }
}
