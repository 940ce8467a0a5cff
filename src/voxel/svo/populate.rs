//! SDF-driven carving of an implicit octree.
//!
//! A pass walks down from a node, pushing uniform materials into children
//! before it looks at them, recursing wherever the field says a child may
//! touch the surface, and finally either folding eight identical leaf
//! children back into the parent or marking the parent Full.

use super::field::SdfField;
use super::octree::{child_index, OctreeStore};
use crate::core::error::Error;
use crate::core::types::Result;
use crate::voxel::material::MaterialId;

/// Counters collected during one populate pass
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PopulateStats {
    /// Nodes the recursion entered
    pub visited: usize,
    /// Field evaluations
    pub field_samples: usize,
    /// Parents that absorbed eight uniform children
    pub reductions: usize,
    /// Parents left (or marked) Full
    pub subdivided: usize,
}

/// Carves one material into a store wherever a field selects it.
pub struct SdfPopulator<'f, F: SdfField + ?Sized> {
    target: MaterialId,
    field: &'f F,
    stats: PopulateStats,
    /// Previous value of every slot written during the pass, oldest first
    undo: Vec<(usize, MaterialId)>,
}

impl<'f, F: SdfField + ?Sized> SdfPopulator<'f, F> {
    /// `target` must be a solid material (id >= 2)
    pub fn new(target: MaterialId, field: &'f F) -> Self {
        debug_assert!(target.is_solid(), "carve target {:?} is reserved", target);
        Self {
            target,
            field,
            stats: PopulateStats::default(),
            undo: Vec::new(),
        }
    }

    /// Run the pass from `root`. The node itself is always entered; the
    /// field is only consulted for its descendants.
    ///
    /// A `root` at max depth (the only node of a depth-0 store) is set to the
    /// target unconditionally, so even a field that selects nothing changes it.
    ///
    /// If the field yields a non-finite value every slot written so far is
    /// restored and the error is returned. Rollback memory grows with the
    /// number of writes, not with the store.
    pub fn populate(mut self, store: &mut OctreeStore, root: usize) -> Result<PopulateStats> {
        store.node(root)?;

        match self.carve(store, root) {
            Ok(()) => {
                log::debug!(
                    "Carved material {} from node {}: {} visited, {} samples, {} reduced, {} subdivided",
                    self.target.0,
                    root,
                    self.stats.visited,
                    self.stats.field_samples,
                    self.stats.reductions,
                    self.stats.subdivided,
                );
                Ok(self.stats)
            }
            Err(err) => {
                log::warn!(
                    "Rolling back carve of material {} ({} writes): {}",
                    self.target.0,
                    self.undo.len(),
                    err
                );
                for (index, previous) in self.undo.drain(..).rev() {
                    store.set(index, previous);
                }
                Err(err)
            }
        }
    }

    fn carve(&mut self, store: &mut OctreeStore, index: usize) -> Result<()> {
        self.stats.visited += 1;

        // Max depth: the parent already qualified this node
        if store.height_of(index) == 0 {
            self.write(store, index, self.target);
            return Ok(());
        }

        // Make the implicit "children equal a uniform parent" explicit
        let current = store.as_slice()[index];
        if !current.is_full() {
            self.write_children(store, index, current);
        }

        for code in 0..8u8 {
            let child = child_index(index, code);
            let distance = self.field.distance(&store.node_unchecked(child));
            self.stats.field_samples += 1;
            if !distance.is_finite() {
                return Err(Error::NonFiniteField { index: child, value: distance });
            }
            if distance < store.size_of(child) {
                self.carve(store, child)?;
            }
        }

        self.reduce(store, index);
        Ok(())
    }

    /// Fold uniform leaf children into `index`, or mark it Full.
    fn reduce(&mut self, store: &mut OctreeStore, index: usize) {
        let children = store.children_of(index);
        let common = children[0];
        let uniform = children.iter().all(|&m| m == common);
        let all_leaves = (0..8u8)
            .all(|code| store.node_unchecked(child_index(index, code)).is_leaf());

        if uniform && all_leaves && !common.is_full() {
            self.write(store, index, common);
            self.write_children(store, index, MaterialId::EMPTY);
            self.stats.reductions += 1;
        } else {
            self.write(store, index, MaterialId::FULL);
            self.stats.subdivided += 1;
        }
    }

    /// Set one slot, remembering its old value if it changes
    fn write(&mut self, store: &mut OctreeStore, index: usize, material: MaterialId) {
        let previous = store.as_slice()[index];
        if previous != material {
            self.undo.push((index, previous));
            store.set(index, material);
        }
    }

    fn write_children(&mut self, store: &mut OctreeStore, index: usize, material: MaterialId) {
        for code in 0..8u8 {
            self.write(store, child_index(index, code), material);
        }
    }
}

/// Carve `target` into `store` below `root` wherever `field` selects it.
pub fn populate<F: SdfField + ?Sized>(
    store: &mut OctreeStore,
    root: usize,
    target: MaterialId,
    field: &F,
) -> Result<PopulateStats> {
    SdfPopulator::new(target, field).populate(store, root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::svo::field::{NoField, PointField};
    use crate::voxel::svo::node::NodeHandle;
    use glam::Vec3;

    const STONE: MaterialId = MaterialId(7);

    fn sphere(center: Vec3, radius: f32) -> PointField<impl Fn(Vec3) -> f32> {
        PointField(move |p: Vec3| (p - center).length() - radius)
    }

    #[test]
    fn test_full_collapse() {
        let mut store = OctreeStore::new(1, 1.0).unwrap();
        let everything = |_: &NodeHandle<'_>| -1.0;
        let stats = populate(&mut store, 0, STONE, &everything).unwrap();

        assert_eq!(store.as_slice()[0], STONE);
        assert!(store.as_slice()[1..].iter().all(|m| m.is_empty()));
        assert_eq!(stats.reductions, 1);
        assert_eq!(stats.field_samples, 8);

        let leaves: Vec<_> = store.leaves().collect();
        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0].position, Vec3::ZERO);
        assert_eq!(leaves[0].size, 2.0);
        assert_eq!(leaves[0].material, STONE);
    }

    #[test]
    fn test_non_uniform_retains_structure() {
        let mut store = OctreeStore::new(1, 1.0).unwrap();
        // Carve the four +x children only
        let positive_x = |node: &NodeHandle<'_>| if node.position().x > 0.0 { -1.0 } else { 10.0 };
        populate(&mut store, 0, MaterialId::RED, &positive_x).unwrap();

        assert_eq!(store.as_slice()[0], MaterialId::FULL);
        let leaves: Vec<_> = store.leaves().collect();
        assert_eq!(leaves.len(), 4);
        for leaf in &leaves {
            assert_eq!(leaf.material, MaterialId::RED);
            assert_eq!(leaf.size, 1.0);
            assert_eq!(leaf.position.x, 0.5);
            assert_eq!(leaf.position.y.abs(), 0.5);
            assert_eq!(leaf.position.z.abs(), 0.5);
        }
        // Child order 1, 3, 5, 7
        assert_eq!(leaves[0].position, Vec3::new(0.5, -0.5, -0.5));
        assert_eq!(leaves[3].position, Vec3::new(0.5, 0.5, 0.5));
    }

    #[test]
    fn test_idempotent_merge() {
        let mut store = OctreeStore::new(4, 1.0).unwrap();
        populate(&mut store, 0, STONE, &sphere(Vec3::new(2.0, 0.0, -1.0), 5.0)).unwrap();
        let before = store.clone();

        let stats = populate(&mut store, 0, MaterialId::WHITE, &NoField).unwrap();
        assert_eq!(store, before);
        assert_eq!(stats.visited, 1);

        // Also on a fresh store
        let mut empty = OctreeStore::new(3, 1.0).unwrap();
        populate(&mut empty, 0, STONE, &NoField).unwrap();
        assert_eq!(empty, OctreeStore::new(3, 1.0).unwrap());
    }

    #[test]
    fn test_passes_compose() {
        let mut store = OctreeStore::new(4, 1.0).unwrap();
        populate(&mut store, 0, MaterialId::WHITE, &sphere(Vec3::new(0.0, 4.0, 0.0), 3.0)).unwrap();
        let white_only: Vec<_> = store.leaves().collect();

        // A disjoint region below leaves the white leaves untouched
        populate(&mut store, 0, MaterialId::BLACK, &sphere(Vec3::new(0.0, -4.0, 0.0), 3.0)).unwrap();
        let combined: Vec<_> = store.leaves().collect();
        let whites: Vec<_> = combined
            .iter()
            .filter(|l| l.material == MaterialId::WHITE)
            .copied()
            .collect();
        assert_eq!(whites, white_only);
        assert!(combined.iter().any(|l| l.material == MaterialId::BLACK));
        assert_eq!(store.sample(Vec3::new(0.0, 4.0, 0.0)), MaterialId::WHITE);
        assert_eq!(store.sample(Vec3::new(0.0, -4.0, 0.0)), MaterialId::BLACK);
    }

    #[test]
    fn test_later_pass_overwrites() {
        let mut store = OctreeStore::new(3, 1.0).unwrap();
        let everything = |_: &NodeHandle<'_>| -1.0;
        populate(&mut store, 0, MaterialId::WHITE, &everything).unwrap();
        populate(&mut store, 0, MaterialId::RED, &everything).unwrap();
        assert_eq!(store.as_slice()[0], MaterialId::RED);
        assert_eq!(store.leaves().count(), 1);
    }

    #[test]
    fn test_no_full_leaves_after_pass() {
        let mut store = OctreeStore::new(4, 0.5).unwrap();
        populate(&mut store, 0, STONE, &sphere(Vec3::ZERO, 2.3)).unwrap();
        populate(&mut store, 0, MaterialId::RED, &sphere(Vec3::splat(1.0), 1.1)).unwrap();

        // Every Full node has live children and no Full node has 8 equal leaves
        for index in 0..store.len() {
            let node = store.node(index).unwrap();
            if !node.material().is_full() {
                continue;
            }
            assert!(node.height() > 0);
            let children = store.children_of(index);
            let uniform = children.iter().all(|&m| m == children[0]);
            assert!(!uniform || children[0].is_full());
        }
    }

    #[test]
    fn test_non_finite_field_rolls_back() {
        crate::core::logging::init_for_tests();
        let mut store = OctreeStore::new(3, 1.0).unwrap();
        populate(&mut store, 0, STONE, &sphere(Vec3::ZERO, 2.0)).unwrap();
        let before = store.clone();

        let poisoned = |node: &NodeHandle<'_>| if node.depth() == 3 { f32::NAN } else { -1.0 };
        let err = populate(&mut store, 0, MaterialId::RED, &poisoned).unwrap_err();
        assert!(matches!(err, Error::NonFiniteField { .. }));
        assert_eq!(store, before);
    }

    #[test]
    fn test_subtree_root() {
        let mut store = OctreeStore::new(2, 1.0).unwrap();
        let everything = |_: &NodeHandle<'_>| -1.0;
        // Carve only inside child 3
        populate(&mut store, child_index(0, 3), STONE, &everything).unwrap();
        assert_eq!(store.as_slice()[child_index(0, 3)], STONE);
        let len = store.len();
        assert!(populate(&mut store, len, STONE, &everything).is_err());
    }

    #[test]
    fn test_depth_zero_root_always_set() {
        // The root of a depth-0 store is at max depth, so the field is never asked
        let mut store = OctreeStore::new(0, 1.0).unwrap();
        populate(&mut store, 0, MaterialId::RED, &NoField).unwrap();
        assert_eq!(store.as_slice(), &[MaterialId::RED]);
        populate(&mut store, 0, MaterialId::WHITE, &NoField).unwrap();
        assert_eq!(store.as_slice(), &[MaterialId::WHITE]);
    }

    #[test]
    fn test_rollback_after_overlapping_passes() {
        crate::core::logging::init_for_tests();
        let mut store = OctreeStore::new(4, 1.0).unwrap();
        populate(&mut store, 0, MaterialId::WHITE, &sphere(Vec3::new(2.0, 2.0, 0.0), 4.0)).unwrap();
        populate(&mut store, 0, MaterialId::RED, &sphere(Vec3::new(-1.0, 0.0, 1.0), 3.5)).unwrap();
        let before = store.clone();

        // The last node visited fails, after every other slot was written
        let last = store.len() - 1;
        let late_nan = move |node: &NodeHandle<'_>| if node.index() == last { f32::NAN } else { -1.0 };
        let err = populate(&mut store, 0, STONE, &late_nan).unwrap_err();
        assert!(matches!(err, Error::NonFiniteField { .. }));
        assert_eq!(store, before);
    }
}
