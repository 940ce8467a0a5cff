//! A carvable voxel object: one octree plus the palette it is drawn with

use std::fmt;
use std::time::Instant;

use super::material::{MaterialId, MaterialRegistry};
use super::svo::{populate, LeafVoxel, Leaves, OctreeStore, PopulateStats, SdfField};
use crate::core::types::Result;
use crate::mesh::{build_mesh, MeshBuffers, MeshMode};
use crate::scene::config::ObjectConfig;

/// Callback fired after every successful carve
pub type UpdateListener = Box<dyn FnMut(&OctreeStore) + Send>;

pub struct VoxelObject {
    store: OctreeStore,
    registry: MaterialRegistry,
    /// Incremented once per successful carve
    generation: u64,
    listeners: Vec<UpdateListener>,
}

impl VoxelObject {
    /// Empty object of the given depth and unit size
    pub fn new(depth: u8, unit_size: f32, registry: MaterialRegistry) -> Result<Self> {
        Ok(Self {
            store: OctreeStore::new(depth, unit_size)?,
            registry,
            generation: 0,
            listeners: Vec::new(),
        })
    }

    /// Build an object and apply every carve pass of `config` in order
    pub fn from_config(config: &ObjectConfig) -> Result<Self> {
        let start = Instant::now();
        let mut object = Self::new(config.depth, config.unit_size, config.registry()?)?;
        for pass in &config.passes {
            let material = MaterialId::from_u32(pass.material)?;
            object.carve(material, &pass.shape)?;
        }
        log::info!(
            "Built object: depth {}, {} passes, {} leaves in {:.2}ms",
            config.depth,
            config.passes.len(),
            object.leaves().count(),
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(object)
    }

    pub fn store(&self) -> &OctreeStore {
        &self.store
    }

    pub fn registry(&self) -> &MaterialRegistry {
        &self.registry
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Carve `material` wherever `field` reaches, then notify listeners.
    ///
    /// On error the store is left untouched and no listener runs.
    pub fn carve<F: SdfField + ?Sized>(&mut self, material: MaterialId, field: &F) -> Result<PopulateStats> {
        let stats = populate(&mut self.store, 0, material, field)?;
        self.generation += 1;
        for listener in &mut self.listeners {
            listener(&self.store);
        }
        Ok(stats)
    }

    /// Register a listener for store updates
    pub fn subscribe<L>(&mut self, listener: L)
    where
        L: FnMut(&OctreeStore) + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Reset the store to empty and notify listeners
    pub fn clear(&mut self) {
        self.store.clear();
        self.generation += 1;
        for listener in &mut self.listeners {
            listener(&self.store);
        }
    }

    pub fn leaves(&self) -> Leaves<'_> {
        self.store.leaves()
    }

    /// Mesh the current leaves; fails early if a leaf uses an unknown material
    pub fn build_mesh(&self, mode: MeshMode) -> Result<MeshBuffers> {
        self.store.validate(&self.registry)?;
        build_mesh(self.leaves(), &self.registry, mode)
    }

    /// Collect the current leaves into a vector
    pub fn collect_leaves(&self) -> Vec<LeafVoxel> {
        self.leaves().collect()
    }
}

impl fmt::Debug for VoxelObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoxelObject")
            .field("depth", &self.store.depth())
            .field("unit_size", &self.store.unit_size())
            .field("generation", &self.generation)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::Error;
    use crate::voxel::sdf::Shape;
    use crate::voxel::svo::NodeHandle;
    use glam::Vec3;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_carve_notifies() {
        let mut object = VoxelObject::new(3, 1.0, MaterialRegistry::default()).unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        object.subscribe(move |store| {
            assert!(!store.is_empty());
            seen.fetch_add(1, Ordering::SeqCst);
        });

        let sphere = Shape::Sphere { center: Vec3::ZERO, radius: 2.5 };
        object.carve(MaterialId::WHITE, &sphere).unwrap();
        object.carve(MaterialId::RED, &sphere).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(object.generation(), 2);
    }

    #[test]
    fn test_failed_carve_is_silent() {
        crate::core::logging::init_for_tests();
        let mut object = VoxelObject::new(2, 1.0, MaterialRegistry::default()).unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        object.subscribe(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        let nan = |_: &NodeHandle<'_>| f32::NAN;
        let err = object.carve(MaterialId::WHITE, &nan).unwrap_err();
        assert!(matches!(err, Error::NonFiniteField { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(object.generation(), 0);
        assert!(object.store().is_empty());
    }

    #[test]
    fn test_build_mesh_validates_palette() {
        let mut object = VoxelObject::new(2, 1.0, MaterialRegistry::new()).unwrap();
        let sphere = Shape::Sphere { center: Vec3::ZERO, radius: 1.0 };
        object.carve(MaterialId::RED, &sphere).unwrap();

        let err = object.build_mesh(MeshMode::Sequential).unwrap_err();
        assert!(matches!(err, Error::UnregisteredMaterial(5)));
    }

    #[test]
    fn test_demo_scene() {
        let object = VoxelObject::from_config(&ObjectConfig::default()).unwrap();
        let leaves = object.collect_leaves();
        assert!(!leaves.is_empty());

        // Red sphere was carved last and covers the origin
        assert_eq!(object.store().sample(Vec3::splat(0.25)), MaterialId::RED);
        assert_eq!(object.store().sample(Vec3::new(0.5, 28.5, 0.5)), MaterialId::WHITE);
        assert_eq!(object.store().sample(Vec3::new(0.5, -28.5, 0.5)), MaterialId::BLACK);

        let mesh = object.build_mesh(MeshMode::default()).unwrap();
        assert_eq!(mesh.vertex_count(), 8 * leaves.len());
        assert_eq!(mesh, object.build_mesh(MeshMode::Sequential).unwrap());
    }

    #[test]
    fn test_clear() {
        let mut object = VoxelObject::from_config(&ObjectConfig::default()).unwrap();
        object.clear();
        assert!(object.store().is_empty());
        assert_eq!(object.leaves().count(), 0);
    }
}
