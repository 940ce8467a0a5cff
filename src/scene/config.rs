//! Object configuration: octree shape, palette and carve passes

use std::path::Path;

use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::core::error::Error;
use crate::core::types::Result;
use crate::mesh::MeshMode;
use crate::voxel::material::{MaterialId, MaterialRegistry};
use crate::voxel::sdf::Shape;
use crate::voxel::svo::MAX_DEPTH;

/// One palette entry
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaterialEntry {
    pub id: u32,
    /// Linear RGBA in [0, 1]
    pub color: [f32; 4],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// One carve pass; passes run in file order, later ones overwrite earlier
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CarvePass {
    pub material: u32,
    pub shape: Shape,
}

/// Serializable description of a voxel object
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectConfig {
    /// Octree depth (levels below the root)
    pub depth: u8,
    /// Edge length of a depth-max cell
    pub unit_size: f32,
    /// Solid materials; reserved ids 0 and 1 are implicit
    #[serde(default)]
    pub materials: Vec<MaterialEntry>,
    #[serde(default)]
    pub passes: Vec<CarvePass>,
    #[serde(default)]
    pub mesher: MeshMode,
}

impl Default for ObjectConfig {
    /// Demo scene: white sphere above, black sphere below, red sphere through the middle
    fn default() -> Self {
        let entry = |id: MaterialId, name: &str| MaterialEntry {
            id: id.0 as u32,
            color: MaterialRegistry::default()
                .color_of(id)
                .map(|c| c.to_array())
                .unwrap_or([0.0; 4]),
            name: Some(name.to_string()),
        };

        Self {
            depth: 6,
            unit_size: 1.0,
            materials: vec![
                entry(MaterialId::CLEAR, "clear"),
                entry(MaterialId::BLACK, "black"),
                entry(MaterialId::WHITE, "white"),
                entry(MaterialId::RED, "red"),
            ],
            passes: vec![
                CarvePass {
                    material: MaterialId::WHITE.0 as u32,
                    shape: Shape::Sphere { center: Vec3::new(0.0, 16.0, 0.0), radius: 16.0 },
                },
                CarvePass {
                    material: MaterialId::BLACK.0 as u32,
                    shape: Shape::Sphere { center: Vec3::new(0.0, -16.0, 0.0), radius: 16.0 },
                },
                CarvePass {
                    material: MaterialId::RED.0 as u32,
                    shape: Shape::Sphere { center: Vec3::ZERO, radius: 20.0 },
                },
            ],
            mesher: MeshMode::default(),
        }
    }
}

impl ObjectConfig {
    /// Check ranges and palette references without building anything
    pub fn validate(&self) -> Result<()> {
        if self.depth > MAX_DEPTH {
            return Err(Error::InvalidConfig(format!(
                "depth {} exceeds maximum {}",
                self.depth, MAX_DEPTH
            )));
        }
        if !self.unit_size.is_finite() || self.unit_size <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "unit_size must be positive, got {}",
                self.unit_size
            )));
        }
        if let MeshMode::Parallel { threads: Some(0) } = self.mesher {
            return Err(Error::InvalidConfig("mesher thread count must be non-zero".into()));
        }

        let registry = self.registry()?;
        for (i, pass) in self.passes.iter().enumerate() {
            let id = MaterialId::from_u32(pass.material)?;
            if !id.is_solid() {
                return Err(Error::InvalidConfig(format!(
                    "pass {} carves reserved material {}",
                    i, pass.material
                )));
            }
            if !registry.contains(id) {
                return Err(Error::UnregisteredMaterial(id.0));
            }
        }
        Ok(())
    }

    /// Palette described by `materials`
    pub fn registry(&self) -> Result<MaterialRegistry> {
        let mut registry = MaterialRegistry::new();
        for entry in &self.materials {
            let id = MaterialId::from_u32(entry.id)?;
            registry.register(id, Vec4::from_array(entry.color))?;
        }
        Ok(registry)
    }

    /// Save to file (sync)
    pub fn save_sync(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load from file (sync) and validate
    pub fn load_sync(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        log::debug!(
            "Loaded object config {:?}: depth {}, {} passes",
            path,
            config.depth,
            config.passes.len()
        );
        Ok(config)
    }
}
