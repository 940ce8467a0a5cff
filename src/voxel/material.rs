//! Material ids and the fixed material palette

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::core::error::Error;
use crate::core::types::{Result, Vec4};

/// Number of addressable material ids
pub const MATERIAL_COUNT: usize = 256;

/// Material id stored per octree node - exactly 1 byte
#[repr(transparent)]
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord,
    Pod, Zeroable, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MaterialId(pub u8);

impl MaterialId {
    /// Nothing here; never meshed
    pub const EMPTY: MaterialId = MaterialId(0);
    /// Node is subdivided, children hold the data; never meshed
    pub const FULL: MaterialId = MaterialId(1);

    pub const CLEAR: MaterialId = MaterialId(2);
    pub const BLACK: MaterialId = MaterialId(3);
    pub const WHITE: MaterialId = MaterialId(4);
    pub const RED: MaterialId = MaterialId(5);

    /// Checked conversion from a wider integer
    pub fn from_u32(id: u32) -> Result<Self> {
        u8::try_from(id)
            .map(MaterialId)
            .map_err(|_| Error::MaterialOutOfRange(id))
    }

    pub fn is_empty(self) -> bool {
        self == Self::EMPTY
    }

    pub fn is_full(self) -> bool {
        self == Self::FULL
    }

    /// Ids 2..=255 produce geometry
    pub fn is_solid(self) -> bool {
        self.0 >= 2
    }
}

impl From<u8> for MaterialId {
    fn from(id: u8) -> Self {
        MaterialId(id)
    }
}

/// Build a linear RGBA color from 8-bit channels
pub fn rgba8(r: u8, g: u8, b: u8, a: u8) -> Vec4 {
    Vec4::new(r as f32, g as f32, b as f32, a as f32) / 255.0
}

/// Fixed 256-entry palette mapping material ids to vertex colors.
///
/// Ids 0 and 1 are reserved and always map to transparent black.
#[derive(Clone, Debug)]
pub struct MaterialRegistry {
    colors: [Option<Vec4>; MATERIAL_COUNT],
}

impl MaterialRegistry {
    /// Registry with only the reserved ids
    pub fn new() -> Self {
        let mut colors = [None; MATERIAL_COUNT];
        colors[MaterialId::EMPTY.0 as usize] = Some(Vec4::ZERO);
        colors[MaterialId::FULL.0 as usize] = Some(Vec4::ZERO);
        Self { colors }
    }

    /// Register (or replace) a solid material color
    pub fn register(&mut self, id: MaterialId, color: Vec4) -> Result<()> {
        if !id.is_solid() {
            return Err(Error::InvalidConfig(format!(
                "material id {} is reserved",
                id.0
            )));
        }
        self.colors[id.0 as usize] = Some(color);
        Ok(())
    }

    /// Look up a color by raw id, rejecting ids outside [0, 255]
    pub fn color(&self, id: u32) -> Result<Vec4> {
        let id = MaterialId::from_u32(id)?;
        self.color_of(id)
    }

    /// Look up a color by material id
    pub fn color_of(&self, id: MaterialId) -> Result<Vec4> {
        self.colors[id.0 as usize].ok_or(Error::UnregisteredMaterial(id.0))
    }

    pub fn contains(&self, id: MaterialId) -> bool {
        self.colors[id.0 as usize].is_some()
    }

    /// Registered solid materials in id order
    pub fn solid_materials(&self) -> impl Iterator<Item = (MaterialId, Vec4)> + '_ {
        self.colors
            .iter()
            .enumerate()
            .skip(2)
            .filter_map(|(id, color)| color.map(|c| (MaterialId(id as u8), c)))
    }
}

impl Default for MaterialRegistry {
    /// The built-in palette: clear, black, white, red
    fn default() -> Self {
        let mut registry = Self::new();
        registry.colors[MaterialId::CLEAR.0 as usize] = Some(Vec4::ZERO);
        registry.colors[MaterialId::BLACK.0 as usize] = Some(Vec4::new(0.0, 0.0, 0.0, 1.0));
        registry.colors[MaterialId::WHITE.0 as usize] = Some(Vec4::ONE);
        registry.colors[MaterialId::RED.0 as usize] = Some(Vec4::new(1.0, 0.0, 0.0, 1.0));
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size() {
        assert_eq!(std::mem::size_of::<MaterialId>(), 1);
    }

    #[test]
    fn test_reserved_ids() {
        assert!(MaterialId::EMPTY.is_empty());
        assert!(MaterialId::FULL.is_full());
        assert!(!MaterialId::FULL.is_solid());
        assert!(MaterialId::CLEAR.is_solid());
    }

    #[test]
    fn test_default_palette() {
        let registry = MaterialRegistry::default();
        assert_eq!(registry.color(4).unwrap(), Vec4::ONE);
        assert_eq!(registry.color_of(MaterialId::RED).unwrap(), Vec4::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(registry.color(0).unwrap(), Vec4::ZERO);
        assert_eq!(registry.solid_materials().count(), 4);
    }

    #[test]
    fn test_out_of_range_lookup() {
        let registry = MaterialRegistry::default();
        assert!(matches!(registry.color(256), Err(Error::MaterialOutOfRange(256))));
        assert!(matches!(registry.color(9), Err(Error::UnregisteredMaterial(9))));
    }

    #[test]
    fn test_register() {
        let mut registry = MaterialRegistry::new();
        let moss = MaterialId(42);
        assert!(!registry.contains(moss));
        registry.register(moss, rgba8(0, 128, 0, 255)).unwrap();
        assert!(registry.contains(moss));
        assert!((registry.color_of(moss).unwrap().y - 128.0 / 255.0).abs() < 1e-6);
        assert!(registry.register(MaterialId::FULL, Vec4::ONE).is_err());
    }
}
