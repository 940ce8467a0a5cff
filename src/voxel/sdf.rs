//! SDF (Signed Distance Field) primitives for carving voxel objects.
//!
//! This module provides:
//! - Point-wise distance functions (sphere, box, capsule, plane)
//! - Combinators (union, subtraction, intersection, smooth minimum)
//! - `Shape`, a serializable primitive usable directly as a carve field

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::voxel::svo::field::SdfField;
use crate::voxel::svo::node::NodeHandle;

// =============================================================================
// SDF Primitives
// =============================================================================

/// Distance to a sphere center
#[inline]
pub fn sdf_sphere(p: Vec3, center: Vec3, radius: f32) -> f32 {
    (p - center).length() - radius
}

/// Distance to an axis-aligned box given its center and half-extents
#[inline]
pub fn sdf_box(p: Vec3, center: Vec3, half_extents: Vec3) -> f32 {
    let q = (p - center).abs() - half_extents;
    q.max(Vec3::ZERO).length() + q.max_element().min(0.0)
}

/// Distance to a capsule (line segment with radius)
/// Capsule from point `a` to `b` with radius `r`
#[inline]
pub fn sdf_capsule(p: Vec3, a: Vec3, b: Vec3, radius: f32) -> f32 {
    let ab = b - a;
    let ap = p - a;
    let t = (ap.dot(ab) / ab.length_squared()).clamp(0.0, 1.0);
    let closest = a + ab * t;
    (p - closest).length() - radius
}

/// Distance to a plane at arbitrary position and orientation
/// Normal should be normalized
#[inline]
pub fn sdf_plane_point_normal(p: Vec3, plane_point: Vec3, normal: Vec3) -> f32 {
    (p - plane_point).dot(normal)
}

// =============================================================================
// SDF Combinations
// =============================================================================

/// Smooth minimum (polynomial smooth blend)
#[inline]
pub fn smin(a: f32, b: f32, k: f32) -> f32 {
    let h = (k - (b - a).abs()).max(0.0) / k;
    b.min(a) - h * h * k * 0.25
}

/// Union (min of two distances)
#[inline]
pub fn sdf_union(a: f32, b: f32) -> f32 {
    a.min(b)
}

/// Subtraction: a - b (inside a, outside b)
#[inline]
pub fn sdf_subtraction(a: f32, b: f32) -> f32 {
    (-b).max(a)
}

/// Intersection (max of two distances)
#[inline]
pub fn sdf_intersection(a: f32, b: f32) -> f32 {
    a.max(b)
}

// =============================================================================
// Serializable shapes
// =============================================================================

/// A primitive that can be carved into an octree
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    Sphere { center: Vec3, radius: f32 },
    Box { center: Vec3, half_extents: Vec3 },
    Capsule { a: Vec3, b: Vec3, radius: f32 },
    /// Half-space below the plane (opposite the normal)
    HalfSpace { point: Vec3, normal: Vec3 },
    Union { shapes: Vec<Shape> },
    /// Inside `base`, outside `cut`
    Subtract { base: Box<Shape>, cut: Box<Shape> },
    /// Inside both `a` and `b`
    Intersect { a: Box<Shape>, b: Box<Shape> },
    SmoothUnion { a: Box<Shape>, b: Box<Shape>, k: f32 },
}

impl Shape {
    /// Signed distance from `p` to the shape surface
    pub fn distance_at(&self, p: Vec3) -> f32 {
        match self {
            Shape::Sphere { center, radius } => sdf_sphere(p, *center, *radius),
            Shape::Box { center, half_extents } => sdf_box(p, *center, *half_extents),
            Shape::Capsule { a, b, radius } => sdf_capsule(p, *a, *b, *radius),
            Shape::HalfSpace { point, normal } => {
                sdf_plane_point_normal(p, *point, normal.normalize_or_zero())
            }
            Shape::Union { shapes } => shapes
                .iter()
                .map(|s| s.distance_at(p))
                .fold(f32::MAX, sdf_union),
            Shape::Subtract { base, cut } => {
                sdf_subtraction(base.distance_at(p), cut.distance_at(p))
            }
            Shape::Intersect { a, b } => {
                sdf_intersection(a.distance_at(p), b.distance_at(p))
            }
            Shape::SmoothUnion { a, b, k } => smin(a.distance_at(p), b.distance_at(p), *k),
        }
    }
}

impl SdfField for Shape {
    fn distance(&self, node: &NodeHandle<'_>) -> f32 {
        self.distance_at(node.position())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sdf_sphere() {
        let d = sdf_sphere(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0), 1.0);
        assert!((d - 1.0).abs() < 0.001); // |(0,0,0) - (2,0,0)| - 1 = 2 - 1 = 1
    }

    #[test]
    fn test_sdf_box() {
        let half = Vec3::splat(1.0);
        assert!((sdf_box(Vec3::new(3.0, 0.0, 0.0), Vec3::ZERO, half) - 2.0).abs() < 1e-6);
        assert!((sdf_box(Vec3::ZERO, Vec3::ZERO, half) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_sdf_capsule() {
        let (a, b) = (Vec3::new(-1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        // On the segment: one radius inside
        assert!((sdf_capsule(Vec3::ZERO, a, b, 0.5) + 0.5).abs() < 1e-6);
        // One unit off the segment: half a unit outside
        assert!((sdf_capsule(Vec3::Y, a, b, 0.5) - 0.5).abs() < 1e-6);
        // Past the end cap
        assert!((sdf_capsule(Vec3::new(3.0, 0.0, 0.0), a, b, 0.5) - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_smin() {
        let result = smin(0.5, 0.3, 0.5);
        assert!(result < 0.3); // Smooth min should be less than or equal to min
    }

    #[test]
    fn test_shape_combinators() {
        let a = Shape::Sphere { center: Vec3::ZERO, radius: 2.0 };
        let b = Shape::Sphere { center: Vec3::new(3.0, 0.0, 0.0), radius: 2.0 };
        let union = Shape::Union { shapes: vec![a.clone(), b.clone()] };
        assert!(union.distance_at(Vec3::new(3.0, 0.0, 0.0)) < 0.0);

        let bitten = Shape::Subtract { base: Box::new(a), cut: Box::new(b) };
        assert!(bitten.distance_at(Vec3::new(1.8, 0.0, 0.0)) > 0.0);
        assert!(bitten.distance_at(Vec3::new(-1.0, 0.0, 0.0)) < 0.0);

        let lens = Shape::Intersect {
            a: Box::new(Shape::Sphere { center: Vec3::ZERO, radius: 2.0 }),
            b: Box::new(Shape::Sphere { center: Vec3::new(3.0, 0.0, 0.0), radius: 2.0 }),
        };
        assert!(lens.distance_at(Vec3::new(1.5, 0.0, 0.0)) < 0.0);
        assert!(lens.distance_at(Vec3::new(-1.0, 0.0, 0.0)) > 0.0);
        assert!(lens.distance_at(Vec3::new(4.0, 0.0, 0.0)) > 0.0);

        let below = Shape::HalfSpace { point: Vec3::ZERO, normal: Vec3::Y };
        assert!(below.distance_at(Vec3::new(0.0, -1.0, 0.0)) < 0.0);
    }

    #[test]
    fn test_shape_serde() {
        let shape = Shape::Box { center: Vec3::new(1.0, 2.0, 3.0), half_extents: Vec3::ONE };
        let json = serde_json::to_string(&shape).unwrap();
        assert!(json.contains("\"type\":\"box\""));
        let back: Shape = serde_json::from_str(&json).unwrap();
        assert_eq!(back, shape);
    }
}
