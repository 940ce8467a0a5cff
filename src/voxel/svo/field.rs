//! Scalar fields consumed by the populator.
//!
//! A field answers one question per node: how far is this node's center
//! from the target surface? The populator recurses into a child whenever the
//! answer is smaller than the child's edge length.

use glam::Vec3;

use super::node::NodeHandle;

/// Signed-distance-like scalar evaluated per octree node.
pub trait SdfField {
    /// Distance from the node to the carved surface; negative inside.
    fn distance(&self, node: &NodeHandle<'_>) -> f32;
}

impl<F> SdfField for F
where
    F: Fn(&NodeHandle<'_>) -> f32,
{
    fn distance(&self, node: &NodeHandle<'_>) -> f32 {
        self(node)
    }
}

/// Evaluates a point-wise distance function at node centers.
#[derive(Clone, Copy, Debug)]
pub struct PointField<F>(pub F);

impl<F> SdfField for PointField<F>
where
    F: Fn(Vec3) -> f32,
{
    fn distance(&self, node: &NodeHandle<'_>) -> f32 {
        (self.0)(node.position())
    }
}

/// Turns a point-in-solid predicate into a field: -1 inside, a large
/// positive distance outside.
#[derive(Clone, Copy, Debug)]
pub struct ContainmentField<P> {
    contains: P,
    outside: f32,
}

impl<P> ContainmentField<P>
where
    P: Fn(Vec3) -> bool,
{
    /// Distance reported for nodes whose center is outside
    pub const DEFAULT_OUTSIDE: f32 = 1.0e6;

    pub fn new(contains: P) -> Self {
        Self { contains, outside: Self::DEFAULT_OUTSIDE }
    }

    pub fn with_outside_distance(mut self, outside: f32) -> Self {
        self.outside = outside;
        self
    }
}

impl<P> SdfField for ContainmentField<P>
where
    P: Fn(Vec3) -> bool,
{
    fn distance(&self, node: &NodeHandle<'_>) -> f32 {
        if (self.contains)(node.position()) { -1.0 } else { self.outside }
    }
}

/// A field that never selects anything
#[derive(Clone, Copy, Debug, Default)]
pub struct NoField;

impl SdfField for NoField {
    fn distance(&self, _node: &NodeHandle<'_>) -> f32 {
        f32::MAX
    }
}
