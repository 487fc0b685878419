// Transform helpers shared by the rotation wrappers
//
// Rotations about a single coordinate axis and conservative re-bounding of a
// transformed AABB.

use crate::{Aabb, Vec3};

/// One of the three coordinate axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Component index (0=X, 1=Y, 2=Z).
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Unit vector along the axis.
    pub fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }

    /// Rotate `v` about this axis, given the precomputed sine and cosine of the angle.
    ///
    /// Right-handed: a positive angle about Z turns +X towards +Y.
    #[inline]
    pub fn rotate(self, v: Vec3, sin: f64, cos: f64) -> Vec3 {
        match self {
            Axis::X => Vec3::new(v.x, cos * v.y - sin * v.z, sin * v.y + cos * v.z),
            Axis::Y => Vec3::new(cos * v.x + sin * v.z, v.y, -sin * v.x + cos * v.z),
            Axis::Z => Vec3::new(cos * v.x - sin * v.y, sin * v.x + cos * v.y, v.z),
        }
    }
}

/// Transform an axis-aligned bounding box.
///
/// Maps all 8 corners through `f` and bounds the results. The box is
/// conservative, not tight, for rotations.
pub fn transform_aabb(aabb: &Aabb, f: impl Fn(Vec3) -> Vec3) -> Aabb {
    Aabb::enclosing(aabb.corners().map(f)).unwrap_or(Aabb::EMPTY)
}
