use crate::{Interval, Vec3};

/// Offset applied to both ends of a ray's parameter range so that secondary
/// rays do not re-hit the surface they start on.
pub const RAY_EPSILON: f32 = 1e-4;

/// A ray in 3D space with an origin, a unit direction and a valid parameter
/// range.
///
/// Rays are immutable once built: the direction is normalized by every
/// constructor and all fields are private.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    origin: Vec3,
    direction: Vec3,
    range: Interval,
}

impl Ray {
    /// Create a ray valid over `[RAY_EPSILON, +inf]`.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self::with_range(origin, direction, Interval::new(RAY_EPSILON, f32::INFINITY))
    }

    /// Create a ray with an explicit parameter range.
    pub fn with_range(origin: Vec3, direction: Vec3, range: Interval) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
            range,
        }
    }

    /// Create a shadow segment from `from` towards `to`.
    ///
    /// The valid range is `[RAY_EPSILON, distance - RAY_EPSILON]` so that
    /// neither endpoint registers as an occluder.
    pub fn segment(from: Vec3, to: Vec3) -> Self {
        let distance = from.distance(to);
        Self::with_range(
            from,
            to - from,
            Interval::new(RAY_EPSILON, distance - RAY_EPSILON),
        )
    }

    /// Get the origin point of the ray.
    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Get the (unit length) direction of the ray.
    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Get the valid parameter range.
    #[inline]
    pub fn range(&self) -> Interval {
        self.range
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}
