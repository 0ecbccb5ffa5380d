// Orthonormal frames
//
// Placement for surfaces and cameras, and the local shading frame used by the
// direction sampler. Axes are assumed orthonormal, so the inverse transform is
// a projection onto the axes.

use glam::Vec3;

/// An origin plus three orthonormal axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub origin: Vec3,
    pub x: Vec3,
    pub y: Vec3,
    pub z: Vec3,
}

impl Default for Frame {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Frame {
    /// The world frame.
    pub const IDENTITY: Frame = Frame {
        origin: Vec3::ZERO,
        x: Vec3::X,
        y: Vec3::Y,
        z: Vec3::Z,
    };

    /// World-aligned frame moved to `origin`.
    pub fn from_origin(origin: Vec3) -> Self {
        Self {
            origin,
            ..Self::IDENTITY
        }
    }

    /// Build a frame whose z axis points along `z`.
    ///
    /// The x and y axes are an arbitrary orthonormal completion.
    pub fn from_z(origin: Vec3, z: Vec3) -> Self {
        let z = z.normalize();
        let (x, y) = z.any_orthonormal_pair();
        Self { origin, x, y, z }
    }

    /// Build a frame from a z axis and a hint for the x axis.
    ///
    /// `x_hint` is orthogonalized against `z`; falls back to [`Frame::from_z`]
    /// when the two are parallel.
    pub fn from_zx(origin: Vec3, z: Vec3, x_hint: Vec3) -> Self {
        let z = z.normalize();
        let x = x_hint - z * x_hint.dot(z);
        if x.length_squared() < 1e-12 {
            return Self::from_z(origin, z);
        }
        let x = x.normalize();
        let y = z.cross(x);
        Self { origin, x, y, z }
    }

    /// Camera-style frame at `eye` whose -z axis looks at `target`.
    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        let z = (eye - target).normalize();
        let x = up.cross(z).normalize();
        let y = z.cross(x);
        Self {
            origin: eye,
            x,
            y,
            z,
        }
    }

    /// Transform a local point to world space.
    #[inline]
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.origin + self.transform_direction(p)
    }

    /// Transform a local direction to world space (no translation).
    #[inline]
    pub fn transform_direction(&self, d: Vec3) -> Vec3 {
        self.x * d.x + self.y * d.y + self.z * d.z
    }

    /// Transform a world point into this frame.
    #[inline]
    pub fn inverse_transform_point(&self, p: Vec3) -> Vec3 {
        self.inverse_transform_direction(p - self.origin)
    }

    /// Transform a world direction into this frame.
    #[inline]
    pub fn inverse_transform_direction(&self, d: Vec3) -> Vec3 {
        Vec3::new(d.dot(self.x), d.dot(self.y), d.dot(self.z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_orthonormal(frame: &Frame) {
        assert!((frame.x.length() - 1.0).abs() < 1e-5);
        assert!((frame.y.length() - 1.0).abs() < 1e-5);
        assert!((frame.z.length() - 1.0).abs() < 1e-5);
        assert!(frame.x.dot(frame.y).abs() < 1e-5);
        assert!(frame.y.dot(frame.z).abs() < 1e-5);
        assert!(frame.x.dot(frame.z).abs() < 1e-5);
    }

    #[test]
    fn test_identity_transform() {
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(Frame::IDENTITY.transform_point(p), p);
        assert_eq!(Frame::IDENTITY.inverse_transform_point(p), p);
    }

    #[test]
    fn test_from_z_is_orthonormal() {
        let frame = Frame::from_z(Vec3::ONE, Vec3::new(0.3, -2.0, 0.5));
        assert_orthonormal(&frame);
        assert!((frame.z - Vec3::new(0.3, -2.0, 0.5).normalize()).length() < 1e-5);
    }

    #[test]
    fn test_from_zx_keeps_x_hint() {
        let frame = Frame::from_zx(Vec3::ZERO, Vec3::Y, Vec3::new(1.0, 1.0, 0.0));
        assert_orthonormal(&frame);
        assert!((frame.x - Vec3::X).length() < 1e-5);

        // Parallel hint falls back to an arbitrary completion
        let frame = Frame::from_zx(Vec3::ZERO, Vec3::Y, Vec3::Y);
        assert_orthonormal(&frame);
    }

    #[test]
    fn test_look_at() {
        let frame = Frame::look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        assert_orthonormal(&frame);
        assert!((frame.z - Vec3::Z).length() < 1e-6);
        assert!((frame.x - Vec3::X).length() < 1e-6);
        assert!((frame.y - Vec3::Y).length() < 1e-6);

        // Local -z points at the target
        let forward = frame.transform_direction(Vec3::NEG_Z);
        assert!((forward - Vec3::NEG_Z).length() < 1e-6);
    }

    #[test]
    fn test_point_roundtrip() {
        let frame = Frame::from_z(Vec3::new(3.0, -1.0, 2.0), Vec3::new(1.0, 1.0, 1.0));
        let p = Vec3::new(0.25, -4.0, 7.5);

        let back = frame.transform_point(frame.inverse_transform_point(p));
        assert!((back - p).length() < 1e-4);
    }
}
