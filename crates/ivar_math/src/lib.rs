// Re-export glam for convenience
pub use glam::*;

// Ivar math types
mod frame;
mod interval;
mod ray;

pub use frame::Frame;
pub use interval::Interval;
pub use ray::{Ray, RAY_EPSILON};

/// Arithmetic mean of the three components.
#[inline]
pub fn mean(v: Vec3) -> f32 {
    (v.x + v.y + v.z) / 3.0
}
