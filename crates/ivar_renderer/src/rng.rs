//! Per-pixel random streams.
//!
//! Each pixel owns an independent generator seeded from its coordinates, so
//! the image does not depend on how rows are split between workers.

use rand::rngs::SmallRng;
use rand::SeedableRng;

/// One random generator per pixel, stored row-major like the image.
pub struct PixelRngs {
    width: u32,
    rngs: Vec<SmallRng>,
}

impl PixelRngs {
    /// Seed a generator for every pixel of a `width` x `height` image.
    pub fn new(width: u32, height: u32, seed: u64) -> Self {
        let mut rngs = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                rngs.push(SmallRng::seed_from_u64(pixel_seed(x, y, seed)));
            }
        }
        Self { width, rngs }
    }

    /// Mutable rows of generators, top to bottom.
    pub fn rows_mut(&mut self) -> std::slice::ChunksMut<'_, SmallRng> {
        self.rngs.chunks_mut(self.width.max(1) as usize)
    }
}

/// Stream seed of pixel (x, y). `seed_from_u64` scrambles it further.
#[inline]
fn pixel_seed(x: u32, y: u32, seed: u64) -> u64 {
    let index = ((y as u64) << 32) | x as u64;
    // Spread the render seed so nearby seeds do not just swap pixel streams
    index ^ seed.wrapping_mul(0x9E37_79B9_7F4A_7C15)
}
