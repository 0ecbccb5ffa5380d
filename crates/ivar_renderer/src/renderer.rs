//! Image rendering and work scheduling.
//!
//! Rows are dealt out round-robin: with N workers, worker `tid` renders rows
//! `tid, tid + N, tid + 2N, ...`. Each worker receives its rows (and the
//! matching rows of per-pixel generators) as disjoint mutable slices, so no
//! locking is needed and the result is independent of the worker count.

use std::time::Instant;

use ivar_core::{Color, Scene};
use rand::rngs::SmallRng;
use rand::RngCore;
use rayon::prelude::*;

use crate::gen_f32;
use crate::integrator::{trace, TraceStats};
use crate::rng::PixelRngs;

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert a color to 8-bit RGBA.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    // Apply gamma correction and convert to 0-255
    let r = (255.0 * linear_to_gamma(color.x).clamp(0.0, 1.0)) as u8;
    let g = (255.0 * linear_to_gamma(color.y).clamp(0.0, 1.0)) as u8;
    let b = (255.0 * linear_to_gamma(color.z).clamp(0.0, 1.0)) as u8;
    [r, g, b, 255]
}

/// Linear float image, row 0 at the top.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; (width * height) as usize],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.pixels[(y * self.width + x) as usize] = color;
    }

    /// Convert to RGBA bytes (for display or saving).
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity((self.width * self.height * 4) as usize);
        for color in &self.pixels {
            bytes.extend_from_slice(&color_to_rgba(*color));
        }
        bytes
    }
}

/// Render a single pixel.
///
/// Averages `samples²` jittered camera rays, one per cell of a
/// `samples` x `samples` grid over the pixel. All randomness comes from
/// `rng`.
pub fn render_pixel(
    scene: &Scene,
    x: u32,
    y: u32,
    rng: &mut dyn RngCore,
    stats: &mut TraceStats,
) -> Color {
    let settings = &scene.settings;
    let samples = settings.samples.max(1);
    let (width, height) = (settings.width as f32, settings.height as f32);
    let row = (settings.height - 1 - y) as f32;

    let mut color = Color::ZERO;
    for jj in 0..samples {
        for ii in 0..samples {
            let u = (x as f32 + (ii as f32 + gen_f32(rng)) / samples as f32) / width;
            let v = (row + (jj as f32 + gen_f32(rng)) / samples as f32) / height;

            let ray = scene.camera.ray(u, v);
            stats.camera_rays += 1;
            color += trace(scene, &ray, rng, 0, stats);
        }
    }

    color / (samples * samples) as f32
}

/// Render the scene at `scene.settings` resolution.
///
/// With `parallel` the rows are spread over the rayon thread pool, otherwise
/// everything runs on the calling thread. Both produce identical images.
pub fn render(scene: &Scene, parallel: bool) -> ImageBuffer {
    render_with_stats(scene, parallel).0
}

type RowJob<'a> = (u32, &'a mut [Color], &'a mut [SmallRng]);

/// Render the scene and report ray statistics.
pub fn render_with_stats(scene: &Scene, parallel: bool) -> (ImageBuffer, TraceStats) {
    let settings = &scene.settings;
    let (width, height) = (settings.width, settings.height);
    let mut image = ImageBuffer::new(width, height);

    if width == 0 || height == 0 {
        return (image, TraceStats::default());
    }

    let start = Instant::now();
    let mut rngs = PixelRngs::new(width, height, settings.seed);
    let workers = if parallel {
        rayon::current_num_threads().max(1)
    } else {
        1
    };

    let mut jobs: Vec<Vec<RowJob>> = (0..workers).map(|_| Vec::new()).collect();
    let rows = image.pixels.chunks_mut(width as usize).zip(rngs.rows_mut());
    for (y, (pixels, row_rngs)) in rows.enumerate() {
        jobs[y % workers].push((y as u32, pixels, row_rngs));
    }

    let stats = if parallel {
        jobs.into_par_iter()
            .enumerate()
            .map(|(tid, rows)| render_rows(scene, tid, rows))
            .reduce(TraceStats::default, TraceStats::merge)
    } else {
        jobs.into_iter()
            .enumerate()
            .map(|(tid, rows)| render_rows(scene, tid, rows))
            .fold(TraceStats::default(), TraceStats::merge)
    };

    log::info!(
        "Rendered '{}' {}x{} ({} spp, {} workers) in {:.2?}: {} rays",
        scene.name,
        width,
        height,
        settings.samples_per_pixel(),
        workers,
        start.elapsed(),
        stats.total_rays()
    );

    (image, stats)
}

fn render_rows(scene: &Scene, tid: usize, rows: Vec<RowJob>) -> TraceStats {
    let mut stats = TraceStats::default();
    let height = scene.settings.height;

    for (y, pixels, rngs) in rows {
        for (x, (pixel, rng)) in pixels.iter_mut().zip(rngs.iter_mut()).enumerate() {
            *pixel = render_pixel(scene, x as u32, y, rng, &mut stats);
        }

        if tid == 0 {
            log::debug!("Row {}/{}", y + 1, height);
        }
    }

    stats
}
