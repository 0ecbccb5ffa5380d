//! Ivar Renderer - CPU Path Tracing
//!
//! A Monte Carlo path tracer for `ivar_core` scenes: ray/primitive
//! intersection, Blinn-Phong and microfacet shading, importance-sampled
//! directions, recursive light transport and a multithreaded scheduler with
//! one random stream per pixel.

mod brdf;
mod integrator;
mod intersect;
mod renderer;
mod rng;
mod sampling;

pub use brdf::eval_brdf;
pub use integrator::{eval_environment, radiance, trace, TraceStats};
pub use intersect::{any_hit, closest_hit, intersect_surface, Intersection};
pub use renderer::{
    color_to_rgba, linear_to_gamma, render, render_pixel, render_with_stats, ImageBuffer,
};
pub use rng::PixelRngs;
pub use sampling::{brdf_pdf, cosine_pdf, sample_brdf, sample_cosine, DirectionSample};

/// Re-export common math and scene types
pub use ivar_core::{Color, Scene};
pub use ivar_math::{Ray, Vec2, Vec3};

use rand::{Rng, RngCore};

/// Uniform float in `[0, 1)`.
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen()
}

/// Pair of uniform floats in `[0, 1)`.
#[inline]
pub fn gen_vec2(rng: &mut dyn RngCore) -> Vec2 {
    let x = gen_f32(rng);
    let y = gen_f32(rng);
    Vec2::new(x, y)
}
