//! Light transport.
//!
//! Estimates the radiance arriving along a ray by combining, at the first
//! hit:
//! - ambient and (for camera rays) emitted light
//! - direct light from point lights and emissive quads
//! - one BRDF-sampled environment lookup
//! - one BRDF-sampled indirect bounce, recursively, up to `max_depth`

use std::f32::consts::PI;

use ivar_core::{lookup_texture, Color, Scene, Shape, ShadingParams, Surface, TextureWrap};
use ivar_math::{Ray, Vec2, Vec3};
use rand::RngCore;

use crate::brdf::eval_brdf;
use crate::intersect::{any_hit, closest_hit};
use crate::sampling::sample_brdf;
use crate::{gen_f32, gen_vec2};

/// Counters collected while tracing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraceStats {
    /// Primary rays generated by the camera
    pub camera_rays: u64,
    /// Secondary rays traced for indirect light
    pub bounce_rays: u64,
    /// Visibility queries towards lights and the environment
    pub shadow_rays: u64,
    /// Deepest recursion level reached
    pub deepest: u32,
}

impl TraceStats {
    /// Combine counters from two workers.
    pub fn merge(self, other: TraceStats) -> TraceStats {
        TraceStats {
            camera_rays: self.camera_rays + other.camera_rays,
            bounce_rays: self.bounce_rays + other.bounce_rays,
            shadow_rays: self.shadow_rays + other.shadow_rays,
            deepest: self.deepest.max(other.deepest),
        }
    }

    pub fn total_rays(&self) -> u64 {
        self.camera_rays + self.bounce_rays + self.shadow_rays
    }
}

/// Estimate the radiance arriving along `ray`.
///
/// `depth` is 0 for camera rays.
pub fn radiance(scene: &Scene, ray: &Ray, rng: &mut dyn RngCore, depth: u32) -> Color {
    trace(scene, ray, rng, depth, &mut TraceStats::default())
}

/// Same estimator as [`radiance`], recording ray counts in `stats`.
pub fn trace(
    scene: &Scene,
    ray: &Ray,
    rng: &mut dyn RngCore,
    depth: u32,
    stats: &mut TraceStats,
) -> Color {
    stats.deepest = stats.deepest.max(depth);

    let Some(hit) = closest_hit(scene, ray) else {
        return eval_environment(scene, ray.direction());
    };

    let params = hit.material.shading_at(hit.texcoord, hit.normal);
    let p = hit.position;
    let n = params.normal;
    let v = -ray.direction();
    let shadows = scene.settings.shadows;

    let mut c = scene.ambient * params.diffuse;

    // Emission is only counted where the path starts
    if depth == 0 {
        c += params.emission;
    }

    for light in &scene.lights {
        let cl = light.intensity / p.distance_squared(light.position);
        let l = (light.position - p).normalize();
        let shade = cl * brdf_cos(&params, v, l);

        if shade == Color::ZERO {
            continue;
        }
        if shadows {
            stats.shadow_rays += 1;
            if any_hit(scene, &Ray::segment(p, light.position)) {
                continue;
            }
        }
        c += shade;
    }

    for surface in scene.area_lights() {
        c += sample_area_light(scene, surface, &params, p, v, rng, stats);
    }

    if scene.environment.is_some() {
        let s = sample_brdf(
            params.diffuse,
            params.specular,
            params.exponent,
            v,
            n,
            gen_vec2(rng),
            gen_f32(rng),
        );
        let cos = n.dot(s.direction);

        if s.pdf > 0.0 && cos > 0.0 {
            let env = eval_environment(scene, s.direction);
            let shade = brdf_cos(&params, v, s.direction) * env / s.pdf;
            let visible = !shadows || {
                stats.shadow_rays += 1;
                !any_hit(scene, &Ray::new(p, s.direction))
            };
            if visible {
                c += shade;
            }
        }
    }

    if depth < scene.settings.max_depth {
        let s = sample_brdf(
            params.diffuse,
            params.specular,
            params.exponent,
            v,
            n,
            gen_vec2(rng),
            gen_f32(rng),
        );
        let cos = n.dot(s.direction);

        if s.pdf > 0.0 && cos > 0.0 {
            stats.bounce_rays += 1;
            let weight = brdf_cos(&params, v, s.direction) / s.pdf;
            let incoming = trace(scene, &Ray::new(p, s.direction), rng, depth + 1, stats);
            c += incoming * weight;
        }
    }

    c
}

/// Radiance arriving from the environment in direction `d`.
///
/// Uses a lat-long lookup into the environment texture when present,
/// otherwise the constant background. The map wraps around in longitude
/// only, so the poles never blend with the opposite edge.
pub fn eval_environment(scene: &Scene, d: Vec3) -> Color {
    match scene.environment.as_deref() {
        Some(env) => {
            let u = d.x.atan2(d.z) / (2.0 * PI);
            let v = 1.0 - d.y.clamp(-1.0, 1.0).acos() / PI;
            env.lookup(Vec2::new(u, v), TextureWrap::TileU)
        }
        None => scene.background,
    }
}

/// BRDF times the clamped cosine term.
#[inline]
fn brdf_cos(params: &ShadingParams, v: Vec3, l: Vec3) -> Color {
    let cos = params.normal.dot(l).max(0.0);
    if cos == 0.0 {
        return Color::ZERO;
    }
    eval_brdf(
        params.diffuse,
        params.specular,
        params.exponent,
        v,
        l,
        params.normal,
        params.microfacet,
    ) * cos
}

/// One-sample estimate of direct light from an emissive quad.
fn sample_area_light(
    scene: &Scene,
    surface: &Surface,
    params: &ShadingParams,
    p: Vec3,
    v: Vec3,
    rng: &mut dyn RngCore,
    stats: &mut TraceStats,
) -> Color {
    let Shape::Quad { radius } = surface.shape else {
        return Color::ZERO;
    };

    let ruv = gen_vec2(rng);
    let local = Vec3::new((2.0 * ruv.x - 1.0) * radius, (2.0 * ruv.y - 1.0) * radius, 0.0);
    let s = surface.frame.transform_point(local);
    let nl = surface.frame.z;

    let material = &surface.material;
    let kel = lookup_texture(
        material.emission,
        material.emission_texture.as_deref(),
        ruv,
        TextureWrap::Clamp,
    );

    let l = (s - p).normalize();
    let area = 4.0 * radius * radius;
    let cl = kel * area * (-nl.dot(l)).max(0.0) / p.distance_squared(s);
    let shade = cl * brdf_cos(params, v, l);

    if shade == Color::ZERO || !shade.is_finite() {
        return Color::ZERO;
    }
    if scene.settings.shadows {
        stats.shadow_rays += 1;
        if any_hit(scene, &Ray::segment(p, s)) {
            return Color::ZERO;
        }
    }
    shade
}
