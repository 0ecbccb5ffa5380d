//! Importance sampling of outgoing directions.
//!
//! All samplers take their random numbers as arguments so that the caller
//! decides which stream they come from.

use std::f32::consts::PI;

use ivar_core::Color;
use ivar_math::{mean, Frame, Vec2, Vec3};

/// A sampled direction and its probability density (per solid angle).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionSample {
    pub direction: Vec3,
    pub pdf: f32,
}

/// Cosine-weighted direction in the hemisphere around `normal`.
pub fn sample_cosine(normal: Vec3, ruv: Vec2) -> DirectionSample {
    let frame = Frame::from_z(Vec3::ZERO, normal);
    let local = cosine_hemisphere(ruv);
    DirectionSample {
        direction: frame.transform_direction(local),
        pdf: local.z / PI,
    }
}

/// Density of [`sample_cosine`] for direction `l`.
#[inline]
pub fn cosine_pdf(normal: Vec3, l: Vec3) -> f32 {
    normal.dot(l).max(0.0) / PI
}

/// Sample a direction proportionally to the diffuse and specular lobes.
///
/// `rl` picks the lobe: the diffuse lobe is chosen with probability
/// `mean(kd) / (mean(kd) + mean(ks))`. The returned pdf is the density of the
/// full mixture, see [`brdf_pdf`].
pub fn sample_brdf(
    diffuse: Color,
    specular: Color,
    exponent: f32,
    v: Vec3,
    normal: Vec3,
    ruv: Vec2,
    rl: f32,
) -> DirectionSample {
    if specular == Color::ZERO {
        return sample_cosine(normal, ruv);
    }

    let frame = Frame::from_z(Vec3::ZERO, normal);
    let w = diffuse_weight(diffuse, specular);

    let direction = if rl < w {
        frame.transform_direction(cosine_hemisphere(ruv))
    } else {
        let h = frame.transform_direction(cospower_hemisphere(ruv, exponent));
        h * (2.0 * v.dot(h)) - v
    };

    DirectionSample {
        direction,
        pdf: brdf_pdf(diffuse, specular, exponent, v, normal, direction),
    }
}

/// Density with which [`sample_brdf`] produces direction `l`.
pub fn brdf_pdf(
    diffuse: Color,
    specular: Color,
    exponent: f32,
    v: Vec3,
    normal: Vec3,
    l: Vec3,
) -> f32 {
    if specular == Color::ZERO {
        return cosine_pdf(normal, l);
    }

    let w = diffuse_weight(diffuse, specular);
    let h = (l + v).normalize_or_zero();
    let vh = v.dot(h);

    let specular_pdf = if vh > 0.0 {
        cospower_pdf(normal.dot(h), exponent) / (4.0 * vh)
    } else {
        0.0
    };

    w * cosine_pdf(normal, l) + (1.0 - w) * specular_pdf
}

/// Probability of picking the diffuse lobe.
#[inline]
fn diffuse_weight(diffuse: Color, specular: Color) -> f32 {
    let kd = mean(diffuse);
    kd / (kd + mean(specular))
}

/// Cosine-distributed direction around +Z.
#[inline]
fn cosine_hemisphere(ruv: Vec2) -> Vec3 {
    let z = (1.0 - ruv.y).sqrt();
    let r = ruv.y.sqrt();
    let phi = 2.0 * PI * ruv.x;
    Vec3::new(r * phi.cos(), r * phi.sin(), z)
}

/// Direction around +Z distributed as `cos^n`.
#[inline]
fn cospower_hemisphere(ruv: Vec2, n: f32) -> Vec3 {
    let z = ruv.y.powf(1.0 / (n + 1.0));
    let r = (1.0 - z * z).max(0.0).sqrt();
    let phi = 2.0 * PI * ruv.x;
    Vec3::new(r * phi.cos(), r * phi.sin(), z)
}

#[inline]
fn cospower_pdf(cos_theta: f32, n: f32) -> f32 {
    if cos_theta <= 0.0 {
        0.0
    } else {
        (n + 1.0) / (2.0 * PI) * cos_theta.powf(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{eval_brdf, gen_f32, gen_vec2};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_cosine_sample_in_hemisphere() {
        let normal = Vec3::new(0.3, 1.0, -0.2).normalize();
        let mut rng = StdRng::seed_from_u64(1);

        for _ in 0..1000 {
            let s = sample_cosine(normal, gen_vec2(&mut rng));
            assert!((s.direction.length() - 1.0).abs() < 1e-4);
            assert!(s.direction.dot(normal) >= -1e-6);
            assert!((s.pdf - cosine_pdf(normal, s.direction)).abs() < 1e-4);
        }
    }

    #[test]
    fn test_zero_specular_delegates_to_cosine() {
        let ruv = Vec2::new(0.3, 0.6);
        let a = sample_brdf(Color::ONE, Color::ZERO, 10.0, Vec3::Z, Vec3::Z, ruv, 0.9);
        let b = sample_cosine(Vec3::Z, ruv);
        assert_eq!(a, b);
    }

    #[test]
    fn test_specular_lobe_reflects_about_half_vector() {
        // ruv.y = 1 gives the half vector along the normal
        let v = Vec3::new(1.0, 0.0, 1.0).normalize();
        let s = sample_brdf(
            Color::splat(0.5),
            Color::splat(0.5),
            20.0,
            v,
            Vec3::Z,
            Vec2::new(0.0, 1.0),
            0.99,
        );
        let mirror = Vec3::new(-1.0, 0.0, 1.0).normalize();
        assert!((s.direction - mirror).length() < 1e-5);
        assert!(s.pdf > 0.0);
    }

    #[test]
    fn test_brdf_pdf_integrates_to_one() {
        // Uniform sphere estimate of the pdf integral, viewing along the normal
        // so no specular directions fall below the horizon.
        let kd = Color::splat(0.4);
        let ks = Color::splat(0.3);
        let n = Vec3::Z;
        let v = Vec3::Z;
        let mut rng = StdRng::seed_from_u64(42);

        let count = 200_000;
        let mut sum = 0.0;
        for _ in 0..count {
            let z = 1.0 - 2.0 * gen_f32(&mut rng);
            let r = (1.0 - z * z).max(0.0).sqrt();
            let phi = 2.0 * PI * gen_f32(&mut rng);
            let l = Vec3::new(r * phi.cos(), r * phi.sin(), z);
            sum += brdf_pdf(kd, ks, 10.0, v, n, l) as f64;
        }
        let integral = sum / count as f64 * 4.0 * std::f64::consts::PI;

        assert!((integral - 1.0).abs() < 0.03, "integral = {}", integral);
    }

    #[test]
    fn test_brdf_sampling_matches_cosine_estimate() {
        // Both estimators target the same albedo integral
        let kd = Color::splat(0.5);
        let ks = Color::splat(0.2);
        let exponent = 8.0;
        let n = Vec3::Z;
        let v = Vec3::new(0.2, 0.0, 1.0).normalize();
        let mut rng = StdRng::seed_from_u64(9);

        let count = 100_000;
        let mut by_brdf = 0.0;
        let mut by_cosine = 0.0;
        for _ in 0..count {
            let s = sample_brdf(kd, ks, exponent, v, n, gen_vec2(&mut rng), gen_f32(&mut rng));
            let cos = n.dot(s.direction);
            if s.pdf > 0.0 && cos > 0.0 {
                let f = eval_brdf(kd, ks, exponent, v, s.direction, n, false);
                by_brdf += (f.x * cos / s.pdf) as f64;
            }

            let c = sample_cosine(n, gen_vec2(&mut rng));
            let cos = n.dot(c.direction);
            if c.pdf > 0.0 {
                let f = eval_brdf(kd, ks, exponent, v, c.direction, n, false);
                by_cosine += (f.x * cos / c.pdf) as f64;
            }
        }

        let by_brdf = by_brdf / count as f64;
        let by_cosine = by_cosine / count as f64;
        assert!(
            (by_brdf - by_cosine).abs() < 0.02,
            "brdf {} vs cosine {}",
            by_brdf,
            by_cosine
        );
    }
}
