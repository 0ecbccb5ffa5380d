//! Reflectance evaluation.
//!
//! Two models share the same diffuse term: normalized Blinn-Phong, and a
//! microfacet specular term with a Blinn distribution, Schlick Fresnel and
//! the Cook-Torrance shadowing/masking term.

use std::f32::consts::PI;

use ivar_core::Color;
use ivar_math::Vec3;

/// Evaluate the BRDF for unit view direction `v`, light direction `l` and
/// normal `n`, all pointing away from the surface.
///
/// The caller multiplies by `max(0, n·l)`.
pub fn eval_brdf(
    diffuse: Color,
    specular: Color,
    exponent: f32,
    v: Vec3,
    l: Vec3,
    n: Vec3,
    microfacet: bool,
) -> Color {
    if microfacet {
        eval_microfacet(specular, exponent, v, l, n)
    } else {
        eval_blinn_phong(diffuse, specular, exponent, v, l, n)
    }
}

fn eval_blinn_phong(kd: Color, ks: Color, n_exp: f32, v: Vec3, l: Vec3, n: Vec3) -> Color {
    let h = (v + l).normalize_or_zero();
    let lobe = n.dot(h).max(0.0).powf(n_exp);
    kd / PI + ks * ((n_exp + 8.0) / (8.0 * PI)) * lobe
}

fn eval_microfacet(ks: Color, n_exp: f32, v: Vec3, l: Vec3, n: Vec3) -> Color {
    let ln = l.dot(n);
    let vn = v.dot(n);
    if ln <= 0.0 || vn <= 0.0 {
        return Color::ZERO;
    }

    let h = (v + l).normalize();
    let hn = h.dot(n);
    let hl = h.dot(l);
    let hv = h.dot(v);

    let d = (n_exp + 2.0) / (2.0 * PI) * hn.max(0.0).powf(n_exp);
    let f = ks + (Color::ONE - ks) * (1.0 - hl).powi(5);
    let g = 1.0_f32
        .min(2.0 * hn * vn / hv)
        .min(2.0 * hn * ln / hl);

    f * (d * g / (4.0 * ln * vn))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lambertian_is_constant() {
        let kd = Color::new(0.8, 0.5, 0.2);
        let n = Vec3::Z;
        let v = Vec3::new(0.3, 0.0, 1.0).normalize();

        let lights = [
            Vec3::Z,
            Vec3::new(1.0, 0.0, 1.0).normalize(),
            Vec3::new(0.0, -1.0, 0.2).normalize(),
        ];
        for l in lights {
            let f = eval_brdf(kd, Color::ZERO, 10.0, v, l, n, false);
            assert!((f - kd / PI).length() < 1e-6);
        }
    }

    #[test]
    fn test_blinn_phong_peak_at_mirror() {
        let ks = Color::splat(0.5);
        let n = Vec3::Z;
        let v = Vec3::new(1.0, 0.0, 1.0).normalize();
        let mirror = Vec3::new(-1.0, 0.0, 1.0).normalize();
        let off = Vec3::new(-0.2, 0.5, 1.0).normalize();

        let peak = eval_brdf(Color::ZERO, ks, 20.0, v, mirror, n, false);
        let side = eval_brdf(Color::ZERO, ks, 20.0, v, off, n, false);

        let expected = 0.5 * (20.0 + 8.0) / (8.0 * PI);
        assert!((peak.x - expected).abs() < 1e-4);
        assert!(side.x < peak.x);
    }

    #[test]
    fn test_microfacet_ignores_diffuse() {
        let n = Vec3::Z;
        let v = Vec3::new(0.2, 0.1, 1.0).normalize();
        let l = Vec3::new(-0.3, 0.0, 1.0).normalize();

        let with_kd = eval_brdf(Color::ONE, Color::splat(0.04), 50.0, v, l, n, true);
        let without = eval_brdf(Color::ZERO, Color::splat(0.04), 50.0, v, l, n, true);
        assert_eq!(with_kd, without);
    }

    #[test]
    fn test_microfacet_normal_incidence() {
        // v = l = n: D = (n+2)/2π, F = ks, G = 1
        let ks = Color::splat(0.04);
        let f = eval_brdf(Color::ZERO, ks, 10.0, Vec3::Z, Vec3::Z, Vec3::Z, true);
        let expected = 0.04 * (12.0 / (2.0 * PI)) / 4.0;
        assert!((f.x - expected).abs() < 1e-6);
    }

    #[test]
    fn test_microfacet_below_horizon_is_zero() {
        let n = Vec3::Z;
        let v = Vec3::Z;
        let below = Vec3::new(1.0, 0.0, -0.1).normalize();

        let f = eval_brdf(Color::ZERO, Color::ONE, 10.0, v, below, n, true);
        assert_eq!(f, Color::ZERO);
        let f = eval_brdf(Color::ZERO, Color::ONE, 10.0, below, v, n, true);
        assert_eq!(f, Color::ZERO);
    }

    #[test]
    fn test_microfacet_is_finite_at_grazing() {
        let n = Vec3::Z;
        let v = Vec3::new(1.0, 0.0, 1e-4).normalize();
        let l = Vec3::new(-1.0, 0.0, 1e-4).normalize();
        let f = eval_brdf(Color::ZERO, Color::splat(0.5), 100.0, v, l, n, true);
        assert!(f.is_finite());
    }
}
