//! Surface materials.
//!
//! A material is a set of constant channels, each of which may be replaced
//! per point by a texture. `Material::shading_at` resolves all channels for a
//! single hit so the integrator only ever sees plain colors.

use std::sync::Arc;

use ivar_math::{Vec2, Vec3};

use crate::texture::{lookup_texture, Texture, TextureWrap};

/// RGB color in linear space.
pub type Color = Vec3;

/// A Blinn-Phong / microfacet material.
#[derive(Clone, Debug)]
pub struct Material {
    /// Emitted radiance
    pub emission: Color,

    /// Diffuse reflectance
    pub diffuse: Color,

    /// Specular reflectance
    pub specular: Color,

    /// Specular exponent (glossiness)
    pub exponent: f32,

    /// Use the microfacet specular term instead of Blinn-Phong
    pub microfacet: bool,

    pub emission_texture: Option<Arc<Texture>>,
    pub diffuse_texture: Option<Arc<Texture>>,
    pub specular_texture: Option<Arc<Texture>>,

    /// Normal map, texels encode world-space normals in [0, 1]
    pub normal_texture: Option<Arc<Texture>>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            emission: Color::ZERO,
            diffuse: Color::ONE,
            specular: Color::ZERO,
            exponent: 10.0,
            microfacet: false,
            emission_texture: None,
            diffuse_texture: None,
            specular_texture: None,
            normal_texture: None,
        }
    }
}

/// Material channels resolved at a single surface point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadingParams {
    pub emission: Color,
    pub diffuse: Color,
    pub specular: Color,
    pub exponent: f32,
    pub microfacet: bool,
    /// Shading normal (unit length)
    pub normal: Vec3,
}

impl Material {
    /// Create a purely diffuse material.
    pub fn diffuse(color: Color) -> Self {
        Self {
            diffuse: color,
            ..Default::default()
        }
    }

    /// Create a material with diffuse and Blinn-Phong specular lobes.
    pub fn glossy(diffuse: Color, specular: Color, exponent: f32) -> Self {
        Self {
            diffuse,
            specular,
            exponent,
            ..Default::default()
        }
    }

    /// Create a light-emitting material with no reflectance.
    pub fn emissive(emission: Color) -> Self {
        Self {
            emission,
            diffuse: Color::ZERO,
            ..Default::default()
        }
    }

    /// Check if the constant emission is non-zero.
    ///
    /// Only the constant channel is considered, an emission texture on a
    /// black base does not make a surface a light.
    pub fn is_emissive(&self) -> bool {
        self.emission != Color::ZERO
    }

    /// Resolve every channel at texture coordinate `uv`.
    ///
    /// `normal` is the geometric normal, used unless a normal map is present.
    pub fn shading_at(&self, uv: Vec2, normal: Vec3) -> ShadingParams {
        let wrap = TextureWrap::Clamp;

        let normal = match self.normal_texture.as_deref() {
            Some(texture) => {
                let encoded = texture.lookup(uv, wrap);
                (encoded * 2.0 - Vec3::ONE).try_normalize().unwrap_or(normal)
            }
            None => normal,
        };

        ShadingParams {
            emission: lookup_texture(self.emission, self.emission_texture.as_deref(), uv, wrap),
            diffuse: lookup_texture(self.diffuse, self.diffuse_texture.as_deref(), uv, wrap),
            specular: lookup_texture(self.specular, self.specular_texture.as_deref(), uv, wrap),
            exponent: self.exponent,
            microfacet: self.microfacet,
            normal,
        }
    }
}
