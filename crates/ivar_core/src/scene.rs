//! Scene description types.
//!
//! A `Scene` is built once (usually by the JSON loader) and then shared
//! read-only by every render worker.

use std::sync::Arc;

use ivar_math::{Frame, Ray, Vec3};
use serde::Deserialize;

use crate::material::{Color, Material};
use crate::texture::Texture;

/// Geometric primitive of a surface, in the surface's local frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    /// Sphere centered at the frame origin.
    Sphere { radius: f32 },
    /// Square in the local z = 0 plane, spanning `[-radius, radius]` on x and y.
    Quad { radius: f32 },
}

/// A placed primitive with its material.
#[derive(Clone, Debug)]
pub struct Surface {
    /// Placement in world space
    pub frame: Frame,

    pub shape: Shape,

    pub material: Material,
}

impl Surface {
    /// Create a sphere at `center`.
    pub fn sphere(center: Vec3, radius: f32, material: Material) -> Self {
        Self {
            frame: Frame::from_origin(center),
            shape: Shape::Sphere { radius },
            material,
        }
    }

    /// Create a quad on the z = 0 plane of `frame`.
    pub fn quad(frame: Frame, radius: f32, material: Material) -> Self {
        Self {
            frame,
            shape: Shape::Quad { radius },
            material,
        }
    }

    /// Check if this surface is a quad that should be sampled as an area light.
    pub fn is_area_light(&self) -> bool {
        matches!(self.shape, Shape::Quad { .. }) && self.material.is_emissive()
    }
}

/// An isotropic point light with inverse-square falloff.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub intensity: Color,
}

impl PointLight {
    pub fn new(position: Vec3, intensity: Color) -> Self {
        Self {
            position,
            intensity,
        }
    }
}

/// Pinhole camera looking down its local -z axis.
///
/// The image plane sits `dist` in front of the eye and spans `width` by
/// `height` world units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub frame: Frame,
    pub width: f32,
    pub height: f32,
    pub dist: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            frame: Frame::IDENTITY,
            width: 1.0,
            height: 1.0,
            dist: 1.0,
        }
    }
}

impl Camera {
    /// Create a camera at `from` looking towards `to`.
    pub fn look_at(from: Vec3, to: Vec3, up: Vec3, width: f32, height: f32, dist: f32) -> Self {
        Self {
            frame: Frame::look_at(from, to, up),
            width,
            height,
            dist,
        }
    }

    /// Generate the camera ray through normalized film coordinates.
    ///
    /// `(0, 0)` is the bottom-left corner of the image plane, `(1, 1)` the
    /// top-right.
    #[inline]
    pub fn ray(&self, u: f32, v: f32) -> Ray {
        let local = Vec3::new((u - 0.5) * self.width, (v - 0.5) * self.height, -self.dist);
        Ray::new(self.frame.origin, self.frame.transform_direction(local))
    }
}

/// Rendering parameters.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderSettings {
    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,

    /// Samples per pixel along each axis (total = samples²)
    pub samples: u32,

    /// Maximum number of indirect bounces
    pub max_depth: u32,

    /// Cast shadow rays towards lights
    pub shadows: bool,

    /// Mixed into every per-pixel random stream
    pub seed: u64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            samples: 1,
            max_depth: 2,
            shadows: true,
            seed: 0,
        }
    }
}

impl RenderSettings {
    /// Total number of camera rays per pixel.
    pub fn samples_per_pixel(&self) -> u32 {
        self.samples * self.samples
    }
}

/// Everything needed to render an image.
#[derive(Clone, Debug)]
pub struct Scene {
    /// Scene name (from file or user-defined)
    pub name: String,

    pub camera: Camera,

    pub surfaces: Vec<Surface>,

    pub lights: Vec<PointLight>,

    /// Ambient illumination, multiplied by the diffuse color
    pub ambient: Color,

    /// Radiance for rays that leave the scene
    pub background: Color,

    /// Lat-long environment map, replaces `background` when present
    pub environment: Option<Arc<Texture>>,

    pub settings: RenderSettings,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new("untitled")
    }
}

impl Scene {
    /// Create a new empty scene.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            camera: Camera::default(),
            surfaces: Vec::new(),
            lights: Vec::new(),
            ambient: Color::splat(0.2),
            background: Color::splat(0.2),
            environment: None,
            settings: RenderSettings::default(),
        }
    }

    /// Add a surface to the scene, returning its index.
    pub fn add_surface(&mut self, surface: Surface) -> usize {
        let index = self.surfaces.len();
        self.surfaces.push(surface);
        index
    }

    /// Add a point light to the scene, returning its index.
    pub fn add_light(&mut self, light: PointLight) -> usize {
        let index = self.lights.len();
        self.lights.push(light);
        index
    }

    /// Set the image height, deriving the width from the camera aspect.
    pub fn set_resolution(&mut self, height: u32) {
        let width = self.camera.width * height as f32 / self.camera.height;
        self.settings.height = height;
        self.settings.width = (width as u32).max(1);
    }

    /// Iterate over quads with non-zero emission.
    pub fn area_lights(&self) -> impl Iterator<Item = &Surface> {
        self.surfaces.iter().filter(|s| s.is_area_light())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_creation() {
        let mut scene = Scene::new("test");
        assert_eq!(scene.name, "test");
        assert!(scene.surfaces.is_empty());

        let idx = scene.add_surface(Surface::sphere(Vec3::ZERO, 1.0, Material::default()));
        assert_eq!(idx, 0);
        let idx = scene.add_light(PointLight::new(Vec3::Y, Color::ONE));
        assert_eq!(idx, 0);
        assert_eq!(scene.surfaces.len(), 1);
        assert_eq!(scene.lights.len(), 1);
    }

    #[test]
    fn test_area_lights_are_emissive_quads() {
        let mut scene = Scene::new("lights");
        let light = Material::emissive(Color::splat(4.0));
        scene.add_surface(Surface::quad(Frame::IDENTITY, 1.0, light.clone()));
        scene.add_surface(Surface::sphere(Vec3::ONE, 1.0, light));
        scene.add_surface(Surface::quad(Frame::IDENTITY, 1.0, Material::default()));

        assert_eq!(scene.area_lights().count(), 1);
    }

    #[test]
    fn test_set_resolution_keeps_aspect() {
        let mut scene = Scene::new("aspect");
        scene.camera.width = 2.0;
        scene.camera.height = 1.0;
        scene.set_resolution(240);

        assert_eq!(scene.settings.height, 240);
        assert_eq!(scene.settings.width, 480);
    }

    #[test]
    fn test_camera_center_ray() {
        let camera = Camera::look_at(Vec3::new(0.0, 0.0, 4.0), Vec3::ZERO, Vec3::Y, 1.0, 1.0, 1.0);
        let ray = camera.ray(0.5, 0.5);

        assert_eq!(ray.origin(), Vec3::new(0.0, 0.0, 4.0));
        assert!((ray.direction() - Vec3::NEG_Z).length() < 1e-6);
    }

    #[test]
    fn test_camera_corner_ray() {
        let camera = Camera::default();
        let ray = camera.ray(1.0, 1.0);
        let expected = Vec3::new(0.5, 0.5, -1.0).normalize();
        assert!((ray.direction() - expected).length() < 1e-6);
    }

    #[test]
    fn test_render_settings_defaults() {
        let settings = RenderSettings::default();
        assert_eq!((settings.width, settings.height), (512, 512));
        assert_eq!(settings.samples, 1);
        assert_eq!(settings.max_depth, 2);
        assert!(settings.shadows);
        assert_eq!(settings.seed, 0);
        assert_eq!(settings.samples_per_pixel(), 1);
    }

    #[test]
    fn test_render_settings_partial_json() {
        let settings: RenderSettings =
            serde_json::from_str(r#"{ "samples": 4, "shadows": false }"#).unwrap();
        assert_eq!(settings.samples, 4);
        assert!(!settings.shadows);
        assert_eq!(settings.width, 512);
        assert_eq!(settings.samples_per_pixel(), 16);
    }
}
