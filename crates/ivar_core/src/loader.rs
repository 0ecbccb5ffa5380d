//! JSON scene loading.
//!
//! This module provides the main entry point for reading a scene file and
//! converting it to the in-memory `Scene` representation. Every field has a
//! default, so a minimal file only lists what differs. Unknown fields are
//! rejected to catch typos early.
//!
//! Texture paths are resolved relative to the scene file and loaded through
//! a `TextureCache` that lives for the duration of one load.

use std::path::Path;
use std::sync::Arc;

use ivar_math::{Frame, Vec3};
use serde::Deserialize;
use thiserror::Error;

use crate::material::Material;
use crate::scene::{Camera, PointLight, RenderSettings, Scene, Shape, Surface};
use crate::texture::{Texture, TextureCache, TextureError};

/// Errors that can occur during scene loading.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Texture error: {0}")]
    Texture(#[from] TextureError),

    #[error("Invalid scene: {0}")]
    InvalidScene(String),
}

/// Result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

#[derive(Deserialize, Debug)]
#[serde(default, deny_unknown_fields)]
struct SceneDesc {
    name: Option<String>,
    camera: CameraDesc,
    ambient: [f32; 3],
    background: [f32; 3],
    background_texture: Option<String>,
    settings: RenderSettings,
    surfaces: Vec<SurfaceDesc>,
    lights: Vec<LightDesc>,
}

impl Default for SceneDesc {
    fn default() -> Self {
        Self {
            name: None,
            camera: CameraDesc::default(),
            ambient: [0.2; 3],
            background: [0.2; 3],
            background_texture: None,
            settings: RenderSettings::default(),
            surfaces: Vec::new(),
            lights: Vec::new(),
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(default, deny_unknown_fields)]
struct CameraDesc {
    from: [f32; 3],
    to: [f32; 3],
    up: [f32; 3],
    width: f32,
    height: f32,
    dist: f32,
}

impl Default for CameraDesc {
    fn default() -> Self {
        Self {
            from: [0.0, 0.0, 1.0],
            to: [0.0, 0.0, 0.0],
            up: [0.0, 1.0, 0.0],
            width: 1.0,
            height: 1.0,
            dist: 1.0,
        }
    }
}

#[derive(Deserialize, Debug, Default, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
enum ShapeKind {
    #[default]
    Sphere,
    Quad,
}

#[derive(Deserialize, Debug)]
#[serde(default, deny_unknown_fields)]
struct SurfaceDesc {
    #[serde(rename = "type")]
    kind: ShapeKind,
    radius: f32,
    frame: FrameDesc,
    material: MaterialDesc,
}

impl Default for SurfaceDesc {
    fn default() -> Self {
        Self {
            kind: ShapeKind::Sphere,
            radius: 1.0,
            frame: FrameDesc::default(),
            material: MaterialDesc::default(),
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(default, deny_unknown_fields)]
struct FrameDesc {
    origin: [f32; 3],
    z: [f32; 3],
    x: [f32; 3],
}

impl Default for FrameDesc {
    fn default() -> Self {
        Self {
            origin: [0.0; 3],
            z: [0.0, 0.0, 1.0],
            x: [1.0, 0.0, 0.0],
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(default, deny_unknown_fields)]
struct MaterialDesc {
    emission: [f32; 3],
    diffuse: [f32; 3],
    specular: [f32; 3],
    exponent: f32,
    microfacet: bool,
    emission_texture: Option<String>,
    diffuse_texture: Option<String>,
    specular_texture: Option<String>,
    normal_texture: Option<String>,
}

impl Default for MaterialDesc {
    fn default() -> Self {
        Self {
            emission: [0.0; 3],
            diffuse: [1.0; 3],
            specular: [0.0; 3],
            exponent: 10.0,
            microfacet: false,
            emission_texture: None,
            diffuse_texture: None,
            specular_texture: None,
            normal_texture: None,
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(default, deny_unknown_fields)]
struct LightDesc {
    position: [f32; 3],
    intensity: [f32; 3],
}

impl Default for LightDesc {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            intensity: [1.0; 3],
        }
    }
}

/// Load a scene file from disk.
///
/// Texture paths inside the file are resolved relative to its directory.
/// The scene name defaults to the file stem.
///
/// # Example
///
/// ```ignore
/// use ivar_core::load_scene;
///
/// let scene = load_scene("scenes/cornell.json")?;
/// println!("{}x{}", scene.settings.width, scene.settings.height);
/// ```
pub fn load_scene<P: AsRef<Path>>(path: P) -> LoadResult<Scene> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)?;
    let desc: SceneDesc = serde_json::from_str(&json)?;

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let fallback = path.file_stem().and_then(|s| s.to_str()).unwrap_or("unnamed");

    build_scene(desc, base_dir, fallback)
}

/// Load a scene from a JSON string, resolving textures against `base_dir`.
pub fn load_scene_from_str<P: AsRef<Path>>(json: &str, base_dir: P) -> LoadResult<Scene> {
    let desc: SceneDesc = serde_json::from_str(json)?;
    build_scene(desc, base_dir.as_ref(), "untitled")
}

fn build_scene(desc: SceneDesc, base_dir: &Path, fallback_name: &str) -> LoadResult<Scene> {
    validate(&desc)?;

    let mut textures = TextureCache::with_base_dir(base_dir);
    let mut scene = Scene::new(desc.name.as_deref().unwrap_or(fallback_name));

    let cam = &desc.camera;
    scene.camera = Camera::look_at(
        Vec3::from(cam.from),
        Vec3::from(cam.to),
        Vec3::from(cam.up),
        cam.width,
        cam.height,
        cam.dist,
    );
    scene.ambient = Vec3::from(desc.ambient);
    scene.background = Vec3::from(desc.background);
    scene.environment = load_optional(&mut textures, desc.background_texture.as_deref())?;
    scene.settings = desc.settings;

    for (index, surface) in desc.surfaces.iter().enumerate() {
        let material = build_material(&mut textures, &surface.material)?;
        let frame = Frame::from_zx(
            Vec3::from(surface.frame.origin),
            Vec3::from(surface.frame.z),
            Vec3::from(surface.frame.x),
        );

        let shape = match surface.kind {
            ShapeKind::Sphere => {
                if material.is_emissive() {
                    log::warn!(
                        "Surface {}: emissive spheres are visible but not sampled as lights",
                        index
                    );
                }
                Shape::Sphere {
                    radius: surface.radius,
                }
            }
            ShapeKind::Quad => Shape::Quad {
                radius: surface.radius,
            },
        };

        scene.add_surface(Surface {
            frame,
            shape,
            material,
        });
    }

    for light in &desc.lights {
        scene.add_light(PointLight::new(
            Vec3::from(light.position),
            Vec3::from(light.intensity),
        ));
    }

    log::debug!(
        "Loaded scene '{}': {} surfaces, {} lights, {} textures",
        scene.name,
        scene.surfaces.len(),
        scene.lights.len(),
        textures.len()
    );

    Ok(scene)
}

fn build_material(textures: &mut TextureCache, desc: &MaterialDesc) -> LoadResult<Material> {
    Ok(Material {
        emission: Vec3::from(desc.emission),
        diffuse: Vec3::from(desc.diffuse),
        specular: Vec3::from(desc.specular),
        exponent: desc.exponent,
        microfacet: desc.microfacet,
        emission_texture: load_optional(textures, desc.emission_texture.as_deref())?,
        diffuse_texture: load_optional(textures, desc.diffuse_texture.as_deref())?,
        specular_texture: load_optional(textures, desc.specular_texture.as_deref())?,
        normal_texture: load_optional(textures, desc.normal_texture.as_deref())?,
    })
}

fn load_optional(
    textures: &mut TextureCache,
    path: Option<&str>,
) -> LoadResult<Option<Arc<Texture>>> {
    match path {
        Some(path) => Ok(Some(textures.load(path)?)),
        None => Ok(None),
    }
}

fn validate(desc: &SceneDesc) -> LoadResult<()> {
    let settings = &desc.settings;
    if settings.width == 0 || settings.height == 0 {
        return Err(LoadError::InvalidScene(format!(
            "resolution must be positive, got {}x{}",
            settings.width, settings.height
        )));
    }
    if settings.samples == 0 {
        return Err(LoadError::InvalidScene("samples must be positive".into()));
    }

    let cam = &desc.camera;
    if !(cam.width > 0.0 && cam.height > 0.0 && cam.dist > 0.0) {
        return Err(LoadError::InvalidScene(
            "camera width, height and dist must be positive".into(),
        ));
    }
    if Vec3::from(cam.from) == Vec3::from(cam.to) {
        return Err(LoadError::InvalidScene("camera from and to coincide".into()));
    }
    let forward = Vec3::from(cam.to) - Vec3::from(cam.from);
    if forward.cross(Vec3::from(cam.up)).length_squared() == 0.0 {
        return Err(LoadError::InvalidScene(
            "camera up is parallel to the view direction".into(),
        ));
    }

    for (index, surface) in desc.surfaces.iter().enumerate() {
        if !(surface.radius > 0.0) {
            return Err(LoadError::InvalidScene(format!(
                "surface {}: radius must be positive, got {}",
                index, surface.radius
            )));
        }
        if Vec3::from(surface.frame.z).length_squared() == 0.0 {
            return Err(LoadError::InvalidScene(format!(
                "surface {}: frame z axis is zero",
                index
            )));
        }
    }

    Ok(())
}
