//! Texture loading and lookup for materials and environment maps.
//!
//! Textures are decoded once into linear float RGB and shared between
//! materials through `Arc`. The `TextureCache` that deduplicates them lives
//! only as long as the scene load that owns it; nothing here is global.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{DynamicImage, ImageFormat};
use ivar_math::{Vec2, Vec3};
use thiserror::Error;

/// Errors that can occur during texture loading.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Failed to load texture: {0}")]
    LoadError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image decoding error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Unsupported texture format: {0}")]
    UnsupportedFormat(String),
}

pub type TextureResult<T> = Result<T, TextureError>;

/// Boundary policy for texel indices outside the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextureWrap {
    /// Repeat the edge texel.
    #[default]
    Clamp,
    /// Wrap around on both axes.
    Tile,
    /// Wrap around horizontally, clamp vertically (lat-long environment maps).
    TileU,
}

impl TextureWrap {
    #[inline]
    fn resolve(self, index: i64, size: u32, horizontal: bool) -> u32 {
        let size = i64::from(size.max(1));
        let tile = match self {
            TextureWrap::Clamp => false,
            TextureWrap::Tile => true,
            TextureWrap::TileU => horizontal,
        };
        let index = if tile {
            index.rem_euclid(size)
        } else {
            index.clamp(0, size - 1)
        };
        index as u32
    }
}

/// A loaded texture with pixel data.
///
/// Stores pixels in linear RGB float format, row-major with row 0 at the
/// top of the image.
#[derive(Clone, Debug)]
pub struct Texture {
    /// Texture width in pixels
    pub width: u32,

    /// Texture height in pixels
    pub height: u32,

    /// Pixel data (linear RGB)
    pub pixels: Vec<Vec3>,

    /// Original file path (for debugging)
    pub path: String,
}

impl Texture {
    /// Create a new texture from pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<Vec3>, path: impl Into<String>) -> Self {
        debug_assert_eq!(pixels.len(), (width * height) as usize);
        Self {
            width,
            height,
            pixels,
            path: path.into(),
        }
    }

    /// Create a solid color texture (1x1).
    pub fn solid_color(color: Vec3) -> Self {
        Self::new(1, 1, vec![color], "<solid>")
    }

    /// Bilinear lookup at texture coordinates `uv`.
    ///
    /// Interpolates between the four texel centers surrounding the sample
    /// point. `v = 1` is the top row of the image.
    pub fn lookup(&self, uv: Vec2, wrap: TextureWrap) -> Vec3 {
        let x = uv.x * self.width as f32 - 0.5;
        let y = (1.0 - uv.y) * self.height as f32 - 0.5;

        let x0 = x.floor();
        let y0 = y.floor();
        let s = x - x0;
        let t = y - y0;

        let (x0, y0) = (x0 as i64, y0 as i64);
        let i0 = wrap.resolve(x0, self.width, true);
        let i1 = wrap.resolve(x0 + 1, self.width, true);
        let j0 = wrap.resolve(y0, self.height, false);
        let j1 = wrap.resolve(y0 + 1, self.height, false);

        self.get_pixel(i0, j0) * (1.0 - s) * (1.0 - t)
            + self.get_pixel(i1, j0) * s * (1.0 - t)
            + self.get_pixel(i0, j1) * (1.0 - s) * t
            + self.get_pixel(i1, j1) * s * t
    }

    /// Get pixel at integer coordinates.
    fn get_pixel(&self, x: u32, y: u32) -> Vec3 {
        let idx = (y * self.width + x) as usize;
        self.pixels.get(idx).copied().unwrap_or(Vec3::ZERO)
    }

    /// Get total size in bytes (approximate).
    pub fn size_bytes(&self) -> usize {
        self.pixels.len() * std::mem::size_of::<Vec3>()
    }
}

/// Resolve a material channel through its optional texture.
///
/// Returns `value` unchanged when there is no texture, otherwise the texture
/// lookup replaces it.
#[inline]
pub fn lookup_texture(
    value: Vec3,
    texture: Option<&Texture>,
    uv: Vec2,
    wrap: TextureWrap,
) -> Vec3 {
    match texture {
        Some(texture) => texture.lookup(uv, wrap),
        None => value,
    }
}

/// Cache for loaded textures.
///
/// Owned by a single scene load; textures are handed out as `Arc`s so the
/// finished scene keeps them alive after the cache is dropped.
pub struct TextureCache {
    /// Cached textures by file path
    textures: HashMap<String, Arc<Texture>>,

    /// Base directory for resolving relative paths
    base_dir: Option<PathBuf>,
}

impl TextureCache {
    /// Create a new empty texture cache.
    pub fn new() -> Self {
        Self {
            textures: HashMap::new(),
            base_dir: None,
        }
    }

    /// Create a texture cache with a base directory for relative paths.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            textures: HashMap::new(),
            base_dir: Some(base_dir.into()),
        }
    }

    /// Load a texture from file, using cache if available.
    pub fn load(&mut self, path: &str) -> TextureResult<Arc<Texture>> {
        if let Some(texture) = self.textures.get(path) {
            return Ok(texture.clone());
        }

        let full_path = self.resolve_path(path);
        let texture = Arc::new(load_texture_file(&full_path)?);
        self.textures.insert(path.to_string(), texture.clone());

        log::debug!(
            "Loaded texture: {} ({}x{}, {:.1} KB)",
            path,
            texture.width,
            texture.height,
            texture.size_bytes() as f32 / 1024.0
        );

        Ok(texture)
    }

    /// Get the number of cached textures.
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    /// Check if cache is empty.
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Resolve a path relative to the base directory.
    fn resolve_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);

        if path.is_absolute() {
            path.to_path_buf()
        } else if let Some(base) = &self.base_dir {
            base.join(path)
        } else {
            path.to_path_buf()
        }
    }
}

impl Default for TextureCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Load a texture from a file path.
///
/// LDR images are converted from sRGB to linear; float images (HDR, EXR)
/// are taken as-is.
fn load_texture_file(path: &Path) -> TextureResult<Texture> {
    let display = path.display().to_string();

    // Reject unknown extensions before touching the filesystem
    if ImageFormat::from_path(path).is_err() {
        return Err(TextureError::UnsupportedFormat(display));
    }

    let img = image::open(path).map_err(|e| match e {
        image::ImageError::Unsupported(_) => TextureError::UnsupportedFormat(display.clone()),
        image::ImageError::IoError(io) => TextureError::Io(io),
        other => TextureError::LoadError(format!("Failed to open {}: {}", display, other)),
    })?;

    let (width, height) = (img.width(), img.height());
    let pixels: Vec<Vec3> = match img {
        DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_) => img
            .to_rgb32f()
            .pixels()
            .map(|p| Vec3::new(p[0], p[1], p[2]))
            .collect(),
        _ => img
            .to_rgb8()
            .pixels()
            .map(|p| {
                Vec3::new(
                    srgb_to_linear(p[0]),
                    srgb_to_linear(p[1]),
                    srgb_to_linear(p[2]),
                )
            })
            .collect(),
    };

    Ok(Texture::new(width, height, pixels, display))
}

/// Convert sRGB byte value to linear float.
fn srgb_to_linear(value: u8) -> f32 {
    let v = value as f32 / 255.0;
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: Vec3 = Vec3::new(1.0, 0.0, 0.0);
    const B: Vec3 = Vec3::new(0.0, 1.0, 0.0);
    const C: Vec3 = Vec3::new(0.0, 0.0, 1.0);
    const D: Vec3 = Vec3::new(1.0, 1.0, 1.0);

    /// 2x2 texture, top row [A, B], bottom row [C, D].
    fn checker() -> Texture {
        Texture::new(2, 2, vec![A, B, C, D], "<checker>")
    }

    fn approx_eq(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn test_solid_color_texture() {
        let tex = Texture::solid_color(Vec3::new(1.0, 0.5, 0.0));
        assert_eq!(tex.width, 1);
        assert_eq!(tex.height, 1);

        for wrap in [TextureWrap::Clamp, TextureWrap::Tile] {
            let sample = tex.lookup(Vec2::new(0.3, 0.9), wrap);
            assert!(approx_eq(sample, Vec3::new(1.0, 0.5, 0.0)));
        }
    }

    #[test]
    fn test_bilinear_center_is_average() {
        let tex = checker();
        let sample = tex.lookup(Vec2::new(0.5, 0.5), TextureWrap::Clamp);
        assert!(approx_eq(sample, (A + B + C + D) / 4.0));
    }

    #[test]
    fn test_texel_centers_are_exact() {
        let tex = checker();
        // Top-left texel center
        assert!(approx_eq(tex.lookup(Vec2::new(0.25, 0.75), TextureWrap::Clamp), A));
        // Bottom-right texel center
        assert!(approx_eq(tex.lookup(Vec2::new(0.75, 0.25), TextureWrap::Clamp), D));
    }

    #[test]
    fn test_clamp_vs_tile_at_edge() {
        let tex = checker();
        let uv = Vec2::new(0.0, 0.75);

        // Clamp repeats the left column
        assert!(approx_eq(tex.lookup(uv, TextureWrap::Clamp), A));
        // Tile blends with the right column across the seam
        assert!(approx_eq(tex.lookup(uv, TextureWrap::Tile), (A + B) / 2.0));
    }

    #[test]
    fn test_tile_u_clamps_vertically() {
        let tex = checker();

        // Horizontal seam still blends across
        let seam = tex.lookup(Vec2::new(0.0, 0.75), TextureWrap::TileU);
        assert!(approx_eq(seam, (A + B) / 2.0));

        // Top edge keeps the top row instead of blending with the bottom one
        let top = tex.lookup(Vec2::new(0.25, 1.0), TextureWrap::TileU);
        assert!(approx_eq(top, A));
        let bottom = tex.lookup(Vec2::new(0.75, 0.0), TextureWrap::TileU);
        assert!(approx_eq(bottom, D));
        assert!(approx_eq(tex.lookup(Vec2::new(0.25, 1.0), TextureWrap::Tile), (A + C) / 2.0));
    }

    #[test]
    fn test_tile_wraps_out_of_range_coordinates() {
        let tex = checker();
        let inside = tex.lookup(Vec2::new(0.25, 0.75), TextureWrap::Tile);
        let wrapped = tex.lookup(Vec2::new(1.25, 0.75), TextureWrap::Tile);
        let negative = tex.lookup(Vec2::new(-0.75, 0.75), TextureWrap::Tile);
        assert!(approx_eq(inside, wrapped));
        assert!(approx_eq(inside, negative));
    }

    #[test]
    fn test_lookup_texture_without_texture_returns_value() {
        let value = Vec3::new(0.2, 0.4, 0.6);
        let result = lookup_texture(value, None, Vec2::new(0.5, 0.5), TextureWrap::Clamp);
        assert_eq!(result, value);

        let tex = checker();
        let result = lookup_texture(value, Some(&tex), Vec2::new(0.25, 0.75), TextureWrap::Clamp);
        assert!(approx_eq(result, A));
    }

    #[test]
    fn test_texture_cache() {
        let cache = TextureCache::new();
        assert!(cache.is_empty());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_unsupported_format_is_an_error() {
        let mut cache = TextureCache::new();
        let result = cache.load("textures/diffuse.xyz");
        assert!(matches!(result, Err(TextureError::UnsupportedFormat(_))));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_load_png_through_cache() {
        let dir = std::env::temp_dir().join(format!("ivar_texture_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let mut img = image::RgbImage::new(2, 1);
        img.put_pixel(0, 0, image::Rgb([255, 0, 0]));
        img.put_pixel(1, 0, image::Rgb([0, 0, 255]));
        img.save(dir.join("red_blue.png")).unwrap();

        let mut cache = TextureCache::with_base_dir(&dir);
        let first = cache.load("red_blue.png").unwrap();
        let second = cache.load("red_blue.png").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
        assert_eq!((first.width, first.height), (2, 1));
        assert!(approx_eq(first.pixels[0], Vec3::new(1.0, 0.0, 0.0)));
        assert!(approx_eq(first.pixels[1], Vec3::new(0.0, 0.0, 1.0)));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_srgb_to_linear() {
        // Black stays black
        assert!((srgb_to_linear(0) - 0.0).abs() < 0.001);

        // White stays white
        assert!((srgb_to_linear(255) - 1.0).abs() < 0.001);

        // Mid-gray is darker in linear
        let mid = srgb_to_linear(128);
        assert!(mid < 0.5);
        assert!(mid > 0.1);
    }
}
