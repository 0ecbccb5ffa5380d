//! Ivar Core - scene description for the Ivar path tracer.
//!
//! This crate provides:
//!
//! - **Scene types**: `Scene`, `Surface`, `Shape`, `PointLight`, `Camera`,
//!   `RenderSettings`
//! - **Materials**: `Material` with optional per-channel textures
//! - **Textures**: in-memory float textures, bilinear lookup and a
//!   scene-scoped `TextureCache`
//! - **Loading**: JSON scene files
//!
//! Everything here is built once before rendering and then only read.
//!
//! # Example
//!
//! ```ignore
//! use ivar_core::load_scene;
//!
//! let scene = load_scene("scenes/cornell.json")?;
//! println!("Loaded {} surfaces, {} lights",
//!     scene.surfaces.len(),
//!     scene.lights.len());
//! ```

pub mod loader;
pub mod material;
pub mod scene;
pub mod texture;

// Re-export commonly used types
pub use loader::{load_scene, load_scene_from_str, LoadError, LoadResult};
pub use material::{Color, Material, ShadingParams};
pub use scene::{Camera, PointLight, RenderSettings, Scene, Shape, Surface};
pub use texture::{lookup_texture, Texture, TextureCache, TextureError, TextureWrap};
