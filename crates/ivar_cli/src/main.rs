//! `ivar` - render a JSON scene to PNG.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use ivar_renderer::ImageBuffer;

/// Monte Carlo path tracer.
#[derive(Debug, Parser)]
#[command(name = "ivar", author, version, about)]
struct Args {
    /// Scene description (JSON).
    scene: PathBuf,

    /// Output image; defaults to the scene path with a `.png` extension.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Image height in pixels; the width follows the camera aspect.
    #[arg(short, long)]
    resolution: Option<u32>,

    /// Render on the calling thread only.
    #[arg(long)]
    single_thread: bool,

    /// Override samples per pixel along each axis.
    #[arg(long)]
    samples: Option<u32>,

    /// Override the random seed.
    #[arg(long)]
    seed: Option<u64>,
}

impl Args {
    fn output_path(&self) -> PathBuf {
        match &self.output {
            Some(path) => path.clone(),
            None => self.scene.with_extension("png"),
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let output = args.output_path();

    let start = Instant::now();
    let mut scene = ivar_core::load_scene(&args.scene)
        .with_context(|| format!("Failed to load scene {}", args.scene.display()))?;
    log::info!(
        "Loaded '{}' in {:.2?}: {} surfaces, {} lights",
        scene.name,
        start.elapsed(),
        scene.surfaces.len(),
        scene.lights.len()
    );

    if let Some(height) = args.resolution {
        anyhow::ensure!(height > 0, "resolution must be positive");
        scene.set_resolution(height);
    }
    if let Some(samples) = args.samples {
        anyhow::ensure!(samples > 0, "samples must be positive");
        scene.settings.samples = samples;
    }
    if let Some(seed) = args.seed {
        scene.settings.seed = seed;
    }

    let image = ivar_renderer::render(&scene, !args.single_thread);

    save_png(&image, &output).with_context(|| format!("Failed to save {}", output.display()))?;
    log::info!("Saved {}", output.display());

    Ok(())
}

fn save_png(image: &ImageBuffer, path: &Path) -> Result<()> {
    let rgba = image::RgbaImage::from_raw(image.width, image.height, image.to_rgba())
        .context("Image buffer size does not match its dimensions")?;
    rgba.save(path)?;
    Ok(())
}
