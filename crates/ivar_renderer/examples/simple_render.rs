//! Simple path tracer example.
//!
//! Builds a small box lit by an emissive quad and a point light, renders it
//! on all cores and saves to PPM format.

use ivar_core::{Camera, Material, PointLight, Scene, Surface};
use ivar_math::Frame;
use ivar_renderer::{color_to_rgba, render_with_stats, Color, ImageBuffer, Vec3};
use std::fs::File;
use std::io::{BufWriter, Write};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("Ivar Path Tracer - Simple Example");
    println!("=================================");

    let scene = build_scene();
    println!(
        "Rendering {}x{} @ {} spp...",
        scene.settings.width,
        scene.settings.height,
        scene.settings.samples_per_pixel()
    );

    let start = std::time::Instant::now();
    let (image, stats) = render_with_stats(&scene, true);
    println!("Rendered in {:?} ({} rays)", start.elapsed(), stats.total_rays());

    let filename = "output.ppm";
    save_ppm(&image, filename).expect("Failed to save image");
    println!("Saved to {}", filename);
}

fn build_scene() -> Scene {
    let mut scene = Scene::new("simple");
    scene.camera = Camera::look_at(
        Vec3::new(0.0, 1.0, 3.5),
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::Y,
        1.0,
        1.0,
        1.0,
    );
    scene.ambient = Color::ZERO;
    scene.background = Color::ZERO;
    scene.settings.width = 256;
    scene.settings.height = 256;
    scene.settings.samples = 4;
    scene.settings.max_depth = 3;

    let white = Material::diffuse(Color::splat(0.73));
    let red = Material::diffuse(Color::new(0.65, 0.05, 0.05));
    let green = Material::diffuse(Color::new(0.12, 0.45, 0.15));

    // Walls, each facing into the box
    let walls = [
        (Vec3::new(0.0, 0.0, 0.0), Vec3::Y, white.clone()),
        (Vec3::new(0.0, 2.0, 0.0), Vec3::NEG_Y, white.clone()),
        (Vec3::new(0.0, 1.0, -1.0), Vec3::Z, white.clone()),
        (Vec3::new(-1.0, 1.0, 0.0), Vec3::X, red),
        (Vec3::new(1.0, 1.0, 0.0), Vec3::NEG_X, green),
    ];
    for (origin, normal, material) in walls {
        scene.add_surface(Surface::quad(Frame::from_z(origin, normal), 1.0, material));
    }

    // Ceiling lamp just below the ceiling
    scene.add_surface(Surface::quad(
        Frame::from_z(Vec3::new(0.0, 1.99, 0.0), Vec3::NEG_Y),
        0.25,
        Material::emissive(Color::splat(15.0)),
    ));

    scene.add_surface(Surface::sphere(
        Vec3::new(-0.4, 0.35, -0.3),
        0.35,
        Material::glossy(Color::splat(0.2), Color::splat(0.6), 200.0),
    ));
    scene.add_surface(Surface::sphere(
        Vec3::new(0.45, 0.3, 0.2),
        0.3,
        Material {
            diffuse: Color::new(0.2, 0.3, 0.7),
            specular: Color::splat(0.04),
            exponent: 50.0,
            microfacet: true,
            ..Default::default()
        },
    ));

    scene.add_light(PointLight::new(Vec3::new(0.0, 1.5, 0.5), Color::splat(0.5)));

    scene
}

fn save_ppm(image: &ImageBuffer, filename: &str) -> std::io::Result<()> {
    let file = File::create(filename)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "P3")?;
    writeln!(writer, "{} {}", image.width, image.height)?;
    writeln!(writer, "255")?;

    for y in 0..image.height {
        for x in 0..image.width {
            let rgba = color_to_rgba(image.get(x, y));
            writeln!(writer, "{} {} {}", rgba[0], rgba[1], rgba[2])?;
        }
    }

    Ok(())
}
