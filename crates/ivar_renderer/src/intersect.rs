//! Ray/primitive intersection and scene queries.
//!
//! The scene is scanned linearly; there is no acceleration structure.

use std::f32::consts::PI;

use ivar_core::{Material, Scene, Shape, Surface};
use ivar_math::{Frame, Interval, Ray, Vec2, Vec3};

/// Information about a ray-surface hit.
#[derive(Debug, Clone, Copy)]
pub struct Intersection<'a> {
    /// Ray parameter at the hit
    pub t: f32,

    /// Hit point in world space
    pub position: Vec3,

    /// Unit geometric normal
    pub normal: Vec3,

    /// Surface texture coordinate
    pub texcoord: Vec2,

    /// Material of the surface that was hit
    pub material: &'a Material,
}

/// Intersect a ray with a single surface over the ray's own range.
pub fn intersect_surface<'a>(surface: &'a Surface, ray: &Ray) -> Option<Intersection<'a>> {
    hit_surface(surface, ray, ray.range())
}

/// Find the closest hit along the ray, if any.
pub fn closest_hit<'a>(scene: &'a Scene, ray: &Ray) -> Option<Intersection<'a>> {
    let mut range = ray.range();
    let mut closest = None;

    for surface in &scene.surfaces {
        if let Some(hit) = hit_surface(surface, ray, range) {
            range = range.with_max(hit.t);
            closest = Some(hit);
        }
    }

    closest
}

/// Check whether anything blocks the ray inside its range.
///
/// Returns as soon as one hit is found.
pub fn any_hit(scene: &Scene, ray: &Ray) -> bool {
    let range = ray.range();
    if range.is_empty() {
        return false;
    }
    scene
        .surfaces
        .iter()
        .any(|surface| hit_surface(surface, ray, range).is_some())
}

#[inline]
fn hit_surface<'a>(surface: &'a Surface, ray: &Ray, range: Interval) -> Option<Intersection<'a>> {
    let (t, position, normal, texcoord) = match surface.shape {
        Shape::Sphere { radius } => hit_sphere(&surface.frame, radius, ray, range)?,
        Shape::Quad { radius } => hit_quad(&surface.frame, radius, ray, range)?,
    };

    Some(Intersection {
        t,
        position,
        normal,
        texcoord,
        material: &surface.material,
    })
}

type Hit = (f32, Vec3, Vec3, Vec2);

fn hit_sphere(frame: &Frame, radius: f32, ray: &Ray, range: Interval) -> Option<Hit> {
    let center = frame.origin;
    let oc = center - ray.origin();
    let a = ray.direction().length_squared();
    let h = ray.direction().dot(oc);
    let c = oc.length_squared() - radius * radius;

    let discriminant = h * h - a * c;
    if discriminant < 0.0 {
        return None;
    }

    let sqrtd = discriminant.sqrt();

    // Find the nearest root that lies in the acceptable range
    let mut root = (h - sqrtd) / a;
    if !range.contains(root) {
        root = (h + sqrtd) / a;
        if !range.contains(root) {
            return None;
        }
    }

    let position = ray.at(root);
    let normal = (position - center) / radius;
    let texcoord = sphere_uv(frame.inverse_transform_direction(normal));

    Some((root, position, normal, texcoord))
}

/// Spherical texture coordinates for a point on the unit sphere.
///
/// u: angle around the Y axis from X=-1, in [0, 1]
/// v: angle from Y=-1 to Y=+1, in [0, 1]
fn sphere_uv(p: Vec3) -> Vec2 {
    let theta = (-p.y).clamp(-1.0, 1.0).acos();
    let phi = (-p.z).atan2(p.x) + PI;
    Vec2::new(phi / (2.0 * PI), theta / PI)
}

fn hit_quad(frame: &Frame, radius: f32, ray: &Ray, range: Interval) -> Option<Hit> {
    let origin = frame.inverse_transform_point(ray.origin());
    let direction = frame.inverse_transform_direction(ray.direction());

    // Parallel to the plane
    if direction.z == 0.0 {
        return None;
    }

    let t = -origin.z / direction.z;
    if !range.contains(t) {
        return None;
    }

    let local = origin + direction * t;
    if !(local.x.abs() < radius && local.y.abs() < radius) {
        return None;
    }

    let texcoord = Vec2::new(
        local.x / (2.0 * radius) + 0.5,
        local.y / (2.0 * radius) + 0.5,
    );

    Some((t, ray.at(t), frame.z, texcoord))
}
