//! Path tracing light transport.
//!
//! Paths are followed in a loop rather than by recursion, carrying the
//! running attenuation product and the radiance gathered so far.

use crate::material::MaterialCache;
use crate::object::Object;
use crate::trace::Hittable;
use ember_math::{Color, Interval, Ray};
use rand::RngCore;

/// Closest hit distance accepted after a bounce, to avoid self-intersection.
pub const EPSILON: f32 = 0.001;

/// Radiance seen by rays that leave the scene.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Background {
    /// Only emissive materials light the scene.
    #[default]
    Black,
    Solid(Color),
    /// White at the horizon fading to sky blue straight up.
    SkyGradient,
}

impl Background {
    pub fn radiance(&self, ray: &Ray) -> Color {
        match self {
            Background::Black => Color::ZERO,
            Background::Solid(color) => *color,
            Background::SkyGradient => sky_gradient(ray),
        }
    }
}

/// Vertical blend between white and sky blue.
fn sky_gradient(ray: &Ray) -> Color {
    let unit_direction = ray.direction.normalize();
    let a = 0.5 * (unit_direction.y + 1.0);
    let white = Color::new(1.0, 1.0, 1.0);
    let blue = Color::new(0.5, 0.7, 1.0);
    white * (1.0 - a) + blue * a
}

/// Radiance arriving along `ray` after at most `max_depth` surface
/// interactions. Energy beyond the depth limit is dropped.
pub fn trace_path(
    root: &Object,
    materials: &MaterialCache,
    background: &Background,
    ray: Ray,
    max_depth: u32,
    rng: &mut dyn RngCore,
) -> Color {
    let mut ray = ray;
    let mut attenuation = Color::ONE;
    let mut radiance = Color::ZERO;

    for _ in 0..max_depth {
        let surface = root.hit(&ray, Interval::new(EPSILON, f32::INFINITY), rng);
        if !surface.hit {
            return radiance + attenuation * background.radiance(&ray);
        }

        let scatter = materials.get(surface.mat).bsdf(&ray, &surface, rng);
        radiance += attenuation * scatter.emitted;
        attenuation *= scatter.attenuation;
        if scatter.absorbed {
            return radiance;
        }
        ray = scatter.out;
    }

    radiance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{MatId, Material};
    use crate::trace::Trace;
    use ember_math::{Vec3, Xorshift};
    use rand::SeedableRng;

    /// Straightforward recursive form, kept as a reference for the loop.
    fn trace_recursive(
        root: &Object,
        materials: &MaterialCache,
        background: &Background,
        ray: &Ray,
        depth: u32,
        rng: &mut dyn RngCore,
    ) -> Color {
        if depth == 0 {
            return Color::ZERO;
        }
        let surface: Trace = root.hit(ray, Interval::new(EPSILON, f32::INFINITY), rng);
        if !surface.hit {
            return background.radiance(ray);
        }
        let scatter = materials.get(surface.mat).bsdf(ray, &surface, rng);
        if scatter.absorbed {
            return scatter.emitted;
        }
        scatter.emitted
            + scatter.attenuation
                * trace_recursive(root, materials, background, &scatter.out, depth - 1, rng)
    }

    fn furnace() -> (Object, MaterialCache) {
        let mut materials = MaterialCache::new();
        let grey = materials.add(Material::lambertian(Color::splat(0.8)));
        let mirror = materials.add(Material::metal(Color::splat(0.9), 0.1));
        // Closed box seen from inside, no lights
        let scene = Object::list(vec![
            Object::cuboid(Vec3::splat(-5.0), Vec3::splat(5.0), grey),
            Object::sphere(Vec3::ZERO, 1.0, mirror),
        ]);
        (scene, materials)
    }

    #[test]
    fn test_closed_unlit_scene_is_black() {
        let (scene, materials) = furnace();
        let mut rng = Xorshift::seed_from_u64(1);
        for _ in 0..500 {
            let dir = ember_math::random_unit_vector(&mut rng);
            let ray = Ray::new(Vec3::new(0.0, 0.0, 3.0), dir, 0.0);
            let c = trace_path(&scene, &materials, &Background::SkyGradient, ray, 8, &mut rng);
            assert_eq!(c, Color::ZERO);
        }
    }

    #[test]
    fn test_miss_returns_background() {
        let materials = MaterialCache::new();
        let empty = Object::list(vec![]);
        let ray = Ray::new(Vec3::ZERO, Vec3::Y, 0.0);
        let mut rng = Xorshift::new();

        let black = trace_path(&empty, &materials, &Background::Black, ray, 5, &mut rng);
        assert_eq!(black, Color::ZERO);

        let solid_bg = Background::Solid(Color::new(0.1, 0.2, 0.3));
        let solid = trace_path(&empty, &materials, &solid_bg, ray, 5, &mut rng);
        assert_eq!(solid, Color::new(0.1, 0.2, 0.3));

        let sky = trace_path(&empty, &materials, &Background::SkyGradient, ray, 5, &mut rng);
        assert!((sky - Color::new(0.5, 0.7, 1.0)).length() < 1e-5);
    }

    #[test]
    fn test_light_terminates_path() {
        let mut materials = MaterialCache::new();
        let light = materials.add(Material::diffuse_light(Color::splat(3.0)));
        let scene = Object::sphere(Vec3::new(0.0, 0.0, -3.0), 1.0, light);
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z, 0.0);

        // The sky behind the light must not leak through
        let sky = Background::SkyGradient;
        let c = trace_path(&scene, &materials, &sky, ray, 5, &mut Xorshift::new());
        assert_eq!(c, Color::splat(3.0));
    }

    #[test]
    fn test_zero_depth_gathers_nothing() {
        let materials = MaterialCache::new();
        let ray = Ray::new(Vec3::ZERO, Vec3::Y, 0.0);
        let empty = Object::list(vec![]);
        let sky = Background::SkyGradient;
        let c = trace_path(&empty, &materials, &sky, ray, 0, &mut Xorshift::new());
        assert_eq!(c, Color::ZERO);
    }

    #[test]
    fn test_loop_matches_recursion() {
        let mut materials = MaterialCache::new();
        let ground = materials.add(Material::lambertian(Color::splat(0.5)));
        let glass = materials.add(Material::dielectric(1.5));
        let light = materials.add(Material::diffuse_light(Color::new(4.0, 3.0, 2.0)));
        let scene = Object::list(vec![
            Object::sphere(Vec3::new(0.0, -100.5, -1.0), 100.0, ground),
            Object::sphere(Vec3::new(0.0, 0.0, -1.0), 0.5, glass),
            Object::rect_xz(-1.0, 1.0, -2.0, 0.0, 2.0, light),
            Object::sphere(Vec3::new(1.0, 0.0, -1.0), 0.5, MatId::FALLBACK),
        ]);
        let background = Background::SkyGradient;

        let mut rays = Xorshift::seed_from_u64(3);
        for seed in 0..200 {
            let dir = Vec3::new(
                ember_math::gen_f32(&mut rays) - 0.5,
                ember_math::gen_f32(&mut rays) - 0.5,
                -1.0,
            );
            let ray = Ray::new(Vec3::ZERO, dir, 0.0);

            let mut a = Xorshift::seed_from_u64(seed);
            let mut b = a.clone();
            let iterative = trace_path(&scene, &materials, &background, ray, 6, &mut a);
            let recursive = trace_recursive(&scene, &materials, &background, &ray, 6, &mut b);
            assert!((iterative - recursive).length() < 1e-4, "{iterative} vs {recursive}");
        }
    }
}
