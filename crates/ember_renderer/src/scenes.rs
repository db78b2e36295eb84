//! Built-in demo scenes.

use crate::camera::Camera;
use crate::integrator::Background;
use crate::material::{Material, MaterialCache};
use crate::object::Object;
use crate::scene::Scene;
use crate::sphere::Sphere;
use ember_core::{Perlin, Texture};
use ember_math::{gen_f32, Color, Interval, Vec3};
use log::info;
use rand::RngCore;
use std::sync::Arc;

/// Camera shared by the outdoor sphere scenes.
fn outdoor_camera(width: u32, height: u32, vfov: f32, aperture: f32) -> Camera {
    let look_from = Vec3::new(13.0, 2.0, 3.0);
    let look_at = Vec3::ZERO;
    let mut camera = Camera::new()
        .with_resolution(width, height)
        .with_position(look_from, look_at, Vec3::Y)
        .with_lens(vfov, aperture, (look_from - look_at).length())
        .with_shutter(0.0, 1.0);
    camera.initialize();
    camera
}

/// A field of small random spheres around three large ones, on a checker
/// ground.
///
/// The small spheres are packed into SIMD lanes under a BVH. Roughly 80% are
/// diffuse, 15% metal and 5% glass.
pub fn random_spheres(width: u32, height: u32, rng: &mut dyn RngCore) -> Scene {
    let camera = outdoor_camera(width, height, 20.0, 0.1);
    let (time0, time1) = camera.shutter();

    let mut materials = MaterialCache::new();
    let checker = Texture::checker(
        Texture::constant(Color::new(0.2, 0.3, 0.1)),
        Texture::constant(Color::splat(0.9)),
    );
    let ground = materials.add(Material::lambertian(checker));
    let glass = materials.add(Material::dielectric(1.5));

    let mut spheres = Vec::new();
    let mut movers = Vec::new();
    for a in -11..11 {
        for b in -11..11 {
            let choose_mat = gen_f32(rng);
            let center = Vec3::new(
                a as f32 + 0.9 * gen_f32(rng),
                0.2,
                b as f32 + 0.9 * gen_f32(rng),
            );

            if (center - Vec3::new(4.0, 0.2, 0.0)).length() <= 0.9 {
                continue;
            }

            if choose_mat < 0.8 {
                let albedo = Color::new(
                    gen_f32(rng) * gen_f32(rng),
                    gen_f32(rng) * gen_f32(rng),
                    gen_f32(rng) * gen_f32(rng),
                );
                let mat = materials.add(Material::lambertian(albedo));
                // One in eight diffuse spheres bounces during the shutter
                if gen_f32(rng) < 0.125 {
                    let center1 = center + Vec3::new(0.0, 0.5 * gen_f32(rng), 0.0);
                    movers.push(Object::moving_sphere(center, center1, time0, time1, 0.2, mat));
                } else {
                    spheres.push(Object::sphere(center, 0.2, mat));
                }
            } else if choose_mat < 0.95 {
                let albedo = Color::new(
                    0.5 * (1.0 + gen_f32(rng)),
                    0.5 * (1.0 + gen_f32(rng)),
                    0.5 * (1.0 + gen_f32(rng)),
                );
                let mat = materials.add(Material::metal(albedo, 0.5 * gen_f32(rng)));
                spheres.push(Object::sphere(center, 0.2, mat));
            } else {
                spheres.push(Object::sphere(center, 0.2, glass));
            }
        }
    }

    let brown = materials.add(Material::lambertian(Color::new(0.4, 0.2, 0.1)));
    let mirror = materials.add(Material::metal(Color::new(0.7, 0.6, 0.5), 0.0));
    spheres.push(Object::sphere(Vec3::new(0.0, 1.0, 0.0), 1.0, glass));
    spheres.push(Object::sphere(Vec3::new(-4.0, 1.0, 0.0), 1.0, brown));
    spheres.push(Object::sphere(Vec3::new(4.0, 1.0, 0.0), 1.0, mirror));

    let time = Interval::new(time0, time1);
    let sphere_count = spheres.len();
    let mover_count = movers.len();
    let root = Object::list(vec![
        Object::sphere(Vec3::new(0.0, -1000.0, 0.0), 1000.0, ground),
        Object::bvh_lanes(spheres, time, rng),
        Object::bvh(movers, time, rng),
    ]);

    info!(
        "Built random spheres scene: {} static and {} moving spheres, {} materials",
        sphere_count,
        mover_count,
        materials.len()
    );

    Scene::new(root, materials, camera).with_background(Background::SkyGradient)
}

/// Four spheres in a single lane plus one moving sphere.
pub fn simple_lanes(width: u32, height: u32) -> Scene {
    let camera = outdoor_camera(width, height, 60.0, 0.1);
    let (time0, time1) = camera.shutter();

    let mut materials = MaterialCache::new();
    let grey = materials.add(Material::lambertian(Color::splat(0.5)));
    let brown = materials.add(Material::lambertian(Color::new(0.4, 0.2, 0.1)));
    let mirror = materials.add(Material::metal(Color::new(0.7, 0.6, 0.5), 0.0));
    let glass = materials.add(Material::dielectric(1.5));

    let lane = Object::sphere_lane(&[
        Sphere::new(Vec3::new(0.0, -1000.0, 0.0), 1000.0, grey),
        Sphere::new(Vec3::new(0.0, 1.0, 0.0), 1.0, glass),
        Sphere::new(Vec3::new(-4.0, 1.0, 0.0), 1.0, brown),
        Sphere::new(Vec3::new(4.0, 1.0, 0.0), 1.0, mirror),
    ]);
    let mover = Object::moving_sphere(
        Vec3::new(6.0, 1.0, -2.0),
        Vec3::new(6.0, 1.25, -2.0),
        time0,
        time1,
        0.5,
        brown,
    );

    info!("Built simple lanes scene: {} materials", materials.len());

    Scene::new(Object::list(vec![lane, mover]), materials, camera)
        .with_background(Background::SkyGradient)
}

/// Cornell box holding two rotated blocks of smoke, lit from the ceiling.
pub fn cornell_smoke(width: u32, height: u32) -> Scene {
    let mut camera = Camera::new()
        .with_resolution(width, height)
        .with_position(Vec3::new(278.0, 278.0, -800.0), Vec3::new(278.0, 278.0, 0.0), Vec3::Y)
        .with_lens(40.0, 0.0, 10.0);
    camera.initialize();

    let mut materials = MaterialCache::new();
    let red = materials.add(Material::lambertian(Color::new(0.65, 0.05, 0.05)));
    let white = materials.add(Material::lambertian(Color::splat(0.73)));
    let green = materials.add(Material::lambertian(Color::new(0.12, 0.45, 0.15)));
    let light = materials.add(Material::diffuse_light(Color::splat(7.0)));
    let dark_fog = materials.add(Material::isotropic(Color::ZERO));
    let light_fog = materials.add(Material::isotropic(Color::ONE));

    let tall = Object::translate(
        Object::rotate_y(Object::cuboid(Vec3::ZERO, Vec3::new(165.0, 330.0, 165.0), white), 15.0),
        Vec3::new(265.0, 0.0, 295.0),
    );
    let short = Object::translate(
        Object::rotate_y(Object::cuboid(Vec3::ZERO, Vec3::splat(165.0), white), -18.0),
        Vec3::new(130.0, 0.0, 65.0),
    );

    let root = Object::list(vec![
        Object::rect_yz(0.0, 555.0, 0.0, 555.0, 555.0, green),
        Object::rect_yz(0.0, 555.0, 0.0, 555.0, 0.0, red),
        Object::rect_xz(113.0, 443.0, 127.0, 432.0, 554.0, light),
        Object::rect_xz(0.0, 555.0, 0.0, 555.0, 555.0, white),
        Object::rect_xz(0.0, 555.0, 0.0, 555.0, 0.0, white),
        Object::rect_xy(0.0, 555.0, 0.0, 555.0, 555.0, white),
        Object::volume(tall, 0.01, dark_fog),
        Object::volume(short, 0.01, light_fog),
    ]);

    info!("Built cornell smoke scene: {} materials", materials.len());

    Scene::new(root, materials, camera)
}

/// Two spheres wearing a Perlin turbulence marble texture.
pub fn perlin_spheres(width: u32, height: u32, rng: &mut dyn RngCore) -> Scene {
    let camera = outdoor_camera(width, height, 20.0, 0.0);

    let mut materials = MaterialCache::new();
    let marble = Texture::noise(Arc::new(Perlin::new(rng)), 4.0);
    let mat = materials.add(Material::lambertian(marble));

    let root = Object::list(vec![
        Object::sphere(Vec3::new(0.0, -1000.0, 0.0), 1000.0, mat),
        Object::sphere(Vec3::new(0.0, 2.0, 0.0), 2.0, mat),
    ]);

    info!("Built perlin spheres scene");

    Scene::new(root, materials, camera).with_background(Background::SkyGradient)
}
