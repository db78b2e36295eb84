//! Sphere primitives.

use crate::material::MatId;
use crate::trace::{Hittable, Trace};
use ember_math::{Aabb, Interval, Ray, Vec2, Vec3};
use rand::RngCore;
use std::f32::consts::{FRAC_PI_2, PI};

/// A static sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
    pub mat: MatId,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32, mat: MatId) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
            mat,
        }
    }

    /// Texture coordinates of a point on the unit sphere.
    pub fn uv(p: Vec3) -> Vec2 {
        let u = 1.0 - (p.z.atan2(p.x) + PI) / (2.0 * PI);
        let v = (p.y.clamp(-1.0, 1.0).asin() + FRAC_PI_2) / PI;
        Vec2::new(u, v)
    }
}

/// Quadratic solve shared by static and moving spheres.
#[inline]
pub(crate) fn hit_sphere(
    center: Vec3,
    radius: f32,
    mat: MatId,
    ray: &Ray,
    ray_t: Interval,
) -> Trace {
    let rel_pos = ray.origin - center;
    let a = ray.direction.length_squared();
    let b = 2.0 * rel_pos.dot(ray.direction);
    let c = rel_pos.length_squared() - radius * radius;
    let discriminant = b * b - 4.0 * a * c;

    if discriminant <= 0.0 {
        return Trace::MISS;
    }

    let sqrt_d = discriminant.sqrt();
    let near = (-b - sqrt_d) / (2.0 * a);
    let far = (-b + sqrt_d) / (2.0 * a);

    let t = if ray_t.contains(near) {
        near
    } else if ray_t.contains(far) {
        far
    } else {
        return Trace::MISS;
    };

    let pos = ray.at(t);
    let normal = (pos - center) / radius;
    Trace {
        hit: true,
        t,
        mat,
        pos,
        normal,
        uv: Sphere::uv(normal),
    }
}

impl Hittable for Sphere {
    fn hit(&self, ray: &Ray, ray_t: Interval, _rng: &mut dyn RngCore) -> Trace {
        hit_sphere(self.center, self.radius, self.mat, ray, ray_t)
    }

    fn bounding_box(&self, _time: Interval) -> Aabb {
        let r = Vec3::splat(self.radius);
        Aabb::from_points(self.center - r, self.center + r)
    }
}

/// A sphere whose centre moves linearly from `center0` at `time0` to
/// `center1` at `time1`, extrapolating outside that window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovingSphere {
    pub center0: Vec3,
    pub center1: Vec3,
    pub time0: f32,
    pub time1: f32,
    pub radius: f32,
    pub mat: MatId,
}

impl MovingSphere {
    pub fn new(
        center0: Vec3,
        center1: Vec3,
        time0: f32,
        time1: f32,
        radius: f32,
        mat: MatId,
    ) -> Self {
        Self {
            center0,
            center1,
            time0,
            time1,
            radius: radius.max(0.0),
            mat,
        }
    }

    pub fn center(&self, time: f32) -> Vec3 {
        let duration = self.time1 - self.time0;
        if duration <= 0.0 {
            return self.center0;
        }
        self.center0.lerp(self.center1, (time - self.time0) / duration)
    }
}

impl Hittable for MovingSphere {
    fn hit(&self, ray: &Ray, ray_t: Interval, _rng: &mut dyn RngCore) -> Trace {
        hit_sphere(self.center(ray.time), self.radius, self.mat, ray, ray_t)
    }

    fn bounding_box(&self, time: Interval) -> Aabb {
        let r = Vec3::splat(self.radius);
        let (c0, c1) = (self.center(time.min), self.center(time.max));
        Aabb::enclose(
            &Aabb::from_points(c0 - r, c0 + r),
            &Aabb::from_points(c1 - r, c1 + r),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_math::Xorshift;

    const FORWARD: Interval = Interval::new(0.001, f32::INFINITY);

    #[test]
    fn test_sphere_hit_distance_and_normal() {
        let mut rng = Xorshift::new();
        for (d, r) in [(5.0, 1.0), (10.0, 2.5), (3.0, 0.5)] {
            let sphere = Sphere::new(Vec3::ZERO, r, MatId(3));
            let ray = Ray::new(Vec3::new(0.0, 0.0, -d), Vec3::Z, 0.0);
            let trace = sphere.hit(&ray, FORWARD, &mut rng);

            assert!(trace.hit);
            assert!((trace.t - (d - r)).abs() < 1e-4);
            assert_eq!(trace.mat, MatId(3));
            assert!((trace.normal - trace.pos / r).length() < 1e-5);
            assert!((trace.normal.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_sphere_no_false_hits() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, MatId(1));
        let mut rng = Xorshift::new();

        // Closest approach is 0.6 > radius
        let ray = Ray::new(Vec3::new(0.6, 0.0, 0.0), Vec3::NEG_Z, 0.0);
        assert!(!sphere.hit(&ray, FORWARD, &mut rng).hit);

        // Pointing away
        let ray = Ray::new(Vec3::ZERO, Vec3::Y, 0.0);
        assert!(!sphere.hit(&ray, FORWARD, &mut rng).hit);
    }

    #[test]
    fn test_sphere_inside_uses_far_root() {
        let sphere = Sphere::new(Vec3::ZERO, 2.0, MatId(1));
        let ray = Ray::new(Vec3::ZERO, Vec3::X, 0.0);
        let trace = sphere.hit(&ray, FORWARD, &mut Xorshift::new());
        assert!(trace.hit);
        assert!((trace.t - 2.0).abs() < 1e-5);
        // Outward, not facing the ray
        assert!((trace.normal - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_sphere_respects_interval() {
        let sphere = Sphere::new(Vec3::ZERO, 1.0, MatId(1));
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z, 0.0);
        let trace = sphere.hit(&ray, Interval::new(0.001, 3.0), &mut Xorshift::new());
        assert!(!trace.hit);
    }

    #[test]
    fn test_sphere_uv() {
        let uv = Sphere::uv(Vec3::Y);
        assert!((uv.y - 1.0).abs() < 1e-5);
        let uv = Sphere::uv(Vec3::NEG_Y);
        assert!(uv.y.abs() < 1e-5);

        let uv = Sphere::uv(Vec3::X);
        assert!((uv.x - 0.5).abs() < 1e-5);
        assert!((uv.y - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_moving_sphere_follows_ray_time() {
        let end = Vec3::new(10.0, 0.0, 0.0);
        let sphere = MovingSphere::new(Vec3::ZERO, end, 0.0, 1.0, 1.0, MatId(1));
        let mut rng = Xorshift::new();

        let early = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z, 0.0);
        assert!(sphere.hit(&early, FORWARD, &mut rng).hit);

        let late = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z, 1.0);
        assert!(!sphere.hit(&late, FORWARD, &mut rng).hit);

        let late = Ray::new(Vec3::new(10.0, 0.0, -5.0), Vec3::Z, 1.0);
        assert!(sphere.hit(&late, FORWARD, &mut rng).hit);
    }

    #[test]
    fn test_moving_sphere_box_covers_sweep() {
        let end = Vec3::new(10.0, 0.0, 0.0);
        let sphere = MovingSphere::new(Vec3::ZERO, end, 0.0, 1.0, 1.0, MatId(1));
        let bbox = sphere.bounding_box(Interval::new(0.0, 1.0));
        assert!(bbox.min.x <= -1.0);
        assert!(bbox.max.x >= 11.0);
    }
}
