//! Homogeneous participating media.

use crate::material::MatId;
use crate::object::Object;
use crate::trace::{Hittable, Trace};
use ember_math::{gen_f32, Aabb, Interval, Ray, Vec2, Vec3};
use rand::RngCore;

/// Constant-density fog filling a closed boundary object.
///
/// Scattering events are placed by sampling a free-flight distance, so the
/// same ray can hit at different depths or pass through entirely.
#[derive(Debug, Clone)]
pub struct ConstantMedium {
    boundary: Box<Object>,
    neg_inv_density: f32,
    /// Phase function, normally isotropic
    mat: MatId,
}

impl ConstantMedium {
    pub fn new(boundary: Object, density: f32, mat: MatId) -> Self {
        Self {
            boundary: Box::new(boundary),
            neg_inv_density: -1.0 / density,
            mat,
        }
    }
}

impl Hittable for ConstantMedium {
    fn hit(&self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Trace {
        let enter = self.boundary.hit(ray, Interval::UNIVERSE, rng);
        if !enter.hit {
            return Trace::MISS;
        }
        let exit = self
            .boundary
            .hit(ray, Interval::new(enter.t + 0.0001, f32::INFINITY), rng);
        if !exit.hit {
            return Trace::MISS;
        }

        let t_enter = enter.t.max(ray_t.min).max(0.0);
        let t_exit = exit.t.min(ray_t.max);
        if t_enter >= t_exit {
            return Trace::MISS;
        }

        let ray_length = ray.direction.length();
        let distance_inside = (t_exit - t_enter) * ray_length;
        let hit_distance = self.neg_inv_density * gen_f32(rng).ln();
        if hit_distance > distance_inside {
            return Trace::MISS;
        }

        let t = t_enter + hit_distance / ray_length;
        Trace {
            hit: true,
            t,
            mat: self.mat,
            pos: ray.at(t),
            // Arbitrary; isotropic scattering ignores it
            normal: Vec3::X,
            uv: Vec2::ZERO,
        }
    }

    fn bounding_box(&self, time: Interval) -> Aabb {
        self.boundary.bounding_box(time)
    }
}
