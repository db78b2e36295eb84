//! `LANE_WIDTH` spheres intersected in one pass.
//!
//! Centres and radii are stored structure-of-lanes so the quadratic is
//! evaluated for every sphere at once; only the winning lane is touched in
//! scalar code afterwards.

use crate::material::MatId;
use crate::sphere::Sphere;
use crate::trace::{Hittable, Trace};
use ember_math::{hmin, Aabb, F32Lane, Interval, Ray, V3Lane, Vec3, LANE_WIDTH};
use rand::RngCore;
use wide::{CmpGe, CmpGt, CmpLe};

/// A full batch of spheres. Unused slots hold copies of a real sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereLane {
    centers: V3Lane,
    radii: F32Lane,
    mats: [MatId; LANE_WIDTH],
}

impl SphereLane {
    /// Pack up to `LANE_WIDTH` spheres, duplicating the last to fill the lane.
    ///
    /// # Panics
    ///
    /// If `spheres` is empty or longer than `LANE_WIDTH`.
    pub fn new(spheres: &[Sphere]) -> Self {
        let mut builder = SphereLaneBuilder::new();
        for sphere in spheres {
            builder.push(*sphere);
        }
        builder.finish()
    }

    /// The sphere stored in slot `i`.
    pub fn get(&self, i: usize) -> Sphere {
        Sphere::new(self.centers.get(i), self.radii.to_array()[i], self.mats[i])
    }
}

impl Hittable for SphereLane {
    fn hit(&self, ray: &Ray, ray_t: Interval, _rng: &mut dyn RngCore) -> Trace {
        let rel_pos = V3Lane::splat(ray.origin) - self.centers;
        let dir = V3Lane::splat(ray.direction);

        let a = dir.length_squared();
        let b = F32Lane::splat(2.0) * rel_pos.dot(&dir);
        let c = rel_pos.length_squared() - self.radii * self.radii;
        let d = b * b - F32Lane::splat(4.0) * a * c;

        let real_mask = d.cmp_gt(F32Lane::ZERO);
        if real_mask.none() {
            return Trace::MISS;
        }

        let sqrt_d = d.sqrt();
        let two_a = F32Lane::splat(2.0) * a;
        let near = (-b - sqrt_d) / two_a;
        let far = (-b + sqrt_d) / two_a;

        let t_min = F32Lane::splat(ray_t.min);
        let t_max = F32Lane::splat(ray_t.max);
        // NaN roots from negative discriminants fail both compares
        let near_mask = real_mask & near.cmp_ge(t_min) & near.cmp_le(t_max);
        let far_mask = real_mask & far.cmp_ge(t_min) & far.cmp_le(t_max);
        if (near_mask | far_mask).none() {
            return Trace::MISS;
        }

        let none = F32Lane::splat(f32::INFINITY);
        let t = near_mask.blend(near, none).min(far_mask.blend(far, none));
        let t_hit = hmin(t);

        let lanes = t.to_array();
        let idx = lanes.iter().position(|&ti| ti == t_hit).unwrap_or(0);
        let center = self.centers.get(idx);
        let radius = self.radii.to_array()[idx];

        let pos = ray.at(t_hit);
        let normal = (pos - center) / radius;
        Trace {
            hit: true,
            t: t_hit,
            mat: self.mats[idx],
            pos,
            normal,
            uv: Sphere::uv(normal),
        }
    }

    fn bounding_box(&self, _time: Interval) -> Aabb {
        let min = (self.centers - self.radii).hmin();
        let max = (self.centers + self.radii).hmax();
        Aabb::from_points(min, max)
    }
}

/// Accumulates spheres one at a time into a [`SphereLane`].
#[derive(Debug, Clone)]
pub struct SphereLaneBuilder {
    spheres: [Sphere; LANE_WIDTH],
    len: usize,
}

impl SphereLaneBuilder {
    pub fn new() -> Self {
        Self {
            spheres: [Sphere::new(Vec3::ZERO, 0.0, MatId::FALLBACK); LANE_WIDTH],
            len: 0,
        }
    }

    /// # Panics
    ///
    /// If the lane is already full.
    pub fn push(&mut self, sphere: Sphere) {
        assert!(self.len < LANE_WIDTH, "sphere lane holds at most {LANE_WIDTH} spheres");
        self.spheres[self.len] = sphere;
        self.len += 1;
    }

    pub fn is_full(&self) -> bool {
        self.len == LANE_WIDTH
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Build the lane and reset the builder.
    ///
    /// # Panics
    ///
    /// If nothing was pushed.
    pub fn finish(&mut self) -> SphereLane {
        assert!(!self.is_empty(), "cannot finish an empty sphere lane");
        let last = self.spheres[self.len - 1];
        for slot in &mut self.spheres[self.len..] {
            *slot = last;
        }

        let lane = SphereLane {
            centers: V3Lane::from_array(self.spheres.map(|s| s.center)),
            radii: F32Lane::from(self.spheres.map(|s| s.radius)),
            mats: self.spheres.map(|s| s.mat),
        };
        self.len = 0;
        lane
    }
}

impl Default for SphereLaneBuilder {
    fn default() -> Self {
        Self::new()
    }
}
