//! Axis-aligned rectangles and the boxes built from them.

use crate::material::MatId;
use crate::trace::{Hittable, Trace};
use ember_math::{Aabb, Interval, Ray, Vec2, Vec3};
use rand::RngCore;

/// Which coordinate plane a rectangle lies in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plane {
    /// Fixed z; spans x and y
    XY,
    /// Fixed y; spans x and z
    XZ,
    /// Fixed x; spans y and z
    YZ,
}

impl Plane {
    /// (first free axis, second free axis, fixed axis)
    #[inline]
    fn axes(self) -> (usize, usize, usize) {
        match self {
            Plane::XY => (0, 1, 2),
            Plane::XZ => (0, 2, 1),
            Plane::YZ => (1, 2, 0),
        }
    }
}

/// Rectangle `[a0, a1] x [b0, b1]` at offset `k` along the plane's normal axis.
///
/// Double-sided: the reported normal always faces the incoming ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub plane: Plane,
    pub a0: f32,
    pub a1: f32,
    pub b0: f32,
    pub b1: f32,
    pub k: f32,
    pub mat: MatId,
}

impl Rect {
    pub fn xy(x0: f32, x1: f32, y0: f32, y1: f32, z: f32, mat: MatId) -> Self {
        Self::new(Plane::XY, x0, x1, y0, y1, z, mat)
    }

    pub fn xz(x0: f32, x1: f32, z0: f32, z1: f32, y: f32, mat: MatId) -> Self {
        Self::new(Plane::XZ, x0, x1, z0, z1, y, mat)
    }

    pub fn yz(y0: f32, y1: f32, z0: f32, z1: f32, x: f32, mat: MatId) -> Self {
        Self::new(Plane::YZ, y0, y1, z0, z1, x, mat)
    }

    fn new(plane: Plane, a0: f32, a1: f32, b0: f32, b1: f32, k: f32, mat: MatId) -> Self {
        Self {
            plane,
            a0: a0.min(a1),
            a1: a0.max(a1),
            b0: b0.min(b1),
            b1: b0.max(b1),
            k,
            mat,
        }
    }
}

impl Hittable for Rect {
    fn hit(&self, ray: &Ray, ray_t: Interval, _rng: &mut dyn RngCore) -> Trace {
        let (ia, ib, ik) = self.plane.axes();

        let t = (self.k - ray.origin[ik]) / ray.direction[ik];
        // Rays parallel to the plane give an infinite or NaN t
        if !t.is_finite() || !ray_t.contains(t) {
            return Trace::MISS;
        }

        let pos = ray.at(t);
        let (a, b) = (pos[ia], pos[ib]);
        if a < self.a0 || a > self.a1 || b < self.b0 || b > self.b1 {
            return Trace::MISS;
        }

        let mut normal = Vec3::ZERO;
        normal[ik] = if ray.direction[ik] > 0.0 { -1.0 } else { 1.0 };

        Trace {
            hit: true,
            t,
            mat: self.mat,
            pos,
            normal,
            uv: Vec2::new(
                (a - self.a0) / (self.a1 - self.a0),
                (b - self.b0) / (self.b1 - self.b0),
            ),
        }
    }

    fn bounding_box(&self, _time: Interval) -> Aabb {
        let (ia, ib, ik) = self.plane.axes();
        let mut min = Vec3::ZERO;
        let mut max = Vec3::ZERO;
        min[ia] = self.a0;
        max[ia] = self.a1;
        min[ib] = self.b0;
        max[ib] = self.b1;
        min[ik] = self.k;
        max[ik] = self.k;
        Aabb::from_points(min, max)
    }
}

/// Axis-aligned box made of six rectangles sharing one material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cuboid {
    min: Vec3,
    max: Vec3,
    sides: [Rect; 6],
}

impl Cuboid {
    pub fn new(a: Vec3, b: Vec3, mat: MatId) -> Self {
        let (min, max) = (a.min(b), a.max(b));
        let sides = [
            Rect::xy(min.x, max.x, min.y, max.y, max.z, mat),
            Rect::xy(min.x, max.x, min.y, max.y, min.z, mat),
            Rect::xz(min.x, max.x, min.z, max.z, max.y, mat),
            Rect::xz(min.x, max.x, min.z, max.z, min.y, mat),
            Rect::yz(min.y, max.y, min.z, max.z, max.x, mat),
            Rect::yz(min.y, max.y, min.z, max.z, min.x, mat),
        ];
        Self { min, max, sides }
    }
}

impl Hittable for Cuboid {
    fn hit(&self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Trace {
        let mut best = Trace::MISS;
        let mut closest = ray_t.max;
        for side in &self.sides {
            let trace = side.hit(ray, ray_t.with_max(closest), rng);
            if trace.hit {
                closest = trace.t;
                best = trace;
            }
        }
        best
    }

    fn bounding_box(&self, _time: Interval) -> Aabb {
        Aabb::from_points(self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_math::Xorshift;

    const FORWARD: Interval = Interval::new(0.001, f32::INFINITY);

    #[test]
    fn test_rect_hit_and_uv() {
        let rect = Rect::xy(0.0, 2.0, 0.0, 4.0, -5.0, MatId(2));
        let ray = Ray::new(Vec3::new(0.5, 3.0, 0.0), Vec3::NEG_Z, 0.0);
        let trace = rect.hit(&ray, FORWARD, &mut Xorshift::new());

        assert!(trace.hit);
        assert!((trace.t - 5.0).abs() < 1e-5);
        assert_eq!(trace.mat, MatId(2));
        assert!((trace.uv - Vec2::new(0.25, 0.75)).length() < 1e-5);
    }

    #[test]
    fn test_rect_normal_faces_ray() {
        let rect = Rect::xz(-1.0, 1.0, -1.0, 1.0, 0.0, MatId(1));
        let mut rng = Xorshift::new();

        let down = Ray::new(Vec3::new(0.0, 2.0, 0.0), Vec3::NEG_Y, 0.0);
        assert_eq!(rect.hit(&down, FORWARD, &mut rng).normal, Vec3::Y);

        let up = Ray::new(Vec3::new(0.0, -2.0, 0.0), Vec3::Y, 0.0);
        assert_eq!(rect.hit(&up, FORWARD, &mut rng).normal, Vec3::NEG_Y);
    }

    #[test]
    fn test_rect_misses() {
        let rect = Rect::yz(0.0, 1.0, 0.0, 1.0, 3.0, MatId(1));
        let mut rng = Xorshift::new();

        // Outside the extent
        let ray = Ray::new(Vec3::new(0.0, 2.0, 0.5), Vec3::X, 0.0);
        assert!(!rect.hit(&ray, FORWARD, &mut rng).hit);

        // Parallel to the plane
        let ray = Ray::new(Vec3::new(0.0, 0.5, 0.5), Vec3::Y, 0.0);
        assert!(!rect.hit(&ray, FORWARD, &mut rng).hit);
    }

    #[test]
    fn test_rect_box_is_padded() {
        let bbox = Rect::xz(0.0, 1.0, 0.0, 1.0, 2.0, MatId(1)).bounding_box(Interval::EMPTY);
        assert!(bbox.max.y > bbox.min.y);
        assert!(bbox.min.y < 2.0 && bbox.max.y > 2.0);
    }

    #[test]
    fn test_cuboid_hits_nearest_face() {
        let cuboid = Cuboid::new(Vec3::splat(-1.0), Vec3::splat(1.0), MatId(4));
        let mut rng = Xorshift::new();

        let ray = Ray::new(Vec3::new(0.2, 0.3, 5.0), Vec3::NEG_Z, 0.0);
        let trace = cuboid.hit(&ray, FORWARD, &mut rng);
        assert!(trace.hit);
        assert!((trace.t - 4.0).abs() < 1e-5);
        assert_eq!(trace.normal, Vec3::Z);

        // From inside, the exit face
        let ray = Ray::new(Vec3::ZERO, Vec3::X, 0.0);
        let trace = cuboid.hit(&ray, FORWARD, &mut rng);
        assert!((trace.t - 1.0).abs() < 1e-5);
    }
}
