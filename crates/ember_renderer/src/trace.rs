//! Intersection records and the trait every scene object implements.

use crate::material::MatId;
use ember_math::{Aabb, Interval, Ray, Vec2, Vec3};
use rand::RngCore;

/// Result of intersecting a ray with an object.
///
/// Fields other than `hit` are meaningless when `hit` is false.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trace {
    pub hit: bool,
    /// Ray parameter of the intersection
    pub t: f32,
    pub mat: MatId,
    pub pos: Vec3,
    /// Unit surface normal. Outward for closed surfaces; rectangles face the ray.
    pub normal: Vec3,
    pub uv: Vec2,
}

impl Trace {
    pub const MISS: Trace = Trace {
        hit: false,
        t: f32::INFINITY,
        mat: MatId::FALLBACK,
        pos: Vec3::ZERO,
        normal: Vec3::ZERO,
        uv: Vec2::ZERO,
    };

    /// Distance used for ordering; a miss counts as infinitely far.
    #[inline]
    pub fn distance(&self) -> f32 {
        if self.hit {
            self.t
        } else {
            f32::INFINITY
        }
    }

    /// The nearer of two traces. Ties keep `a`.
    #[inline]
    pub fn closer(a: Trace, b: Trace) -> Trace {
        if b.distance() < a.distance() {
            b
        } else {
            a
        }
    }
}

impl Default for Trace {
    fn default() -> Self {
        Self::MISS
    }
}

/// Anything a ray can be tested against.
pub trait Hittable: Send + Sync {
    /// Closest intersection with `ray_t.min <= t <= ray_t.max`, or [`Trace::MISS`].
    ///
    /// `rng` is only consumed by participating media.
    fn hit(&self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Trace;

    /// A box enclosing the object for every time in `time`.
    fn bounding_box(&self, time: Interval) -> Aabb;
}
