//! Ember math - vectors, rays, bounds and SIMD lanes for the path tracer.
//!
//! Scalar vector types come straight from `glam`; everything else here is
//! specific to ray tracing: parametric intervals, bounding boxes, affine
//! transforms with a cached inverse, structure-of-lanes vectors for batched
//! intersection, and the xorshift generator used for Monte Carlo sampling.

// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod interval;
mod lane;
mod ray;
mod rng;
mod transform;

pub use aabb::Aabb;
pub use interval::Interval;
pub use lane::{hmax, hmin, F32Lane, V3Lane, LANE_WIDTH};
pub use ray::Ray;
pub use rng::{
    gen_f32, random_in_unit_disk, random_in_unit_sphere, random_unit_vector, random_vector,
    Xorshift,
};
pub use transform::Transform;

/// Linear RGB color. Components are unbounded radiance until tone mapping.
pub type Color = Vec3;

/// Replace a color containing any NaN component with black.
///
/// A single degenerate sample must not poison a pixel average.
#[inline]
pub fn safe(c: Color) -> Color {
    if c.is_nan() {
        Color::ZERO
    } else {
        c
    }
}

/// Reflect `v` about the normal `n`.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract `v` through a surface with normal `n` facing the incoming side.
///
/// `ratio` is the incident index over the transmitted index. Returns `None`
/// on total internal reflection.
#[inline]
pub fn refract(v: Vec3, n: Vec3, ratio: f32) -> Option<Vec3> {
    let unit = v.normalize();
    let cos_theta = unit.dot(n);
    let discriminant = 1.0 - ratio * ratio * (1.0 - cos_theta * cos_theta);
    if discriminant > 0.0 {
        Some(ratio * (unit - cos_theta * n) - n * discriminant.sqrt())
    } else {
        None
    }
}
