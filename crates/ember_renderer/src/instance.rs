use crate::object::Object;
use crate::trace::{Hittable, Trace};
use ember_math::{Aabb, Interval, Ray, Transform, Vec3};
use rand::RngCore;

/// An object placed in the world by an affine transform.
///
/// Rays are carried into local space instead of transforming the geometry.
/// The local direction is left unnormalised so `t` means the same thing on
/// both sides of the transform.
#[derive(Debug, Clone)]
pub struct Instance {
    inner: Box<Object>,
    transform: Transform,
}

impl Instance {
    pub fn new(inner: Object, transform: Transform) -> Self {
        Self {
            inner: Box::new(inner),
            transform,
        }
    }

    pub fn translate(inner: Object, offset: Vec3) -> Self {
        Self::new(inner, Transform::translation(offset))
    }

    /// Rotate about +Y through the origin, angle in degrees.
    pub fn rotate_y(inner: Object, degrees: f32) -> Self {
        Self::new(inner, Transform::rotation_y(degrees))
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }
}

impl Hittable for Instance {
    fn hit(&self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Trace {
        let local = Ray::new(
            self.transform.inverse_point(ray.origin),
            self.transform.inverse_vector(ray.direction),
            ray.time,
        );

        let trace = self.inner.hit(&local, ray_t, rng);
        if !trace.hit {
            return trace;
        }

        Trace {
            pos: self.transform.point(trace.pos),
            normal: self.transform.normal(trace.normal),
            ..trace
        }
    }

    fn bounding_box(&self, time: Interval) -> Aabb {
        self.transform.aabb(&self.inner.bounding_box(time))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::MatId;
    use ember_math::{Mat4, Xorshift};

    const FORWARD: Interval = Interval::new(0.001, f32::INFINITY);

    #[test]
    fn test_translated_sphere() {
        let sphere = Object::sphere(Vec3::ZERO, 1.0, MatId(1));
        let inst = Instance::translate(sphere, Vec3::new(5.0, 0.0, 0.0));
        let ray = Ray::new(Vec3::new(5.0, 0.0, -10.0), Vec3::Z, 0.0);
        let trace = inst.hit(&ray, FORWARD, &mut Xorshift::new());

        assert!(trace.hit);
        assert!((trace.t - 9.0).abs() < 1e-4);
        assert!((trace.pos - Vec3::new(5.0, 0.0, -1.0)).length() < 1e-4);
        assert!((trace.normal - Vec3::NEG_Z).length() < 1e-4);
    }

    #[test]
    fn test_scaled_instance_keeps_world_t() {
        // Uniform scale 2: local direction shrinks, t must still be world t
        let inst = Instance::new(
            Object::sphere(Vec3::ZERO, 1.0, MatId(1)),
            Transform::new(Mat4::from_scale(Vec3::splat(2.0))),
        );
        let ray = Ray::new(Vec3::new(0.0, 0.0, -10.0), Vec3::Z, 0.0);
        let trace = inst.hit(&ray, FORWARD, &mut Xorshift::new());

        assert!(trace.hit);
        assert!((trace.t - 8.0).abs() < 1e-4);
        assert!((trace.pos - Vec3::new(0.0, 0.0, -2.0)).length() < 1e-4);
    }

    #[test]
    fn test_rotated_box_bounds_and_normal() {
        let cuboid = Object::cuboid(Vec3::ZERO, Vec3::new(2.0, 1.0, 1.0), MatId(1));
        let inst = Instance::rotate_y(cuboid, 90.0);

        // +X extent of the box now lies along -Z
        let bbox = inst.bounding_box(Interval::EMPTY);
        assert!((bbox.min.z + 2.0).abs() < 1e-3);
        assert!(bbox.max.x <= 1.0 + 1e-3);

        let ray = Ray::new(Vec3::new(0.5, 0.5, -10.0), Vec3::Z, 0.0);
        let trace = inst.hit(&ray, FORWARD, &mut Xorshift::new());
        assert!(trace.hit);
        assert!((trace.t - 8.0).abs() < 1e-3);
        assert!((trace.normal - Vec3::NEG_Z).length() < 1e-3);
    }
}
