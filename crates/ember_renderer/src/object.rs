//! The closed set of scene objects.
//!
//! Every variant is a concrete struct implementing [`Hittable`]; `Object`
//! dispatches to them with an exhaustive `match` so composites (lists, BVHs,
//! instances, volumes) can own any mix of children without trait objects.

use crate::bvh::Bvh;
use crate::instance::Instance;
use crate::list::ObjectList;
use crate::material::MatId;
use crate::rect::{Cuboid, Rect};
use crate::sphere::{MovingSphere, Sphere};
use crate::sphere_lane::SphereLane;
use crate::trace::{Hittable, Trace};
use crate::volume::ConstantMedium;
use ember_math::{Aabb, Interval, Ray, Transform, Vec3};
use rand::RngCore;

#[derive(Debug, Clone)]
pub enum Object {
    Sphere(Sphere),
    MovingSphere(MovingSphere),
    SphereLane(SphereLane),
    Rect(Rect),
    Cuboid(Cuboid),
    Volume(ConstantMedium),
    List(ObjectList),
    Bvh(Bvh),
    Instance(Instance),
}

impl Object {
    pub fn sphere(center: Vec3, radius: f32, mat: MatId) -> Self {
        Object::Sphere(Sphere::new(center, radius, mat))
    }

    pub fn moving_sphere(
        center0: Vec3,
        center1: Vec3,
        time0: f32,
        time1: f32,
        radius: f32,
        mat: MatId,
    ) -> Self {
        Object::MovingSphere(MovingSphere::new(center0, center1, time0, time1, radius, mat))
    }

    pub fn sphere_lane(spheres: &[Sphere]) -> Self {
        Object::SphereLane(SphereLane::new(spheres))
    }

    pub fn rect_xy(x0: f32, x1: f32, y0: f32, y1: f32, z: f32, mat: MatId) -> Self {
        Object::Rect(Rect::xy(x0, x1, y0, y1, z, mat))
    }

    pub fn rect_xz(x0: f32, x1: f32, z0: f32, z1: f32, y: f32, mat: MatId) -> Self {
        Object::Rect(Rect::xz(x0, x1, z0, z1, y, mat))
    }

    pub fn rect_yz(y0: f32, y1: f32, z0: f32, z1: f32, x: f32, mat: MatId) -> Self {
        Object::Rect(Rect::yz(y0, y1, z0, z1, x, mat))
    }

    pub fn cuboid(min: Vec3, max: Vec3, mat: MatId) -> Self {
        Object::Cuboid(Cuboid::new(min, max, mat))
    }

    /// Fog of `density` filling `boundary`, scattering with `mat`.
    pub fn volume(boundary: Object, density: f32, mat: MatId) -> Self {
        Object::Volume(ConstantMedium::new(boundary, density, mat))
    }

    pub fn list(objects: Vec<Object>) -> Self {
        Object::List(ObjectList::new(objects))
    }

    /// BVH with one object per leaf. `time` is the shutter interval used for
    /// moving-object bounds.
    pub fn bvh(objects: Vec<Object>, time: Interval, rng: &mut dyn RngCore) -> Self {
        Object::Bvh(Bvh::new(objects, time, rng))
    }

    /// BVH whose leaves pack spheres into SIMD lanes.
    pub fn bvh_lanes(objects: Vec<Object>, time: Interval, rng: &mut dyn RngCore) -> Self {
        Object::Bvh(Bvh::sphere_lanes(objects, time, rng))
    }

    pub fn instance(inner: Object, transform: Transform) -> Self {
        Object::Instance(Instance::new(inner, transform))
    }

    pub fn translate(inner: Object, offset: Vec3) -> Self {
        Object::Instance(Instance::translate(inner, offset))
    }

    pub fn rotate_y(inner: Object, degrees: f32) -> Self {
        Object::Instance(Instance::rotate_y(inner, degrees))
    }
}

impl Hittable for Object {
    #[inline]
    fn hit(&self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Trace {
        match self {
            Object::Sphere(o) => o.hit(ray, ray_t, rng),
            Object::MovingSphere(o) => o.hit(ray, ray_t, rng),
            Object::SphereLane(o) => o.hit(ray, ray_t, rng),
            Object::Rect(o) => o.hit(ray, ray_t, rng),
            Object::Cuboid(o) => o.hit(ray, ray_t, rng),
            Object::Volume(o) => o.hit(ray, ray_t, rng),
            Object::List(o) => o.hit(ray, ray_t, rng),
            Object::Bvh(o) => o.hit(ray, ray_t, rng),
            Object::Instance(o) => o.hit(ray, ray_t, rng),
        }
    }

    fn bounding_box(&self, time: Interval) -> Aabb {
        match self {
            Object::Sphere(o) => o.bounding_box(time),
            Object::MovingSphere(o) => o.bounding_box(time),
            Object::SphereLane(o) => o.bounding_box(time),
            Object::Rect(o) => o.bounding_box(time),
            Object::Cuboid(o) => o.bounding_box(time),
            Object::Volume(o) => o.bounding_box(time),
            Object::List(o) => o.bounding_box(time),
            Object::Bvh(o) => o.bounding_box(time),
            Object::Instance(o) => o.bounding_box(time),
        }
    }
}

impl From<Sphere> for Object {
    fn from(sphere: Sphere) -> Self {
        Object::Sphere(sphere)
    }
}

impl From<Bvh> for Object {
    fn from(bvh: Bvh) -> Self {
        Object::Bvh(bvh)
    }
}
