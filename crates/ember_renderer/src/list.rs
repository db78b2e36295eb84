use crate::object::Object;
use crate::trace::{Hittable, Trace};
use ember_math::{Aabb, Interval, Ray};
use rand::RngCore;

/// Heterogeneous objects tested one after another.
#[derive(Debug, Clone, Default)]
pub struct ObjectList {
    objects: Vec<Object>,
}

impl ObjectList {
    /// Takes ownership of `objects`.
    pub fn new(objects: Vec<Object>) -> Self {
        Self { objects }
    }

    pub fn push(&mut self, object: Object) {
        self.objects.push(object);
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    /// Give the objects back, e.g. to build a BVH over them.
    pub fn into_objects(self) -> Vec<Object> {
        self.objects
    }
}

impl Hittable for ObjectList {
    fn hit(&self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Trace {
        let mut best = Trace::MISS;
        let mut closest = ray_t.max;

        // Each hit shrinks the interval, so a later hit is always closer
        for object in &self.objects {
            let trace = object.hit(ray, ray_t.with_max(closest), rng);
            if trace.hit {
                closest = trace.t;
                best = trace;
            }
        }
        best
    }

    fn bounding_box(&self, time: Interval) -> Aabb {
        self.objects
            .iter()
            .fold(Aabb::EMPTY, |acc, o| Aabb::enclose(&acc, &o.bounding_box(time)))
    }
}

impl From<Vec<Object>> for ObjectList {
    fn from(objects: Vec<Object>) -> Self {
        Self::new(objects)
    }
}
