//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Nodes live in a flat array with parent links. Traversal walks that array
//! as a small state machine instead of recursing, so a query needs no stack.

use crate::object::Object;
use crate::sphere::Sphere;
use crate::trace::{Hittable, Trace};
use ember_math::{Aabb, Interval, Ray, LANE_WIDTH};
use rand::{Rng, RngCore};

/// Sentinel for "no node" in parent/right links.
const NONE: u32 = u32::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Internal,
    Leaf,
}

/// One tree node. For leaves `left` indexes the object array and `right`
/// is unused.
#[derive(Debug, Clone, Copy)]
struct BvhNode {
    kind: NodeKind,
    bbox: Aabb,
    left: u32,
    right: u32,
    parent: u32,
}

/// How the traversal arrived at the current node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    /// Descended from the parent; the node is a left child
    Parent,
    /// Moved across from the left sibling; the node is a right child
    Sibling,
    /// Returned from a finished subtree rooted at the node
    Child,
}

/// Median-split BVH owning its leaf objects.
#[derive(Debug, Clone, Default)]
pub struct Bvh {
    nodes: Vec<BvhNode>,
    objects: Vec<Object>,
}

impl Bvh {
    /// One object per leaf.
    pub fn new(objects: Vec<Object>, time: Interval, rng: &mut dyn RngCore) -> Self {
        Self::with_leaves(objects, 1, time, rng, single_or_list)
    }

    /// Up to `LANE_WIDTH` objects per leaf. Leaves made only of static
    /// spheres become a [`SphereLane`](crate::SphereLane); anything else is
    /// kept as a list.
    pub fn sphere_lanes(objects: Vec<Object>, time: Interval, rng: &mut dyn RngCore) -> Self {
        Self::with_leaves(objects, LANE_WIDTH, time, rng, pack_lane)
    }

    /// Build with chunks of at most `leaf_span` objects, each turned into a
    /// single leaf object by `leaf`.
    ///
    /// # Panics
    ///
    /// If `leaf_span` is zero.
    pub fn with_leaves<F>(
        objects: Vec<Object>,
        leaf_span: usize,
        time: Interval,
        rng: &mut dyn RngCore,
        mut leaf: F,
    ) -> Self
    where
        F: FnMut(Vec<Object>) -> Object,
    {
        assert!(leaf_span > 0, "BVH leaves must hold at least one object");

        let mut bvh = Bvh::default();
        if objects.is_empty() {
            return bvh;
        }

        let count = objects.len();
        bvh.populate(objects, leaf_span, time, rng, &mut leaf);
        log::debug!(
            "Built BVH: {} objects, {} nodes, {} leaves (span {})",
            count,
            bvh.nodes.len(),
            bvh.objects.len(),
            leaf_span
        );
        bvh
    }

    /// Number of leaf objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Recursively build the subtree over `objects`, returning its node index.
    fn populate(
        &mut self,
        objects: Vec<Object>,
        leaf_span: usize,
        time: Interval,
        rng: &mut dyn RngCore,
        leaf: &mut dyn FnMut(Vec<Object>) -> Object,
    ) -> u32 {
        let index = self.nodes.len() as u32;

        if objects.len() <= leaf_span {
            let object = leaf(objects);
            self.nodes.push(BvhNode {
                kind: NodeKind::Leaf,
                bbox: object.bounding_box(time),
                left: self.objects.len() as u32,
                right: NONE,
                parent: NONE,
            });
            self.objects.push(object);
            return index;
        }

        // Reserve the slot so the parent precedes its children
        self.nodes.push(BvhNode {
            kind: NodeKind::Internal,
            bbox: Aabb::EMPTY,
            left: NONE,
            right: NONE,
            parent: NONE,
        });

        let axis = rng.gen_range(0..3);
        let mut keyed: Vec<(f32, Object)> = objects
            .into_iter()
            .map(|o| (o.bounding_box(time).axis_min(axis), o))
            .collect();
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
        let mut left_objects: Vec<Object> = keyed.into_iter().map(|(_, o)| o).collect();
        let right_objects = left_objects.split_off(left_objects.len().div_ceil(2));

        let left = self.populate(left_objects, leaf_span, time, rng, leaf);
        let right = self.populate(right_objects, leaf_span, time, rng, leaf);
        self.nodes[left as usize].parent = index;
        self.nodes[right as usize].parent = index;

        let bbox = Aabb::enclose(&self.nodes[left as usize].bbox, &self.nodes[right as usize].bbox);
        let node = &mut self.nodes[index as usize];
        node.left = left;
        node.right = right;
        node.bbox = bbox;
        index
    }
}

/// Leaf factory for [`Bvh::sphere_lanes`].
fn pack_lane(chunk: Vec<Object>) -> Object {
    let spheres: Vec<Sphere> = chunk
        .iter()
        .filter_map(|o| match o {
            Object::Sphere(s) => Some(*s),
            _ => None,
        })
        .collect();

    if spheres.len() == chunk.len() && !spheres.is_empty() {
        return Object::sphere_lane(&spheres);
    }
    single_or_list(chunk)
}

/// Unwrap a one-object chunk; wrap anything else in a list.
fn single_or_list(mut chunk: Vec<Object>) -> Object {
    if chunk.len() == 1 {
        if let Some(object) = chunk.pop() {
            return object;
        }
    }
    Object::list(chunk)
}

const ROOT: u32 = 0;

impl Hittable for Bvh {
    fn hit(&self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Trace {
        let Some(root) = self.nodes.first() else {
            return Trace::MISS;
        };
        if root.kind == NodeKind::Leaf {
            if !root.bbox.hit(ray, ray_t) {
                return Trace::MISS;
            }
            return self.objects[root.left as usize].hit(ray, ray_t, rng);
        }

        let mut best = Trace::MISS;
        let mut closest = ray_t.max;
        let mut current = root.left;
        let mut visit = Visit::Parent;

        loop {
            let node = &self.nodes[current as usize];
            match visit {
                Visit::Child => {
                    if current == ROOT {
                        return best;
                    }
                    let parent = &self.nodes[node.parent as usize];
                    if parent.left == current {
                        current = parent.right;
                        visit = Visit::Sibling;
                    } else {
                        current = node.parent;
                    }
                }
                Visit::Parent | Visit::Sibling => {
                    let window = ray_t.with_max(closest);
                    let entered = node.bbox.hit(ray, window);

                    if entered && node.kind == NodeKind::Internal {
                        current = node.left;
                        visit = Visit::Parent;
                        continue;
                    }

                    if entered {
                        let trace = self.objects[node.left as usize].hit(ray, window, rng);
                        if trace.hit {
                            closest = trace.t;
                            best = trace;
                        }
                    }

                    if visit == Visit::Parent {
                        current = self.nodes[node.parent as usize].right;
                        visit = Visit::Sibling;
                    } else {
                        current = node.parent;
                        visit = Visit::Child;
                    }
                }
            }
        }
    }

    /// Cached root box; `time` is fixed at build.
    fn bounding_box(&self, _time: Interval) -> Aabb {
        self.nodes.first().map_or(Aabb::EMPTY, |root| root.bbox)
    }
}
