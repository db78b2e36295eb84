// Affine transforms for instancing.
//
// The inverse and the normal matrix are computed once when the transform is
// built; intersection code only ever multiplies.

use crate::{Aabb, Mat4, Vec3};

/// Local-to-world affine transform with its cached inverse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Local to world
    pub matrix: Mat4,
    /// World to local
    pub inverse: Mat4,
    /// Inverse transpose, for carrying normals to world space
    pub normal_matrix: Mat4,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        matrix: Mat4::IDENTITY,
        inverse: Mat4::IDENTITY,
        normal_matrix: Mat4::IDENTITY,
    };

    pub fn new(matrix: Mat4) -> Self {
        let inverse = matrix.inverse();
        Self {
            matrix,
            inverse,
            normal_matrix: inverse.transpose(),
        }
    }

    pub fn translation(offset: Vec3) -> Self {
        Self::new(Mat4::from_translation(offset))
    }

    /// Rotation about +Y, angle in degrees.
    pub fn rotation_y(degrees: f32) -> Self {
        Self::new(Mat4::from_rotation_y(degrees.to_radians()))
    }

    /// Apply `self` first, then `outer`.
    pub fn then(&self, outer: &Transform) -> Transform {
        Transform::new(outer.matrix * self.matrix)
    }

    #[inline]
    pub fn point(&self, p: Vec3) -> Vec3 {
        self.matrix.transform_point3(p)
    }

    /// Directions ignore translation (w = 0).
    #[inline]
    pub fn vector(&self, v: Vec3) -> Vec3 {
        self.matrix.transform_vector3(v)
    }

    /// Carry a surface normal to world space and renormalise.
    #[inline]
    pub fn normal(&self, n: Vec3) -> Vec3 {
        self.normal_matrix.transform_vector3(n).normalize()
    }

    #[inline]
    pub fn inverse_point(&self, p: Vec3) -> Vec3 {
        self.inverse.transform_point3(p)
    }

    #[inline]
    pub fn inverse_vector(&self, v: Vec3) -> Vec3 {
        self.inverse.transform_vector3(v)
    }

    /// World-space box enclosing all 8 transformed corners of `aabb`.
    pub fn aabb(&self, aabb: &Aabb) -> Aabb {
        if aabb.is_empty() {
            return Aabb::EMPTY;
        }
        aabb.corners()
            .iter()
            .map(|&corner| self.point(corner))
            .fold(Aabb::EMPTY, |acc, p| Aabb::enclose(&acc, &Aabb::new(p, p)))
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}
