//! Structure-of-lanes vectors for batched intersection tests.
//!
//! `LANE_WIDTH` scalars are processed per instruction. The default is 8
//! (AVX); the `lane4` feature drops to 4 for SSE-only hosts.

use crate::Vec3;
use std::ops::{Add, Mul, Sub};

#[cfg(not(feature = "lane4"))]
pub type F32Lane = wide::f32x8;
#[cfg(not(feature = "lane4"))]
pub const LANE_WIDTH: usize = 8;

#[cfg(feature = "lane4")]
pub type F32Lane = wide::f32x4;
#[cfg(feature = "lane4")]
pub const LANE_WIDTH: usize = 4;

/// Horizontal minimum across all lanes.
#[inline]
pub fn hmin(v: F32Lane) -> f32 {
    v.to_array().into_iter().fold(f32::INFINITY, f32::min)
}

/// Horizontal maximum across all lanes.
#[inline]
pub fn hmax(v: F32Lane) -> f32 {
    v.to_array().into_iter().fold(f32::NEG_INFINITY, f32::max)
}

/// `LANE_WIDTH` 3-vectors stored as three coordinate lanes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct V3Lane {
    pub x: F32Lane,
    pub y: F32Lane,
    pub z: F32Lane,
}

impl V3Lane {
    pub const ZERO: V3Lane = V3Lane {
        x: F32Lane::ZERO,
        y: F32Lane::ZERO,
        z: F32Lane::ZERO,
    };

    /// Broadcast one vector into every lane.
    #[inline]
    pub fn splat(v: Vec3) -> Self {
        Self {
            x: F32Lane::splat(v.x),
            y: F32Lane::splat(v.y),
            z: F32Lane::splat(v.z),
        }
    }

    /// Build from per-lane vectors.
    pub fn from_array(vs: [Vec3; LANE_WIDTH]) -> Self {
        let mut x = [0.0; LANE_WIDTH];
        let mut y = [0.0; LANE_WIDTH];
        let mut z = [0.0; LANE_WIDTH];
        for (i, v) in vs.iter().enumerate() {
            x[i] = v.x;
            y[i] = v.y;
            z[i] = v.z;
        }
        Self {
            x: F32Lane::from(x),
            y: F32Lane::from(y),
            z: F32Lane::from(z),
        }
    }

    /// Extract lane `i`.
    #[inline]
    pub fn get(&self, i: usize) -> Vec3 {
        Vec3::new(self.x.to_array()[i], self.y.to_array()[i], self.z.to_array()[i])
    }

    /// Overwrite lane `i`.
    pub fn set(&mut self, i: usize, v: Vec3) {
        let mut x = self.x.to_array();
        let mut y = self.y.to_array();
        let mut z = self.z.to_array();
        x[i] = v.x;
        y[i] = v.y;
        z[i] = v.z;
        self.x = F32Lane::from(x);
        self.y = F32Lane::from(y);
        self.z = F32Lane::from(z);
    }

    #[inline]
    pub fn dot(&self, other: &V3Lane) -> F32Lane {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    #[inline]
    pub fn length_squared(&self) -> F32Lane {
        self.dot(self)
    }

    /// Per-lane minimum corner, reduced across lanes.
    pub fn hmin(&self) -> Vec3 {
        Vec3::new(hmin(self.x), hmin(self.y), hmin(self.z))
    }

    /// Per-lane maximum corner, reduced across lanes.
    pub fn hmax(&self) -> Vec3 {
        Vec3::new(hmax(self.x), hmax(self.y), hmax(self.z))
    }
}

impl Add for V3Lane {
    type Output = V3Lane;

    #[inline]
    fn add(self, o: V3Lane) -> V3Lane {
        V3Lane {
            x: self.x + o.x,
            y: self.y + o.y,
            z: self.z + o.z,
        }
    }
}

impl Sub for V3Lane {
    type Output = V3Lane;

    #[inline]
    fn sub(self, o: V3Lane) -> V3Lane {
        V3Lane {
            x: self.x - o.x,
            y: self.y - o.y,
            z: self.z - o.z,
        }
    }
}

impl Add<F32Lane> for V3Lane {
    type Output = V3Lane;

    #[inline]
    fn add(self, s: F32Lane) -> V3Lane {
        V3Lane {
            x: self.x + s,
            y: self.y + s,
            z: self.z + s,
        }
    }
}

impl Sub<F32Lane> for V3Lane {
    type Output = V3Lane;

    #[inline]
    fn sub(self, s: F32Lane) -> V3Lane {
        V3Lane {
            x: self.x - s,
            y: self.y - s,
            z: self.z - s,
        }
    }
}

impl Mul<F32Lane> for V3Lane {
    type Output = V3Lane;

    #[inline]
    fn mul(self, s: F32Lane) -> V3Lane {
        V3Lane {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
        }
    }
}
