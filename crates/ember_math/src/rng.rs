//! Xorshift generator and the sampling helpers built on it.
//!
//! Every sampling call takes the generator explicitly, so each render task
//! owns its own stream and a render can be replayed from its seed.

use crate::Vec3;
use rand::{Error, Rng, RngCore, SeedableRng};

/// Three-word xorshift generator. Fast, small, not cryptographically secure.
#[derive(Debug, Clone)]
pub struct Xorshift {
    x: u32,
    y: u32,
    z: u32,
}

impl Xorshift {
    const DEFAULT_STATE: [u32; 3] = [123_456_789, 362_436_069, 521_288_629];

    /// Generator with the fixed default state.
    pub fn new() -> Self {
        let [x, y, z] = Self::DEFAULT_STATE;
        Self { x, y, z }
    }
}

impl Default for Xorshift {
    fn default() -> Self {
        Self::new()
    }
}

impl RngCore for Xorshift {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        self.x ^= self.x << 16;
        self.x ^= self.x >> 5;
        self.x ^= self.x << 1;
        let t = self.x;
        self.x = self.y;
        self.y = self.z;
        self.z = t ^ self.x ^ self.y;
        self.z
    }

    #[inline]
    fn next_u64(&mut self) -> u64 {
        let hi = self.next_u32() as u64;
        let lo = self.next_u32() as u64;
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.next_u32().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for Xorshift {
    type Seed = [u8; 12];

    fn from_seed(seed: Self::Seed) -> Self {
        let word = |i: usize| u32::from_le_bytes([seed[i], seed[i + 1], seed[i + 2], seed[i + 3]]);
        let (x, y, z) = (word(0), word(4), word(8));
        // The all-zero state is a fixed point
        if x == 0 && y == 0 && z == 0 {
            return Self::new();
        }
        Self { x, y, z }
    }
}

/// Uniform float in [0, 1).
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}

/// Each component uniform in [-1, 1).
#[inline]
pub fn random_vector(rng: &mut dyn RngCore) -> Vec3 {
    Vec3::new(
        2.0 * gen_f32(rng) - 1.0,
        2.0 * gen_f32(rng) - 1.0,
        2.0 * gen_f32(rng) - 1.0,
    )
}

/// Uniform point strictly inside the unit sphere (rejection sampled).
pub fn random_in_unit_sphere(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let v = random_vector(rng);
        if v.length_squared() < 1.0 {
            return v;
        }
    }
}

/// Uniform direction on the unit sphere.
pub fn random_unit_vector(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let v = random_vector(rng);
        let len_sq = v.length_squared();
        if len_sq > 1e-6 && len_sq <= 1.0 {
            return v / len_sq.sqrt();
        }
    }
}

/// Uniform point inside the unit disk in the XY plane.
pub fn random_in_unit_disk(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let p = Vec3::new(2.0 * gen_f32(rng) - 1.0, 2.0 * gen_f32(rng) - 1.0, 0.0);
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}
