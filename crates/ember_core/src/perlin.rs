//! Gradient (Perlin) noise with turbulence.

use ember_math::{random_vector, Vec3};
use rand::{Rng, RngCore};

const POINT_COUNT: usize = 256;

/// Default octave count for [`Perlin::turbulence`].
pub const DEFAULT_TURBULENCE_DEPTH: u32 = 7;

/// Lattice of random unit gradients addressed through three permutations.
///
/// Built once from a generator and read-only afterwards, so it can be shared
/// between textures and render threads.
#[derive(Debug, Clone)]
pub struct Perlin {
    gradients: Box<[Vec3; POINT_COUNT]>,
    perm_x: [u8; POINT_COUNT],
    perm_y: [u8; POINT_COUNT],
    perm_z: [u8; POINT_COUNT],
}

impl Perlin {
    pub fn new(rng: &mut dyn RngCore) -> Self {
        let mut gradients = Box::new([Vec3::X; POINT_COUNT]);
        for g in gradients.iter_mut() {
            // Rejection keeps the directions isotropic and away from zero
            *g = loop {
                let v = random_vector(rng);
                let len_sq = v.length_squared();
                if len_sq > 1e-6 && len_sq <= 1.0 {
                    break v / len_sq.sqrt();
                }
            };
        }

        Self {
            gradients,
            perm_x: permutation(rng),
            perm_y: permutation(rng),
            perm_z: permutation(rng),
        }
    }

    /// Smoothed noise in roughly [-1, 1].
    pub fn noise(&self, p: Vec3) -> f32 {
        let floor = p.floor();
        let f = p - floor;
        let (i, j, k) = (floor.x as i32, floor.y as i32, floor.z as i32);

        let mut corners = [[[Vec3::ZERO; 2]; 2]; 2];
        for (di, plane) in corners.iter_mut().enumerate() {
            for (dj, row) in plane.iter_mut().enumerate() {
                for (dk, corner) in row.iter_mut().enumerate() {
                    let index = self.perm_x[((i + di as i32) & 255) as usize]
                        ^ self.perm_y[((j + dj as i32) & 255) as usize]
                        ^ self.perm_z[((k + dk as i32) & 255) as usize];
                    *corner = self.gradients[index as usize];
                }
            }
        }

        interpolate(&corners, f)
    }

    /// Sum of `depth` octaves of noise, absolute valued.
    pub fn turbulence(&self, p: Vec3, depth: u32) -> f32 {
        let mut accum = 0.0;
        let mut weight = 1.0;
        let mut p = p;
        for _ in 0..depth {
            accum += weight * self.noise(p);
            weight *= 0.5;
            p *= 2.0;
        }
        accum.abs()
    }
}

/// Fisher-Yates shuffle of 0..=255.
fn permutation(rng: &mut dyn RngCore) -> [u8; POINT_COUNT] {
    let mut perm = [0u8; POINT_COUNT];
    for (i, p) in perm.iter_mut().enumerate() {
        *p = i as u8;
    }
    for i in (1..POINT_COUNT).rev() {
        let target = rng.gen_range(0..=i);
        perm.swap(i, target);
    }
    perm
}

/// Trilinear blend of corner gradients with Hermite smoothing.
fn interpolate(corners: &[[[Vec3; 2]; 2]; 2], f: Vec3) -> f32 {
    let s = f * f * (Vec3::splat(3.0) - 2.0 * f);
    let mut accum = 0.0;
    for (i, plane) in corners.iter().enumerate() {
        for (j, row) in plane.iter().enumerate() {
            for (k, gradient) in row.iter().enumerate() {
                let (fi, fj, fk) = (i as f32, j as f32, k as f32);
                let weight = f - Vec3::new(fi, fj, fk);
                accum += (fi * s.x + (1.0 - fi) * (1.0 - s.x))
                    * (fj * s.y + (1.0 - fj) * (1.0 - s.y))
                    * (fk * s.z + (1.0 - fk) * (1.0 - s.z))
                    * gradient.dot(weight);
            }
        }
    }
    accum
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_math::Xorshift;
    use rand::SeedableRng;

    #[test]
    fn test_noise_vanishes_on_lattice_points() {
        let perlin = Perlin::new(&mut Xorshift::seed_from_u64(1));
        // Gradient noise is zero wherever the fractional offset is zero
        for p in [Vec3::ZERO, Vec3::new(3.0, -2.0, 7.0), Vec3::splat(100.0)] {
            assert!(perlin.noise(p).abs() < 1e-5);
        }
    }

    #[test]
    fn test_noise_is_bounded_and_varies() {
        let perlin = Perlin::new(&mut Xorshift::seed_from_u64(2));
        let mut rng = Xorshift::seed_from_u64(3);
        let samples: Vec<f32> = (0..500)
            .map(|_| perlin.noise(random_vector(&mut rng) * 20.0))
            .collect();

        assert!(samples.iter().all(|n| n.abs() <= 1.8));
        assert!(samples.iter().any(|n| n.abs() > 0.05));
    }

    #[test]
    fn test_same_seed_same_noise() {
        let a = Perlin::new(&mut Xorshift::seed_from_u64(5));
        let b = Perlin::new(&mut Xorshift::seed_from_u64(5));
        let p = Vec3::new(0.3, 1.7, -4.2);
        assert_eq!(a.noise(p), b.noise(p));
        assert_eq!(
            a.turbulence(p, DEFAULT_TURBULENCE_DEPTH),
            b.turbulence(p, DEFAULT_TURBULENCE_DEPTH)
        );
    }

    #[test]
    fn test_turbulence_is_non_negative() {
        let perlin = Perlin::new(&mut Xorshift::seed_from_u64(8));
        for i in 0..50 {
            let p = Vec3::new(i as f32 * 0.37, i as f32 * 0.11, -(i as f32) * 0.23);
            assert!(perlin.turbulence(p, DEFAULT_TURBULENCE_DEPTH) >= 0.0);
        }
    }
}
