//! Materials and the id-keyed cache that owns them.
//!
//! Objects refer to materials by [`MatId`] rather than by reference, so the
//! object graph and the material table can be built independently and
//! shared across render threads without lifetimes.

use ember_core::Texture;
use ember_math::{gen_f32, random_in_unit_sphere, reflect, refract, Color, Ray};
use rand::RngCore;

use crate::trace::Trace;

/// Outcome of a material interaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scatter {
    /// Continuation ray. Meaningless when `absorbed` is set.
    pub out: Ray,
    pub attenuation: Color,
    pub emitted: Color,
    /// The path ends here
    pub absorbed: bool,
}

impl Scatter {
    fn continue_with(out: Ray, attenuation: Color) -> Self {
        Self {
            out,
            attenuation,
            emitted: Color::ZERO,
            absorbed: false,
        }
    }
}

/// Surface and volume scattering models.
#[derive(Debug, Clone)]
pub enum Material {
    /// Diffuse reflector.
    Lambertian { albedo: Texture },
    /// Specular reflector. `roughness` 0 is a perfect mirror.
    Metal { albedo: Color, roughness: f32 },
    /// Refracting glass-like medium.
    Dielectric { index: f32 },
    /// Emitter. Terminates every path that reaches it.
    DiffuseLight { emit: Texture },
    /// Phase function for participating media.
    Isotropic { albedo: Texture },
}

impl Material {
    pub fn lambertian(albedo: impl Into<Texture>) -> Self {
        Material::Lambertian {
            albedo: albedo.into(),
        }
    }

    pub fn metal(albedo: Color, roughness: f32) -> Self {
        Material::Metal {
            albedo,
            roughness: roughness.clamp(0.0, 1.0),
        }
    }

    pub fn dielectric(index: f32) -> Self {
        Material::Dielectric { index }
    }

    pub fn diffuse_light(emit: impl Into<Texture>) -> Self {
        Material::DiffuseLight { emit: emit.into() }
    }

    pub fn isotropic(albedo: impl Into<Texture>) -> Self {
        Material::Isotropic {
            albedo: albedo.into(),
        }
    }

    /// Sample how `incoming` interacts with the surface at `surface`.
    pub fn bsdf(&self, incoming: &Ray, surface: &Trace, rng: &mut dyn RngCore) -> Scatter {
        match self {
            Material::Lambertian { albedo } => {
                let direction = surface.normal + random_in_unit_sphere(rng);
                Scatter::continue_with(
                    Ray::new(surface.pos, direction, incoming.time),
                    albedo.sample(surface.uv, surface.pos),
                )
            }
            Material::Metal { albedo, roughness } => {
                let reflected = reflect(incoming.direction.normalize(), surface.normal);
                let direction = reflected + *roughness * random_in_unit_sphere(rng);
                Scatter {
                    absorbed: direction.dot(surface.normal) <= 0.0,
                    ..Scatter::continue_with(
                        Ray::new(surface.pos, direction, incoming.time),
                        *albedo,
                    )
                }
            }
            Material::Dielectric { index } => dielectric(*index, incoming, surface, rng),
            Material::DiffuseLight { emit } => Scatter {
                out: *incoming,
                attenuation: Color::ONE,
                emitted: emit.sample(surface.uv, surface.pos),
                absorbed: true,
            },
            Material::Isotropic { albedo } => Scatter::continue_with(
                Ray::new(surface.pos, random_in_unit_sphere(rng), incoming.time),
                albedo.sample(surface.uv, surface.pos),
            ),
        }
    }

    /// Schlick's approximation of Fresnel reflectance.
    pub fn schlick(cos: f32, index: f32) -> f32 {
        let r0 = ((1.0 - index) / (1.0 + index)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cos).powi(5)
    }
}

impl Default for Material {
    fn default() -> Self {
        Material::lambertian(Color::new(1.0, 0.0, 0.0))
    }
}

fn dielectric(index: f32, incoming: &Ray, surface: &Trace, rng: &mut dyn RngCore) -> Scatter {
    let reflected = reflect(incoming.direction, surface.normal);
    let idn = incoming.direction.normalize().dot(surface.normal);

    // Leaving the medium when travelling along the outward normal
    let (n_out, ratio) = if idn > 0.0 {
        (-surface.normal, index)
    } else {
        (surface.normal, 1.0 / index)
    };

    let direction = match refract(incoming.direction, n_out, ratio) {
        Some(refracted) => {
            let cos = if idn > 0.0 {
                (1.0 - index * index * (1.0 - idn * idn)).max(0.0).sqrt()
            } else {
                -idn
            };
            if gen_f32(rng) < Material::schlick(cos, index) {
                reflected
            } else {
                refracted
            }
        }
        None => reflected,
    };

    Scatter::continue_with(Ray::new(surface.pos, direction, incoming.time), Color::ONE)
}

/// Handle into a [`MaterialCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MatId(pub u32);

impl MatId {
    /// Always present: red lambertian.
    pub const FALLBACK: MatId = MatId(0);
}

/// Append-only material table. Ids stay valid until [`MaterialCache::clear`].
#[derive(Debug, Clone)]
pub struct MaterialCache {
    materials: Vec<Material>,
}

impl MaterialCache {
    pub fn new() -> Self {
        Self {
            materials: vec![Material::default()],
        }
    }

    pub fn add(&mut self, material: Material) -> MatId {
        let id = MatId(self.materials.len() as u32);
        self.materials.push(material);
        id
    }

    /// # Panics
    ///
    /// If `id` was not issued by this cache.
    pub fn get(&self, id: MatId) -> &Material {
        match self.materials.get(id.0 as usize) {
            Some(material) => material,
            None => panic!(
                "material id {} out of range ({} materials)",
                id.0,
                self.materials.len()
            ),
        }
    }

    /// Number of materials, including the fallback.
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Drop every material except a fresh fallback at id 0.
    pub fn clear(&mut self) {
        self.materials.clear();
        self.materials.push(Material::default());
    }
}

impl Default for MaterialCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_math::{Vec2, Vec3, Xorshift};
    use rand::SeedableRng;

    fn surface(normal: Vec3) -> Trace {
        Trace {
            hit: true,
            t: 1.0,
            mat: MatId::FALLBACK,
            pos: Vec3::ZERO,
            normal,
            uv: Vec2::ZERO,
        }
    }

    #[test]
    fn test_schlick_at_normal_incidence_is_r0() {
        for index in [1.0f32, 1.33, 1.5, 2.4] {
            let r0 = ((1.0 - index) / (1.0 + index)).powi(2);
            assert_eq!(Material::schlick(1.0, index), r0);
        }
    }

    #[test]
    fn test_diffuse_light_always_absorbs() {
        let light = Material::diffuse_light(Color::splat(4.0));
        let mut rng = Xorshift::seed_from_u64(1);
        for _ in 0..100 {
            let incoming = Ray::new(Vec3::new(0.0, 2.0, 0.0), Vec3::NEG_Y, 0.0);
            let s = light.bsdf(&incoming, &surface(Vec3::Y), &mut rng);
            assert!(s.absorbed);
            assert_eq!(s.emitted, Color::splat(4.0));
        }
    }

    #[test]
    fn test_lambertian_scatters_into_upper_hemisphere_region() {
        let mat = Material::lambertian(Color::splat(0.5));
        let mut rng = Xorshift::seed_from_u64(2);
        let incoming = Ray::new(Vec3::new(0.0, 2.0, 0.0), Vec3::NEG_Y, 0.25);
        for _ in 0..500 {
            let s = mat.bsdf(&incoming, &surface(Vec3::Y), &mut rng);
            assert!(!s.absorbed);
            assert_eq!(s.attenuation, Color::splat(0.5));
            assert_eq!(s.emitted, Color::ZERO);
            assert_eq!(s.out.time, 0.25);
            // normal + point in unit ball never points below the surface
            assert!(s.out.direction.y >= 0.0);
        }
    }

    #[test]
    fn test_polished_metal_mirrors() {
        let mat = Material::metal(Color::splat(0.8), 0.0);
        let mut rng = Xorshift::seed_from_u64(3);
        let incoming = Ray::new(Vec3::new(-1.0, 1.0, 0.0), Vec3::new(1.0, -1.0, 0.0), 0.0);
        let s = mat.bsdf(&incoming, &surface(Vec3::Y), &mut rng);

        assert!(!s.absorbed);
        let expected = Vec3::new(1.0, 1.0, 0.0).normalize();
        assert!((s.out.direction - expected).length() < 1e-5);
    }

    #[test]
    fn test_metal_absorbs_when_scattered_below_surface() {
        let mat = Material::metal(Color::ONE, 1.0);
        let mut rng = Xorshift::seed_from_u64(4);
        // Grazing ray: fuzz pushes many reflections under the surface
        let incoming = Ray::new(Vec3::new(-1.0, 0.01, 0.0), Vec3::new(1.0, -0.01, 0.0), 0.0);
        let mut absorbed = 0;
        for _ in 0..1000 {
            let s = mat.bsdf(&incoming, &surface(Vec3::Y), &mut rng);
            assert_eq!(s.absorbed, s.out.direction.dot(Vec3::Y) <= 0.0);
            absorbed += s.absorbed as u32;
        }
        assert!(absorbed > 0);
    }

    #[test]
    fn test_dielectric_total_internal_reflection() {
        let mat = Material::dielectric(1.5);
        let mut rng = Xorshift::seed_from_u64(5);
        // Inside glass, travelling nearly parallel to the surface along the outward normal side
        let incoming = Ray::new(Vec3::ZERO, Vec3::new(1.0, 0.1, 0.0), 0.0);
        for _ in 0..50 {
            let s = mat.bsdf(&incoming, &surface(Vec3::Y), &mut rng);
            assert_eq!(s.attenuation, Color::ONE);
            assert!(s.out.direction.y < 0.0);
        }
    }

    #[test]
    fn test_dielectric_normal_incidence_mostly_transmits() {
        let mat = Material::dielectric(1.5);
        let mut rng = Xorshift::seed_from_u64(6);
        let incoming = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::NEG_Y, 0.0);
        let transmitted = (0..1000)
            .filter(|_| mat.bsdf(&incoming, &surface(Vec3::Y), &mut rng).out.direction.y < 0.0)
            .count();
        // r0 = 0.04
        assert!(transmitted > 900);
    }

    #[test]
    fn test_isotropic_uses_texture() {
        let mat = Material::isotropic(Color::new(0.2, 0.4, 0.6));
        let mut rng = Xorshift::seed_from_u64(7);
        let incoming = Ray::new(Vec3::ZERO, Vec3::X, 0.0);
        let s = mat.bsdf(&incoming, &surface(Vec3::Y), &mut rng);
        assert!(!s.absorbed);
        assert_eq!(s.attenuation, Color::new(0.2, 0.4, 0.6));
        assert!(s.out.direction.length_squared() < 1.0);
    }

    #[test]
    fn test_cache_seeds_fallback() {
        let mut cache = MaterialCache::new();
        assert_eq!(cache.len(), 1);
        assert!(matches!(cache.get(MatId::FALLBACK), Material::Lambertian { .. }));

        let glass = cache.add(Material::dielectric(1.5));
        assert_eq!(glass, MatId(1));
        assert!(matches!(cache.get(glass), Material::Dielectric { .. }));

        cache.clear();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.add(Material::dielectric(1.5)), MatId(1));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_cache_rejects_unknown_id() {
        MaterialCache::new().get(MatId(7));
    }
}
