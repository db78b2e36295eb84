//! A renderable scene: object graph, materials, camera and background.

use crate::camera::Camera;
use crate::integrator::{trace_path, Background};
use crate::material::MaterialCache;
use crate::object::Object;
use crate::renderer::RenderConfig;
use ember_math::{safe, Color, Ray};
use rand::RngCore;

/// Display gamma applied to averaged pixel radiance.
pub const GAMMA: f32 = 2.2;

/// Everything a render reads. Shared immutably between render tasks.
#[derive(Debug, Clone)]
pub struct Scene {
    pub root: Object,
    pub materials: MaterialCache,
    pub camera: Camera,
    pub background: Background,
}

impl Scene {
    /// Scene lit only by its own emitters.
    pub fn new(root: Object, materials: MaterialCache, camera: Camera) -> Self {
        Self {
            root,
            materials,
            camera,
            background: Background::default(),
        }
    }

    pub fn with_background(mut self, background: Background) -> Self {
        self.background = background;
        self
    }

    /// Radiance along `ray`.
    pub fn trace(&self, ray: Ray, max_depth: u32, rng: &mut dyn RngCore) -> Color {
        trace_path(&self.root, &self.materials, &self.background, ray, max_depth, rng)
    }

    /// Gamma-encoded colour of the pixel whose top-left corner sits at the
    /// normalised image point `(u, v)`.
    ///
    /// NaN samples are dropped to black before averaging.
    pub fn pixel(&self, u: f32, v: f32, config: &RenderConfig, rng: &mut dyn RngCore) -> Color {
        let samples = config.samples_per_pixel.max(1);
        let mut sum = Color::ZERO;
        for _ in 0..samples {
            let ray = self.camera.get_ray(u, v, rng);
            sum += safe(self.trace(ray, config.max_depth, rng));
        }
        let average = sum / samples as f32;
        average.max(Color::ZERO).powf(1.0 / GAMMA)
    }
}
