//! Colour sources sampled by materials.

use std::sync::Arc;

use ember_math::{Color, Vec2, Vec3};

use crate::image_texture::ImageTexture;
use crate::perlin::{Perlin, DEFAULT_TURBULENCE_DEPTH};

/// Pure function of `(uv, p)`; immutable once built so it can be shared
/// across render threads.
#[derive(Debug, Clone)]
pub enum Texture {
    Constant(Color),
    /// 3D sine-sign checkerboard choosing between two sub-textures.
    Checker {
        odd: Arc<Texture>,
        even: Arc<Texture>,
    },
    /// Marble-like turbulence.
    Noise { perlin: Arc<Perlin>, scale: f32 },
    Image(Arc<ImageTexture>),
}

impl Texture {
    pub fn constant(color: Color) -> Self {
        Texture::Constant(color)
    }

    pub fn checker(odd: Texture, even: Texture) -> Self {
        Texture::Checker {
            odd: Arc::new(odd),
            even: Arc::new(even),
        }
    }

    pub fn noise(perlin: Arc<Perlin>, scale: f32) -> Self {
        Texture::Noise { perlin, scale }
    }

    pub fn image(image: Arc<ImageTexture>) -> Self {
        Texture::Image(image)
    }

    pub fn sample(&self, uv: Vec2, p: Vec3) -> Color {
        match self {
            Texture::Constant(color) => *color,
            Texture::Checker { odd, even } => {
                let sines = (10.0 * p.x).sin() * (10.0 * p.y).sin() * (10.0 * p.z).sin();
                if sines < 0.0 {
                    odd.sample(uv, p)
                } else {
                    even.sample(uv, p)
                }
            }
            Texture::Noise { perlin, scale } => {
                let phase = scale * p.z + 10.0 * perlin.turbulence(p, DEFAULT_TURBULENCE_DEPTH);
                Color::splat(0.5 * (1.0 + phase.sin()))
            }
            Texture::Image(image) => image.sample(uv),
        }
    }
}

impl Default for Texture {
    fn default() -> Self {
        Texture::Constant(Color::splat(0.5))
    }
}

impl From<Color> for Texture {
    fn from(color: Color) -> Self {
        Texture::Constant(color)
    }
}
