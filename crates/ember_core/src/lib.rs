//! Ember Core - textures for the ember path tracer.
//!
//! This crate provides:
//!
//! - **Texture**: constant, checkerboard, Perlin turbulence and image lookups
//! - **Image loading**: sRGB decode to linear floats, with a path-keyed cache
//!
//! # Example
//!
//! ```ignore
//! use ember_core::{ImageTexture, Texture};
//! use std::sync::Arc;
//!
//! let earth = Texture::image(Arc::new(ImageTexture::load_or_black("earthmap.jpg")));
//! let color = earth.sample(uv, position);
//! ```

pub mod image_texture;
pub mod perlin;
pub mod texture;

pub use image_texture::{srgb_to_linear, ImageTexture, TextureCache, TextureError, TextureResult};
pub use perlin::{Perlin, DEFAULT_TURBULENCE_DEPTH};
pub use texture::Texture;
