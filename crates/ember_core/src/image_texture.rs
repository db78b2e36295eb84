//! Image-backed textures and their load cache.
//!
//! Decoded pixels are stored as linear RGB floats so sampling never has to
//! undo the sRGB curve per lookup.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ember_math::{Color, Vec2};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TextureError {
    #[error("failed to open texture {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("texture {0} has no pixels")]
    Empty(PathBuf),
}

pub type TextureResult<T> = Result<T, TextureError>;

/// Decoded image with nearest-texel lookup.
#[derive(Clone, Debug, Default)]
pub struct ImageTexture {
    width: u32,
    height: u32,
    /// Row-major, top row first
    pixels: Vec<Color>,
}

impl ImageTexture {
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Color>) -> Self {
        assert_eq!(
            pixels.len(),
            (width * height) as usize,
            "pixel count does not match {width}x{height}"
        );
        Self { width, height, pixels }
    }

    /// Build from 8-bit sRGB RGBA bytes, as produced by a decoder.
    pub fn from_srgb_rgba8(width: u32, height: u32, bytes: &[u8]) -> Self {
        let pixels = bytes
            .chunks_exact(4)
            .map(|p| Color::new(srgb_to_linear(p[0]), srgb_to_linear(p[1]), srgb_to_linear(p[2])))
            .collect();
        Self::from_pixels(width, height, pixels)
    }

    /// Decode an image file.
    pub fn load(path: impl AsRef<Path>) -> TextureResult<Self> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|source| TextureError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        if width == 0 || height == 0 {
            return Err(TextureError::Empty(path.to_path_buf()));
        }

        log::debug!("Loaded texture {} ({}x{})", path.display(), width, height);
        Ok(Self::from_srgb_rgba8(width, height, rgba.as_raw()))
    }

    /// Decode an image file, falling back to the empty texture on failure.
    pub fn load_or_black(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(texture) => texture,
            Err(e) => {
                log::warn!("{e}; sampling as black");
                Self::default()
            }
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Nearest texel at `uv`, with (0, 0) at the bottom-left.
    pub fn sample(&self, uv: Vec2) -> Color {
        if self.is_empty() {
            return Color::ZERO;
        }

        let u = uv.x.clamp(0.0, 1.0);
        let v = 1.0 - uv.y.clamp(0.0, 1.0);

        let x = ((u * self.width as f32) as u32).min(self.width - 1);
        let y = ((v * self.height as f32) as u32).min(self.height - 1);

        self.pixels[(y * self.width + x) as usize]
    }
}

/// Memoises decoded images by path.
#[derive(Debug, Default)]
pub struct TextureCache {
    textures: HashMap<PathBuf, Arc<ImageTexture>>,
    base_dir: Option<PathBuf>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Relative paths are resolved against `base_dir`.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            textures: HashMap::new(),
            base_dir: Some(base_dir.into()),
        }
    }

    pub fn load(&mut self, path: impl AsRef<Path>) -> TextureResult<Arc<ImageTexture>> {
        let full_path = self.resolve_path(path.as_ref());
        if let Some(texture) = self.textures.get(&full_path) {
            return Ok(Arc::clone(texture));
        }

        let texture = Arc::new(ImageTexture::load(&full_path)?);
        self.textures.insert(full_path, Arc::clone(&texture));
        Ok(texture)
    }

    /// Cached variant of [`ImageTexture::load_or_black`]. Failures are not
    /// cached, so a later call retries the decode.
    pub fn load_or_black(&mut self, path: impl AsRef<Path>) -> Arc<ImageTexture> {
        match self.load(path) {
            Ok(texture) => texture,
            Err(e) => {
                log::warn!("{e}; sampling as black");
                Arc::new(ImageTexture::default())
            }
        }
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    pub fn clear(&mut self) {
        self.textures.clear();
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

/// Decode one 8-bit sRGB channel to linear.
pub fn srgb_to_linear(value: u8) -> f32 {
    let v = value as f32 / 255.0;
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}
