//! Parallel block renderer.
//!
//! The image is split into blocks and each block becomes one fire-and-forget
//! task on a rayon thread pool. Tasks write disjoint pixels of a shared
//! atomic buffer and bump a completion counter; the host polls
//! [`Renderer::progress`] and calls [`Renderer::finish`] until it reports
//! completion.
//!
//! Counter states:
//! - `-1`: idle
//! - `0..total`: rendering
//! - `total`: done, waiting for `finish()` to publish and return to idle

use crate::block::{generate_blocks, Block, Region, DEFAULT_BLOCK_SIZE};
use crate::scene::Scene;
use ember_math::{Color, Xorshift};
use log::{debug, info, warn};
use rand::SeedableRng;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicI32, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

const IDLE: i32 = -1;

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Maximum number of surface interactions per path
    pub max_depth: u32,
    /// Edge length of a render block in pixels
    pub block_size: u32,
    /// Worker threads; 0 uses every core
    pub threads: usize,
    /// Base seed for the per-block generators
    pub seed: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples_per_pixel: 8,
            max_depth: 5,
            block_size: DEFAULT_BLOCK_SIZE,
            threads: 0,
            seed: 0x5eed,
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("a render is already in progress")]
    InProgress,

    #[error("region {region} does not fit in the {width}x{height} image")]
    RegionOutOfBounds { region: Region, width: u32, height: u32 },

    #[error("failed to start render threads: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("failed to write image: {0}")]
    Image(#[from] image::ImageError),
}

/// Receives the finished image, e.g. to upload it to a display texture.
pub trait Presenter: Send {
    /// `pixels` is row-major, packed as by [`pack_rgba`].
    fn present(&mut self, width: u32, height: u32, pixels: &[u32]);
}

/// Pack a display colour as `0xAABBGGRR` with opaque alpha.
///
/// Channels are clamped to [0, 1] and truncated to 8 bits.
#[inline]
pub fn pack_rgba(color: Color) -> u32 {
    let c = color.clamp(Color::ZERO, Color::ONE) * 255.0;
    let (r, g, b) = (c.x as u32, c.y as u32, c.z as u32);
    (0xff << 24) | (b << 16) | (g << 8) | r
}

/// Row-major packed pixels that render tasks write concurrently.
#[derive(Debug)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<AtomicU32>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            data: (0..len).map(|_| AtomicU32::new(0)).collect(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn store(&self, x: u32, y: u32, value: u32) {
        self.data[self.index(x, y)].store(value, Ordering::Relaxed);
    }

    #[inline]
    pub fn load(&self, x: u32, y: u32) -> u32 {
        self.data[self.index(x, y)].load(Ordering::Relaxed)
    }

    pub fn clear(&self) {
        for px in &self.data {
            px.store(0, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> Vec<u32> {
        self.data.iter().map(|px| px.load(Ordering::Relaxed)).collect()
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y as usize * self.width as usize + x as usize
    }
}

/// Multi-threaded renderer driven by polling.
pub struct Renderer {
    config: RenderConfig,
    pool: ThreadPool,
    pixels: Arc<PixelBuffer>,
    tasks_complete: Arc<AtomicI32>,
    total_tasks: i32,
    /// Number of renders started so far
    generation: u64,
    region: Option<Region>,
    presenter: Option<Box<dyn Presenter>>,
    started: Option<Instant>,
}

impl Renderer {
    /// Renderer with the default configuration and `samples` per pixel.
    pub fn new(width: u32, height: u32, samples: u32) -> Result<Self, RenderError> {
        let config = RenderConfig {
            samples_per_pixel: samples,
            ..Default::default()
        };
        Self::with_config(width, height, config)
    }

    pub fn with_config(width: u32, height: u32, config: RenderConfig) -> Result<Self, RenderError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .thread_name(|i| format!("ember-render-{i}"))
            .build()?;

        debug!(
            "Renderer {}x{} with {} threads",
            width,
            height,
            pool.current_num_threads()
        );

        Ok(Self {
            config,
            pool,
            pixels: Arc::new(PixelBuffer::new(width, height)),
            tasks_complete: Arc::new(AtomicI32::new(IDLE)),
            total_tasks: 0,
            generation: 0,
            region: None,
            presenter: None,
            started: None,
        })
    }

    pub fn with_presenter(mut self, presenter: impl Presenter + 'static) -> Self {
        self.presenter = Some(Box::new(presenter));
        self
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Restrict later renders to `region`, or to the whole image with `None`.
    pub fn set_region(&mut self, region: Option<Region>) -> Result<(), RenderError> {
        if self.in_progress() {
            return Err(RenderError::InProgress);
        }
        if let Some(region) = region {
            if !region.fits_within(self.width(), self.height()) {
                return Err(RenderError::RegionOutOfBounds {
                    region,
                    width: self.width(),
                    height: self.height(),
                });
            }
        }
        self.region = region;
        Ok(())
    }

    pub fn region(&self) -> Region {
        self.region
            .unwrap_or_else(|| Region::full(self.width(), self.height()))
    }

    /// Clear the image and queue every block of the current region.
    ///
    /// Returns as soon as the tasks are submitted. The scene must not change
    /// until [`finish`](Self::finish) reports completion, which the shared
    /// `Arc` guarantees.
    pub fn begin_render(&mut self, scene: Arc<Scene>) -> Result<Instant, RenderError> {
        if self.in_progress() {
            return Err(RenderError::InProgress);
        }

        let (width, height) = (self.width(), self.height());
        if scene.camera.image_width != width || scene.camera.image_height != height {
            warn!(
                "Camera resolution {}x{} differs from the {}x{} image",
                scene.camera.image_width, scene.camera.image_height, width, height
            );
        }

        self.pixels.clear();
        self.generation += 1;

        let region = self.region();
        let blocks = generate_blocks(region, self.config.block_size);
        self.total_tasks = blocks.len() as i32;
        self.tasks_complete.store(0, Ordering::Release);

        info!(
            "Render {} started: region {}, {} blocks, {} spp, depth {}",
            self.generation,
            region,
            blocks.len(),
            self.config.samples_per_pixel,
            self.config.max_depth
        );

        let started = Instant::now();
        self.started = Some(started);

        for block in blocks {
            let scene = Arc::clone(&scene);
            let pixels = Arc::clone(&self.pixels);
            let tasks_complete = Arc::clone(&self.tasks_complete);
            let config = self.config.clone();
            let seed = block_seed(config.seed, self.generation, block.index);

            self.pool.spawn(move || {
                let mut rng = Xorshift::seed_from_u64(seed);
                render_block(&scene, &config, &block, &pixels, &mut rng);
                tasks_complete.fetch_add(1, Ordering::AcqRel);
            });
        }

        Ok(started)
    }

    /// Publish the image and return to idle once every block is done.
    ///
    /// Returns `false` while blocks are still rendering, or when idle.
    pub fn finish(&mut self) -> bool {
        let complete = self.tasks_complete.load(Ordering::Acquire);
        if complete == IDLE || complete < self.total_tasks {
            return false;
        }

        if let Some(presenter) = self.presenter.as_mut() {
            let pixels = self.pixels.snapshot();
            presenter.present(self.pixels.width(), self.pixels.height(), &pixels);
        }

        self.tasks_complete.store(IDLE, Ordering::Release);
        match self.started.take() {
            Some(started) => info!(
                "Render {} finished in {:.2?}",
                self.generation,
                started.elapsed()
            ),
            None => info!("Render {} finished", self.generation),
        }
        true
    }

    pub fn in_progress(&self) -> bool {
        self.tasks_complete.load(Ordering::Acquire) != IDLE
    }

    /// Fraction of blocks finished, in [0, 1]. Stays at 1 after a render
    /// completes and is 0 before the first one.
    pub fn progress(&self) -> f32 {
        let complete = self.tasks_complete.load(Ordering::Acquire);
        if complete == IDLE {
            return if self.generation > 0 { 1.0 } else { 0.0 };
        }
        if self.total_tasks == 0 {
            return 1.0;
        }
        (complete as f32 / self.total_tasks as f32).min(1.0)
    }

    /// Copy of the current packed pixels, row-major.
    pub fn pixels(&self) -> Vec<u32> {
        self.pixels.snapshot()
    }

    /// Encode the current pixels to `path`; the format follows the extension.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<(), RenderError> {
        let path = path.as_ref();
        let bytes: Vec<u8> = self
            .pixels
            .snapshot()
            .into_iter()
            .flat_map(u32::to_le_bytes)
            .collect();

        image::save_buffer(
            path,
            &bytes,
            self.width(),
            self.height(),
            image::ColorType::Rgba8,
        )?;

        info!("Wrote {}x{} image to {}", self.width(), self.height(), path.display());
        Ok(())
    }
}

/// Seed of one block's generator. Distinct per render and per block.
fn block_seed(seed: u64, generation: u64, index: usize) -> u64 {
    seed ^ generation.wrapping_mul(0x9e37_79b9_7f4a_7c15)
        ^ (index as u64).wrapping_mul(0xbf58_476d_1ce4_e5b9)
}

/// Render every pixel of `block` into `pixels`.
fn render_block(
    scene: &Scene,
    config: &RenderConfig,
    block: &Block,
    pixels: &PixelBuffer,
    rng: &mut Xorshift,
) {
    let (width, height) = (pixels.width() as f32, pixels.height() as f32);
    let area = block.area;

    for y in area.y..area.y + area.height {
        for x in area.x..area.x + area.width {
            let u = x as f32 / width;
            let v = y as f32 / height;
            let color = scene.pixel(u, v, config, rng);
            pixels.store(x, y, pack_rgba(color));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::integrator::Background;
    use crate::material::{Material, MaterialCache};
    use crate::object::Object;
    use ember_math::Vec3;
    use std::sync::Mutex;
    use std::thread;
    use std::time::Duration;

    fn sky_scene(width: u32, height: u32) -> Arc<Scene> {
        let mut materials = MaterialCache::new();
        let grey = materials.add(Material::lambertian(Color::splat(0.5)));
        let mut camera = Camera::new()
            .with_resolution(width, height)
            .with_position(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y)
            .with_lens(90.0, 0.0, 1.0);
        camera.initialize();

        let root = Object::sphere(Vec3::new(0.0, 0.0, -1.0), 0.5, grey);
        Arc::new(Scene::new(root, materials, camera).with_background(Background::SkyGradient))
    }

    fn config() -> RenderConfig {
        RenderConfig {
            samples_per_pixel: 2,
            max_depth: 3,
            block_size: 8,
            threads: 2,
            seed: 11,
        }
    }

    fn wait(renderer: &mut Renderer) {
        while !renderer.finish() {
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_pack_rgba() {
        assert_eq!(pack_rgba(Color::ZERO), 0xff00_0000);
        assert_eq!(pack_rgba(Color::ONE), 0xffff_ffff);
        assert_eq!(pack_rgba(Color::new(1.0, 0.0, 0.0)), 0xff00_00ff);
        assert_eq!(pack_rgba(Color::new(0.0, 0.0, 2.0)), 0xffff_0000);
        assert_eq!(pack_rgba(Color::new(-1.0, 0.5, 0.0)), 0xff00_7f00);
    }

    #[test]
    fn test_config_json_round_trip() {
        let config = config();
        let json = serde_json::to_string(&config).unwrap();
        let back: RenderConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_config_defaults_fill_missing_fields() {
        let config: RenderConfig = serde_json::from_str(r#"{ "samples_per_pixel": 64 }"#).unwrap();
        assert_eq!(config.samples_per_pixel, 64);
        assert_eq!(config.max_depth, RenderConfig::default().max_depth);
        assert_eq!(config.block_size, 32);
    }

    #[test]
    fn test_idle_before_first_render() {
        let mut renderer = Renderer::with_config(16, 16, config()).unwrap();
        assert!(!renderer.in_progress());
        assert_eq!(renderer.progress(), 0.0);
        assert!(!renderer.finish());
    }

    #[test]
    fn test_render_fills_every_pixel() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut renderer = Renderer::with_config(20, 12, config()).unwrap();
        renderer.begin_render(sky_scene(20, 12)).unwrap();
        wait(&mut renderer);

        assert!(!renderer.in_progress());
        assert_eq!(renderer.progress(), 1.0);
        let pixels = renderer.pixels();
        assert_eq!(pixels.len(), 20 * 12);
        assert!(pixels.iter().all(|&px| px >> 24 == 0xff));
    }

    #[test]
    fn test_progress_is_monotonic() {
        let small_blocks = RenderConfig {
            block_size: 4,
            ..config()
        };
        let mut renderer = Renderer::with_config(64, 64, small_blocks).unwrap();
        renderer.begin_render(sky_scene(64, 64)).unwrap();

        let mut last = 0.0;
        while renderer.in_progress() {
            let p = renderer.progress();
            assert!(p >= last, "progress went from {last} to {p}");
            assert!((0.0..=1.0).contains(&p));
            last = p;
            if renderer.finish() {
                break;
            }
        }
        assert_eq!(renderer.progress(), 1.0);
    }

    #[test]
    fn test_begin_while_rendering_is_rejected() {
        let mut renderer = Renderer::with_config(32, 32, config()).unwrap();
        let scene = sky_scene(32, 32);
        renderer.begin_render(Arc::clone(&scene)).unwrap();

        // Nothing resets the counter until finish() runs
        assert!(matches!(
            renderer.begin_render(Arc::clone(&scene)),
            Err(RenderError::InProgress)
        ));
        assert!(matches!(renderer.set_region(None), Err(RenderError::InProgress)));

        wait(&mut renderer);
        assert!(renderer.begin_render(scene).is_ok());
        wait(&mut renderer);
    }

    #[test]
    fn test_renders_are_reproducible() {
        let render = || {
            let mut renderer = Renderer::with_config(24, 16, config()).unwrap();
            renderer.begin_render(sky_scene(24, 16)).unwrap();
            wait(&mut renderer);
            renderer.pixels()
        };
        assert_eq!(render(), render());
    }

    #[test]
    fn test_region_limits_written_pixels() {
        let mut renderer = Renderer::with_config(16, 16, config()).unwrap();
        renderer.set_region(Some(Region::new(4, 2, 6, 5))).unwrap();
        renderer.begin_render(sky_scene(16, 16)).unwrap();
        wait(&mut renderer);

        let pixels = renderer.pixels();
        for y in 0..16 {
            for x in 0..16 {
                let inside = (4..10).contains(&x) && (2..7).contains(&y);
                let px = pixels[y * 16 + x];
                assert_eq!(px != 0, inside, "pixel ({x}, {y}) = {px:#x}");
            }
        }
    }

    #[test]
    fn test_region_out_of_bounds() {
        let mut renderer = Renderer::with_config(16, 16, config()).unwrap();
        let err = renderer.set_region(Some(Region::new(10, 0, 8, 4))).unwrap_err();
        assert!(matches!(err, RenderError::RegionOutOfBounds { width: 16, height: 16, .. }));
        assert_eq!(renderer.region(), Region::full(16, 16));
    }

    #[test]
    fn test_empty_region_completes_immediately() {
        let mut renderer = Renderer::with_config(16, 16, config()).unwrap();
        renderer.set_region(Some(Region::new(0, 0, 0, 0))).unwrap();
        renderer.begin_render(sky_scene(16, 16)).unwrap();
        assert_eq!(renderer.progress(), 1.0);
        assert!(renderer.finish());
    }

    struct Capture(Arc<Mutex<Vec<u32>>>);

    impl Presenter for Capture {
        fn present(&mut self, width: u32, height: u32, pixels: &[u32]) {
            assert_eq!(pixels.len(), (width * height) as usize);
            *self.0.lock().unwrap() = pixels.to_vec();
        }
    }

    #[test]
    fn test_presenter_receives_finished_image() {
        let shown = Arc::new(Mutex::new(Vec::new()));
        let mut renderer = Renderer::with_config(8, 8, config())
            .unwrap()
            .with_presenter(Capture(Arc::clone(&shown)));

        renderer.begin_render(sky_scene(8, 8)).unwrap();
        wait(&mut renderer);

        assert_eq!(*shown.lock().unwrap(), renderer.pixels());
    }

    #[test]
    fn test_block_seeds_differ() {
        assert_ne!(block_seed(1, 1, 0), block_seed(1, 1, 1));
        assert_ne!(block_seed(1, 1, 0), block_seed(1, 2, 0));
    }
}
