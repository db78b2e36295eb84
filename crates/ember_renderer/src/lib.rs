//! Ember renderer - CPU Monte Carlo path tracing.
//!
//! Scenes are built programmatically from a closed set of [`Object`]
//! variants (spheres, SIMD sphere lanes, rectangles, boxes, volumes, lists,
//! BVHs and transformed instances) that refer to materials by [`MatId`].
//! The [`Renderer`] splits the image into blocks and traces them on a rayon
//! thread pool while the host polls for progress.
//!
//! ```ignore
//! use ember_renderer::{scenes, Renderer};
//! use std::sync::Arc;
//!
//! let scene = Arc::new(scenes::simple_lanes(640, 360));
//! let mut renderer = Renderer::new(640, 360, 16)?;
//! renderer.begin_render(scene)?;
//! while !renderer.finish() {
//!     std::thread::sleep(std::time::Duration::from_millis(50));
//! }
//! renderer.write_to_file("simple.png")?;
//! ```

mod block;
mod bvh;
mod camera;
mod instance;
mod integrator;
mod list;
mod material;
mod object;
mod rect;
mod renderer;
mod scene;
pub mod scenes;
mod sphere;
mod sphere_lane;
mod trace;
mod volume;

pub use block::{generate_blocks, Block, Region, DEFAULT_BLOCK_SIZE};
pub use bvh::Bvh;
pub use camera::Camera;
pub use instance::Instance;
pub use integrator::{trace_path, Background, EPSILON};
pub use list::ObjectList;
pub use material::{MatId, Material, MaterialCache, Scatter};
pub use object::Object;
pub use rect::{Cuboid, Plane, Rect};
pub use renderer::{pack_rgba, PixelBuffer, Presenter, RenderConfig, RenderError, Renderer};
pub use scene::{Scene, GAMMA};
pub use sphere::{MovingSphere, Sphere};
pub use sphere_lane::{SphereLane, SphereLaneBuilder};
pub use trace::{Hittable, Trace};
pub use volume::ConstantMedium;

/// Re-export the math and texture types scenes are built from
pub use ember_core::{ImageTexture, Perlin, Texture, TextureCache};
pub use ember_math::{Aabb, Color, Interval, Ray, Transform, Vec2, Vec3, Xorshift};
