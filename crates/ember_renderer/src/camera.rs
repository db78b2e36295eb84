//! Camera for ray generation.

use ember_math::{gen_f32, random_in_unit_disk, Ray, Vec2, Vec3};
use rand::RngCore;

/// Thin-lens camera with a shutter interval.
///
/// Image coordinates are normalised: `(0, 0)` is the top-left corner of the
/// image and `(1, 1)` the bottom-right.
#[derive(Debug, Clone)]
pub struct Camera {
    // Image settings
    pub image_width: u32,
    pub image_height: u32,

    // Camera positioning
    look_from: Vec3,
    look_at: Vec3,
    vup: Vec3,

    // Lens settings
    vfov: f32,       // Vertical field of view in degrees
    aperture: f32,   // Lens diameter; 0 is a pinhole
    focus_dist: f32, // Distance from camera to plane of perfect focus

    // Shutter
    time0: f32,
    time1: f32,

    // Cached computed values (set by initialize())
    center: Vec3,
    upper_left: Vec3,
    horizontal: Vec3,
    vertical: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    lens_radius: f32,
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        let mut camera = Self {
            image_width: 800,
            image_height: 450,
            look_from: Vec3::ZERO,
            look_at: Vec3::NEG_Z,
            vup: Vec3::Y,
            vfov: 90.0,
            aperture: 0.0,
            focus_dist: 1.0,
            time0: 0.0,
            time1: 0.0,
            center: Vec3::ZERO,
            upper_left: Vec3::ZERO,
            horizontal: Vec3::ZERO,
            vertical: Vec3::ZERO,
            u: Vec3::X,
            v: Vec3::Y,
            w: Vec3::Z,
            lens_radius: 0.0,
        };
        camera.initialize();
        camera
    }

    /// Set image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.image_width = width.max(1);
        self.image_height = height.max(1);
        self
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set lens settings.
    ///
    /// - `vfov`: vertical field of view in degrees
    /// - `aperture`: lens diameter, 0 for a pinhole
    /// - `focus_dist`: distance to the plane in perfect focus
    pub fn with_lens(mut self, vfov: f32, aperture: f32, focus_dist: f32) -> Self {
        self.vfov = vfov;
        self.aperture = aperture.max(0.0);
        self.focus_dist = focus_dist;
        self
    }

    /// Rays are stamped with times uniformly spread over `[time0, time1]`.
    pub fn with_shutter(mut self, time0: f32, time1: f32) -> Self {
        self.time0 = time0;
        self.time1 = time1.max(time0);
        self
    }

    /// Recompute the cached basis. Must be called after changing settings.
    pub fn initialize(&mut self) {
        self.center = self.look_from;
        self.lens_radius = self.aperture / 2.0;

        // Calculate viewport dimensions
        let theta = self.vfov.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h * self.focus_dist;
        let viewport_width = viewport_height * self.aspect_ratio();

        // Calculate camera basis vectors
        self.w = (self.look_from - self.look_at).normalize();
        self.u = self.vup.cross(self.w).normalize();
        self.v = self.w.cross(self.u);

        // Image rows run downwards
        self.horizontal = viewport_width * self.u;
        self.vertical = -viewport_height * self.v;
        self.upper_left =
            self.center - self.focus_dist * self.w - self.horizontal / 2.0 - self.vertical / 2.0;
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.image_width as f32 / self.image_height as f32
    }

    /// Shutter interval.
    pub fn shutter(&self) -> (f32, f32) {
        (self.time0, self.time1)
    }

    pub fn position(&self) -> Vec3 {
        self.center
    }

    /// Ray through normalised image point `(s, t)` from lens point `lens`
    /// (a point in the unit disk) at `time`. Deterministic.
    pub fn ray_through(&self, s: f32, t: f32, lens: Vec2, time: f32) -> Ray {
        let offset = self.lens_radius * (lens.x * self.u + lens.y * self.v);
        let origin = self.center + offset;
        let target = self.upper_left + s * self.horizontal + t * self.vertical;
        Ray::new(origin, target - origin, time)
    }

    /// Jittered ray for one sample. `(s, t)` is the pixel's top-left corner;
    /// the sample lands anywhere inside that pixel, through a random lens
    /// point at a random shutter time.
    pub fn get_ray(&self, s: f32, t: f32, rng: &mut dyn RngCore) -> Ray {
        let s = s + gen_f32(rng) / self.image_width as f32;
        let t = t + gen_f32(rng) / self.image_height as f32;

        let lens = if self.lens_radius > 0.0 {
            random_in_unit_disk(rng).truncate()
        } else {
            Vec2::ZERO
        };
        let time = self.time0 + gen_f32(rng) * (self.time1 - self.time0);

        self.ray_through(s, t, lens, time)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}
