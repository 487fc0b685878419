//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Recursive ray tracing with a hard bounce limit
//! - Rounds of samples accumulated per pixel, run sequentially
//! - Tiles rendered in parallel within a round
//! - Gamma correction and clamping or rescaling on output

use image::RgbImage;
use lumen_core::{RenderHandle, RenderParameters, RenderStatus};
use lumen_math::Interval;
use rand::RngCore;
use rayon::prelude::*;

use crate::bucket::{generate_buckets, render_bucket, Bucket, BucketResult};
use crate::{BvhNode, Camera, Color, HitRecord, Hittable, PrimitiveList, Ray, RenderError};

/// The per-ray subset of [`RenderParameters`].
#[derive(Debug, Clone, Copy)]
pub struct TraceSettings {
    /// Camera rays per pixel per round
    pub samples_per_round: u32,
    /// Maximum number of surface interactions per path
    pub max_bounces: u32,
    /// Accepted hit parameters
    pub ray_interval: Interval,
    /// Radiance of rays that escape the scene
    pub background: Color,
    /// Base seed for the per-bucket generators
    pub seed: u64,
}

impl TraceSettings {
    pub fn from_params(params: &RenderParameters) -> Self {
        Self {
            samples_per_round: params.samples_per_round,
            max_bounces: params.max_bounces,
            ray_interval: params.ray_interval(),
            background: params.background(),
            seed: params.seed,
        }
    }
}

/// Compute the color seen by a ray.
///
/// Emission is gathered at every hit and the continuation is attenuated by
/// the material's reflectance. Paths are cut off after `depth` bounces.
pub fn ray_color(
    ray: &Ray,
    world: &dyn Hittable,
    depth: u32,
    settings: &TraceSettings,
    rng: &mut dyn RngCore,
) -> Color {
    // If we've exceeded max depth, return black (no light)
    if depth == 0 {
        return Color::ZERO;
    }

    let mut rec = HitRecord::default();

    // Check if ray hits anything
    if !world.hit(ray, settings.ray_interval, &mut rec, rng) {
        return settings.background;
    }

    // Get emission from material (for lights)
    let emission = rec.material.emittance(rec.u, rec.v);

    // Try to scatter the ray
    match rec.material.scatter(&rec, rng) {
        Some(scattered) => {
            let attenuation = rec.material.reflectance(rec.u, rec.v);
            emission + attenuation * ray_color(&scattered, world, depth - 1, settings, rng)
        }
        // Ray was absorbed - just return emission
        None => emission,
    }
}

/// Apply gamma correction.
#[inline]
pub fn linear_to_gamma(linear: f64, gamma: f64) -> f64 {
    if linear > 0.0 {
        linear.powf(1.0 / gamma)
    } else {
        0.0
    }
}

/// Bring a color into [0, 1].
///
/// With `rescale`, a color whose brightest channel exceeds one is divided by
/// that channel, keeping its hue. Otherwise each channel is clamped.
#[inline]
pub fn truncate(color: Color, rescale: bool) -> Color {
    let color = color.max(Color::ZERO);
    let brightest = color.max_element();
    if rescale && brightest > 1.0 {
        color / brightest
    } else {
        color.min(Color::ONE)
    }
}

/// Convert a color in [0, 1] to 8-bit RGB.
pub fn color_to_rgb(color: Color) -> [u8; 3] {
    let c = color.clamp(Color::ZERO, Color::ONE) * 255.0;
    [c.x.round() as u8, c.y.round() as u8, c.z.round() as u8]
}

fn pixel_index(width: u32, x: u32, y: u32) -> usize {
    y as usize * width as usize + x as usize
}

/// Simple image buffer for storing render output.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    /// Row-major offset of (x, y), computed in `usize` so large images don't wrap.
    fn index(&self, x: u32, y: u32) -> usize {
        pixel_index(self.width, x, y)
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    /// Convert to an 8-bit RGB image (for display or saving).
    pub fn to_rgb_image(&self) -> RgbImage {
        RgbImage::from_fn(self.width, self.height, |x, y| image::Rgb(color_to_rgb(self.get(x, y))))
    }
}

/// Running per-pixel sums across rounds.
#[derive(Debug, Clone)]
pub struct Accumulator {
    sums: ImageBuffer,
    samples_per_pixel: u64,
    rounds: u32,
}

impl Accumulator {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            sums: ImageBuffer::new(width, height),
            samples_per_pixel: 0,
            rounds: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.sums.width
    }

    pub fn height(&self) -> u32 {
        self.sums.height
    }

    /// Add the sums of one bucket.
    pub fn add_bucket(&mut self, result: &BucketResult) {
        let b = &result.bucket;
        let mut pixels = result.pixels.iter();
        for y in b.y..b.y + b.height {
            for x in b.x..b.x + b.width {
                if let Some(sum) = pixels.next() {
                    let index = self.sums.index(x, y);
                    self.sums.pixels[index] += *sum;
                }
            }
        }
    }

    /// Mark a round of `samples` per pixel as fully added.
    pub fn finish_round(&mut self, samples: u32) {
        self.samples_per_pixel += samples as u64;
        self.rounds += 1;
    }

    /// Samples accumulated in every pixel.
    pub fn samples_per_pixel(&self) -> u64 {
        self.samples_per_pixel
    }

    /// Completed rounds.
    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    /// Mean linear radiance of pixel (x, y), black before the first round.
    pub fn average(&self, x: u32, y: u32) -> Color {
        if self.samples_per_pixel == 0 {
            return Color::ZERO;
        }
        self.sums.get(x, y) / self.samples_per_pixel as f64
    }

    /// Averaged, gamma corrected and truncated pixels.
    pub fn resolve(&self, gamma: f64, rescale: bool) -> ImageBuffer {
        let mut image = ImageBuffer::new(self.width(), self.height());
        for y in 0..self.height() {
            for x in 0..self.width() {
                let c = self.average(x, y);
                let corrected = Color::new(
                    linear_to_gamma(c.x, gamma),
                    linear_to_gamma(c.y, gamma),
                    linear_to_gamma(c.z, gamma),
                );
                image.set(x, y, truncate(corrected, rescale));
            }
        }
        image
    }

    /// Resolve straight to an 8-bit image, using the output settings in `params`.
    pub fn to_rgb_image(&self, params: &RenderParameters) -> RgbImage {
        self.resolve(params.gamma_correction, params.use_scaling_truncation)
            .to_rgb_image()
    }
}

/// Build the top-level object a render traces against.
///
/// With `use_bvh`, bounded primitives go into a BVH and unbounded ones are
/// scanned beside it.
pub fn build_world(scene: PrimitiveList, use_bvh: bool) -> Result<PrimitiveList, RenderError> {
    if scene.is_empty() {
        return Err(RenderError::EmptyScene);
    }
    if !use_bvh {
        return Ok(scene);
    }

    let (finite, infinite) = scene.partition_infinite();
    if !infinite.is_empty() {
        log::warn!(
            "{} unbounded primitive(s) kept outside the BVH and tested on every ray",
            infinite.len()
        );
    }

    let mut world = infinite;
    if !finite.is_empty() {
        world.add(BvhNode::new(finite)?);
    }
    Ok(world)
}

/// A scene, camera and parameters validated and ready to render.
pub struct Renderer {
    params: RenderParameters,
    settings: TraceSettings,
    camera: Camera,
    world: PrimitiveList,
    buckets: Vec<Bucket>,
}

impl Renderer {
    /// Validate the parameters, set the camera up for the image size and
    /// build the acceleration structure.
    pub fn new(scene: PrimitiveList, camera: Camera, params: RenderParameters) -> Result<Self, RenderError> {
        params.validate()?;

        let mut camera = camera.with_resolution(params.image_width, params.image_height);
        camera.initialize()?;

        let primitive_count = scene.len();
        let world = build_world(scene, params.use_bvh)?;
        let buckets = generate_buckets(
            params.image_width,
            params.image_height,
            params.tile_width,
            params.tile_height,
        );

        log::info!(
            "Scene ready: {} primitives, {}x{} image in {} tiles, {} rounds of {} samples",
            primitive_count,
            params.image_width,
            params.image_height,
            buckets.len(),
            params.round_count,
            params.samples_per_round
        );

        Ok(Self {
            settings: TraceSettings::from_params(&params),
            params,
            camera,
            world,
            buckets,
        })
    }

    pub fn params(&self) -> &RenderParameters {
        &self.params
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Trace one round of every bucket in parallel.
    pub fn render_round(&self, round: u32) -> Vec<BucketResult> {
        self.buckets
            .par_iter()
            .map(|bucket| render_bucket(bucket, &self.camera, &self.world, &self.settings, round))
            .collect()
    }

    /// Run every round, checking `handle` for a stop request between rounds.
    ///
    /// `on_round` sees the accumulator after each completed round. Returns
    /// whatever was accumulated, which is partial when the render was stopped.
    pub fn run(&self, handle: &RenderHandle, mut on_round: impl FnMut(&Accumulator)) -> Accumulator {
        if handle.status() == RenderStatus::Pending {
            handle.transition(RenderStatus::Starting);
        }
        handle.set_total_rounds(self.params.round_count);
        handle.transition(RenderStatus::Running);

        let mut accumulator = Accumulator::new(self.params.image_width, self.params.image_height);
        let start = std::time::Instant::now();

        for round in 0..self.params.round_count {
            if handle.is_stop_requested() {
                log::info!("Stop requested, ending render after {} rounds", round);
                handle.transition(RenderStatus::Stopping);
                handle.transition(RenderStatus::Stopped);
                return accumulator;
            }

            for result in self.render_round(round) {
                accumulator.add_bucket(&result);
            }
            accumulator.finish_round(self.params.samples_per_round);
            let done = handle.round_completed();

            log::info!(
                "Round {}/{} done ({} spp, {:.2?} elapsed)",
                done,
                self.params.round_count,
                accumulator.samples_per_pixel(),
                start.elapsed()
            );
            on_round(&accumulator);
        }

        handle.transition(RenderStatus::Completed);
        accumulator
    }
}

/// Render `scene` from `camera`, reporting status through `handle`.
///
/// Setup failures move the handle to `Error` and are returned.
pub fn render(
    scene: PrimitiveList,
    camera: Camera,
    params: RenderParameters,
    handle: &RenderHandle,
) -> Result<Accumulator, RenderError> {
    handle.transition(RenderStatus::Starting);

    let renderer = match Renderer::new(scene, camera, params) {
        Ok(renderer) => renderer,
        Err(e) => {
            handle.fail(e.to_string());
            return Err(e);
        }
    };

    Ok(renderer.run(handle, |_| {}))
}
