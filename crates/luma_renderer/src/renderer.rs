//! Frame rendering: per-pixel sampling, the parallel bucket loop and the
//! output image.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;

use crate::bucket::{generate_buckets, render_bucket, BucketResult, DEFAULT_BUCKET_SIZE};
use crate::camera::Camera;
use crate::error::RenderError;
use crate::material::Color;
use crate::scene::Scene;

/// Exponent applied to linear radiance when quantizing to 8 bits.
pub const OUTPUT_GAMMA: f32 = 0.6;

/// Render configuration.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Path samples averaged per pixel
    pub samples_per_pixel: u32,
    /// Edge length of a bucket in pixels
    pub bucket_size: u32,
    /// Base seed; bucket streams are derived from it
    pub seed: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples_per_pixel: 16,
            bucket_size: DEFAULT_BUCKET_SIZE,
            seed: 0,
        }
    }
}

/// Render a single pixel with multi-sampling.
pub fn render_pixel(
    camera: &Camera,
    scene: &Scene,
    x: u32,
    y: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let samples = config.samples_per_pixel.max(1);
    let mut pixel_color = Color::ZERO;

    for _ in 0..samples {
        // Camera.get_ray already adds random offset for anti-aliasing
        let ray = camera.get_ray(x, y, rng);
        pixel_color += scene.cast_ray(&ray, rng);
    }

    // Average the samples
    pixel_color / samples as f32
}

/// Quantize one linear channel: `255 * clamp(c, 0, 1)^0.6`.
#[inline]
pub fn to_byte(linear: f32) -> u8 {
    (255.0 * linear.clamp(0.0, 1.0).powf(OUTPUT_GAMMA)) as u8
}

/// Convert a color to 8-bit RGB.
pub fn color_to_rgb(color: Color) -> [u8; 3] {
    [to_byte(color.x), to_byte(color.y), to_byte(color.z)]
}

/// Linear radiance framebuffer.
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
            pixels: vec![Color::ZERO; (width * height) as usize],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.pixels[(y * self.width + x) as usize] = color;
    }

    /// Copy a rendered bucket into place.
    pub fn write_bucket(&mut self, result: &BucketResult) {
        let bucket = &result.bucket;
        for (i, color) in result.pixels.iter().enumerate() {
            let local_x = i as u32 % bucket.width;
            let local_y = i as u32 / bucket.width;
            self.set(bucket.x + local_x, bucket.y + local_y, *color);
        }
    }

    /// Convert to gamma-encoded RGB bytes, row-major.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for color in &self.pixels {
            bytes.extend_from_slice(&color_to_rgb(*color));
        }
        bytes
    }

    /// Write the image; the format follows the file extension.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), RenderError> {
        let path = path.as_ref();
        let image = image::RgbImage::from_fn(self.width, self.height, |x, y| {
            image::Rgb(color_to_rgb(self.get(x, y)))
        });
        image.save(path)?;
        log::info!("Saved {}x{} image to {}", self.width, self.height, path.display());
        Ok(())
    }
}

/// Seed for the stream of one bucket.
fn bucket_seed(seed: u64, index: usize) -> u64 {
    seed.rotate_left(32) ^ index as u64
}

/// Render the entire scene to an image buffer.
///
/// Buckets render in parallel, each with its own generator seeded from
/// `config.seed` and the bucket index, so a given seed always yields
/// the same image.
pub fn render(scene: &Scene, camera: &Camera, config: &RenderConfig) -> ImageBuffer {
    let start = Instant::now();
    let buckets = generate_buckets(camera.image_width, camera.image_height, config.bucket_size);
    let total = buckets.len();
    let done = AtomicUsize::new(0);

    log::info!(
        "Rendering {}x{} at {} spp in {} buckets",
        camera.image_width,
        camera.image_height,
        config.samples_per_pixel,
        total
    );

    let results: Vec<BucketResult> = buckets
        .par_iter()
        .map(|bucket| {
            let mut rng = StdRng::seed_from_u64(bucket_seed(config.seed, bucket.index));
            let pixels = render_bucket(bucket, camera, scene, config, &mut rng);
            let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
            log::debug!(
                "Bucket {} done ({}/{}, {:.0}%)",
                bucket.index,
                finished,
                total,
                100.0 * finished as f32 / total as f32
            );
            BucketResult::new(*bucket, pixels)
        })
        .collect();

    let mut image = ImageBuffer::new(camera.image_width, camera.image_height);
    for result in &results {
        image.write_bucket(result);
    }

    log::info!("Render complete in {:.2?}", start.elapsed());
    image
}
