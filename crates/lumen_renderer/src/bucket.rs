//! Bucket-based tile rendering.
//!
//! Divides the image into tiles (buckets) that can be rendered
//! independently and in parallel using rayon. Every bucket of every round
//! draws from its own generator, seeded from the render seed, the round and
//! the bucket index.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::renderer::{ray_color, TraceSettings};
use crate::{Camera, Color, Hittable};

/// A rectangular region of the image to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    /// X coordinate of bucket's top-left corner
    pub x: u32,
    /// Y coordinate of bucket's top-left corner
    pub y: u32,
    /// Width of the bucket in pixels
    pub width: u32,
    /// Height of the bucket in pixels
    pub height: u32,
    /// Index of this bucket in the render order
    pub index: usize,
}

impl Bucket {
    /// Create a new bucket.
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
            index,
        }
    }

    /// Get the total number of pixels in this bucket.
    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }
}

/// Generate buckets for an image, sorted in spiral order from center.
///
/// Edge buckets are clipped to the image, so the buckets tile the image
/// exactly without overlapping. Buckets are rendered from the center
/// outward so the middle of the frame resolves first.
pub fn generate_buckets(width: u32, height: u32, tile_width: u32, tile_height: u32) -> Vec<Bucket> {
    let mut buckets = Vec::new();
    if tile_width == 0 || tile_height == 0 {
        return buckets;
    }
    let mut index = 0;

    // Generate grid of buckets
    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            let bw = tile_width.min(width - x);
            let bh = tile_height.min(height - y);
            buckets.push(Bucket::new(x, y, bw, bh, index));
            index += 1;
            x += tile_width;
        }
        y += tile_height;
    }

    // Sort by distance from center (spiral order)
    sort_spiral(&mut buckets, width, height);

    // Update indices after sorting
    for (i, bucket) in buckets.iter_mut().enumerate() {
        bucket.index = i;
    }

    buckets
}

/// Sort buckets by distance from image center (spiral order).
///
/// The sort is stable, so equally distant buckets keep row-major order.
fn sort_spiral(buckets: &mut [Bucket], width: u32, height: u32) {
    let center_x = width as f64 / 2.0;
    let center_y = height as f64 / 2.0;

    let distance = |b: &Bucket| {
        let bx = b.x as f64 + b.width as f64 / 2.0;
        let by = b.y as f64 + b.height as f64 / 2.0;
        (bx - center_x).powi(2) + (by - center_y).powi(2)
    };

    buckets.sort_by(|a, b| distance(a).total_cmp(&distance(b)));
}

/// Seed for the generator of one bucket in one round.
pub fn bucket_seed(seed: u64, round: u32, index: usize) -> u64 {
    let mut hash = seed;
    for value in [round as u64, index as u64] {
        hash = (hash ^ value).wrapping_add(0x9E37_79B9_7F4A_7C15);
        hash = (hash ^ (hash >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        hash = (hash ^ (hash >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        hash ^= hash >> 31;
    }
    hash
}

/// Trace one round of samples for every pixel of a bucket.
///
/// Returns per-pixel sums, not averages, in row-major order within the bucket.
pub fn render_bucket(
    bucket: &Bucket,
    camera: &Camera,
    world: &dyn Hittable,
    settings: &TraceSettings,
    round: u32,
) -> BucketResult {
    let mut rng = StdRng::seed_from_u64(bucket_seed(settings.seed, round, bucket.index));
    let mut pixels = Vec::with_capacity(bucket.pixel_count() as usize);

    for local_y in 0..bucket.height {
        for local_x in 0..bucket.width {
            let global_x = bucket.x + local_x;
            let global_y = bucket.y + local_y;

            let mut sum = Color::ZERO;
            for _ in 0..settings.samples_per_round {
                let ray = camera.pixel_ray(global_x, global_y, &mut rng);
                sum += ray_color(&ray, world, settings.max_bounces, settings, &mut rng);
            }
            pixels.push(sum);
        }
    }

    BucketResult::new(*bucket, pixels)
}

/// Result of rendering a bucket.
#[derive(Debug, Clone)]
pub struct BucketResult {
    /// The bucket that was rendered
    pub bucket: Bucket,
    /// Summed pixel colors in row-major order
    pub pixels: Vec<Color>,
}

impl BucketResult {
    /// Create a new bucket result.
    pub fn new(bucket: Bucket, pixels: Vec<Color>) -> Self {
        Self { bucket, pixels }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_buckets_exact_fit() {
        let buckets = generate_buckets(128, 128, 64, 64);
        assert_eq!(buckets.len(), 4); // 2x2 grid

        // Total pixels should equal image size
        let total_pixels: u32 = buckets.iter().map(|b| b.pixel_count()).sum();
        assert_eq!(total_pixels, 128 * 128);
    }

    #[test]
    fn test_generate_buckets_partial_fit() {
        let buckets = generate_buckets(100, 70, 64, 32);
        assert_eq!(buckets.len(), 6); // 2x3 grid with partial buckets

        // Total pixels should equal image size
        let total_pixels: u32 = buckets.iter().map(|b| b.pixel_count()).sum();
        assert_eq!(total_pixels, 100 * 70);
    }

    #[test]
    fn test_buckets_do_not_overlap() {
        let buckets = generate_buckets(37, 23, 8, 5);
        let mut covered = HashSet::new();
        for b in &buckets {
            for y in b.y..b.y + b.height {
                for x in b.x..b.x + b.width {
                    assert!(covered.insert((x, y)), "pixel ({x}, {y}) covered twice");
                }
            }
        }
        assert_eq!(covered.len(), 37 * 23);
    }

    #[test]
    fn test_spiral_order() {
        let buckets = generate_buckets(192, 192, 64, 64);
        assert_eq!(buckets.len(), 9); // 3x3 grid

        // First bucket should be the center one
        let first = &buckets[0];
        assert_eq!(first.x, 64);
        assert_eq!(first.y, 64);
        assert!(buckets.iter().enumerate().all(|(i, b)| b.index == i));
    }

    #[test]
    fn test_bucket_seeds_differ() {
        let mut seeds = HashSet::new();
        for round in 0..4 {
            for index in 0..16 {
                assert!(seeds.insert(bucket_seed(7, round, index)));
            }
        }
        assert_ne!(bucket_seed(0, 0, 0), bucket_seed(1, 0, 0));
        assert_eq!(bucket_seed(3, 2, 1), bucket_seed(3, 2, 1));
    }
}
