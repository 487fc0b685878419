//! Raster loading and caching for image textures.
//!
//! Decodes images from disk into normalized RGB pixels. No transfer curve is
//! applied here; image textures apply their own gamma when sampled.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lumen_math::Vec3;
use thiserror::Error;

/// Errors that can occur during raster loading.
#[derive(Error, Debug)]
pub enum RasterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image decoding error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Raster dimensions {width}x{height} do not match {len} pixels")]
    DimensionMismatch { width: u32, height: u32, len: usize },
}

pub type RasterResult<T> = Result<T, RasterError>;

/// A decoded image.
///
/// Pixels are RGB in [0, 1], row-major, with row 0 at the top of the image.
#[derive(Clone, Debug)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<Vec3>,
    /// Original file path (for debugging)
    path: String,
}

impl Raster {
    /// Create a raster from pixel data.
    pub fn new(
        width: u32,
        height: u32,
        pixels: Vec<Vec3>,
        path: impl Into<String>,
    ) -> RasterResult<Self> {
        if width == 0 || height == 0 || pixels.len() != width as usize * height as usize {
            return Err(RasterError::DimensionMismatch {
                width,
                height,
                len: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
            path: path.into(),
        })
    }

    /// Create a raster from an 8-bit RGB image.
    pub fn from_rgb8(image: &image::RgbImage, path: impl Into<String>) -> RasterResult<Self> {
        let (width, height) = image.dimensions();
        let pixels = image
            .pixels()
            .map(|p| Vec3::new(p[0] as f64, p[1] as f64, p[2] as f64) / 255.0)
            .collect();
        Self::new(width, height, pixels, path)
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Source path, `<memory>` style names for generated rasters.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Pixel at integer coordinates, clamped to the raster edges.
    pub fn pixel(&self, x: u32, y: u32) -> Vec3 {
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        self.pixels[(y * self.width + x) as usize]
    }

    /// Get total size in bytes (approximate).
    pub fn size_bytes(&self) -> usize {
        self.pixels.len() * std::mem::size_of::<Vec3>()
    }
}

/// Cache for loaded rasters.
///
/// Rasters are loaded on demand and shared between every texture that
/// references the same file.
pub struct RasterCache {
    /// Cached rasters by file path
    rasters: HashMap<String, Arc<Raster>>,

    /// Base directory for resolving relative paths
    base_dir: Option<PathBuf>,
}

impl RasterCache {
    /// Create a new empty raster cache.
    pub fn new() -> Self {
        Self {
            rasters: HashMap::new(),
            base_dir: None,
        }
    }

    /// Create a raster cache with a base directory for relative paths.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            rasters: HashMap::new(),
            base_dir: Some(base_dir.into()),
        }
    }

    /// Load a raster from file, using the cache if available.
    pub fn load(&mut self, path: &str) -> RasterResult<Arc<Raster>> {
        if let Some(raster) = self.rasters.get(path) {
            return Ok(raster.clone());
        }

        let full_path = self.resolve_path(path);
        let raster = Arc::new(load_raster_file(&full_path)?);
        self.rasters.insert(path.to_string(), raster.clone());

        log::debug!(
            "Loaded raster: {} ({}x{}, {:.1} KB)",
            path,
            raster.width,
            raster.height,
            raster.size_bytes() as f64 / 1024.0
        );

        Ok(raster)
    }

    /// Get a cached raster without loading.
    pub fn get(&self, path: &str) -> Option<Arc<Raster>> {
        self.rasters.get(path).cloned()
    }

    /// Add an already decoded raster under `path`.
    pub fn insert(&mut self, path: impl Into<String>, raster: Raster) -> Arc<Raster> {
        let raster = Arc::new(raster);
        self.rasters.insert(path.into(), raster.clone());
        raster
    }

    /// Get the number of cached rasters.
    pub fn len(&self) -> usize {
        self.rasters.len()
    }

    /// Check if cache is empty.
    pub fn is_empty(&self) -> bool {
        self.rasters.is_empty()
    }

    /// Resolve a path relative to the base directory.
    fn resolve_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);

        if path.is_absolute() {
            path.to_path_buf()
        } else if let Some(base) = &self.base_dir {
            base.join(path)
        } else {
            path.to_path_buf()
        }
    }
}

impl Default for RasterCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Load a raster from a file path.
fn load_raster_file(path: &Path) -> RasterResult<Raster> {
    let bytes = std::fs::read(path)?;
    let img = image::load_from_memory(&bytes)?;

    Raster::from_rgb8(&img.to_rgb8(), path.to_string_lossy())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker() -> image::RgbImage {
        image::RgbImage::from_fn(2, 2, |x, y| {
            if (x + y) % 2 == 0 {
                image::Rgb([255, 255, 255])
            } else {
                image::Rgb([0, 0, 0])
            }
        })
    }

    #[test]
    fn test_from_rgb8() {
        let raster = Raster::from_rgb8(&checker(), "<checker>").unwrap();
        assert_eq!(raster.width(), 2);
        assert_eq!(raster.height(), 2);
        assert_eq!(raster.pixel(0, 0), Vec3::ONE);
        assert_eq!(raster.pixel(1, 0), Vec3::ZERO);
    }

    #[test]
    fn test_pixel_clamps_to_edges() {
        let raster = Raster::from_rgb8(&checker(), "<checker>").unwrap();
        assert_eq!(raster.pixel(7, 9), raster.pixel(1, 1));
    }

    #[test]
    fn test_dimension_mismatch() {
        let err = Raster::new(2, 2, vec![Vec3::ZERO; 3], "<bad>").unwrap_err();
        assert!(matches!(err, RasterError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_raster_cache() {
        let mut cache = RasterCache::new();
        assert!(cache.is_empty());

        let raster = Raster::from_rgb8(&checker(), "<checker>").unwrap();
        let shared = cache.insert("checker.png", raster);
        assert_eq!(cache.len(), 1);

        let again = cache.load("checker.png").unwrap();
        assert!(Arc::ptr_eq(&shared, &again));
    }

    #[test]
    fn test_missing_file() {
        let mut cache = RasterCache::with_base_dir("/definitely/not/here");
        let err = cache.load("missing.png").unwrap_err();
        assert!(matches!(err, RasterError::Io(_)), "unexpected error: {err}");
        assert!(cache.get("missing.png").is_none());
    }

    #[test]
    fn test_undecodable_file() {
        let dir = std::env::temp_dir().join(format!("lumen_raster_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("garbage.png"), b"not an image at all").unwrap();

        let mut cache = RasterCache::with_base_dir(dir.clone());
        let err = cache.load("garbage.png").unwrap_err();
        assert!(matches!(err, RasterError::ImageError(_)), "unexpected error: {err}");
        assert!(cache.is_empty());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
