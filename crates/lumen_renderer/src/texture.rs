//! Textures map surface coordinates to colors.

use std::sync::Arc;

use crate::Color;
use lumen_core::Raster;

/// Trait for anything that can be sampled at surface coordinates (u, v).
pub trait Texture: Send + Sync {
    /// Color at surface coordinates in [0, 1).
    fn value(&self, u: f64, v: f64) -> Color;
}

/// A constant color.
#[derive(Debug, Clone, Copy)]
pub struct ColorTexture {
    color: Color,
}

impl ColorTexture {
    /// Create a constant texture.
    pub fn new(color: Color) -> Self {
        Self { color }
    }

    /// Constant black, the default emittance.
    pub fn black() -> Self {
        Self::new(Color::ZERO)
    }
}

impl Texture for ColorTexture {
    fn value(&self, _u: f64, _v: f64) -> Color {
        self.color
    }
}

/// Nearest-pixel lookup into a decoded raster with gamma and gain.
///
/// Each sampled channel is raised to `gamma` and scaled by `magnitude`, so an
/// sRGB-ish image with gamma 2.2 becomes roughly linear.
#[derive(Debug, Clone)]
pub struct ImageTexture {
    raster: Arc<Raster>,
    gamma: f64,
    magnitude: f64,
}

impl ImageTexture {
    /// Create an image texture over a shared raster.
    pub fn new(raster: Arc<Raster>, gamma: f64, magnitude: f64) -> Self {
        Self {
            raster,
            gamma,
            magnitude,
        }
    }
}

impl Texture for ImageTexture {
    fn value(&self, u: f64, v: f64) -> Color {
        let u = u.clamp(0.0, 1.0);
        let v = v.clamp(0.0, 1.0);

        // Row 0 of the raster is the top of the image, v grows upwards
        let x = (u * (self.raster.width() - 1) as f64) as u32;
        let y = ((1.0 - v) * (self.raster.height() - 1) as f64) as u32;

        let pixel = self.raster.pixel(x, y);
        pixel.powf(self.gamma) * self.magnitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_math::Vec3;

    fn gradient() -> Arc<Raster> {
        // 3x2: top row dark, bottom row bright, red grows to the right
        let pixels = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.5, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.5),
            Vec3::new(0.5, 1.0, 0.5),
            Vec3::new(1.0, 1.0, 0.5),
        ];
        Arc::new(Raster::new(3, 2, pixels, "<gradient>").unwrap())
    }

    #[test]
    fn test_color_texture_ignores_coordinates() {
        let tex = ColorTexture::new(Color::new(1.0, 0.5, 0.0));
        assert_eq!(tex.value(0.0, 0.0), tex.value(0.9, 0.3));
        assert_eq!(ColorTexture::black().value(0.5, 0.5), Color::ZERO);
    }

    #[test]
    fn test_image_texture_orientation() {
        let tex = ImageTexture::new(gradient(), 1.0, 1.0);

        // v = 1 is the top row of the raster
        assert_eq!(tex.value(0.0, 1.0), Color::new(0.0, 0.0, 0.0));
        // v = 0 is the bottom row
        assert_eq!(tex.value(0.0, 0.0), Color::new(0.0, 1.0, 0.5));
        assert_eq!(tex.value(1.0, 0.0), Color::new(1.0, 1.0, 0.5));
        assert_eq!(tex.value(0.5, 1.0), Color::new(0.5, 0.0, 0.0));
    }

    #[test]
    fn test_image_texture_gamma_and_magnitude() {
        let tex = ImageTexture::new(gradient(), 2.0, 3.0);
        let c = tex.value(0.5, 0.0);
        assert!((c.x - 0.75).abs() < 1e-12);
        assert!((c.y - 3.0).abs() < 1e-12);
        assert!((c.z - 0.75).abs() < 1e-12);
    }
}
