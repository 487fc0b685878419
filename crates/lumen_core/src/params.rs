//! Render parameters.
//!
//! Everything the scheduler needs besides the scene itself: image and tile
//! dimensions, sampling budget, bounce budget and the output transfer curve.
//! Parameters are plain data and can be (de)serialized with serde.

use std::path::Path;

use lumen_math::{Interval, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating render parameters.
#[derive(Error, Debug)]
pub enum ParameterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed parameters: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid render parameters: {0}")]
    Invalid(String),
}

/// Parameters of a single render job.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderParameters {
    /// Output width in pixels
    pub image_width: u32,

    /// Output height in pixels
    pub image_height: u32,

    /// Camera rays traced per pixel in every round
    pub samples_per_round: u32,

    /// Number of rounds accumulated into the final image
    pub round_count: u32,

    /// Tile width in pixels (edge tiles may be narrower)
    pub tile_width: u32,

    /// Tile height in pixels (edge tiles may be shorter)
    pub tile_height: u32,

    /// Maximum number of surface interactions per path, at least 1
    pub max_bounces: u32,

    /// Trace against a BVH instead of a flat primitive list
    #[serde(rename = "useBVH")]
    pub use_bvh: bool,

    /// Smallest accepted hit parameter, avoids self-intersection
    pub t_min: f64,

    /// Largest accepted hit parameter
    pub t_max: f64,

    /// Color returned by rays that escape the scene (RGB)
    pub background_color: [f64; 3],

    /// Scale applied to `background_color`
    pub background_color_magnitude: f64,

    /// Output gamma; each channel is raised to 1/gamma
    pub gamma_correction: f64,

    /// Rescale over-bright pixels by their largest channel instead of clamping
    pub use_scaling_truncation: bool,

    /// Base seed for the per-tile random generators
    pub seed: u64,
}

impl Default for RenderParameters {
    fn default() -> Self {
        Self {
            image_width: 800,
            image_height: 450,
            samples_per_round: 4,
            round_count: 25,
            tile_width: 64,
            tile_height: 64,
            max_bounces: 50,
            use_bvh: true,
            t_min: 0.001,
            t_max: 1.0e12,
            background_color: [0.0, 0.0, 0.0],
            background_color_magnitude: 1.0,
            gamma_correction: 2.0,
            use_scaling_truncation: false,
            seed: 0,
        }
    }
}

impl RenderParameters {
    /// Parse parameters from a JSON document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ParameterError> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    /// Load parameters from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ParameterError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check that the parameters describe a renderable job.
    pub fn validate(&self) -> Result<(), ParameterError> {
        let invalid = |msg: String| Err(ParameterError::Invalid(msg));

        if self.image_width == 0 || self.image_height == 0 {
            return invalid(format!(
                "image must be at least 1x1, got {}x{}",
                self.image_width, self.image_height
            ));
        }
        if self.image_width.checked_mul(self.image_height).is_none() {
            return invalid(format!(
                "image of {}x{} has more than {} pixels",
                self.image_width,
                self.image_height,
                u32::MAX
            ));
        }
        if self.tile_width == 0 || self.tile_height == 0 {
            return invalid(format!(
                "tiles must be at least 1x1, got {}x{}",
                self.tile_width, self.tile_height
            ));
        }
        if self.samples_per_round == 0 {
            return invalid("samplesPerRound must be positive".to_string());
        }
        if self.round_count == 0 {
            return invalid("roundCount must be positive".to_string());
        }
        if self.max_bounces == 0 {
            return invalid("maxBounces must be positive".to_string());
        }
        if self.t_min.is_nan() || self.t_min < 0.0 || self.t_min >= self.t_max {
            return invalid(format!(
                "expected 0 <= tMin < tMax, got tMin={} tMax={}",
                self.t_min, self.t_max
            ));
        }
        if self.background_color.iter().any(|c| *c < 0.0) || self.background_color_magnitude < 0.0 {
            return invalid("background color and magnitude must be non-negative".to_string());
        }
        if self.gamma_correction.is_nan() || self.gamma_correction <= 0.0 {
            return invalid(format!(
                "gammaCorrection must be positive, got {}",
                self.gamma_correction
            ));
        }
        Ok(())
    }

    /// Background color already scaled by its magnitude.
    pub fn background(&self) -> Vec3 {
        Vec3::from_array(self.background_color) * self.background_color_magnitude
    }

    /// Accepted range of hit parameters.
    pub fn ray_interval(&self) -> Interval {
        Interval::new(self.t_min, self.t_max)
    }

    /// Total camera rays per pixel once every round has run.
    pub fn total_samples_per_pixel(&self) -> u64 {
        self.samples_per_round as u64 * self.round_count as u64
    }

    /// Aspect ratio of the output image.
    pub fn aspect_ratio(&self) -> f64 {
        self.image_width as f64 / self.image_height as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_parameters_are_valid() {
        assert!(RenderParameters::default().validate().is_ok());
    }

    #[test]
    fn test_from_json_partial() {
        let params = RenderParameters::from_json_str(
            r#"{ "imageWidth": 320, "imageHeight": 240, "useBVH": false, "backgroundColor": [0.1, 0.2, 0.3] }"#,
        )
        .unwrap();

        assert_eq!(params.image_width, 320);
        assert_eq!(params.image_height, 240);
        assert!(!params.use_bvh);
        assert_eq!(params.background_color, [0.1, 0.2, 0.3]);
        // Untouched fields keep their defaults
        assert_eq!(params.tile_width, 64);
        assert_eq!(params.round_count, 25);
    }

    #[test]
    fn test_from_json_rejects_invalid() {
        let err = RenderParameters::from_json_str(r#"{ "roundCount": 0 }"#).unwrap_err();
        assert!(matches!(err, ParameterError::Invalid(_)));

        let err = RenderParameters::from_json_str(r#"{ "imageWidth": "#).unwrap_err();
        assert!(matches!(err, ParameterError::Json(_)));
    }

    #[test]
    fn test_validate_interval() {
        let params = RenderParameters {
            t_min: 1.0,
            t_max: 0.5,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_validate_gamma_and_tiles() {
        let params = RenderParameters {
            gamma_correction: 0.0,
            ..Default::default()
        };
        assert!(params.validate().is_err());

        let params = RenderParameters {
            tile_height: 0,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_validate_bounces_and_pixel_count() {
        let params = RenderParameters {
            max_bounces: 0,
            ..Default::default()
        };
        assert!(params.validate().is_err());

        let params = RenderParameters {
            max_bounces: 1,
            ..Default::default()
        };
        assert!(params.validate().is_ok());

        let params = RenderParameters {
            image_width: 70_000,
            image_height: 70_000,
            ..Default::default()
        };
        assert!(params.validate().is_err());

        let params = RenderParameters {
            image_width: 65_536,
            image_height: 65_535,
            ..Default::default()
        };
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_background_magnitude() {
        let params = RenderParameters {
            background_color: [0.5, 0.25, 1.0],
            background_color_magnitude: 2.0,
            ..Default::default()
        };
        assert_eq!(params.background(), Vec3::new(1.0, 0.5, 2.0));
    }

    #[test]
    fn test_json_round_trip_names() {
        let json = serde_json::to_string(&RenderParameters::default()).unwrap();
        assert!(json.contains("\"samplesPerRound\""));
        assert!(json.contains("\"useBVH\""));
        assert!(json.contains("\"tMin\""));
    }
}
