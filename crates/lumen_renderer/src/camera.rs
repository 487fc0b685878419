//! Thin-lens camera for ray generation.

use crate::sampling::{gen_f64, random_in_unit_disk};
use crate::{Ray, SetupError};
use lumen_math::{Point3, Vec3};
use rand::RngCore;

/// Camera for generating rays into the scene.
///
/// Configure with the builder methods, then call [`Camera::initialize`]
/// before generating rays.
#[derive(Debug, Clone)]
pub struct Camera {
    // Image settings
    pub image_width: u32,
    pub image_height: u32,

    // Camera positioning
    eye: Point3,
    target: Point3,
    up: Vec3,

    // Lens settings
    vfov: f64,           // Vertical field of view in degrees
    aperture: f64,       // Lens diameter, 0 for a pinhole
    focus_distance: f64, // Distance from the eye to the plane of perfect focus

    // Cached computed values (set by initialize())
    lens_radius: f64,
    lower_left_corner: Point3,
    horizontal: Vec3,
    vertical: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self {
            image_width: 800,
            image_height: 450,
            eye: Point3::ZERO,
            target: Point3::new(0.0, 0.0, -1.0),
            up: Vec3::Y,
            vfov: 90.0,
            aperture: 0.0,
            focus_distance: 1.0,
            // Cached values (initialized to defaults)
            lens_radius: 0.0,
            lower_left_corner: Point3::ZERO,
            horizontal: Vec3::ZERO,
            vertical: Vec3::ZERO,
            u: Vec3::X,
            v: Vec3::Y,
            w: Vec3::Z,
        }
    }

    /// Set image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.image_width = width;
        self.image_height = height;
        self
    }

    /// Set camera position.
    pub fn with_position(mut self, eye: Point3, target: Point3, up: Vec3) -> Self {
        self.eye = eye;
        self.target = target;
        self.up = up;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f64, aperture: f64, focus_distance: f64) -> Self {
        self.vfov = vfov;
        self.aperture = aperture;
        self.focus_distance = focus_distance;
        self
    }

    /// Validate the settings and compute the viewport (must be called before generating rays).
    pub fn initialize(&mut self) -> Result<(), SetupError> {
        if self.image_width == 0 || self.image_height == 0 {
            return Err(SetupError::InvalidCamera(format!(
                "image size {}x{} has no pixels",
                self.image_width, self.image_height
            )));
        }
        if self.vfov.is_nan() || self.vfov <= 0.0 || self.vfov >= 180.0 {
            return Err(SetupError::InvalidCamera(format!(
                "vertical field of view {} must lie strictly between 0 and 180 degrees",
                self.vfov
            )));
        }
        if self.aperture.is_nan() || self.aperture < 0.0 {
            return Err(SetupError::InvalidCamera(format!(
                "aperture {} must not be negative",
                self.aperture
            )));
        }
        if self.focus_distance.is_nan() || self.focus_distance <= 0.0 {
            return Err(SetupError::InvalidCamera(format!(
                "focus distance {} must be positive",
                self.focus_distance
            )));
        }

        // Calculate camera basis vectors
        let w = (self.eye - self.target).try_normalize().ok_or_else(|| {
            SetupError::InvalidCamera(format!("eye and target coincide at {}", self.eye))
        })?;
        let u = self.up.cross(w).try_normalize().ok_or_else(|| {
            SetupError::InvalidCamera(format!("up vector {} is parallel to the view direction", self.up))
        })?;
        let v = w.cross(u);

        // Calculate viewport dimensions
        let aspect_ratio = self.image_width as f64 / self.image_height as f64;
        let half_height = (self.vfov.to_radians() / 2.0).tan();
        let half_width = aspect_ratio * half_height;
        let focus = self.focus_distance;

        self.lens_radius = self.aperture / 2.0;
        self.lower_left_corner =
            self.eye - half_width * focus * u - half_height * focus * v - focus * w;
        self.horizontal = 2.0 * half_width * focus * u;
        self.vertical = 2.0 * half_height * focus * v;
        self.u = u;
        self.v = v;
        self.w = w;

        log::debug!(
            "Camera at {} looking at {}: {}x{}, vfov {}, aperture {}",
            self.eye,
            self.target,
            self.image_width,
            self.image_height,
            self.vfov,
            self.aperture
        );
        Ok(())
    }

    /// Generate a ray through normalized screen coordinates.
    ///
    /// `(0, 0)` is the lower-left corner of the viewport and `(1, 1)` the
    /// upper-right. The origin is jittered across the lens for depth of field.
    pub fn get_ray(&self, s: f64, t: f64, rng: &mut dyn RngCore) -> Ray {
        let offset = if self.lens_radius > 0.0 {
            let rd = self.lens_radius * random_in_unit_disk(rng);
            self.u * rd.x + self.v * rd.y
        } else {
            Vec3::ZERO
        };

        let origin = self.eye + offset;
        let direction = self.lower_left_corner + s * self.horizontal + t * self.vertical - origin;
        Ray::new(origin, direction)
    }

    /// Generate a jittered ray for pixel (x, y), with row 0 at the top of the image.
    pub fn pixel_ray(&self, x: u32, y: u32, rng: &mut dyn RngCore) -> Ray {
        let s = (x as f64 + gen_f64(rng)) / self.image_width as f64;
        let t = ((self.image_height - 1 - y) as f64 + gen_f64(rng)) / self.image_height as f64;
        self.get_ray(s, t, rng)
    }

    /// Width over height.
    pub fn aspect_ratio(&self) -> f64 {
        self.image_width as f64 / self.image_height as f64
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pinhole(width: u32, height: u32) -> Camera {
        let mut camera = Camera::new()
            .with_resolution(width, height)
            .with_position(Point3::ZERO, Point3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_lens(90.0, 0.0, 1.0);
        camera.initialize().unwrap();
        camera
    }

    #[test]
    fn test_camera_initialize() {
        let camera = pinhole(800, 600);

        assert!((camera.w - Vec3::Z).length() < 0.001);
        assert!((camera.u - Vec3::X).length() < 1e-12);
        assert!((camera.v - Vec3::Y).length() < 1e-12);
        // 90 degrees: the viewport is 2 units tall at focus distance 1
        assert!((camera.vertical.y - 2.0).abs() < 1e-9);
        assert!((camera.horizontal.x - 2.0 * 800.0 / 600.0).abs() < 1e-9);
    }

    #[test]
    fn test_center_ray_points_forward() {
        let camera = pinhole(100, 100);
        let mut rng = StdRng::seed_from_u64(42);

        let ray = camera.get_ray(0.5, 0.5, &mut rng);
        assert_eq!(ray.origin(), Point3::ZERO);
        assert!((ray.direction() - Vec3::NEG_Z).length() < 1e-12);
    }

    #[test]
    fn test_corners_map_to_viewport_corners() {
        let camera = pinhole(100, 100);
        let mut rng = StdRng::seed_from_u64(42);

        let lower_left = camera.get_ray(0.0, 0.0, &mut rng).direction();
        assert!((lower_left - Vec3::new(-1.0, -1.0, -1.0)).length() < 1e-9);

        let upper_right = camera.get_ray(1.0, 1.0, &mut rng).direction();
        assert!((upper_right - Vec3::new(1.0, 1.0, -1.0)).length() < 1e-9);
    }

    #[test]
    fn test_pixel_rows_run_top_down() {
        let camera = pinhole(10, 10);
        let mut rng = StdRng::seed_from_u64(3);

        assert!(camera.pixel_ray(5, 0, &mut rng).direction().y > 0.0);
        assert!(camera.pixel_ray(5, 9, &mut rng).direction().y < 0.0);
        assert!(camera.pixel_ray(0, 5, &mut rng).direction().x < 0.0);
    }

    #[test]
    fn test_aperture_spreads_origins_but_keeps_focus() {
        let mut camera = Camera::new()
            .with_resolution(100, 100)
            .with_position(Point3::new(0.0, 0.0, 5.0), Point3::ZERO, Vec3::Y)
            .with_lens(40.0, 0.5, 5.0);
        camera.initialize().unwrap();
        let mut rng = StdRng::seed_from_u64(9);

        let mut spread = 0.0f64;
        for _ in 0..100 {
            let ray = camera.get_ray(0.5, 0.5, &mut rng);
            let offset = ray.origin() - Point3::new(0.0, 0.0, 5.0);
            assert!(offset.length() <= 0.25 + 1e-12);
            spread = spread.max(offset.length());

            // Every lens sample converges on the focus point
            let t = -ray.origin().z / ray.direction().z;
            assert!(ray.at(t).length() < 1e-9);
        }
        assert!(spread > 0.0);
    }

    #[test]
    fn test_invalid_cameras_rejected() {
        let bad = [
            Camera::new().with_lens(0.0, 0.0, 1.0),
            Camera::new().with_lens(180.0, 0.0, 1.0),
            Camera::new().with_lens(60.0, -1.0, 1.0),
            Camera::new().with_lens(60.0, 0.0, 0.0),
            Camera::new().with_position(Point3::ONE, Point3::ONE, Vec3::Y),
            Camera::new().with_position(Point3::ZERO, Point3::new(0.0, -1.0, 0.0), Vec3::Y),
            Camera::new().with_resolution(0, 10),
        ];
        for mut camera in bad {
            assert!(matches!(camera.initialize(), Err(SetupError::InvalidCamera(_))));
        }
    }
}
