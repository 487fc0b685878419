//! Homogeneous participating medium (fog, smoke) bounded by a closed primitive.

use std::sync::Arc;

use crate::hittable::{HitRecord, Hittable};
use crate::material::Isotropic;
use crate::sampling::gen_open_f64;
use crate::texture::Texture;
use crate::{Material, Ray, SetupError};
use lumen_math::{Aabb, Interval, Vec3};
use rand::RngCore;

/// Offset past the entry point when looking for the exit point.
const EXIT_EPSILON: f64 = 0.0001;

/// A constant-density medium filling the inside of `boundary`.
///
/// Rays either pass through unaffected or scatter at a random depth, with the
/// chance of scattering growing with the distance travelled inside.
#[derive(Clone)]
pub struct ParticipatingVolume {
    boundary: Box<dyn Hittable>,
    /// Negative reciprocal of the density, so a free path is `neg_inv_density * ln(xi)`
    neg_inv_density: f64,
    phase_function: Arc<dyn Material>,
}

impl ParticipatingVolume {
    /// Fill `boundary` with a medium of the given density and albedo texture.
    pub fn new(
        boundary: impl Hittable + 'static,
        density: f64,
        albedo: Arc<dyn Texture>,
    ) -> Result<Self, SetupError> {
        Self::with_phase_function(Box::new(boundary), density, Arc::new(Isotropic::new(albedo)))
    }

    /// Fill an already boxed `boundary` with a medium scattering through `phase_function`.
    pub fn with_phase_function(
        boundary: Box<dyn Hittable>,
        density: f64,
        phase_function: Arc<dyn Material>,
    ) -> Result<Self, SetupError> {
        if density.is_nan() || density <= 0.0 {
            return Err(SetupError::NonPositiveDensity(density));
        }
        if !boundary.is_closed() {
            return Err(SetupError::OpenBoundary);
        }

        Ok(Self {
            boundary,
            neg_inv_density: -1.0 / density,
            phase_function,
        })
    }
}

impl Hittable for ParticipatingVolume {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        rng: &mut dyn RngCore,
    ) -> bool {
        let mut entry = HitRecord::default();
        let mut exit = HitRecord::default();

        if !self.boundary.hit(ray, Interval::UNIVERSE, &mut entry, rng) {
            return false;
        }
        if !self
            .boundary
            .hit(ray, Interval::new(entry.t + EXIT_EPSILON, f64::INFINITY), &mut exit, rng)
        {
            return false;
        }

        let mut t_enter = entry.t.max(ray_t.min);
        let t_exit = exit.t.min(ray_t.max);
        if t_enter >= t_exit {
            return false;
        }
        // The ray may start inside the medium
        if t_enter < 0.0 {
            t_enter = 0.0;
        }

        let ray_length = ray.direction().length();
        let distance_inside_boundary = (t_exit - t_enter) * ray_length;
        let hit_distance = self.neg_inv_density * gen_open_f64(rng).ln();

        if hit_distance > distance_inside_boundary {
            return false;
        }

        rec.ray = *ray;
        rec.t = t_enter + hit_distance / ray_length;
        // Arbitrary, the isotropic phase function ignores it
        rec.normal = Vec3::X;
        rec.u = 0.0;
        rec.v = 0.0;
        rec.material = self.phase_function.as_ref();

        true
    }

    fn bounding_box(&self) -> Option<Aabb> {
        self.boundary.bounding_box()
    }

    fn set_material(&mut self, material: Arc<dyn Material>) {
        self.phase_function = material;
    }

    fn collect_materials(&self, out: &mut Vec<Arc<dyn Material>>) {
        out.push(self.phase_function.clone());
    }

    fn is_infinite(&self) -> bool {
        self.boundary.is_infinite()
    }

    fn is_closed(&self) -> bool {
        true
    }

    fn box_clone(&self) -> Box<dyn Hittable> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{Color, Lambertian};
    use crate::texture::ColorTexture;
    use crate::{Cuboid, Rectangle, Sphere};
    use lumen_math::Point3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn white() -> Arc<dyn Texture> {
        Arc::new(ColorTexture::new(Color::ONE))
    }

    fn boundary_material() -> Arc<dyn Material> {
        Arc::new(Lambertian::from_color(Color::ONE))
    }

    fn fog(density: f64) -> ParticipatingVolume {
        let cube = Cuboid::new(Point3::ZERO, Point3::ONE, boundary_material()).unwrap();
        ParticipatingVolume::new(cube, density, white()).unwrap()
    }

    fn fraction_scattered(volume: &ParticipatingVolume, ray: &Ray, trials: usize) -> f64 {
        let mut rng = StdRng::seed_from_u64(11);
        let mut scattered = 0;
        for _ in 0..trials {
            let mut rec = HitRecord::default();
            if volume.hit(ray, Interval::new(0.001, f64::INFINITY), &mut rec, &mut rng) {
                let p = rec.point();
                assert!((0.0..=1.0).contains(&p.x));
                scattered += 1;
            }
        }
        scattered as f64 / trials as f64
    }

    #[test]
    fn test_scatter_probability_follows_beer_lambert() {
        let volume = fog(1.0);
        let ray = Ray::new(Point3::new(-1.0, 0.5, 0.5), Vec3::X);

        // One unit of medium at density 1
        let expected = 1.0 - (-1.0f64).exp();
        let observed = fraction_scattered(&volume, &ray, 20_000);
        assert!((observed - expected).abs() < 0.02, "observed {observed}, expected {expected}");
    }

    #[test]
    fn test_unnormalized_direction_keeps_distances() {
        let volume = fog(1.0);
        let ray = Ray::new(Point3::new(-1.0, 0.5, 0.5), Vec3::new(4.0, 0.0, 0.0));

        let expected = 1.0 - (-1.0f64).exp();
        let observed = fraction_scattered(&volume, &ray, 20_000);
        assert!((observed - expected).abs() < 0.02);
    }

    #[test]
    fn test_ray_starting_inside() {
        let volume = fog(1000.0);
        let ray = Ray::new(Point3::splat(0.5), Vec3::Y);
        let mut rec = HitRecord::default();
        let mut rng = StdRng::seed_from_u64(3);

        assert!(volume.hit(&ray, Interval::new(0.001, f64::INFINITY), &mut rec, &mut rng));
        assert!(rec.t < 0.05);
    }

    #[test]
    fn test_miss_outside_boundary() {
        let volume = fog(1000.0);
        let ray = Ray::new(Point3::new(-1.0, 2.0, 0.5), Vec3::X);
        let mut rec = HitRecord::default();
        let mut rng = StdRng::seed_from_u64(3);

        assert!(!volume.hit(&ray, Interval::new(0.001, f64::INFINITY), &mut rec, &mut rng));
    }

    #[test]
    fn test_invalid_volumes_rejected() {
        let sphere = Sphere::new(Point3::ZERO, 1.0, boundary_material()).unwrap();
        assert!(matches!(
            ParticipatingVolume::new(sphere, 0.0, white()),
            Err(SetupError::NonPositiveDensity(_))
        ));

        let sheet = Rectangle::new(Point3::ZERO, Point3::new(1.0, 1.0, 0.0), boundary_material()).unwrap();
        assert!(matches!(
            ParticipatingVolume::new(sheet, 1.0, white()),
            Err(SetupError::OpenBoundary)
        ));
    }

    #[test]
    fn test_bounding_box_is_boundary_box() {
        let volume = fog(0.5);
        let bbox = volume.bounding_box().unwrap();
        assert_eq!(bbox.min(), Point3::ZERO);
        assert_eq!(bbox.max(), Point3::ONE);
    }
}
