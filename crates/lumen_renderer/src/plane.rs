//! Infinite plane primitive.

use std::sync::Arc;

use crate::{
    hittable::{HitRecord, Hittable},
    Material, Ray, SetupError,
};
use lumen_math::{Aabb, Interval, Point3, Vec3};
use rand::RngCore;

/// Threshold below which a ray is treated as parallel to a plane.
pub(crate) const PARALLEL_EPSILON: f64 = 1e-7;

/// Ray parameter where `ray` meets the plane through `point` with unit `normal`.
///
/// Rejects parallel rays and, when `culled`, rays arriving from behind the
/// normal. The result is not range-checked.
#[inline]
pub(crate) fn ray_plane_time(ray: &Ray, point: Point3, normal: Vec3, culled: bool) -> Option<f64> {
    let denominator = ray.direction().dot(normal);
    if denominator.abs() < PARALLEL_EPSILON {
        return None;
    }
    if culled && denominator > -PARALLEL_EPSILON {
        return None;
    }
    Some((point - ray.origin()).dot(normal) / denominator)
}

/// Validate and normalize a user supplied normal.
pub(crate) fn unit_normal(normal: Vec3) -> Result<Vec3, SetupError> {
    normal.try_normalize().ok_or(SetupError::ZeroNormal)
}

/// An infinite plane through `point` with normal `normal`.
#[derive(Clone)]
pub struct Plane {
    point: Point3,
    normal: Vec3,
    /// In-plane axes used for texture coordinates
    tangent: Vec3,
    bitangent: Vec3,
    culled: bool,
    material: Arc<dyn Material>,
}

impl Plane {
    /// Create a plane visible from both sides.
    pub fn new(point: Point3, normal: Vec3, material: Arc<dyn Material>) -> Result<Self, SetupError> {
        let normal = unit_normal(normal)?;
        let (tangent, bitangent) = normal.any_orthonormal_pair();
        Ok(Self {
            point,
            normal,
            tangent,
            bitangent,
            culled: false,
            material,
        })
    }

    /// Only accept rays arriving against the normal.
    pub fn culled(mut self) -> Self {
        self.culled = true;
        self
    }
}

impl Hittable for Plane {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        _rng: &mut dyn RngCore,
    ) -> bool {
        let Some(t) = ray_plane_time(ray, self.point, self.normal, self.culled) else {
            return false;
        };
        if !ray_t.surrounds(t) {
            return false;
        }

        // Texture coordinates tile every unit along the in-plane axes
        let offset = ray.at(t) - self.point;
        rec.ray = *ray;
        rec.t = t;
        rec.normal = self.normal;
        rec.u = offset.dot(self.tangent).rem_euclid(1.0);
        rec.v = offset.dot(self.bitangent).rem_euclid(1.0);
        rec.material = self.material.as_ref();

        true
    }

    fn bounding_box(&self) -> Option<Aabb> {
        None
    }

    fn set_material(&mut self, material: Arc<dyn Material>) {
        self.material = material;
    }

    fn collect_materials(&self, out: &mut Vec<Arc<dyn Material>>) {
        out.push(self.material.clone());
    }

    fn is_infinite(&self) -> bool {
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
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ground() -> Plane {
        let material = Arc::new(Lambertian::from_color(Color::splat(0.5)));
        Plane::new(Point3::new(0.0, -1.0, 0.0), Vec3::new(0.0, 3.0, 0.0), material).unwrap()
    }

    #[test]
    fn test_plane_hit_from_above() {
        let plane = ground();
        let ray = Ray::new(Point3::new(2.0, 1.0, 3.0), Vec3::new(0.0, -1.0, 0.0));
        let mut rec = HitRecord::default();
        let mut rng = StdRng::seed_from_u64(0);

        assert!(plane.hit(&ray, Interval::new(0.001, f64::INFINITY), &mut rec, &mut rng));
        assert!((rec.t - 2.0).abs() < 1e-12);
        assert_eq!(rec.normal, Vec3::Y);
        assert!((0.0..1.0).contains(&rec.u));
    }

    #[test]
    fn test_parallel_ray_misses() {
        let plane = ground();
        let ray = Ray::new(Point3::ZERO, Vec3::X);
        let mut rec = HitRecord::default();
        let mut rng = StdRng::seed_from_u64(0);

        assert!(!plane.hit(&ray, Interval::new(0.001, f64::INFINITY), &mut rec, &mut rng));
    }

    #[test]
    fn test_culled_plane_rejects_back_face() {
        let plane = ground().culled();
        let mut rec = HitRecord::default();
        let mut rng = StdRng::seed_from_u64(0);

        let from_below = Ray::new(Point3::new(0.0, -3.0, 0.0), Vec3::Y);
        assert!(!plane.hit(&from_below, Interval::new(0.001, f64::INFINITY), &mut rec, &mut rng));

        let from_above = Ray::new(Point3::new(0.0, 3.0, 0.0), Vec3::NEG_Y);
        assert!(plane.hit(&from_above, Interval::new(0.001, f64::INFINITY), &mut rec, &mut rng));
    }

    #[test]
    fn test_plane_is_infinite() {
        let plane = ground();
        assert!(plane.is_infinite());
        assert!(!plane.is_closed());
        assert!(plane.bounding_box().is_none());
    }

    #[test]
    fn test_zero_normal_rejected() {
        let material = Arc::new(Lambertian::from_color(Color::ONE));
        assert_eq!(
            Plane::new(Point3::ZERO, Vec3::ZERO, material).err(),
            Some(SetupError::ZeroNormal)
        );
    }
}
