//! Flat circular primitives: solid disks and annuli.

use std::f64::consts::PI;
use std::sync::Arc;

use crate::plane::{ray_plane_time, unit_normal};
use crate::{
    hittable::{HitRecord, Hittable},
    Material, Ray, SetupError,
};
use lumen_math::{Aabb, Interval, Point3, Vec3};
use rand::RngCore;

/// Shared geometry of [`Disk`] and [`HollowDisk`].
#[derive(Clone)]
struct FlatRing {
    center: Point3,
    normal: Vec3,
    tangent: Vec3,
    bitangent: Vec3,
    inner_radius: f64,
    outer_radius: f64,
    culled: bool,
    bbox: Aabb,
}

impl FlatRing {
    fn new(center: Point3, normal: Vec3, inner_radius: f64, outer_radius: f64) -> Result<Self, SetupError> {
        let normal = unit_normal(normal)?;
        let (tangent, bitangent) = normal.any_orthonormal_pair();

        // Extent of a circle of radius r with normal n along axis i is r * sqrt(1 - n_i^2)
        let extent = Vec3::new(
            (1.0 - normal.x * normal.x).max(0.0).sqrt(),
            (1.0 - normal.y * normal.y).max(0.0).sqrt(),
            (1.0 - normal.z * normal.z).max(0.0).sqrt(),
        ) * outer_radius;

        Ok(Self {
            center,
            normal,
            tangent,
            bitangent,
            inner_radius,
            outer_radius,
            culled: false,
            bbox: Aabb::from_points(center - extent, center + extent),
        })
    }

    fn hit<'a>(
        &self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        material: &'a dyn Material,
    ) -> bool {
        let Some(t) = ray_plane_time(ray, self.center, self.normal, self.culled) else {
            return false;
        };
        if !ray_t.surrounds(t) {
            return false;
        }

        let offset = ray.at(t) - self.center;
        let distance_squared = offset.length_squared();
        if distance_squared > self.outer_radius * self.outer_radius {
            return false;
        }
        if distance_squared < self.inner_radius * self.inner_radius {
            return false;
        }

        let angle = offset.dot(self.bitangent).atan2(offset.dot(self.tangent));
        rec.ray = *ray;
        rec.t = t;
        rec.normal = self.normal;
        rec.u = (angle + PI) / (2.0 * PI);
        rec.v = distance_squared.sqrt() / self.outer_radius;
        rec.material = material;

        true
    }
}

/// A solid disk.
#[derive(Clone)]
pub struct Disk {
    ring: FlatRing,
    material: Arc<dyn Material>,
}

impl Disk {
    /// Create a disk centered at `center`, facing `normal`.
    pub fn new(
        center: Point3,
        normal: Vec3,
        radius: f64,
        material: Arc<dyn Material>,
    ) -> Result<Self, SetupError> {
        if radius.is_nan() || radius <= 0.0 {
            return Err(SetupError::NonPositiveRadius(radius));
        }
        Ok(Self {
            ring: FlatRing::new(center, normal, 0.0, radius)?,
            material,
        })
    }

    /// Only accept rays arriving against the normal.
    pub fn culled(mut self) -> Self {
        self.ring.culled = true;
        self
    }
}

impl Hittable for Disk {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        _rng: &mut dyn RngCore,
    ) -> bool {
        self.ring.hit(ray, ray_t, rec, self.material.as_ref())
    }

    fn bounding_box(&self) -> Option<Aabb> {
        Some(self.ring.bbox)
    }

    fn set_material(&mut self, material: Arc<dyn Material>) {
        self.material = material;
    }

    fn collect_materials(&self, out: &mut Vec<Arc<dyn Material>>) {
        out.push(self.material.clone());
    }

    fn box_clone(&self) -> Box<dyn Hittable> {
        Box::new(self.clone())
    }
}

/// A disk with a concentric hole (annulus).
#[derive(Clone)]
pub struct HollowDisk {
    ring: FlatRing,
    material: Arc<dyn Material>,
}

impl HollowDisk {
    /// Create an annulus between `inner_radius` and `outer_radius`.
    pub fn new(
        center: Point3,
        normal: Vec3,
        inner_radius: f64,
        outer_radius: f64,
        material: Arc<dyn Material>,
    ) -> Result<Self, SetupError> {
        if inner_radius.is_nan() || inner_radius <= 0.0 {
            return Err(SetupError::NonPositiveRadius(inner_radius));
        }
        if outer_radius.is_nan() || inner_radius >= outer_radius {
            return Err(SetupError::InvalidRadii {
                inner: inner_radius,
                outer: outer_radius,
            });
        }
        Ok(Self {
            ring: FlatRing::new(center, normal, inner_radius, outer_radius)?,
            material,
        })
    }

    /// Only accept rays arriving against the normal.
    pub fn culled(mut self) -> Self {
        self.ring.culled = true;
        self
    }
}

impl Hittable for HollowDisk {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        _rng: &mut dyn RngCore,
    ) -> bool {
        self.ring.hit(ray, ray_t, rec, self.material.as_ref())
    }

    fn bounding_box(&self) -> Option<Aabb> {
        Some(self.ring.bbox)
    }

    fn set_material(&mut self, material: Arc<dyn Material>) {
        self.material = material;
    }

    fn collect_materials(&self, out: &mut Vec<Arc<dyn Material>>) {
        out.push(self.material.clone());
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

    fn gray() -> Arc<dyn Material> {
        Arc::new(Lambertian::from_color(Color::splat(0.5)))
    }

    fn shoot(object: &dyn Hittable, origin: Point3, direction: Vec3) -> Option<f64> {
        let mut rec = HitRecord::default();
        let mut rng = StdRng::seed_from_u64(0);
        object
            .hit(&Ray::new(origin, direction), Interval::new(0.001, f64::INFINITY), &mut rec, &mut rng)
            .then_some(rec.t)
    }

    #[test]
    fn test_disk_hit_and_miss() {
        let disk = Disk::new(Point3::ZERO, Vec3::Z, 1.0, gray()).unwrap();

        assert_eq!(shoot(&disk, Point3::new(0.5, 0.5, 2.0), Vec3::NEG_Z), Some(2.0));
        assert_eq!(shoot(&disk, Point3::new(0.9, 0.9, 2.0), Vec3::NEG_Z), None);
    }

    #[test]
    fn test_culled_disk() {
        let disk = Disk::new(Point3::ZERO, Vec3::Z, 1.0, gray()).unwrap().culled();

        assert!(shoot(&disk, Point3::new(0.0, 0.0, 2.0), Vec3::NEG_Z).is_some());
        assert!(shoot(&disk, Point3::new(0.0, 0.0, -2.0), Vec3::Z).is_none());
    }

    #[test]
    fn test_hollow_disk_hole() {
        let ring = HollowDisk::new(Point3::ZERO, Vec3::Y, 0.5, 1.0, gray()).unwrap();

        assert!(shoot(&ring, Point3::new(0.0, 1.0, 0.0), Vec3::NEG_Y).is_none());
        assert!(shoot(&ring, Point3::new(0.75, 1.0, 0.0), Vec3::NEG_Y).is_some());
        assert!(shoot(&ring, Point3::new(1.25, 1.0, 0.0), Vec3::NEG_Y).is_none());
    }

    #[test]
    fn test_disk_bounding_box_is_flat() {
        let disk = Disk::new(Point3::new(1.0, 2.0, 3.0), Vec3::Y, 2.0, gray()).unwrap();
        let bbox = disk.bounding_box().unwrap();

        assert!((bbox.x.min + 1.0).abs() < 1e-9);
        assert!((bbox.x.max - 3.0).abs() < 1e-9);
        assert!(bbox.y.size() < 1e-6);
    }

    #[test]
    fn test_hollow_disk_rejects_bad_radii() {
        assert!(matches!(
            HollowDisk::new(Point3::ZERO, Vec3::Y, 1.0, 1.0, gray()),
            Err(SetupError::InvalidRadii { .. })
        ));
        assert!(matches!(
            HollowDisk::new(Point3::ZERO, Vec3::Y, 2.0, 1.0, gray()),
            Err(SetupError::InvalidRadii { .. })
        ));
        assert!(HollowDisk::new(Point3::ZERO, Vec3::Y, 0.0, 1.0, gray()).is_err());
    }
}
