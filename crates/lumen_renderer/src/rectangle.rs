//! Axis-aligned rectangles.

use std::sync::Arc;

use crate::{
    hittable::{HitRecord, Hittable},
    Material, Ray, SetupError,
};
use lumen_math::{Aabb, Axis, Interval, Point3, Vec3};
use rand::RngCore;

/// A rectangle lying in a plane perpendicular to one coordinate axis.
///
/// The plane is picked from the two corners: exactly one coordinate must be
/// shared between them. The normal points along the positive constant axis
/// unless the rectangle is [`flipped`](Rectangle::flipped).
#[derive(Clone)]
pub struct Rectangle {
    /// Axis the rectangle is perpendicular to
    axis: Axis,
    /// Position of the plane along `axis`
    k: f64,
    /// Extent along the first and second in-plane axes
    first: Interval,
    second: Interval,
    normal: Vec3,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

impl Rectangle {
    /// Create a rectangle spanning corners `a` and `b`.
    pub fn new(a: Point3, b: Point3, material: Arc<dyn Material>) -> Result<Self, SetupError> {
        let equal: Vec<Axis> = Axis::ALL
            .into_iter()
            .filter(|axis| a[axis.index()] == b[axis.index()])
            .collect();

        let [axis] = equal[..] else {
            return Err(SetupError::InvalidRectangle {
                a: format!("{a}"),
                b: format!("{b}"),
            });
        };

        let (i, j) = Self::plane_axes(axis);
        let first = Interval::new(a[i].min(b[i]), a[i].max(b[i]));
        let second = Interval::new(a[j].min(b[j]), a[j].max(b[j]));

        Ok(Self {
            axis,
            k: a[axis.index()],
            first,
            second,
            normal: axis.unit(),
            material,
            bbox: Aabb::from_points(a, b),
        })
    }

    /// Reverse the normal so it points along the negative constant axis.
    pub fn flipped(mut self) -> Self {
        self.normal = -self.normal;
        self
    }

    /// The axis this rectangle is perpendicular to.
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Outward normal.
    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    /// Component indices of the two in-plane axes, in XY / XZ / YZ order.
    fn plane_axes(axis: Axis) -> (usize, usize) {
        match axis {
            Axis::X => (1, 2),
            Axis::Y => (0, 2),
            Axis::Z => (0, 1),
        }
    }
}

impl Hittable for Rectangle {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        _rng: &mut dyn RngCore,
    ) -> bool {
        let k_axis = self.axis.index();
        let t = (self.k - ray.origin()[k_axis]) / ray.direction()[k_axis];
        // Parallel rays give an infinite or NaN time, neither is surrounded
        if !ray_t.surrounds(t) {
            return false;
        }

        let (i, j) = Self::plane_axes(self.axis);
        let p = ray.at(t);
        if !self.first.contains(p[i]) || !self.second.contains(p[j]) {
            return false;
        }

        rec.ray = *ray;
        rec.t = t;
        rec.normal = self.normal;
        rec.u = (p[i] - self.first.min) / self.first.size();
        rec.v = (p[j] - self.second.min) / self.second.size();
        rec.material = self.material.as_ref();

        true
    }

    fn bounding_box(&self) -> Option<Aabb> {
        Some(self.bbox)
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

    fn shoot(object: &dyn Hittable, origin: Point3, direction: Vec3) -> Option<(f64, Vec3)> {
        let mut rec = HitRecord::default();
        let mut rng = StdRng::seed_from_u64(0);
        object
            .hit(&Ray::new(origin, direction), Interval::new(0.001, f64::INFINITY), &mut rec, &mut rng)
            .then_some((rec.t, rec.normal))
    }

    #[test]
    fn test_kind_selected_from_shared_coordinate() {
        let xy = Rectangle::new(Point3::new(0.0, 0.0, 2.0), Point3::new(1.0, 1.0, 2.0), gray()).unwrap();
        let xz = Rectangle::new(Point3::new(0.0, 3.0, 0.0), Point3::new(1.0, 3.0, 1.0), gray()).unwrap();
        let yz = Rectangle::new(Point3::new(4.0, 1.0, 1.0), Point3::new(4.0, 0.0, 0.0), gray()).unwrap();

        assert_eq!(xy.axis(), Axis::Z);
        assert_eq!(xz.axis(), Axis::Y);
        assert_eq!(yz.axis(), Axis::X);
        assert_eq!(yz.normal(), Vec3::X);
    }

    #[test]
    fn test_mismatched_corners_rejected() {
        // No shared coordinate
        assert!(matches!(
            Rectangle::new(Point3::ZERO, Point3::ONE, gray()),
            Err(SetupError::InvalidRectangle { .. })
        ));
        // Two shared coordinates collapse to a line
        assert!(Rectangle::new(Point3::ZERO, Point3::new(1.0, 0.0, 0.0), gray()).is_err());
        assert!(Rectangle::new(Point3::ONE, Point3::ONE, gray()).is_err());
    }

    #[test]
    fn test_rectangle_hit_and_uv() {
        let rect = Rectangle::new(Point3::new(-1.0, -1.0, 0.0), Point3::new(1.0, 1.0, 0.0), gray()).unwrap();
        let mut rec = HitRecord::default();
        let mut rng = StdRng::seed_from_u64(0);
        let ray = Ray::new(Point3::new(0.5, 0.0, 3.0), Vec3::NEG_Z);

        assert!(rect.hit(&ray, Interval::new(0.001, f64::INFINITY), &mut rec, &mut rng));
        assert!((rec.t - 3.0).abs() < 1e-12);
        assert!((rec.u - 0.75).abs() < 1e-12);
        assert!((rec.v - 0.5).abs() < 1e-12);
        assert_eq!(rec.normal, Vec3::Z);
    }

    #[test]
    fn test_rectangle_miss() {
        let rect = Rectangle::new(Point3::new(-1.0, -1.0, 0.0), Point3::new(1.0, 1.0, 0.0), gray()).unwrap();

        assert!(shoot(&rect, Point3::new(1.5, 0.0, 3.0), Vec3::NEG_Z).is_none());
        // Parallel to the plane
        assert!(shoot(&rect, Point3::new(0.0, 0.0, 0.0), Vec3::X).is_none());
    }

    #[test]
    fn test_flipped_normal() {
        let rect = Rectangle::new(Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 1.0, 1.0), gray())
            .unwrap()
            .flipped();
        let (t, normal) = shoot(&rect, Point3::new(-2.0, 0.5, 0.5), Vec3::X).unwrap();

        assert!((t - 2.0).abs() < 1e-12);
        assert_eq!(normal, Vec3::NEG_X);
    }
}
