//! Square-based pyramid made of a rectangle and four triangles.

use std::sync::Arc;

use crate::composite::Composite;
use crate::hittable::{HitRecord, Hittable, PrimitiveList};
use crate::rectangle::Rectangle;
use crate::triangle::Triangle;
use crate::{Material, Ray, SetupError};
use lumen_math::{Aabb, Interval, Point3};
use rand::RngCore;

/// A pyramid standing on a horizontal rectangular base.
///
/// The apex sits `height` above the centre of the base.
#[derive(Clone)]
pub struct Pyramid {
    parts: Composite,
}

impl Pyramid {
    /// Create a pyramid on the base spanned by corners `a` and `b`.
    ///
    /// Both corners must share the same Y coordinate and differ in X and Z.
    pub fn new(a: Point3, b: Point3, height: f64, material: Arc<dyn Material>) -> Result<Self, SetupError> {
        if height.is_nan() || height <= 0.0 {
            return Err(SetupError::NonPositiveHeight(height));
        }
        if a.y != b.y {
            return Err(SetupError::InvalidRectangle {
                a: format!("{a}"),
                b: format!("{b}"),
            });
        }

        // Fails when X or Z also coincide
        let base = Rectangle::new(a, b, material.clone())?.flipped();

        let (p0, p1) = (a.min(b), a.max(b));
        let y = a.y;
        let apex = Point3::new((p0.x + p1.x) * 0.5, y + height, (p0.z + p1.z) * 0.5);
        // Counter-clockwise seen from above, so each side winds outward
        let corners = [
            Point3::new(p0.x, y, p0.z),
            Point3::new(p1.x, y, p0.z),
            Point3::new(p1.x, y, p1.z),
            Point3::new(p0.x, y, p1.z),
        ];

        let mut parts = PrimitiveList::new();
        parts.add(base);
        for (i, &corner) in corners.iter().enumerate() {
            let next = corners[(i + 1) % 4];
            parts.add(Triangle::new(corner, apex, next, material.clone())?);
        }

        let bbox = Aabb::from_points(p0, Point3::new(p1.x, y + height, p1.z));
        Ok(Self {
            parts: Composite::new(parts, bbox),
        })
    }
}

impl Hittable for Pyramid {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        rng: &mut dyn RngCore,
    ) -> bool {
        self.parts.hit(ray, ray_t, rec, rng)
    }

    fn bounding_box(&self) -> Option<Aabb> {
        Some(self.parts.bbox())
    }

    fn set_material(&mut self, material: Arc<dyn Material>) {
        self.parts.set_material(material);
    }

    fn collect_materials(&self, out: &mut Vec<Arc<dyn Material>>) {
        self.parts.collect_materials(out);
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
    use lumen_math::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn gray() -> Arc<dyn Material> {
        Arc::new(Lambertian::from_color(Color::splat(0.5)))
    }

    fn pyramid() -> Pyramid {
        Pyramid::new(Point3::new(-1.0, 0.0, -1.0), Point3::new(1.0, 0.0, 1.0), 1.0, gray()).unwrap()
    }

    fn shoot(object: &dyn Hittable, origin: Point3, direction: Vec3) -> Option<(f64, Vec3)> {
        let mut rec = HitRecord::default();
        let mut rng = StdRng::seed_from_u64(0);
        object
            .hit(&Ray::new(origin, direction), Interval::new(0.001, f64::INFINITY), &mut rec, &mut rng)
            .then_some((rec.t, rec.normal))
    }

    #[test]
    fn test_slope_hit_from_above() {
        // The +X face lies in the plane x + y = 1
        let (t, normal) = shoot(&pyramid(), Point3::new(0.1, 3.0, 0.05), Vec3::NEG_Y).unwrap();
        assert!((t - 2.1).abs() < 1e-9);
        assert!(normal.x > 0.0 && normal.y > 0.0);
    }

    #[test]
    fn test_base_faces_down() {
        let (t, normal) = shoot(&pyramid(), Point3::new(0.5, -2.0, 0.5), Vec3::Y).unwrap();
        assert!((t - 2.0).abs() < 1e-9);
        assert_eq!(normal, Vec3::NEG_Y);
    }

    #[test]
    fn test_side_normals_point_outward() {
        for direction in [Vec3::X, Vec3::NEG_X, Vec3::Z, Vec3::NEG_Z] {
            let origin = Point3::new(0.0, 0.25, 0.0) - 3.0 * direction;
            let (t, normal) = shoot(&pyramid(), origin, direction).unwrap();
            assert!((t - 2.25).abs() < 1e-9);
            assert!(normal.dot(direction) < 0.0);
            assert!(normal.y > 0.0);
        }
    }

    #[test]
    fn test_miss_beside_slope() {
        // Clips the bounding box corner but passes outside the slope
        assert!(shoot(&pyramid(), Point3::new(0.9, 0.9, -3.0), Vec3::Z).is_none());
    }

    #[test]
    fn test_invalid_pyramids_rejected() {
        assert!(matches!(
            Pyramid::new(Point3::ZERO, Point3::new(1.0, 1.0, 1.0), 1.0, gray()),
            Err(SetupError::InvalidRectangle { .. })
        ));
        assert!(matches!(
            Pyramid::new(Point3::ZERO, Point3::new(1.0, 0.0, 1.0), 0.0, gray()),
            Err(SetupError::NonPositiveHeight(_))
        ));
        assert!(Pyramid::new(Point3::ZERO, Point3::new(0.0, 0.0, 1.0), 1.0, gray()).is_err());
    }

    #[test]
    fn test_set_material_reaches_all_faces() {
        let mut pyramid = pyramid();
        let red: Arc<dyn Material> = Arc::new(Lambertian::from_color(Color::new(1.0, 0.0, 0.0)));
        pyramid.set_material(red.clone());

        let mut materials = Vec::new();
        pyramid.collect_materials(&mut materials);
        assert_eq!(materials.len(), 5);
        assert!(materials.iter().all(|m| Arc::ptr_eq(m, &red)));
    }
}
