//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use std::sync::Arc;

use crate::{
    hittable::{HitRecord, Hittable},
    Material, Ray, SetupError,
};
use lumen_math::{Aabb, Interval, Point3, Vec3};
use rand::RngCore;

/// Determinant threshold for rays parallel to the triangle.
const EPSILON: f64 = 1e-9;

/// A triangle primitive.
#[derive(Clone)]
pub struct Triangle {
    /// Vertices
    v0: Point3,
    v1: Point3,
    v2: Point3,
    /// Cached edges from v0
    edge1: Vec3,
    edge2: Vec3,
    /// Pre-computed face normal (unit length, right-handed winding)
    normal: Vec3,
    culled: bool,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

impl Triangle {
    /// Create a new triangle from three vertices.
    ///
    /// Fails if the vertices are coincident or collinear.
    pub fn new(v0: Point3, v1: Point3, v2: Point3, material: Arc<dyn Material>) -> Result<Self, SetupError> {
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        // Twice the area; zero for a triangle collapsed to a line or point
        let cross = edge1.cross(edge2);
        let scale = edge1.length_squared().max(edge2.length_squared());
        if scale == 0.0 || cross.length_squared() <= 1e-24 * scale * scale {
            return Err(SetupError::DegenerateTriangle);
        }

        let bbox = Aabb::from_points(v0.min(v1).min(v2), v0.max(v1).max(v2));

        Ok(Self {
            v0,
            v1,
            v2,
            edge1,
            edge2,
            normal: cross.normalize(),
            culled: false,
            material,
            bbox,
        })
    }

    /// Only accept rays hitting the front (counter-clockwise) face.
    pub fn culled(mut self) -> Self {
        self.culled = true;
        self
    }

    /// The three vertices.
    pub fn vertices(&self) -> [Point3; 3] {
        [self.v0, self.v1, self.v2]
    }

    /// Unit face normal.
    pub fn normal(&self) -> Vec3 {
        self.normal
    }
}

impl Hittable for Triangle {
    /// Möller-Trumbore ray-triangle intersection algorithm.
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        _rng: &mut dyn RngCore,
    ) -> bool {
        let h = ray.direction().cross(self.edge2);
        let a = self.edge1.dot(h);

        // Back-facing when culled, parallel otherwise
        if self.culled {
            if a < EPSILON {
                return false;
            }
        } else if a.abs() < EPSILON {
            return false;
        }

        let f = 1.0 / a;
        let s = ray.origin() - self.v0;
        let u = f * s.dot(h);

        // Check if intersection is outside triangle (u parameter)
        if !(0.0..=1.0).contains(&u) {
            return false;
        }

        let q = s.cross(self.edge1);
        let v = f * ray.direction().dot(q);

        // Check if intersection is outside triangle (v parameter)
        if v < 0.0 || u + v > 1.0 {
            return false;
        }

        let t = f * self.edge2.dot(q);
        if !ray_t.surrounds(t) {
            return false;
        }

        rec.ray = *ray;
        rec.t = t;
        rec.normal = self.normal;
        rec.u = u;
        rec.v = v;
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
        Arc::new(Lambertian::from_color(Color::new(0.5, 0.5, 0.5)))
    }

    // Triangle in XY plane at z=-1, normal +Z
    fn front_triangle() -> Triangle {
        Triangle::new(
            Point3::new(-1.0, -1.0, -1.0),
            Point3::new(1.0, -1.0, -1.0),
            Point3::new(0.0, 1.0, -1.0),
            gray(),
        )
        .unwrap()
    }

    #[test]
    fn test_triangle_hit() {
        let tri = front_triangle();
        let ray = Ray::new(Point3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let mut rec = HitRecord::default();
        let mut rng = StdRng::seed_from_u64(0);

        assert!(tri.hit(&ray, Interval::new(0.001, f64::INFINITY), &mut rec, &mut rng));
        assert!((rec.t - 1.0).abs() < 1e-9);
        assert!((rec.normal - Vec3::Z).length() < 1e-12);
        assert!(rec.u >= 0.0 && rec.v >= 0.0 && rec.u + rec.v <= 1.0);
    }

    #[test]
    fn test_triangle_miss() {
        let tri = front_triangle();

        // Ray pointing away
        let ray = Ray::new(Point3::ZERO, Vec3::new(0.0, 0.0, 1.0));
        let mut rec = HitRecord::default();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(!tri.hit(&ray, Interval::new(0.001, f64::INFINITY), &mut rec, &mut rng));

        // Ray passing beside the triangle
        let ray = Ray::new(Point3::new(0.9, 0.9, 0.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(!tri.hit(&ray, Interval::new(0.001, f64::INFINITY), &mut rec, &mut rng));
    }

    #[test]
    fn test_culled_triangle() {
        let tri = front_triangle().culled();
        let mut rec = HitRecord::default();
        let mut rng = StdRng::seed_from_u64(0);

        let front = Ray::new(Point3::ZERO, Vec3::NEG_Z);
        assert!(tri.hit(&front, Interval::new(0.001, f64::INFINITY), &mut rec, &mut rng));

        let back = Ray::new(Point3::new(0.0, 0.0, -2.0), Vec3::Z);
        assert!(!tri.hit(&back, Interval::new(0.001, f64::INFINITY), &mut rec, &mut rng));

        // The same ray hits when culling is off
        assert!(front_triangle().hit(&back, Interval::new(0.001, f64::INFINITY), &mut rec, &mut rng));
    }

    #[test]
    fn test_degenerate_triangles_rejected() {
        let p = Point3::new(1.0, 2.0, 3.0);
        let q = Point3::new(2.0, 2.0, 3.0);

        assert_eq!(
            Triangle::new(p, p, q, gray()).err(),
            Some(SetupError::DegenerateTriangle)
        );
        assert!(Triangle::new(p, q, p + 2.0 * (q - p), gray()).is_err());
        assert!(Triangle::new(p, p, p, gray()).is_err());
    }
}
