//! Axis-aligned box made of six rectangles.

use std::sync::Arc;

use crate::composite::Composite;
use crate::hittable::{HitRecord, Hittable, PrimitiveList};
use crate::rectangle::Rectangle;
use crate::{Material, Ray, SetupError};
use lumen_math::{Aabb, Interval, Point3};
use rand::RngCore;

/// An axis-aligned box with outward facing sides.
#[derive(Clone)]
pub struct Cuboid {
    parts: Composite,
}

impl Cuboid {
    /// Create a box spanning corners `a` and `b`, in any order.
    ///
    /// Fails if the corners share a coordinate, which would flatten the box.
    pub fn new(a: Point3, b: Point3, material: Arc<dyn Material>) -> Result<Self, SetupError> {
        if a.x == b.x || a.y == b.y || a.z == b.z {
            return Err(SetupError::DegenerateBox {
                a: format!("{a}"),
                b: format!("{b}"),
            });
        }

        let p0 = a.min(b);
        let p1 = a.max(b);
        let m = material;

        let mut sides = PrimitiveList::new();
        // +Z / -Z
        sides.add(Rectangle::new(Point3::new(p0.x, p0.y, p1.z), Point3::new(p1.x, p1.y, p1.z), m.clone())?);
        sides.add(Rectangle::new(Point3::new(p0.x, p0.y, p0.z), Point3::new(p1.x, p1.y, p0.z), m.clone())?.flipped());
        // +Y / -Y
        sides.add(Rectangle::new(Point3::new(p0.x, p1.y, p0.z), Point3::new(p1.x, p1.y, p1.z), m.clone())?);
        sides.add(Rectangle::new(Point3::new(p0.x, p0.y, p0.z), Point3::new(p1.x, p0.y, p1.z), m.clone())?.flipped());
        // +X / -X
        sides.add(Rectangle::new(Point3::new(p1.x, p0.y, p0.z), Point3::new(p1.x, p1.y, p1.z), m.clone())?);
        sides.add(Rectangle::new(Point3::new(p0.x, p0.y, p0.z), Point3::new(p0.x, p1.y, p1.z), m)?.flipped());

        Ok(Self {
            parts: Composite::new(sides, Aabb::from_points(p0, p1)),
        })
    }
}

impl Hittable for Cuboid {
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
