//! Hittable trait, HitRecord and PrimitiveList for ray-object intersection.

use std::sync::Arc;

use crate::{Color, Material, Ray};
use lumen_math::{Aabb, Interval, Point3, Vec3};
use rand::RngCore;

/// A dummy material used for HitRecord::default().
/// Always absorbs light (returns None from scatter).
struct DummyMaterial;

impl Material for DummyMaterial {
    fn reflectance(&self, _u: f64, _v: f64) -> Color {
        Color::ZERO
    }

    fn scatter(&self, _rec: &HitRecord, _rng: &mut dyn RngCore) -> Option<Ray> {
        None
    }
}

/// Static dummy material instance for Default impl.
static DUMMY_MATERIAL: DummyMaterial = DummyMaterial;

/// Record of a ray-object intersection.
///
/// Lives for one bounce; the material is borrowed from the primitive that
/// was hit.
#[derive(Clone)]
pub struct HitRecord<'a> {
    /// The ray that produced the hit, in world space
    pub ray: Ray,
    /// Parameter t where the intersection occurs
    pub t: f64,
    /// Unit surface normal in the primitive's own orientation
    pub normal: Vec3,
    /// Surface coordinates
    pub u: f64,
    pub v: f64,
    /// Material at the intersection point
    pub material: &'a dyn Material,
}

impl<'a> Default for HitRecord<'a> {
    fn default() -> Self {
        Self {
            ray: Ray::default(),
            t: 0.0,
            normal: Vec3::ZERO,
            u: 0.0,
            v: 0.0,
            material: &DUMMY_MATERIAL,
        }
    }
}

impl<'a> HitRecord<'a> {
    /// Point of intersection.
    #[inline]
    pub fn point(&self) -> Point3 {
        self.ray.at(self.t)
    }

    /// Whether the ray arrived against the normal (from the outside).
    #[inline]
    pub fn front_face(&self) -> bool {
        self.ray.direction().dot(self.normal) < 0.0
    }

    /// The normal flipped, if needed, to face the incoming ray.
    #[inline]
    pub fn facing_normal(&self) -> Vec3 {
        if self.front_face() {
            self.normal
        } else {
            -self.normal
        }
    }
}

/// Trait for objects that can be hit by rays.
pub trait Hittable: Send + Sync {
    /// Test if a ray hits this object within the given interval.
    ///
    /// Returns true if hit, and fills in the hit record. The record is left
    /// untouched on a miss.
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        rng: &mut dyn RngCore,
    ) -> bool;

    /// Get the axis-aligned bounding box, `None` for unbounded objects.
    fn bounding_box(&self) -> Option<Aabb>;

    /// Replace the material of this object and every part it is made of.
    fn set_material(&mut self, material: Arc<dyn Material>);

    /// Append every material reference this object holds.
    fn collect_materials(&self, out: &mut Vec<Arc<dyn Material>>);

    /// True for objects extending to infinity (planes, infinite cylinders).
    fn is_infinite(&self) -> bool {
        false
    }

    /// True for objects that enclose a volume.
    fn is_closed(&self) -> bool {
        false
    }

    /// Copy into a new box.
    ///
    /// Geometry is deep-copied, including every sub-primitive held by wrappers,
    /// lists and composite shapes. Materials are `Arc`s and stay shared, so
    /// calling `set_material` on the copy leaves the original untouched.
    fn box_clone(&self) -> Box<dyn Hittable>;
}

impl Clone for Box<dyn Hittable> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

/// An ordered list of hittable objects, scanned linearly.
#[derive(Clone, Default)]
pub struct PrimitiveList {
    objects: Vec<Box<dyn Hittable>>,
}

impl PrimitiveList {
    /// Create a new empty list.
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
        }
    }

    /// Create a list from already boxed objects.
    pub fn from_objects(objects: Vec<Box<dyn Hittable>>) -> Self {
        Self { objects }
    }

    /// Add an object to the list.
    pub fn add(&mut self, object: impl Hittable + 'static) {
        self.objects.push(Box::new(object));
    }

    /// Add an already boxed object to the list.
    pub fn push(&mut self, object: Box<dyn Hittable>) {
        self.objects.push(object);
    }

    /// Get the number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Iterate over the objects in order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Hittable> {
        self.objects.iter().map(|o| o.as_ref())
    }

    /// Consume the list, returning its objects.
    pub fn into_objects(self) -> Vec<Box<dyn Hittable>> {
        self.objects
    }

    /// Sort by the minimum corner of each object's bounding box along `axis`.
    ///
    /// Objects without a bounding box sort last.
    pub fn sort_by_axis(&mut self, axis: usize) {
        let key = |o: &Box<dyn Hittable>| {
            o.bounding_box()
                .map_or(f64::INFINITY, |b| b.axis_interval(axis).min)
        };
        self.objects.sort_by(|a, b| key(a).total_cmp(&key(b)));
    }

    /// Split into two halves; the first gets `len / 2` objects.
    pub fn split_half(mut self) -> (PrimitiveList, PrimitiveList) {
        let right = self.objects.split_off(self.objects.len() / 2);
        (self, PrimitiveList::from_objects(right))
    }

    /// Separate unbounded objects from the rest, preserving order.
    pub fn partition_infinite(self) -> (PrimitiveList, PrimitiveList) {
        let (infinite, finite): (Vec<_>, Vec<_>) =
            self.objects.into_iter().partition(|o| o.is_infinite());
        (
            PrimitiveList::from_objects(finite),
            PrimitiveList::from_objects(infinite),
        )
    }
}

impl Hittable for PrimitiveList {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        rng: &mut dyn RngCore,
    ) -> bool {
        let mut hit_anything = false;
        let mut closest_so_far = ray_t.max;

        for object in &self.objects {
            if object.hit(ray, ray_t.with_max(closest_so_far), rec, rng) {
                hit_anything = true;
                closest_so_far = rec.t;
            }
        }

        hit_anything
    }

    fn bounding_box(&self) -> Option<Aabb> {
        let mut objects = self.objects.iter();
        let first = objects.next()?.bounding_box()?;
        objects.try_fold(first, |acc, o| Some(Aabb::surrounding(&acc, &o.bounding_box()?)))
    }

    fn set_material(&mut self, material: Arc<dyn Material>) {
        for object in &mut self.objects {
            object.set_material(material.clone());
        }
    }

    fn collect_materials(&self, out: &mut Vec<Arc<dyn Material>>) {
        for object in &self.objects {
            object.collect_materials(out);
        }
    }

    fn is_infinite(&self) -> bool {
        self.objects.iter().any(|o| o.is_infinite())
    }

    fn is_closed(&self) -> bool {
        !self.objects.is_empty() && self.objects.iter().all(|o| o.is_closed())
    }

    fn box_clone(&self) -> Box<dyn Hittable> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Lambertian, Plane, Sphere};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn gray() -> Arc<dyn Material> {
        Arc::new(Lambertian::from_color(Color::splat(0.5)))
    }

    fn spheres() -> PrimitiveList {
        let mut list = PrimitiveList::new();
        for z in [-6.0, -2.0, -4.0] {
            list.add(Sphere::new(Point3::new(0.0, 0.0, z), 0.5, gray()).unwrap());
        }
        list
    }

    #[test]
    fn test_list_returns_nearest_hit() {
        let list = spheres();
        let mut rng = StdRng::seed_from_u64(1);
        let ray = Ray::new(Point3::ZERO, Vec3::NEG_Z);
        let mut rec = HitRecord::default();

        assert!(list.hit(&ray, Interval::new(0.001, f64::INFINITY), &mut rec, &mut rng));
        assert!((rec.t - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_list_bounding_box() {
        let list = spheres();
        let bbox = list.bounding_box().unwrap();
        assert!((bbox.z.min + 6.5).abs() < 1e-9);
        assert!((bbox.z.max + 1.5).abs() < 1e-9);

        assert!(PrimitiveList::new().bounding_box().is_none());
    }

    #[test]
    fn test_infinite_member_has_no_box() {
        let mut list = spheres();
        list.add(Plane::new(Point3::ZERO, Vec3::Y, gray()).unwrap());
        assert!(list.is_infinite());
        assert!(list.bounding_box().is_none());

        let (finite, infinite) = list.partition_infinite();
        assert_eq!(finite.len(), 3);
        assert_eq!(infinite.len(), 1);
        assert!(finite.bounding_box().is_some());
    }

    #[test]
    fn test_sort_and_split() {
        let mut list = spheres();
        list.sort_by_axis(2);
        let mins: Vec<f64> = list.iter().map(|o| o.bounding_box().unwrap().z.min).collect();
        assert!(mins.windows(2).all(|w| w[0] <= w[1]));

        let (left, right) = list.split_half();
        assert_eq!(left.len(), 1);
        assert_eq!(right.len(), 2);
    }

    #[test]
    fn test_set_material_reaches_every_member() {
        let mut list = spheres();
        let red: Arc<dyn Material> = Arc::new(Lambertian::from_color(Color::new(1.0, 0.0, 0.0)));
        list.set_material(red.clone());

        let mut materials = Vec::new();
        list.collect_materials(&mut materials);
        assert_eq!(materials.len(), 3);
        assert!(materials.iter().all(|m| Arc::ptr_eq(m, &red)));
    }

    #[test]
    fn test_box_clone_copies_geometry_and_shares_materials() {
        let original: Box<dyn Hittable> = Box::new(spheres());
        let mut copy = original.clone();

        let mut before = Vec::new();
        copy.collect_materials(&mut before);
        let mut shared = Vec::new();
        original.collect_materials(&mut shared);
        assert!(before.iter().zip(&shared).all(|(a, b)| Arc::ptr_eq(a, b)));

        let red: Arc<dyn Material> = Arc::new(Lambertian::from_color(Color::new(1.0, 0.0, 0.0)));
        copy.set_material(red.clone());

        let mut materials = Vec::new();
        original.collect_materials(&mut materials);
        assert_eq!(materials.len(), 3);
        assert!(materials.iter().all(|m| !Arc::ptr_eq(m, &red)));
    }
}
