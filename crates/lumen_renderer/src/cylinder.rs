//! Cylindrical primitives.
//!
//! [`UncappedCylinder`] and [`InfiniteCylinder`] are the curved wall alone.
//! [`Cylinder`] and [`HollowCylinder`] close the wall with disks.

use std::f64::consts::PI;
use std::sync::Arc;

use crate::composite::Composite;
use crate::disk::{Disk, HollowDisk};
use crate::hittable::{HitRecord, Hittable, PrimitiveList};
use crate::{Material, Ray, SetupError};
use lumen_math::{Aabb, Interval, Point3, Vec3};
use rand::RngCore;

/// Axis lengths below this are treated as collapsed.
const MIN_AXIS_LENGTH: f64 = 1e-9;

/// Radial geometry shared by the finite and infinite walls.
#[derive(Clone)]
struct Tube {
    base: Point3,
    /// Unit axis direction
    axis: Vec3,
    tangent: Vec3,
    bitangent: Vec3,
    radius: f64,
}

impl Tube {
    fn new(base: Point3, axis: Vec3, radius: f64) -> Self {
        let (tangent, bitangent) = axis.any_orthonormal_pair();
        Self {
            base,
            axis,
            tangent,
            bitangent,
            radius,
        }
    }

    /// Both roots of the radial constraint, nearest first.
    ///
    /// Works in the plane perpendicular to the axis, so the times are in
    /// units of the unprojected ray direction.
    #[inline]
    fn roots(&self, ray: &Ray) -> Option<(f64, f64)> {
        let direction = ray.direction();
        let offset = ray.origin() - self.base;

        let d_perp = direction - direction.dot(self.axis) * self.axis;
        let o_perp = offset - offset.dot(self.axis) * self.axis;

        let a = d_perp.length_squared();
        // Parallel to the axis never crosses the wall
        if a < 1e-18 {
            return None;
        }
        let h = d_perp.dot(o_perp);
        let c = o_perp.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant <= 0.0 {
            return None;
        }
        let sqrtd = discriminant.sqrt();
        Some(((-h - sqrtd) / a, (-h + sqrtd) / a))
    }

    /// Position along the axis of a point, measured from the base.
    #[inline]
    fn height_of(&self, p: Point3) -> f64 {
        (p - self.base).dot(self.axis)
    }

    /// Outward unit normal and angular coordinate of a point on the wall.
    #[inline]
    fn surface(&self, p: Point3, height: f64) -> (Vec3, f64) {
        let radial = p - self.base - height * self.axis;
        let normal = radial / self.radius;
        let angle = radial.dot(self.bitangent).atan2(radial.dot(self.tangent));
        (normal, (angle + PI) / (2.0 * PI))
    }
}

fn validate_axis(base: Point3, top: Point3) -> Result<Vec3, SetupError> {
    let axis = top - base;
    if axis.length() < MIN_AXIS_LENGTH {
        return Err(SetupError::ZeroLengthAxis(format!("{base}")));
    }
    Ok(axis)
}

fn validate_radius(radius: f64) -> Result<(), SetupError> {
    if radius.is_nan() || radius <= 0.0 {
        return Err(SetupError::NonPositiveRadius(radius));
    }
    Ok(())
}

/// Bounds of a finite cylinder: both end disks, each as flat as its axis allows.
fn cylinder_bbox(base: Point3, top: Point3, axis: Vec3, radius: f64) -> Aabb {
    let extent = Vec3::new(
        (1.0 - axis.x * axis.x).max(0.0).sqrt(),
        (1.0 - axis.y * axis.y).max(0.0).sqrt(),
        (1.0 - axis.z * axis.z).max(0.0).sqrt(),
    ) * radius;
    Aabb::from_points(base.min(top) - extent, base.max(top) + extent)
}

/// Open cylindrical wall between two end points.
#[derive(Clone)]
pub struct UncappedCylinder {
    tube: Tube,
    length: f64,
    /// Normals point towards the axis
    reversed: bool,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

impl UncappedCylinder {
    /// Create a wall of `radius` around the segment from `base` to `top`.
    pub fn new(base: Point3, top: Point3, radius: f64, material: Arc<dyn Material>) -> Result<Self, SetupError> {
        validate_radius(radius)?;
        let axis = validate_axis(base, top)?;
        let length = axis.length();
        let axis = axis / length;

        Ok(Self {
            tube: Tube::new(base, axis, radius),
            length,
            reversed: false,
            material,
            bbox: cylinder_bbox(base, top, axis, radius),
        })
    }

    /// Point the normals at the axis instead of away from it.
    pub fn flipped(mut self) -> Self {
        self.reversed = !self.reversed;
        self
    }

    /// Distance between the end points.
    pub fn length(&self) -> f64 {
        self.length
    }
}

impl Hittable for UncappedCylinder {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        _rng: &mut dyn RngCore,
    ) -> bool {
        let Some((near, far)) = self.tube.roots(ray) else {
            return false;
        };

        for t in [near, far] {
            if !ray_t.surrounds(t) {
                continue;
            }
            let p = ray.at(t);
            let height = self.tube.height_of(p);
            if !(0.0..=self.length).contains(&height) {
                continue;
            }

            let (normal, u) = self.tube.surface(p, height);
            rec.ray = *ray;
            rec.t = t;
            rec.normal = if self.reversed { -normal } else { normal };
            rec.u = u;
            rec.v = height / self.length;
            rec.material = self.material.as_ref();
            return true;
        }

        false
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

/// Cylindrical wall of unbounded length around a line.
#[derive(Clone)]
pub struct InfiniteCylinder {
    tube: Tube,
    material: Arc<dyn Material>,
}

impl InfiniteCylinder {
    /// Create a wall of `radius` around the line through `point` along `axis`.
    pub fn new(point: Point3, axis: Vec3, radius: f64, material: Arc<dyn Material>) -> Result<Self, SetupError> {
        validate_radius(radius)?;
        let axis = axis
            .try_normalize()
            .ok_or_else(|| SetupError::ZeroLengthAxis(format!("{point}")))?;

        Ok(Self {
            tube: Tube::new(point, axis, radius),
            material,
        })
    }
}

impl Hittable for InfiniteCylinder {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        _rng: &mut dyn RngCore,
    ) -> bool {
        let Some((near, far)) = self.tube.roots(ray) else {
            return false;
        };

        let t = if ray_t.surrounds(near) {
            near
        } else if ray_t.surrounds(far) {
            far
        } else {
            return false;
        };

        let p = ray.at(t);
        let height = self.tube.height_of(p);
        let (normal, u) = self.tube.surface(p, height);
        rec.ray = *ray;
        rec.t = t;
        rec.normal = normal;
        rec.u = u;
        rec.v = height.rem_euclid(1.0);
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

/// Solid cylinder: a wall closed by a disk at each end.
#[derive(Clone)]
pub struct Cylinder {
    parts: Composite,
}

impl Cylinder {
    pub fn new(base: Point3, top: Point3, radius: f64, material: Arc<dyn Material>) -> Result<Self, SetupError> {
        let wall = UncappedCylinder::new(base, top, radius, material.clone())?;
        let axis = wall.tube.axis;
        let bbox = wall.bbox;

        let mut parts = PrimitiveList::new();
        parts.add(wall);
        parts.add(Disk::new(base, -axis, radius, material.clone())?);
        parts.add(Disk::new(top, axis, radius, material)?);

        Ok(Self {
            parts: Composite::new(parts, bbox),
        })
    }
}

impl Hittable for Cylinder {
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

/// Thick-walled tube: outer and inner walls joined by an annulus at each end.
#[derive(Clone)]
pub struct HollowCylinder {
    parts: Composite,
}

impl HollowCylinder {
    pub fn new(
        base: Point3,
        top: Point3,
        inner_radius: f64,
        outer_radius: f64,
        material: Arc<dyn Material>,
    ) -> Result<Self, SetupError> {
        validate_radius(inner_radius)?;
        if outer_radius.is_nan() || inner_radius >= outer_radius {
            return Err(SetupError::InvalidRadii {
                inner: inner_radius,
                outer: outer_radius,
            });
        }

        let outer = UncappedCylinder::new(base, top, outer_radius, material.clone())?;
        let inner = UncappedCylinder::new(base, top, inner_radius, material.clone())?.flipped();
        let axis = outer.tube.axis;
        let bbox = outer.bbox;

        let mut parts = PrimitiveList::new();
        parts.add(outer);
        parts.add(inner);
        parts.add(HollowDisk::new(base, -axis, inner_radius, outer_radius, material.clone())?);
        parts.add(HollowDisk::new(top, axis, inner_radius, outer_radius, material)?);

        Ok(Self {
            parts: Composite::new(parts, bbox),
        })
    }
}

impl Hittable for HollowCylinder {
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
