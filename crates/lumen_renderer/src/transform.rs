//! Transform wrappers that place a primitive in the world.
//!
//! Each wrapper moves the incoming ray into the object's space, delegates,
//! and reports the hit back in world space.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::hittable::{HitRecord, Hittable};
use crate::{Material, Ray, SetupError};
use lumen_math::{transform_aabb, Aabb, Axis, Interval, Quat, Vec3};
use rand::RngCore;

/// Moves an object by a fixed displacement.
#[derive(Clone)]
pub struct Translation {
    object: Box<dyn Hittable>,
    offset: Vec3,
    bbox: Option<Aabb>,
}

impl Translation {
    pub fn new(object: impl Hittable + 'static, offset: Vec3) -> Self {
        Self::from_boxed(Box::new(object), offset)
    }

    pub fn from_boxed(object: Box<dyn Hittable>, offset: Vec3) -> Self {
        let bbox = object.bounding_box().map(|b| b.translate(offset));
        Self { object, offset, bbox }
    }
}

impl Hittable for Translation {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        rng: &mut dyn RngCore,
    ) -> bool {
        let moved = Ray::new(ray.origin() - self.offset, ray.direction());
        if !self.object.hit(&moved, ray_t, rec, rng) {
            return false;
        }
        // Same direction and parameter, so the world ray reproduces the world point
        rec.ray = *ray;
        true
    }

    fn bounding_box(&self) -> Option<Aabb> {
        self.bbox
    }

    fn set_material(&mut self, material: Arc<dyn Material>) {
        self.object.set_material(material);
    }

    fn collect_materials(&self, out: &mut Vec<Arc<dyn Material>>) {
        self.object.collect_materials(out);
    }

    fn is_infinite(&self) -> bool {
        self.object.is_infinite()
    }

    fn is_closed(&self) -> bool {
        self.object.is_closed()
    }

    fn box_clone(&self) -> Box<dyn Hittable> {
        Box::new(self.clone())
    }
}

/// Rotates an object about one coordinate axis through the origin.
#[derive(Clone)]
pub struct Rotation {
    object: Box<dyn Hittable>,
    axis: Axis,
    sin_theta: f64,
    cos_theta: f64,
    bbox: Option<Aabb>,
}

impl Rotation {
    /// Rotate `object` by `degrees` about `axis`, right-handed.
    pub fn new(object: impl Hittable + 'static, axis: Axis, degrees: f64) -> Self {
        Self::from_boxed(Box::new(object), axis, degrees)
    }

    pub fn from_boxed(object: Box<dyn Hittable>, axis: Axis, degrees: f64) -> Self {
        let (sin_theta, cos_theta) = degrees.to_radians().sin_cos();
        let bbox = object
            .bounding_box()
            .map(|b| transform_aabb(&b, |p| axis.rotate(p, sin_theta, cos_theta)));

        Self {
            object,
            axis,
            sin_theta,
            cos_theta,
            bbox,
        }
    }

    pub fn x(object: impl Hittable + 'static, degrees: f64) -> Self {
        Self::new(object, Axis::X, degrees)
    }

    pub fn y(object: impl Hittable + 'static, degrees: f64) -> Self {
        Self::new(object, Axis::Y, degrees)
    }

    pub fn z(object: impl Hittable + 'static, degrees: f64) -> Self {
        Self::new(object, Axis::Z, degrees)
    }
}

impl Hittable for Rotation {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        rng: &mut dyn RngCore,
    ) -> bool {
        // World to object space is the inverse rotation
        let (s, c) = (self.sin_theta, self.cos_theta);
        let local = Ray::new(
            self.axis.rotate(ray.origin(), -s, c),
            self.axis.rotate(ray.direction(), -s, c),
        );

        if !self.object.hit(&local, ray_t, rec, rng) {
            return false;
        }

        rec.ray = *ray;
        rec.normal = self.axis.rotate(rec.normal, s, c);
        true
    }

    fn bounding_box(&self) -> Option<Aabb> {
        self.bbox
    }

    fn set_material(&mut self, material: Arc<dyn Material>) {
        self.object.set_material(material);
    }

    fn collect_materials(&self, out: &mut Vec<Arc<dyn Material>>) {
        self.object.collect_materials(out);
    }

    fn is_infinite(&self) -> bool {
        self.object.is_infinite()
    }

    fn is_closed(&self) -> bool {
        self.object.is_closed()
    }

    fn box_clone(&self) -> Box<dyn Hittable> {
        Box::new(self.clone())
    }
}

/// The order in which three Euler angles are applied.
///
/// Six Tait-Bryan orders use three distinct axes, six proper Euler orders
/// repeat the first axis last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EulerOrder {
    Xyz,
    Xzy,
    Yxz,
    Yzx,
    Zxy,
    Zyx,
    Xyx,
    Xzx,
    Yxy,
    Yzy,
    Zxz,
    Zyz,
}

impl EulerOrder {
    pub const ALL: [EulerOrder; 12] = [
        EulerOrder::Xyz,
        EulerOrder::Xzy,
        EulerOrder::Yxz,
        EulerOrder::Yzx,
        EulerOrder::Zxy,
        EulerOrder::Zyx,
        EulerOrder::Xyx,
        EulerOrder::Xzx,
        EulerOrder::Yxy,
        EulerOrder::Yzy,
        EulerOrder::Zxz,
        EulerOrder::Zyz,
    ];

    /// The three axes, first applied first.
    pub fn axes(self) -> [Axis; 3] {
        use Axis::{X, Y, Z};
        match self {
            EulerOrder::Xyz => [X, Y, Z],
            EulerOrder::Xzy => [X, Z, Y],
            EulerOrder::Yxz => [Y, X, Z],
            EulerOrder::Yzx => [Y, Z, X],
            EulerOrder::Zxy => [Z, X, Y],
            EulerOrder::Zyx => [Z, Y, X],
            EulerOrder::Xyx => [X, Y, X],
            EulerOrder::Xzx => [X, Z, X],
            EulerOrder::Yxy => [Y, X, Y],
            EulerOrder::Yzy => [Y, Z, Y],
            EulerOrder::Zxz => [Z, X, Z],
            EulerOrder::Zyz => [Z, Y, Z],
        }
    }
}

impl fmt::Display for EulerOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for axis in self.axes() {
            let name = match axis {
                Axis::X => 'X',
                Axis::Y => 'Y',
                Axis::Z => 'Z',
            };
            write!(f, "{name}")?;
        }
        Ok(())
    }
}

impl FromStr for EulerOrder {
    type Err = SetupError;

    /// Parse an order such as `"XYZ"` or `"zxz"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        EulerOrder::ALL
            .into_iter()
            .find(|order| order.to_string() == wanted)
            .ok_or_else(|| SetupError::InvalidRotationOrder(s.to_string()))
    }
}

/// Rotates an object by three Euler angles composed into one quaternion.
#[derive(Clone)]
pub struct Quaternion {
    object: Box<dyn Hittable>,
    rotation: Quat,
    inverse: Quat,
    bbox: Option<Aabb>,
}

impl Quaternion {
    /// Rotate `object` by `degrees`, whose components are the angles about
    /// the first, second and third axis of `order`.
    pub fn new(object: impl Hittable + 'static, degrees: Vec3, order: EulerOrder) -> Self {
        Self::from_boxed(Box::new(object), degrees, order)
    }

    /// Like [`Quaternion::new`] with the order given as text, e.g. `"ZYX"`.
    pub fn from_order_str(object: impl Hittable + 'static, degrees: Vec3, order: &str) -> Result<Self, SetupError> {
        let order = order.parse()?;
        Ok(Self::new(object, degrees, order))
    }

    pub fn from_boxed(object: Box<dyn Hittable>, degrees: Vec3, order: EulerOrder) -> Self {
        let [a1, a2, a3] = order.axes();
        let rotation = Quat::from_axis_angle(a1.unit(), degrees.x.to_radians())
            * Quat::from_axis_angle(a2.unit(), degrees.y.to_radians())
            * Quat::from_axis_angle(a3.unit(), degrees.z.to_radians());
        let rotation = rotation.normalize();
        let inverse = rotation.inverse();

        let bbox = object
            .bounding_box()
            .map(|b| transform_aabb(&b, |p| rotation * p));

        Self {
            object,
            rotation,
            inverse,
            bbox,
        }
    }
}

impl Hittable for Quaternion {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        rng: &mut dyn RngCore,
    ) -> bool {
        let local = Ray::new(self.inverse * ray.origin(), self.inverse * ray.direction());
        if !self.object.hit(&local, ray_t, rec, rng) {
            return false;
        }

        rec.ray = *ray;
        rec.normal = self.rotation * rec.normal;
        true
    }

    fn bounding_box(&self) -> Option<Aabb> {
        self.bbox
    }

    fn set_material(&mut self, material: Arc<dyn Material>) {
        self.object.set_material(material);
    }

    fn collect_materials(&self, out: &mut Vec<Arc<dyn Material>>) {
        self.object.collect_materials(out);
    }

    fn is_infinite(&self) -> bool {
        self.object.is_infinite()
    }

    fn is_closed(&self) -> bool {
        self.object.is_closed()
    }

    fn box_clone(&self) -> Box<dyn Hittable> {
        Box::new(self.clone())
    }
}
