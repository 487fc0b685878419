//! Shared machinery for primitives assembled from simpler parts.

use std::sync::Arc;

use crate::{
    hittable::{HitRecord, Hittable, PrimitiveList},
    Material, Ray,
};
use lumen_math::{Aabb, Interval};
use rand::RngCore;

/// A fixed list of parts behind a cached bounding box.
///
/// The box is tested first and the parts are scanned only when it is hit.
#[derive(Clone)]
pub(crate) struct Composite {
    parts: PrimitiveList,
    bbox: Aabb,
}

impl Composite {
    pub(crate) fn new(parts: PrimitiveList, bbox: Aabb) -> Self {
        Self { parts, bbox }
    }

    #[inline]
    pub(crate) fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        rng: &mut dyn RngCore,
    ) -> bool {
        if !self.bbox.hit(ray, ray_t) {
            return false;
        }
        self.parts.hit(ray, ray_t, rec, rng)
    }

    pub(crate) fn bbox(&self) -> Aabb {
        self.bbox
    }

    pub(crate) fn set_material(&mut self, material: Arc<dyn Material>) {
        self.parts.set_material(material);
    }

    pub(crate) fn collect_materials(&self, out: &mut Vec<Arc<dyn Material>>) {
        self.parts.collect_materials(out);
    }
}
