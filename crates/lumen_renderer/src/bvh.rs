//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Uses a binary tree structure for efficient ray-scene intersection testing.
//! Every leaf holds exactly one primitive.

use std::sync::Arc;

use crate::error::BvhError;
use crate::hittable::{HitRecord, Hittable, PrimitiveList};
use crate::{Material, Ray};
use lumen_math::{Aabb, Interval};
use rand::RngCore;

/// BVH node - either a branch with two children or a leaf with one primitive.
///
/// Built once and read-only afterwards, so it can be shared across render threads.
#[derive(Clone)]
pub enum BvhNode {
    /// Internal node with two children.
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
    /// Leaf node holding a single primitive.
    Leaf {
        object: Box<dyn Hittable>,
        bbox: Aabb,
    },
}

impl BvhNode {
    /// Create a BVH from a list of bounded hittable objects.
    ///
    /// Fails on an empty list, or when any object has no bounding box.
    pub fn new(list: PrimitiveList) -> Result<Self, BvhError> {
        if list.is_empty() {
            return Err(BvhError::EmptyList);
        }
        if let Some(index) = list.iter().position(|o| o.bounding_box().is_none()) {
            return Err(BvhError::MissingBoundingBox { index });
        }

        let count = list.len();
        let root = Self::build(list);
        log::debug!(
            "BVH built over {} primitives: {} leaves, depth {}",
            count,
            root.leaf_count(),
            root.depth()
        );
        Ok(root)
    }

    /// Recursive BVH construction.
    ///
    /// The split axis is the one along which the first and last objects'
    /// minimum corners are furthest apart. Objects are sorted along it and
    /// the list is halved.
    fn build(mut list: PrimitiveList) -> Self {
        let axis = Self::split_axis(&list);
        list.sort_by_axis(axis);

        let list = match <[Box<dyn Hittable>; 1]>::try_from(list.into_objects()) {
            Ok([object]) => {
                let bbox = bounds(object.as_ref());
                return BvhNode::Leaf { object, bbox };
            }
            Err(objects) => PrimitiveList::from_objects(objects),
        };

        let (left, right) = list.split_half();
        let left = Self::build(left);
        let right = Self::build(right);
        let bbox = Aabb::surrounding(&left.bbox(), &right.bbox());

        BvhNode::Branch {
            left: Box::new(left),
            right: Box::new(right),
            bbox,
        }
    }

    fn split_axis(list: &PrimitiveList) -> usize {
        let (Some(first), Some(last)) = (list.iter().next(), list.iter().last()) else {
            return 0;
        };

        let spread = (bounds(last).min() - bounds(first).min()).abs();
        if spread.x >= spread.y && spread.x >= spread.z {
            0
        } else if spread.y >= spread.z {
            1
        } else {
            2
        }
    }

    /// Cached bounding box of this node.
    pub fn bbox(&self) -> Aabb {
        match self {
            BvhNode::Leaf { bbox, .. } | BvhNode::Branch { bbox, .. } => *bbox,
        }
    }

    /// Number of leaves, one per primitive.
    pub fn leaf_count(&self) -> usize {
        match self {
            BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }

    /// Length of the longest root-to-leaf path, counting nodes.
    pub fn depth(&self) -> usize {
        match self {
            BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

/// Bounding box of an object already checked to have one.
fn bounds(object: &dyn Hittable) -> Aabb {
    object.bounding_box().unwrap_or(Aabb::EMPTY)
}

impl Hittable for BvhNode {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        rng: &mut dyn RngCore,
    ) -> bool {
        match self {
            BvhNode::Leaf { object, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return false;
                }
                object.hit(ray, ray_t, rec, rng)
            }

            BvhNode::Branch { left, right, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return false;
                }

                let hit_left = left.hit(ray, ray_t, rec, rng);

                // Only check right up to closest hit, so the nearer of the two wins
                let right_t = if hit_left { ray_t.with_max(rec.t) } else { ray_t };
                let hit_right = right.hit(ray, right_t, rec, rng);

                hit_left || hit_right
            }
        }
    }

    fn bounding_box(&self) -> Option<Aabb> {
        Some(self.bbox())
    }

    fn set_material(&mut self, material: Arc<dyn Material>) {
        match self {
            BvhNode::Leaf { object, .. } => object.set_material(material),
            BvhNode::Branch { left, right, .. } => {
                left.set_material(material.clone());
                right.set_material(material);
            }
        }
    }

    fn collect_materials(&self, out: &mut Vec<Arc<dyn Material>>) {
        match self {
            BvhNode::Leaf { object, .. } => object.collect_materials(out),
            BvhNode::Branch { left, right, .. } => {
                left.collect_materials(out);
                right.collect_materials(out);
            }
        }
    }

    fn box_clone(&self) -> Box<dyn Hittable> {
        Box::new(self.clone())
    }
}
