//! Lumen Renderer - CPU Path Tracing
//!
//! A Monte Carlo path tracer for physically-based rendering.
//!
//! Scenes are built from primitives (spheres, planes, disks, triangles,
//! rectangles, cylinders, boxes, pyramids and participating volumes), wrapped
//! in translations or rotations as needed, and collected in a
//! [`PrimitiveList`]. The [`Renderer`] puts bounded primitives in a BVH, splits
//! the image into tiles and accumulates rounds of samples, reporting progress
//! through a [`lumen_core::RenderHandle`].

mod bucket;
mod bvh;
mod camera;
mod composite;
mod cuboid;
mod cylinder;
mod disk;
mod error;
mod hittable;
mod material;
mod plane;
mod pyramid;
mod rectangle;
mod renderer;
pub mod sampling;
mod sphere;
mod texture;
mod transform;
mod triangle;
mod volume;

pub use bucket::{bucket_seed, generate_buckets, render_bucket, Bucket, BucketResult};
pub use bvh::BvhNode;
pub use camera::Camera;
pub use cuboid::Cuboid;
pub use cylinder::{Cylinder, HollowCylinder, InfiniteCylinder, UncappedCylinder};
pub use disk::{Disk, HollowDisk};
pub use error::{BvhError, RenderError, SetupError};
pub use hittable::{HitRecord, Hittable, PrimitiveList};
pub use material::{Color, Dielectric, Isotropic, Lambertian, Material, Metal};
pub use plane::Plane;
pub use pyramid::Pyramid;
pub use rectangle::Rectangle;
pub use renderer::{
    build_world, color_to_rgb, linear_to_gamma, ray_color, render, truncate, Accumulator,
    ImageBuffer, Renderer, TraceSettings,
};
pub use sphere::Sphere;
pub use texture::{ColorTexture, ImageTexture, Texture};
pub use transform::{EulerOrder, Quaternion, Rotation, Translation};
pub use triangle::Triangle;
pub use volume::ParticipatingVolume;

/// Re-export the math types used throughout the public API
pub use lumen_math::{Aabb, Axis, Interval, Point3, Ray, Vec3};
