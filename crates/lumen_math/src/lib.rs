// Re-export the double precision glam types used throughout the renderer
pub use glam::{DMat3, DQuat, DVec2, DVec3};

/// Direction or displacement in 3D space.
pub type Vec3 = DVec3;
/// Position in 3D space. Point - Point yields a `Vec3`, Point + Vec3 a `Point3`.
pub type Point3 = DVec3;
/// Rotation quaternion.
pub type Quat = DQuat;

// Lumen math types
mod aabb;
mod interval;
mod ray;
mod transform;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;
pub use transform::{transform_aabb, Axis};
