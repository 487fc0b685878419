//! Error types for scene assembly and rendering.
//!
//! Only construction and render setup can fail. Misses, absorbed rays and
//! total internal reflection are ordinary outcomes on the trace path.

use lumen_core::ParameterError;
use thiserror::Error;

/// Invalid geometry or material configuration, reported at construction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SetupError {
    #[error("Degenerate triangle: vertices are coincident or collinear")]
    DegenerateTriangle,

    #[error("Zero-length axis: both end points are {0}")]
    ZeroLengthAxis(String),

    #[error("Radius must be positive, got {0}")]
    NonPositiveRadius(f64),

    #[error("Inner radius {inner} must be smaller than outer radius {outer}")]
    InvalidRadii { inner: f64, outer: f64 },

    #[error("Density must be positive, got {0}")]
    NonPositiveDensity(f64),

    #[error("Height must be positive, got {0}")]
    NonPositiveHeight(f64),

    #[error("Normal vector must be non-zero")]
    ZeroNormal,

    #[error("Rectangle corners {a} and {b} must share exactly one coordinate")]
    InvalidRectangle { a: String, b: String },

    #[error("Box corners {a} and {b} collapse a dimension")]
    DegenerateBox { a: String, b: String },

    #[error("Participating volume boundary must be a closed primitive")]
    OpenBoundary,

    #[error("Invalid rotation order '{0}', expected one of XYZ, XZY, YXZ, YZX, ZXY, ZYX, XYX, XZX, YXY, YZY, ZXZ, ZYZ")]
    InvalidRotationOrder(String),

    #[error("Refractive index must be positive, got {0}")]
    InvalidRefractiveIndex(f64),

    #[error("Invalid camera: {0}")]
    InvalidCamera(String),
}

/// Failure to build a bounding volume hierarchy.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BvhError {
    #[error("Cannot build a BVH over an empty primitive list")]
    EmptyList,

    #[error("Primitive {index} has no bounding box (infinite primitives cannot be placed in a BVH)")]
    MissingBoundingBox { index: usize },
}

/// Failure that aborts a render before or between rounds.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Parameters(#[from] ParameterError),

    #[error("Camera setup failed: {0}")]
    Camera(#[from] SetupError),

    #[error("BVH construction failed: {0}")]
    Bvh(#[from] BvhError),

    #[error("Scene contains no primitives")]
    EmptyScene,
}
