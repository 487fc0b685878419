//! Lumen Core - types shared between the render engine and its collaborators.
//!
//! This crate provides:
//!
//! - **Render parameters**: `RenderParameters`, loadable from JSON
//! - **Render status**: `RenderStatus` and the `RenderHandle` used to poll
//!   progress and request cancellation between rounds
//! - **Rasters**: decoded images backing image textures, with a path-keyed cache
//!
//! # Example
//!
//! ```ignore
//! use lumen_core::{RenderHandle, RenderParameters};
//!
//! let params = RenderParameters::from_json_file("render.json")?;
//! let handle = RenderHandle::new();
//! // ... hand both to the renderer, call handle.request_stop() to cancel
//! ```

pub mod params;
pub mod status;
pub mod texture;

// Re-export commonly used types
pub use params::{ParameterError, RenderParameters};
pub use status::{RenderHandle, RenderStatus};
pub use texture::{Raster, RasterCache, RasterError};
