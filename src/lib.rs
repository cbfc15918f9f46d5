//! plotline: cartesian curve geometry and software rendering pipeline.
//!
//! This crate covers the mapping of logical data-space points into scene
//! coordinates, the derived visual geometry (value labels, boundary-clipped
//! fill polygons) and a rasterized render cache, recomputed synchronously
//! whenever the underlying data or style changes.

pub mod core;
pub mod curve;
pub mod error;
pub mod render;
pub mod telemetry;

pub use curve::{CurveEngine, Document};
pub use error::{PlotError, PlotResult};
