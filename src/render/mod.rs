pub mod bitmap;
pub mod cache;
pub mod primitives;

pub use bitmap::{Bitmap, FillPaint};
pub use cache::{RenderCache, Shape};
pub use primitives::{BrushStyle, Color, ColorStyle, FillKind, ImageStyle};

use crate::core::types::SceneRect;

/// Capability interface for anything the presentation layer can draw.
///
/// Replaces scene-graph inheritance: the curve engine implements this one
/// trait and nothing else about rendering leaks out of it.
pub trait Drawable {
    /// Outer bounds of everything this drawable paints.
    fn bounding_box(&self) -> SceneRect;

    /// Hit-test shape (filled regions plus label boxes).
    fn shape(&self) -> Shape;

    /// Blits the drawable's cached raster output onto `canvas`.
    fn paint(&self, canvas: &mut Bitmap);
}
