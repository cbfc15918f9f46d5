pub mod commands;
pub mod document;
pub mod engine;
pub mod fill;
pub mod geometry;
pub mod style;
pub mod values;

pub use commands::{CurveCommand, PropertyCommand};
pub use document::{Document, nice_range};
pub use engine::CurveEngine;
pub use fill::{FillAnchor, build_fill};
pub use geometry::CurveGeometry;
pub use style::{CurveStyle, FillStyle, ValuesStyle};
pub use values::{
    FontMetrics, FontSpec, HeuristicFontMetrics, NullFontMetrics, ValueLabel, ValuesMode,
    ValuesPosition,
};
