pub mod column;
pub mod coords;
pub mod kernel;
pub mod scale;
pub mod types;

pub use column::{ColumnId, ColumnMode, DataColumn};
pub use coords::{CartesianCoordinateSystem, MappedPoints};
pub use scale::Scale;
pub use types::{
    FillPolygon, LogicalLine, LogicalPoint, PlotExtent, SceneLine, ScenePoint, SceneRect,
};
