use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::column::{ColumnMode, DataColumn};
use crate::core::coords::CartesianCoordinateSystem;
use crate::core::types::{LogicalLine, LogicalPoint, SceneLine, ScenePoint};
use crate::error::{PlotError, PlotResult};

/// Derived geometry of one retransform pass.
///
/// All four sequences are rebuilt wholesale on every pass; `scene_points`
/// and `visible` are one-to-one with `logical_points` by index.
/// `connected[i]` says whether point `i` joins point `i + 1`; the last
/// entry is unused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CurveGeometry {
    pub logical_points: Vec<LogicalPoint>,
    pub scene_points: Vec<ScenePoint>,
    pub visible: Vec<bool>,
    pub connected: Vec<bool>,
}

impl CurveGeometry {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.logical_points.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.logical_points.len()
    }

    /// Scene segments for consecutive connected point pairs, clipped to the
    /// plot extent. These are the curve's rendered line segments; the fill
    /// builder reuses them instead of re-deriving its own.
    #[must_use]
    pub fn scene_lines(&self, cs: &CartesianCoordinateSystem) -> Vec<SceneLine> {
        let mut logical_lines = Vec::new();
        for i in 0..self.logical_points.len().saturating_sub(1) {
            if self.connected.get(i).copied().unwrap_or(false) {
                logical_lines.push(LogicalLine::new(
                    self.logical_points[i],
                    self.logical_points[i + 1],
                ));
            }
        }
        cs.map_lines(&logical_lines)
    }
}

/// Rebuilds curve geometry from the two bound columns.
///
/// A row contributes a point only when both columns report it valid and
/// unmasked; an invalid or masked row instead marks the previously emitted
/// point as disconnected, so gaps break runs rather than being
/// interpolated across. Either column missing is the defined empty state,
/// not an error.
///
/// Non-numeric x/y bindings fail with `UnsupportedColumnMode`; the caller
/// (the curve engine) degrades to the empty state so the error never
/// reaches the presentation layer.
pub fn recompute(
    x_column: Option<&DataColumn>,
    y_column: Option<&DataColumn>,
    cs: &CartesianCoordinateSystem,
) -> PlotResult<CurveGeometry> {
    let (Some(x_column), Some(y_column)) = (x_column, y_column) else {
        return Ok(CurveGeometry::empty());
    };

    for column in [x_column, y_column] {
        if column.column_mode() != ColumnMode::Numeric {
            return Err(PlotError::UnsupportedColumnMode(column.column_mode()));
        }
    }

    let row_count = x_column.row_count().max(y_column.row_count());
    let mut logical_points = Vec::with_capacity(row_count);
    let mut connected = Vec::with_capacity(row_count);

    for row in 0..row_count {
        let usable = x_column.is_valid(row)
            && y_column.is_valid(row)
            && !x_column.is_masked(row)
            && !y_column.is_masked(row);
        if usable {
            logical_points.push(LogicalPoint::new(
                x_column.value_at(row),
                y_column.value_at(row),
            ));
            connected.push(true);
        } else if let Some(last) = connected.last_mut() {
            // Break the run at the previous point instead of dropping the
            // gap silently.
            *last = false;
        }
    }

    let mapped = cs.map_points(&logical_points);
    trace!(
        rows = row_count,
        points = logical_points.len(),
        visible = mapped.visible.iter().filter(|v| **v).count(),
        "recomputed curve geometry"
    );

    Ok(CurveGeometry {
        logical_points,
        scene_points: mapped.scene,
        visible: mapped.visible,
        connected,
    })
}
