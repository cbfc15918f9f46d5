use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::coords::CartesianCoordinateSystem;
use crate::core::types::{FillPolygon, LogicalLine, LogicalPoint, SceneLine, ScenePoint};

/// Which plot boundary the fill region closes against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FillAnchor {
    Above,
    Below,
    ZeroBaseline,
    Left,
    Right,
}

/// Whether the closing strip runs along a horizontal boundary (a shared y)
/// or a vertical one (a shared x).
fn is_horizontal(anchor: FillAnchor) -> bool {
    matches!(
        anchor,
        FillAnchor::Above | FillAnchor::Below | FillAnchor::ZeroBaseline
    )
}

fn push_dedup(vertices: &mut Vec<ScenePoint>, point: ScenePoint) {
    if vertices.last() != Some(&point) {
        vertices.push(point);
    }
}

fn close(vertices: &mut Vec<ScenePoint>) {
    if let (Some(first), Some(last)) = (vertices.first().copied(), vertices.last().copied()) {
        if first != last {
            vertices.push(first);
        }
    }
}

/// Builds the closed scene-space polygons between the curve and the
/// anchored plot boundary.
///
/// When the curve's rendered segments are already available they are
/// reused as-is; otherwise segments are synthesized from consecutive
/// connected logical points and clipped to the plot extent. The first and
/// last fill endpoints are snapped onto the boundary when clipping put
/// them there, using the anchored point's x (or y for side anchors)
/// clamped into the plot range. Discontinuities between consecutive
/// segments are bridged into one region unless `split_on_gaps` asks for
/// one sealed polygon per run.
#[must_use]
pub fn build_fill(
    logical_points: &[LogicalPoint],
    connected: &[bool],
    scene_lines: &[SceneLine],
    cs: &CartesianCoordinateSystem,
    anchor: FillAnchor,
    split_on_gaps: bool,
) -> Vec<FillPolygon> {
    if logical_points.is_empty() {
        return Vec::new();
    }

    let fill_lines = if scene_lines.is_empty() {
        let mut logical_lines = Vec::new();
        for i in 0..logical_points.len().saturating_sub(1) {
            if connected.get(i).copied().unwrap_or(false) {
                logical_lines.push(LogicalLine::new(logical_points[i], logical_points[i + 1]));
            }
        }
        if logical_lines.is_empty() {
            // No drawable pair; fall back to degenerate per-point segments
            // so isolated points still close against the boundary.
            logical_lines = logical_points
                .iter()
                .map(|p| LogicalLine::new(*p, *p))
                .collect();
        }
        cs.map_lines(&logical_lines)
    } else {
        scene_lines.to_vec()
    };

    let Some(first_line) = fill_lines.first() else {
        return Vec::new();
    };
    let mut start = first_line.p1;
    let mut end = fill_lines[fill_lines.len() - 1].p2;

    let first = logical_points[0];
    let last = logical_points[logical_points.len() - 1];
    let extent = cs.extent();
    let (x_min, x_max) = (extent.x_min, extent.x_max);
    let (y_min, y_max) = (extent.y_min, extent.y_max);

    // The boundary coordinate the closing strip runs along: a scene y for
    // horizontal anchors, a scene x for the side ones.
    let closing;

    match anchor {
        FillAnchor::Above => {
            let Some(edge) = cs.map_point(LogicalPoint::new(x_min, y_min)) else {
                return Vec::new();
            };
            if CartesianCoordinateSystem::essentially_equal(start.y, edge.y) {
                let snap_x = first.x.clamp(x_min, x_max);
                if let Some(p) = cs.map_point(LogicalPoint::new(snap_x, y_min)) {
                    start = p;
                }
            }
            if CartesianCoordinateSystem::essentially_equal(end.y, edge.y) {
                let snap_x = last.x.clamp(x_min, x_max);
                if let Some(p) = cs.map_point(LogicalPoint::new(snap_x, y_min)) {
                    end = p;
                }
            }
            let Some(top) = cs.map_point(LogicalPoint::new(x_min, y_max)) else {
                return Vec::new();
            };
            closing = top.y;
        }
        FillAnchor::Below => {
            let Some(edge) = cs.map_point(LogicalPoint::new(x_min, y_max)) else {
                return Vec::new();
            };
            if CartesianCoordinateSystem::essentially_equal(start.y, edge.y) {
                let snap_x = first.x.clamp(x_min, x_max);
                if let Some(p) = cs.map_point(LogicalPoint::new(snap_x, y_max)) {
                    start = p;
                }
            }
            if CartesianCoordinateSystem::essentially_equal(end.y, edge.y) {
                let snap_x = last.x.clamp(x_min, x_max);
                if let Some(p) = cs.map_point(LogicalPoint::new(snap_x, y_max)) {
                    end = p;
                }
            }
            let Some(bottom) = cs.map_point(LogicalPoint::new(x_min, y_min)) else {
                return Vec::new();
            };
            closing = bottom.y;
        }
        FillAnchor::ZeroBaseline => {
            let Some(edge) = cs.map_point(LogicalPoint::new(x_min, y_max)) else {
                return Vec::new();
            };
            let snap_y = if y_max > 0.0 { y_max } else { y_min };
            if CartesianCoordinateSystem::essentially_equal(start.y, edge.y) {
                let snap_x = first.x.clamp(x_min, x_max);
                if let Some(p) = cs.map_point(LogicalPoint::new(snap_x, snap_y)) {
                    start = p;
                }
            }
            if CartesianCoordinateSystem::essentially_equal(end.y, edge.y) {
                let snap_x = last.x.clamp(x_min, x_max);
                if let Some(p) = cs.map_point(LogicalPoint::new(snap_x, snap_y)) {
                    end = p;
                }
            }
            // The zero baseline itself may lie outside the range; clamp it
            // to the nearer boundary so the region stays inside the plot.
            let baseline = if y_min > 0.0 {
                y_min
            } else if y_max < 0.0 {
                y_max
            } else {
                0.0
            };
            let Some(base) = cs.map_point(LogicalPoint::new(x_min, baseline)) else {
                return Vec::new();
            };
            closing = base.y;
        }
        FillAnchor::Left => {
            let Some(edge) = cs.map_point(LogicalPoint::new(x_max, y_min)) else {
                return Vec::new();
            };
            if CartesianCoordinateSystem::essentially_equal(start.x, edge.x) {
                let snap_y = first.y.clamp(y_min, y_max);
                if let Some(p) = cs.map_point(LogicalPoint::new(x_max, snap_y)) {
                    start = p;
                }
            }
            if CartesianCoordinateSystem::essentially_equal(end.x, edge.x) {
                let snap_y = last.y.clamp(y_min, y_max);
                if let Some(p) = cs.map_point(LogicalPoint::new(x_max, snap_y)) {
                    end = p;
                }
            }
            let Some(left) = cs.map_point(LogicalPoint::new(x_min, y_min)) else {
                return Vec::new();
            };
            closing = left.x;
        }
        FillAnchor::Right => {
            let Some(edge) = cs.map_point(LogicalPoint::new(x_min, y_min)) else {
                return Vec::new();
            };
            if CartesianCoordinateSystem::essentially_equal(start.x, edge.x) {
                let snap_y = first.y.clamp(y_min, y_max);
                if let Some(p) = cs.map_point(LogicalPoint::new(x_min, snap_y)) {
                    start = p;
                }
            }
            if CartesianCoordinateSystem::essentially_equal(end.x, edge.x) {
                let snap_y = last.y.clamp(y_min, y_max);
                if let Some(p) = cs.map_point(LogicalPoint::new(x_min, snap_y)) {
                    end = p;
                }
            }
            let Some(right) = cs.map_point(LogicalPoint::new(x_max, y_min)) else {
                return Vec::new();
            };
            closing = right.x;
        }
    }

    let horizontal = is_horizontal(anchor);
    let mut polygons = Vec::new();
    let mut vertices: Vec<ScenePoint> = Vec::new();
    let mut run_start = start;

    if start != fill_lines[0].p1 {
        vertices.push(start);
    }

    for (i, line) in fill_lines.iter().enumerate() {
        if i != 0 && line.p1 != fill_lines[i - 1].p2 && split_on_gaps {
            // Seal the finished run against the boundary before starting
            // the next one.
            let prev = fill_lines[i - 1].p2;
            if horizontal {
                push_dedup(&mut vertices, ScenePoint::new(prev.x, closing));
                push_dedup(&mut vertices, ScenePoint::new(run_start.x, closing));
            } else {
                push_dedup(&mut vertices, ScenePoint::new(closing, prev.y));
                push_dedup(&mut vertices, ScenePoint::new(closing, run_start.y));
            }
            close(&mut vertices);
            polygons.push(FillPolygon::new(std::mem::take(&mut vertices)));
            run_start = line.p1;
        }
        push_dedup(&mut vertices, line.p1);
        push_dedup(&mut vertices, line.p2);
    }

    push_dedup(&mut vertices, end);
    if horizontal {
        push_dedup(&mut vertices, ScenePoint::new(end.x, closing));
        push_dedup(&mut vertices, ScenePoint::new(run_start.x, closing));
    } else {
        push_dedup(&mut vertices, ScenePoint::new(closing, end.y));
        push_dedup(&mut vertices, ScenePoint::new(closing, run_start.y));
    }
    close(&mut vertices);
    polygons.push(FillPolygon::new(vertices));

    trace!(
        polygons = polygons.len(),
        anchor = ?anchor,
        split_on_gaps,
        "built fill regions"
    );
    polygons
}
