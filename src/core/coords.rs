use ordered_float::OrderedFloat;
use smallvec::SmallVec;

use crate::core::scale::Scale;
use crate::core::types::{LogicalLine, LogicalPoint, PlotExtent, SceneLine, ScenePoint};
use crate::error::{PlotError, PlotResult};

/// Result of a batch point mapping pass.
///
/// `scene` is one-to-one with the input by index; `visible[i]` is true when
/// the logical point falls within every scale's valid interval and the
/// plot's logical extent.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedPoints {
    pub scene: Vec<ScenePoint>,
    pub visible: Vec<bool>,
}

/// Maps logical (data-space) coordinates into scene (visual) coordinates.
///
/// Owns one or more monotonic scale segments per axis plus the plot's
/// logical extent. Values outside every segment extrapolate through the
/// nearest segment and are reported as invisible.
#[derive(Debug, Clone, PartialEq)]
pub struct CartesianCoordinateSystem {
    x_scales: SmallVec<[Scale; 2]>,
    y_scales: SmallVec<[Scale; 2]>,
    extent: PlotExtent,
}

impl CartesianCoordinateSystem {
    const EPSILON: f64 = 1e-9;

    pub fn new(
        extent: PlotExtent,
        x_scales: Vec<Scale>,
        y_scales: Vec<Scale>,
    ) -> PlotResult<Self> {
        if x_scales.is_empty() || y_scales.is_empty() {
            return Err(PlotError::InvalidData(
                "coordinate system needs at least one scale per axis".to_owned(),
            ));
        }
        Ok(Self {
            x_scales: SmallVec::from_vec(x_scales),
            y_scales: SmallVec::from_vec(y_scales),
            extent,
        })
    }

    /// Coordinate system whose scene coordinates equal the logical ones,
    /// with one scale segment per axis spanning the extent.
    pub fn identity(extent: PlotExtent) -> PlotResult<Self> {
        Self::new(
            extent,
            vec![Scale::identity(extent.x_min, extent.x_max)?],
            vec![Scale::identity(extent.y_min, extent.y_max)?],
        )
    }

    /// Linear mapping of the extent onto a scene rectangle of the given
    /// size, y flipped so that larger logical y draws higher on screen.
    pub fn linear(extent: PlotExtent, scene_width: f64, scene_height: f64) -> PlotResult<Self> {
        Self::new(
            extent,
            vec![Scale::new(extent.x_min, extent.x_max, 0.0, scene_width)?],
            vec![Scale::new(extent.y_min, extent.y_max, scene_height, 0.0)?],
        )
    }

    #[must_use]
    pub fn extent(&self) -> PlotExtent {
        self.extent
    }

    #[must_use]
    pub fn x_min(&self) -> f64 {
        self.extent.x_min
    }

    #[must_use]
    pub fn x_max(&self) -> f64 {
        self.extent.x_max
    }

    #[must_use]
    pub fn y_min(&self) -> f64 {
        self.extent.y_min
    }

    #[must_use]
    pub fn y_max(&self) -> f64 {
        self.extent.y_max
    }

    /// Epsilon-tolerant equality used for boundary snapping. Exact float
    /// comparison would miss endpoints that only coincide up to mapping
    /// rounding.
    #[must_use]
    pub fn essentially_equal(a: f64, b: f64) -> bool {
        let magnitude = a.abs().min(b.abs());
        let tolerance = if magnitude == 0.0 {
            Self::EPSILON
        } else {
            magnitude * Self::EPSILON
        };
        (a - b).abs() <= tolerance
    }

    /// Segment containing `value`, or the nearest one for extrapolation.
    fn nearest_scale(scales: &[Scale], value: f64) -> &Scale {
        scales
            .iter()
            .min_by_key(|scale| OrderedFloat(scale.distance_to(value)))
            .expect("constructor guarantees at least one scale per axis")
    }

    fn scale_containing(scales: &[Scale], value: f64) -> Option<&Scale> {
        scales.iter().find(|scale| scale.contains(value))
    }

    /// Maps one logical point. `None` when a coordinate lies outside every
    /// segment of its axis.
    #[must_use]
    pub fn map_point(&self, point: LogicalPoint) -> Option<ScenePoint> {
        let x_scale = Self::scale_containing(&self.x_scales, point.x)?;
        let y_scale = Self::scale_containing(&self.y_scales, point.y)?;
        Some(ScenePoint::new(x_scale.map(point.x), y_scale.map(point.y)))
    }

    /// Maps one scene point back into logical space.
    #[must_use]
    pub fn inverse_map_point(&self, point: ScenePoint) -> Option<LogicalPoint> {
        let x = self
            .x_scales
            .iter()
            .map(|scale| scale.inverse_map(point.x))
            .find(|logical| {
                self.x_scales.iter().any(|scale| scale.contains(*logical))
            })?;
        let y = self
            .y_scales
            .iter()
            .map(|scale| scale.inverse_map(point.y))
            .find(|logical| {
                self.y_scales.iter().any(|scale| scale.contains(*logical))
            })?;
        Some(LogicalPoint::new(x, y))
    }

    /// Batch point mapping: one scale lookup pass, 1:1 output with a
    /// visibility mask. Out-of-range points extrapolate but are invisible.
    #[must_use]
    pub fn map_points(&self, points: &[LogicalPoint]) -> MappedPoints {
        let mut scene = Vec::with_capacity(points.len());
        let mut visible = Vec::with_capacity(points.len());
        for point in points {
            let x_scale = Self::nearest_scale(&self.x_scales, point.x);
            let y_scale = Self::nearest_scale(&self.y_scales, point.y);
            scene.push(ScenePoint::new(x_scale.map(point.x), y_scale.map(point.y)));
            visible.push(
                x_scale.contains(point.x)
                    && y_scale.contains(point.y)
                    && self.extent.contains(*point),
            );
        }
        MappedPoints { scene, visible }
    }

    /// Batch line mapping: clips each segment to the plot's logical extent,
    /// drops fully-outside segments, and maps surviving endpoints. Endpoints
    /// of clipped segments land exactly on the mapped boundary, which the
    /// fill builder's boundary snapping relies on.
    #[must_use]
    pub fn map_lines(&self, lines: &[LogicalLine]) -> Vec<SceneLine> {
        let mut mapped = Vec::with_capacity(lines.len());
        for line in lines {
            let Some(clipped) = clip_to_extent(self.extent, *line) else {
                continue;
            };
            let p1 = ScenePoint::new(
                Self::nearest_scale(&self.x_scales, clipped.p1.x).map(clipped.p1.x),
                Self::nearest_scale(&self.y_scales, clipped.p1.y).map(clipped.p1.y),
            );
            let p2 = ScenePoint::new(
                Self::nearest_scale(&self.x_scales, clipped.p2.x).map(clipped.p2.x),
                Self::nearest_scale(&self.y_scales, clipped.p2.y).map(clipped.p2.y),
            );
            mapped.push(SceneLine::new(p1, p2));
        }
        mapped
    }
}

/// Liang-Barsky clipping of a logical segment against the extent rectangle.
fn clip_to_extent(extent: PlotExtent, line: LogicalLine) -> Option<LogicalLine> {
    let dx = line.p2.x - line.p1.x;
    let dy = line.p2.y - line.p1.y;
    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;

    let edges = [
        (-dx, line.p1.x - extent.x_min),
        (dx, extent.x_max - line.p1.x),
        (-dy, line.p1.y - extent.y_min),
        (dy, extent.y_max - line.p1.y),
    ];
    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                if r > t1 {
                    return None;
                }
                if r > t0 {
                    t0 = r;
                }
            } else {
                if r < t0 {
                    return None;
                }
                if r < t1 {
                    t1 = r;
                }
            }
        }
    }

    Some(LogicalLine::new(
        LogicalPoint::new(line.p1.x + t0 * dx, line.p1.y + t0 * dy),
        LogicalPoint::new(line.p1.x + t1 * dx, line.p1.y + t1 * dy),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity_system() -> CartesianCoordinateSystem {
        let extent = PlotExtent::new(0.0, 10.0, 0.0, 10.0).expect("extent");
        CartesianCoordinateSystem::identity(extent).expect("coordinate system")
    }

    #[test]
    fn identity_mapping_preserves_coordinates() {
        let cs = identity_system();
        let mapped = cs.map_points(&[LogicalPoint::new(3.0, 4.0)]);
        assert_eq!(mapped.scene, vec![ScenePoint::new(3.0, 4.0)]);
        assert_eq!(mapped.visible, vec![true]);
    }

    #[test]
    fn out_of_range_points_extrapolate_and_are_invisible() {
        let cs = identity_system();
        let mapped = cs.map_points(&[LogicalPoint::new(15.0, 5.0)]);
        assert_eq!(mapped.scene, vec![ScenePoint::new(15.0, 5.0)]);
        assert_eq!(mapped.visible, vec![false]);
    }

    #[test]
    fn single_point_mapping_rejects_out_of_segment_values() {
        let cs = identity_system();
        assert!(cs.map_point(LogicalPoint::new(11.0, 5.0)).is_none());
        assert_eq!(
            cs.map_point(LogicalPoint::new(2.0, 8.0)),
            Some(ScenePoint::new(2.0, 8.0))
        );
    }

    #[test]
    fn inverse_mapping_round_trips() {
        let extent = PlotExtent::new(0.0, 10.0, 0.0, 100.0).expect("extent");
        let cs = CartesianCoordinateSystem::linear(extent, 500.0, 400.0).expect("system");
        let scene = cs.map_point(LogicalPoint::new(5.0, 25.0)).expect("mapped");
        let logical = cs.inverse_map_point(scene).expect("inverse");
        assert!((logical.x - 5.0).abs() < 1e-9);
        assert!((logical.y - 25.0).abs() < 1e-9);
    }

    #[test]
    fn line_mapping_clips_to_extent() {
        let cs = identity_system();
        let lines = [
            LogicalLine::new(LogicalPoint::new(-5.0, 5.0), LogicalPoint::new(5.0, 5.0)),
            LogicalLine::new(LogicalPoint::new(20.0, 20.0), LogicalPoint::new(30.0, 30.0)),
        ];
        let mapped = cs.map_lines(&lines);
        assert_eq!(mapped.len(), 1);
        assert_eq!(mapped[0].p1, ScenePoint::new(0.0, 5.0));
        assert_eq!(mapped[0].p2, ScenePoint::new(5.0, 5.0));
    }

    #[test]
    fn essentially_equal_tolerates_rounding() {
        assert!(CartesianCoordinateSystem::essentially_equal(
            1.0,
            1.0 + 1e-12
        ));
        assert!(CartesianCoordinateSystem::essentially_equal(0.0, 0.0));
        assert!(!CartesianCoordinateSystem::essentially_equal(1.0, 1.001));
    }

    #[test]
    fn flipped_y_axis_maps_downward() {
        let extent = PlotExtent::new(0.0, 4.0, 0.0, 16.0).expect("extent");
        let cs = CartesianCoordinateSystem::linear(extent, 400.0, 160.0).expect("system");
        let mapped = cs.map_points(&[LogicalPoint::new(0.0, 0.0), LogicalPoint::new(4.0, 16.0)]);
        assert_eq!(mapped.scene[0], ScenePoint::new(0.0, 160.0));
        assert_eq!(mapped.scene[1], ScenePoint::new(400.0, 0.0));
    }
}
