use serde::{Deserialize, Serialize};

use crate::error::{PlotError, PlotResult};

/// Point in logical (data-space) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogicalPoint {
    pub x: f64,
    pub y: f64,
}

impl LogicalPoint {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Point in scene (visual/device) coordinates, produced by coordinate mapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenePoint {
    pub x: f64,
    pub y: f64,
}

impl ScenePoint {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Line segment in logical coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogicalLine {
    pub p1: LogicalPoint,
    pub p2: LogicalPoint,
}

impl LogicalLine {
    #[must_use]
    pub fn new(p1: LogicalPoint, p2: LogicalPoint) -> Self {
        Self { p1, p2 }
    }
}

/// Line segment in scene coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneLine {
    pub p1: ScenePoint,
    pub p2: ScenePoint,
}

impl SceneLine {
    #[must_use]
    pub fn new(p1: ScenePoint, p2: ScenePoint) -> Self {
        Self { p1, p2 }
    }
}

/// Logical extent of the plot's drawable area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotExtent {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl PlotExtent {
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> PlotResult<Self> {
        if !x_min.is_finite() || !x_max.is_finite() || !y_min.is_finite() || !y_max.is_finite() {
            return Err(PlotError::InvalidData(
                "plot extent bounds must be finite".to_owned(),
            ));
        }
        if x_min >= x_max || y_min >= y_max {
            return Err(PlotError::InvalidData(
                "plot extent must span a non-empty range on both axes".to_owned(),
            ));
        }
        Ok(Self {
            x_min,
            x_max,
            y_min,
            y_max,
        })
    }

    #[must_use]
    pub fn contains(self, point: LogicalPoint) -> bool {
        point.x >= self.x_min
            && point.x <= self.x_max
            && point.y >= self.y_min
            && point.y <= self.y_max
    }
}

/// Axis-aligned rectangle in scene coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct SceneRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl SceneRect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Tight bounding box of a point sequence. `None` for the empty sequence.
    #[must_use]
    pub fn bounding(points: &[ScenePoint]) -> Option<Self> {
        let first = points.first()?;
        let mut x_min = first.x;
        let mut x_max = first.x;
        let mut y_min = first.y;
        let mut y_max = first.y;
        for point in &points[1..] {
            x_min = x_min.min(point.x);
            x_max = x_max.max(point.x);
            y_min = y_min.min(point.y);
            y_max = y_max.max(point.y);
        }
        Some(Self::new(x_min, y_min, x_max - x_min, y_max - y_min))
    }

    /// Smallest rectangle containing both `self` and `other`.
    ///
    /// An empty rectangle does not grow the union, matching the behavior the
    /// shape recalculation relies on when some stages produced no geometry.
    #[must_use]
    pub fn united(self, other: Self) -> Self {
        if other.is_empty() {
            return self;
        }
        if self.is_empty() {
            return other;
        }
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = (self.x + self.width).max(other.x + other.width);
        let bottom = (self.y + self.height).max(other.y + other.height);
        Self::new(x, y, right - x, bottom - y)
    }
}

/// Ordered closed sequence of scene points forming one contiguous filled
/// region. A curve interrupted by gaps may produce several polygons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FillPolygon {
    pub vertices: Vec<ScenePoint>,
}

impl FillPolygon {
    #[must_use]
    pub fn new(vertices: Vec<ScenePoint>) -> Self {
        Self { vertices }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Closed means the first and last vertices coincide in scene
    /// coordinates.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        match (self.vertices.first(), self.vertices.last()) {
            (Some(first), Some(last)) => first == last,
            _ => false,
        }
    }

    #[must_use]
    pub fn bounding(&self) -> SceneRect {
        SceneRect::bounding(&self.vertices).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extent_rejects_degenerate_ranges() {
        assert!(PlotExtent::new(0.0, 0.0, 0.0, 1.0).is_err());
        assert!(PlotExtent::new(0.0, 1.0, f64::NAN, 1.0).is_err());
        assert!(PlotExtent::new(0.0, 4.0, 0.0, 16.0).is_ok());
    }

    #[test]
    fn rect_union_ignores_empty_sides() {
        let a = SceneRect::new(0.0, 0.0, 10.0, 10.0);
        let empty = SceneRect::default();
        assert_eq!(a.united(empty), a);
        assert_eq!(empty.united(a), a);

        let b = SceneRect::new(5.0, 5.0, 10.0, 10.0);
        let union = a.united(b);
        assert_eq!(union, SceneRect::new(0.0, 0.0, 15.0, 15.0));
    }

    #[test]
    fn bounding_covers_all_points() {
        let points = [
            ScenePoint::new(2.0, 3.0),
            ScenePoint::new(-1.0, 7.0),
            ScenePoint::new(4.0, 0.5),
        ];
        let rect = SceneRect::bounding(&points).expect("bounding rect");
        assert_eq!(rect, SceneRect::new(-1.0, 0.5, 5.0, 6.5));
        assert!(SceneRect::bounding(&[]).is_none());
    }

    #[test]
    fn polygon_closure_requires_matching_endpoints() {
        let open = FillPolygon::new(vec![ScenePoint::new(0.0, 0.0), ScenePoint::new(1.0, 1.0)]);
        assert!(!open.is_closed());

        let closed = FillPolygon::new(vec![
            ScenePoint::new(0.0, 0.0),
            ScenePoint::new(1.0, 1.0),
            ScenePoint::new(0.0, 0.0),
        ]);
        assert!(closed.is_closed());
        assert!(!FillPolygon::default().is_closed());
    }
}
