use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::column::{ColumnMode, DataColumn};
use crate::core::types::{LogicalPoint, SceneRect, ScenePoint};

/// What text each point's label carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ValuesMode {
    #[default]
    None,
    X,
    Y,
    XY,
    XYBracketed,
    CustomColumn,
}

/// Where a label sits relative to its point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ValuesPosition {
    #[default]
    Above,
    Under,
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    pub family: String,
    pub size: f64,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            family: "sans".to_owned(),
            size: 8.0,
        }
    }
}

/// Text measurement seam. Label placement only needs widths and the
/// ascent, so rasterizer-free callers (tests, headless layout) can plug in
/// a heuristic or null implementation.
pub trait FontMetrics: std::fmt::Debug {
    fn ascent(&self, font: &FontSpec) -> f64;
    fn text_width(&self, font: &FontSpec, text: &str) -> f64;
}

/// Average-advance approximation, good enough for layout without a font
/// stack.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicFontMetrics;

impl FontMetrics for HeuristicFontMetrics {
    fn ascent(&self, font: &FontSpec) -> f64 {
        font.size * 0.8
    }

    fn text_width(&self, font: &FontSpec, text: &str) -> f64 {
        font.size * 0.6 * text.chars().count() as f64
    }
}

/// Zero-extent metrics. Layout still runs with every label box collapsed
/// to its anchor, the degraded mode for environments without any text
/// measurement at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullFontMetrics;

impl FontMetrics for NullFontMetrics {
    fn ascent(&self, _font: &FontSpec) -> f64 {
        0.0
    }

    fn text_width(&self, _font: &FontSpec, _text: &str) -> f64 {
        0.0
    }
}

/// One laid-out label: text plus the scene anchor of its top-left-ish
/// reference point. Rotation is carried for the painter, not applied to
/// the anchor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueLabel {
    pub text: String,
    pub anchor: ScenePoint,
    pub rotation: f64,
}

impl ValueLabel {
    /// Axis-aligned box the rasterizer fills for this label: the glyph box
    /// rotated by the negative of `rotation` (degrees, counterclockwise)
    /// around the anchor, then covered by its axis-aligned bounds. The
    /// raster fill stays axis-aligned, so rotated labels are approximated
    /// by this cover.
    #[must_use]
    pub fn bounding(&self, font: &FontSpec, metrics: &dyn FontMetrics) -> SceneRect {
        let width = metrics.text_width(font, &self.text);
        let ascent = metrics.ascent(font);
        let (sin, cos) = (-self.rotation).to_radians().sin_cos();

        let mut x_min = f64::INFINITY;
        let mut x_max = f64::NEG_INFINITY;
        let mut y_min = f64::INFINITY;
        let mut y_max = f64::NEG_INFINITY;
        for (dx, dy) in [(0.0, 0.0), (width, 0.0), (width, -ascent), (0.0, -ascent)] {
            let rx = dx * cos - dy * sin;
            let ry = dx * sin + dy * cos;
            x_min = x_min.min(rx);
            x_max = x_max.max(rx);
            y_min = y_min.min(ry);
            y_max = y_max.max(ry);
        }

        SceneRect::new(
            self.anchor.x + x_min,
            self.anchor.y + y_min,
            x_max - x_min,
            y_max - y_min,
        )
    }
}

#[derive(Debug, Clone)]
pub struct ValueLayoutParams<'a> {
    pub mode: ValuesMode,
    pub position: ValuesPosition,
    pub distance: f64,
    pub rotation: f64,
    pub prefix: &'a str,
    pub suffix: &'a str,
    pub font: &'a FontSpec,
    pub values_column: Option<&'a DataColumn>,
}

const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

fn format_number(value: f64) -> String {
    format!("{value}")
}

fn custom_column_text(column: &DataColumn, row: usize) -> Option<String> {
    match column.column_mode() {
        ColumnMode::Numeric => Some(format_number(column.value_at(row))),
        ColumnMode::Text => column.text_at(row).map(str::to_owned),
        ColumnMode::DateTime => column
            .datetime_at(row)
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string()),
        ColumnMode::Month => {
            let month = column.value_at(row);
            let index = month.round() as i64 - 1;
            MONTH_NAMES.get(usize::try_from(index).ok()?).map(|name| (*name).to_owned())
        }
        ColumnMode::Day => {
            let day = column.value_at(row);
            let index = day.round() as i64 - 1;
            DAY_NAMES.get(usize::try_from(index).ok()?).map(|name| (*name).to_owned())
        }
    }
}

fn label_text(point: LogicalPoint, mode: ValuesMode) -> String {
    match mode {
        ValuesMode::None | ValuesMode::CustomColumn => String::new(),
        ValuesMode::X => format_number(point.x),
        ValuesMode::Y => format_number(point.y),
        ValuesMode::XY => format!("{},{}", format_number(point.x), format_number(point.y)),
        ValuesMode::XYBracketed => {
            format!("({},{})", format_number(point.x), format_number(point.y))
        }
    }
}

/// Lays out one label per visible point.
///
/// Every label is paired with its own point's scene coordinates; points
/// skipped for invisibility never shift a later label onto the wrong
/// point. In custom-column mode, rows past the column's length and the
/// column's invalid or masked rows produce no label.
#[must_use]
pub fn layout(
    logical_points: &[LogicalPoint],
    scene_points: &[ScenePoint],
    visible: &[bool],
    params: &ValueLayoutParams<'_>,
    metrics: &dyn FontMetrics,
) -> Vec<ValueLabel> {
    if params.mode == ValuesMode::None {
        return Vec::new();
    }

    let mut labels = Vec::new();
    for (i, point) in logical_points.iter().enumerate() {
        if !visible.get(i).copied().unwrap_or(false) {
            continue;
        }

        let body = match params.mode {
            ValuesMode::CustomColumn => {
                let Some(column) = params.values_column else {
                    break;
                };
                if i >= column.row_count() {
                    break;
                }
                if !column.is_valid(i) || column.is_masked(i) {
                    continue;
                }
                match custom_column_text(column, i) {
                    Some(text) => text,
                    None => continue,
                }
            }
            mode => label_text(*point, mode),
        };

        let text = format!("{}{}{}", params.prefix, body, params.suffix);
        let width = metrics.text_width(params.font, &text);
        let height = metrics.ascent(params.font);
        let scene = scene_points[i];

        let anchor = match params.position {
            ValuesPosition::Above => {
                ScenePoint::new(scene.x - width / 2.0, scene.y - params.distance)
            }
            ValuesPosition::Under => ScenePoint::new(
                scene.x - width / 2.0,
                scene.y + params.distance + height / 2.0,
            ),
            ValuesPosition::Left => {
                ScenePoint::new(scene.x - params.distance - width - 1.0, scene.y)
            }
            ValuesPosition::Right => ScenePoint::new(scene.x + params.distance - 1.0, scene.y),
        };

        labels.push(ValueLabel {
            text,
            anchor,
            rotation: params.rotation,
        });
    }

    trace!(labels = labels.len(), mode = ?params.mode, "laid out value labels");
    labels
}
