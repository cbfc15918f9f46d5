use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::curve::fill::FillAnchor;
use crate::curve::values::{FontSpec, ValuesMode, ValuesPosition};
use crate::error::{PlotError, PlotResult};
use crate::render::primitives::{BrushStyle, Color, ColorStyle, FillKind, ImageStyle};

/// Schema version for the persisted curve style contract.
pub const CURVE_STYLE_JSON_SCHEMA: u32 = 1;

/// Everything the value label layer needs besides the points.
#[derive(Debug, Clone, PartialEq)]
pub struct ValuesStyle {
    pub mode: ValuesMode,
    pub position: ValuesPosition,
    pub distance: f64,
    pub rotation: f64,
    pub opacity: f64,
    pub prefix: String,
    pub suffix: String,
    pub font: FontSpec,
    pub color: Color,
}

impl Default for ValuesStyle {
    fn default() -> Self {
        Self {
            mode: ValuesMode::None,
            position: ValuesPosition::Above,
            distance: 5.0,
            rotation: 0.0,
            opacity: 1.0,
            prefix: String::new(),
            suffix: String::new(),
            font: FontSpec::default(),
            color: Color::BLACK,
        }
    }
}

/// Fill appearance and region construction knobs. `anchor: None` disables
/// filling entirely.
#[derive(Debug, Clone, PartialEq)]
pub struct FillStyle {
    pub anchor: Option<FillAnchor>,
    pub kind: FillKind,
    pub color_style: ColorStyle,
    pub image_style: ImageStyle,
    pub brush_style: BrushStyle,
    pub first_color: Color,
    pub second_color: Color,
    pub file_name: String,
    pub opacity: f64,
    pub split_on_gaps: bool,
}

impl Default for FillStyle {
    fn default() -> Self {
        Self {
            anchor: Some(FillAnchor::ZeroBaseline),
            kind: FillKind::Color,
            color_style: ColorStyle::SingleColor,
            image_style: ImageStyle::Scaled,
            brush_style: BrushStyle::Solid,
            first_color: Color::rgb(0.816, 0.878, 0.890),
            second_color: Color::BLACK,
            file_name: String::new(),
            opacity: 1.0,
            split_on_gaps: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CurveStyle {
    pub values: ValuesStyle,
    pub filling: FillStyle,
}

// Persisted form. Every attribute is optional so that a document written
// by an older or foreign producer still loads: each missing attribute is
// logged and replaced by its default rather than failing the whole load.

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
struct ValuesStyleRaw {
    mode: Option<ValuesMode>,
    position: Option<ValuesPosition>,
    distance: Option<f64>,
    rotation: Option<f64>,
    opacity: Option<f64>,
    prefix: Option<String>,
    suffix: Option<String>,
    font: Option<FontSpec>,
    color: Option<(u8, u8, u8)>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
struct FillStyleRaw {
    enabled: Option<bool>,
    anchor: Option<FillAnchor>,
    kind: Option<FillKind>,
    color_style: Option<ColorStyle>,
    image_style: Option<ImageStyle>,
    brush_style: Option<BrushStyle>,
    first_color: Option<(u8, u8, u8)>,
    second_color: Option<(u8, u8, u8)>,
    file_name: Option<String>,
    opacity: Option<f64>,
    split_on_gaps: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
struct CurveStyleRaw {
    values: ValuesStyleRaw,
    filling: FillStyleRaw,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CurveStyleDocument {
    schema_version: u32,
    style: CurveStyleRaw,
}

fn resolve<T>(value: Option<T>, attribute: &str, default: T) -> T {
    match value {
        Some(v) => v,
        None => {
            warn!(attribute, "missing or empty attribute, default value is used");
            default
        }
    }
}

impl CurveStyle {
    /// Serializes the style as a versioned JSON document.
    pub fn to_json(&self) -> PlotResult<String> {
        let raw = CurveStyleRaw {
            values: ValuesStyleRaw {
                mode: Some(self.values.mode),
                position: Some(self.values.position),
                distance: Some(self.values.distance),
                rotation: Some(self.values.rotation),
                opacity: Some(self.values.opacity),
                prefix: Some(self.values.prefix.clone()),
                suffix: Some(self.values.suffix.clone()),
                font: Some(self.values.font.clone()),
                color: Some(self.values.color.to_channels()),
            },
            filling: FillStyleRaw {
                enabled: Some(self.filling.anchor.is_some()),
                anchor: self.filling.anchor,
                kind: Some(self.filling.kind),
                color_style: Some(self.filling.color_style),
                image_style: Some(self.filling.image_style),
                brush_style: Some(self.filling.brush_style),
                first_color: Some(self.filling.first_color.to_channels()),
                second_color: Some(self.filling.second_color.to_channels()),
                file_name: Some(self.filling.file_name.clone()),
                opacity: Some(self.filling.opacity),
                split_on_gaps: Some(self.filling.split_on_gaps),
            },
        };
        let document = CurveStyleDocument {
            schema_version: CURVE_STYLE_JSON_SCHEMA,
            style: raw,
        };
        serde_json::to_string_pretty(&document)
            .map_err(|e| PlotError::InvalidData(format!("style serialization failed: {e}")))
    }

    /// Loads a style from a versioned JSON document, logging and
    /// defaulting every missing attribute instead of rejecting the
    /// document.
    pub fn from_json(input: &str) -> PlotResult<Self> {
        let document: CurveStyleDocument = serde_json::from_str(input).map_err(|e| {
            PlotError::MalformedAttribute {
                attribute: "style document".to_owned(),
                reason: e.to_string(),
            }
        })?;
        if document.schema_version != CURVE_STYLE_JSON_SCHEMA {
            return Err(PlotError::MalformedAttribute {
                attribute: "schema_version".to_owned(),
                reason: format!(
                    "unsupported version {}, expected {}",
                    document.schema_version, CURVE_STYLE_JSON_SCHEMA
                ),
            });
        }

        let defaults = CurveStyle::default();
        let raw = document.style;

        let values = ValuesStyle {
            mode: resolve(raw.values.mode, "values.mode", defaults.values.mode),
            position: resolve(
                raw.values.position,
                "values.position",
                defaults.values.position,
            ),
            distance: resolve(
                raw.values.distance,
                "values.distance",
                defaults.values.distance,
            ),
            rotation: resolve(
                raw.values.rotation,
                "values.rotation",
                defaults.values.rotation,
            ),
            opacity: resolve(raw.values.opacity, "values.opacity", defaults.values.opacity),
            // Prefix and suffix are legitimately empty; no warning.
            prefix: raw.values.prefix.unwrap_or_default(),
            suffix: raw.values.suffix.unwrap_or_default(),
            font: resolve(raw.values.font, "values.font", defaults.values.font),
            color: raw
                .values
                .color
                .map(|(r, g, b)| Color::from_channels(r, g, b))
                .unwrap_or_else(|| {
                    warn!(
                        attribute = "values.color",
                        "missing or empty attribute, default value is used"
                    );
                    defaults.values.color
                }),
        };

        let enabled = resolve(raw.filling.enabled, "filling.enabled", true);
        let anchor = if enabled {
            Some(resolve(
                raw.filling.anchor,
                "filling.anchor",
                defaults
                    .filling
                    .anchor
                    .unwrap_or(FillAnchor::ZeroBaseline),
            ))
        } else {
            None
        };

        let filling = FillStyle {
            anchor,
            kind: resolve(raw.filling.kind, "filling.kind", defaults.filling.kind),
            color_style: resolve(
                raw.filling.color_style,
                "filling.color_style",
                defaults.filling.color_style,
            ),
            image_style: resolve(
                raw.filling.image_style,
                "filling.image_style",
                defaults.filling.image_style,
            ),
            brush_style: resolve(
                raw.filling.brush_style,
                "filling.brush_style",
                defaults.filling.brush_style,
            ),
            first_color: raw
                .filling
                .first_color
                .map(|(r, g, b)| Color::from_channels(r, g, b))
                .unwrap_or_else(|| {
                    warn!(
                        attribute = "filling.first_color",
                        "missing or empty attribute, default value is used"
                    );
                    defaults.filling.first_color
                }),
            second_color: raw
                .filling
                .second_color
                .map(|(r, g, b)| Color::from_channels(r, g, b))
                .unwrap_or_else(|| {
                    warn!(
                        attribute = "filling.second_color",
                        "missing or empty attribute, default value is used"
                    );
                    defaults.filling.second_color
                }),
            file_name: raw.filling.file_name.unwrap_or_default(),
            opacity: resolve(
                raw.filling.opacity,
                "filling.opacity",
                defaults.filling.opacity,
            ),
            split_on_gaps: resolve(
                raw.filling.split_on_gaps,
                "filling.split_on_gaps",
                defaults.filling.split_on_gaps,
            ),
        };

        debug!("loaded curve style document");
        Ok(Self { values, filling })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_round_trips_through_json() {
        let mut style = CurveStyle::default();
        style.values.mode = ValuesMode::XYBracketed;
        style.values.position = ValuesPosition::Right;
        style.values.distance = 7.5;
        style.values.prefix = "[".to_owned();
        style.values.suffix = "]".to_owned();
        style.filling.anchor = Some(FillAnchor::Above);
        style.filling.split_on_gaps = true;
        style.filling.first_color = Color::from_channels(10, 20, 30);

        let json = style.to_json().expect("serialize");
        let loaded = CurveStyle::from_json(&json).expect("deserialize");
        assert_eq!(loaded, style);
    }

    #[test]
    fn disabled_filling_round_trips_as_none() {
        let mut style = CurveStyle::default();
        style.filling.anchor = None;
        let json = style.to_json().expect("serialize");
        let loaded = CurveStyle::from_json(&json).expect("deserialize");
        assert_eq!(loaded.filling.anchor, None);
    }

    #[test]
    fn missing_attributes_fall_back_to_defaults() {
        let json = r#"{
            "schema_version": 1,
            "style": {
                "values": { "mode": "Y" },
                "filling": { "opacity": 0.5 }
            }
        }"#;
        let loaded = CurveStyle::from_json(json).expect("partial document loads");
        assert_eq!(loaded.values.mode, ValuesMode::Y);
        assert_eq!(loaded.values.distance, 5.0);
        assert_eq!(loaded.filling.opacity, 0.5);
        assert_eq!(loaded.filling.anchor, Some(FillAnchor::ZeroBaseline));
        assert!(!loaded.filling.split_on_gaps);
    }

    #[test]
    fn unsupported_schema_version_is_rejected() {
        let json = r#"{ "schema_version": 99, "style": {} }"#;
        let err = CurveStyle::from_json(json).expect_err("version mismatch");
        assert!(matches!(err, PlotError::MalformedAttribute { .. }));
    }

    #[test]
    fn garbage_input_reports_a_malformed_document() {
        let err = CurveStyle::from_json("not json").expect_err("parse failure");
        assert!(matches!(err, PlotError::MalformedAttribute { .. }));
    }
}
