use serde::{Deserialize, Serialize};

use crate::error::{PlotError, PlotResult};

/// RGBA color in normalized 0..=1 channel values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Color {
    #[must_use]
    pub const fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    #[must_use]
    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self::rgba(red, green, blue, 1.0)
    }

    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);

    /// From integer channels as persisted documents carry them.
    #[must_use]
    pub fn from_channels(red: u8, green: u8, blue: u8) -> Self {
        Self::rgb(
            f64::from(red) / 255.0,
            f64::from(green) / 255.0,
            f64::from(blue) / 255.0,
        )
    }

    /// Integer channel triple for persistence. Round-trips losslessly with
    /// `from_channels`.
    #[must_use]
    pub fn to_channels(self) -> (u8, u8, u8) {
        let quantize = |value: f64| (value.clamp(0.0, 1.0) * 255.0).round() as u8;
        (
            quantize(self.red),
            quantize(self.green),
            quantize(self.blue),
        )
    }

    #[must_use]
    pub fn with_alpha(self, alpha: f64) -> Self {
        Self { alpha, ..self }
    }

    /// Linear interpolation toward `other`; `t` clamped to [0, 1].
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self::rgba(
            self.red + (other.red - self.red) * t,
            self.green + (other.green - self.green) * t,
            self.blue + (other.blue - self.blue) * t,
            self.alpha + (other.alpha - self.alpha) * t,
        )
    }

    pub fn validate(self) -> PlotResult<()> {
        for (channel, value) in [
            ("red", self.red),
            ("green", self.green),
            ("blue", self.blue),
            ("alpha", self.alpha),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(PlotError::InvalidData(format!(
                    "color channel `{channel}` must be finite and in [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

/// What fills a region: flat/gradient color, an external image, or a brush
/// pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FillKind {
    #[default]
    Color,
    Image,
    Pattern,
}

/// Color spread across a filled region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ColorStyle {
    #[default]
    SingleColor,
    HorizontalLinearGradient,
    VerticalLinearGradient,
    TopLeftDiagonalLinearGradient,
    BottomLeftDiagonalLinearGradient,
    RadialGradient,
}

/// Placement of an image fill inside the region's bounding rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ImageStyle {
    ScaledCropped,
    #[default]
    Scaled,
    ScaledAspectRatio,
    Centered,
    Tiled,
    CenterTiled,
}

/// Procedural brush patterns for `FillKind::Pattern`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BrushStyle {
    #[default]
    Solid,
    Dense,
    Horizontal,
    Vertical,
    Cross,
    Diagonal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_channels_round_trip() {
        let color = Color::from_channels(12, 200, 255);
        let (r, g, b) = color.to_channels();
        assert_eq!((r, g, b), (12, 200, 255));
        assert!(color.validate().is_ok());
    }

    #[test]
    fn color_validation_rejects_out_of_range_channels() {
        assert!(Color::rgb(1.5, 0.0, 0.0).validate().is_err());
        assert!(Color::rgba(0.0, 0.0, 0.0, f64::NAN).validate().is_err());
    }

    #[test]
    fn lerp_interpolates_midpoint() {
        let mid = Color::BLACK.lerp(Color::WHITE, 0.5);
        assert!((mid.red - 0.5).abs() < 1e-12);
        assert!((mid.green - 0.5).abs() < 1e-12);
        assert!((mid.blue - 0.5).abs() < 1e-12);
    }
}
