use serde::{Deserialize, Serialize};

use crate::error::{PlotError, PlotResult};

/// One monotonic linear mapping segment from a logical interval to a scene
/// interval.
///
/// The scene interval may run backwards (`scene_start > scene_end`) to model
/// the usual downward-growing device y-axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scale {
    logical_start: f64,
    logical_end: f64,
    scene_start: f64,
    scene_end: f64,
}

impl Scale {
    pub fn new(
        logical_start: f64,
        logical_end: f64,
        scene_start: f64,
        scene_end: f64,
    ) -> PlotResult<Self> {
        if !logical_start.is_finite()
            || !logical_end.is_finite()
            || !scene_start.is_finite()
            || !scene_end.is_finite()
        {
            return Err(PlotError::InvalidData(
                "scale intervals must be finite".to_owned(),
            ));
        }
        if logical_start >= logical_end {
            return Err(PlotError::InvalidData(
                "scale logical interval must be ascending and non-empty".to_owned(),
            ));
        }
        if scene_start == scene_end {
            return Err(PlotError::InvalidData(
                "scale scene interval must be non-empty".to_owned(),
            ));
        }
        Ok(Self {
            logical_start,
            logical_end,
            scene_start,
            scene_end,
        })
    }

    /// Segment whose scene coordinates equal its logical coordinates.
    pub fn identity(logical_start: f64, logical_end: f64) -> PlotResult<Self> {
        Self::new(logical_start, logical_end, logical_start, logical_end)
    }

    #[must_use]
    pub fn logical_interval(self) -> (f64, f64) {
        (self.logical_start, self.logical_end)
    }

    #[must_use]
    pub fn contains(self, value: f64) -> bool {
        value >= self.logical_start && value <= self.logical_end
    }

    /// Distance from `value` to the logical interval; zero inside it.
    #[must_use]
    pub fn distance_to(self, value: f64) -> f64 {
        if value < self.logical_start {
            self.logical_start - value
        } else if value > self.logical_end {
            value - self.logical_end
        } else {
            0.0
        }
    }

    /// Maps a logical value into scene coordinates. Values outside the
    /// logical interval extrapolate linearly.
    #[must_use]
    pub fn map(self, value: f64) -> f64 {
        let normalized = (value - self.logical_start) / (self.logical_end - self.logical_start);
        self.scene_start + normalized * (self.scene_end - self.scene_start)
    }

    /// Maps a scene coordinate back into logical space.
    #[must_use]
    pub fn inverse_map(self, scene: f64) -> f64 {
        let normalized = (scene - self.scene_start) / (self.scene_end - self.scene_start);
        self.logical_start + normalized * (self.logical_end - self.logical_start)
    }
}
