use tracing::trace;

use crate::core::types::{FillPolygon, SceneRect, ScenePoint};
use crate::render::bitmap::{Bitmap, FillPaint};
use crate::render::primitives::Color;

/// Default blur radius for the hover/selection effect variants.
pub const EFFECT_BLUR_RADIUS: i32 = 5;

/// Rasterized output of one curve, reused between paints until an upstream
/// geometry or style change invalidates it.
///
/// The cache owns only pixels; the geometry it was built from stays with
/// the curve engine. The hover/selection effect images are derived lazily
/// from the pixmap and dropped whenever it is rebuilt.
#[derive(Debug, Clone, Default)]
pub struct RenderCache {
    bounding: SceneRect,
    pixmap: Option<Bitmap>,
    hover_image: Option<Bitmap>,
    selection_image: Option<Bitmap>,
}

impl RenderCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn bounding(&self) -> SceneRect {
        self.bounding
    }

    /// Current pixmap; a zero-size bitmap when nothing was rasterized yet
    /// or the geometry was degenerate.
    #[must_use]
    pub fn pixmap(&self) -> Bitmap {
        self.pixmap.clone().unwrap_or_else(|| Bitmap::new(0, 0))
    }

    /// Rebuilds the pixmap from fill polygons and label boxes.
    ///
    /// The bitmap is sized to the tight bounding box of all geometry and
    /// drawn translated so the box's top-left lands at the origin. A
    /// zero-area bounding box produces a zero-size, valid bitmap.
    pub fn rasterize(
        &mut self,
        bounding: SceneRect,
        polygons: &[FillPolygon],
        fill_paint: Option<&FillPaint>,
        label_boxes: &[SceneRect],
        label_color: Option<Color>,
    ) {
        self.bounding = bounding;
        self.hover_image = None;
        self.selection_image = None;

        let width = bounding.width.ceil().max(0.0) as u32;
        let height = bounding.height.ceil().max(0.0) as u32;
        let mut pixmap = Bitmap::new(width, height);
        if pixmap.is_zero_sized() {
            trace!(width, height, "rasterized zero-size render cache");
            self.pixmap = Some(pixmap);
            return;
        }

        if let Some(paint) = fill_paint {
            for polygon in polygons {
                let translated: Vec<(f64, f64)> = polygon
                    .vertices
                    .iter()
                    .map(|vertex| (vertex.x - bounding.x, vertex.y - bounding.y))
                    .collect();
                pixmap.fill_polygon(&translated, paint);
            }
        }

        if let Some(color) = label_color {
            for label_box in label_boxes {
                pixmap.fill_rect(
                    SceneRect::new(
                        label_box.x - bounding.x,
                        label_box.y - bounding.y,
                        label_box.width,
                        label_box.height,
                    ),
                    color,
                );
            }
        }

        trace!(
            width,
            height,
            polygons = polygons.len(),
            labels = label_boxes.len(),
            "rasterized render cache"
        );
        self.pixmap = Some(pixmap);
    }

    /// Blurred alpha-only variant used for the hover highlight. Computed
    /// lazily and kept until the next rasterization.
    pub fn hover_effect(&mut self) -> Bitmap {
        if self.hover_image.is_none() {
            self.hover_image = Some(self.pixmap().blurred(EFFECT_BLUR_RADIUS, true));
        }
        self.hover_image
            .clone()
            .unwrap_or_else(|| Bitmap::new(0, 0))
    }

    /// Blurred alpha-only variant used for the selection highlight.
    pub fn selection_effect(&mut self) -> Bitmap {
        if self.selection_image.is_none() {
            self.selection_image = Some(self.pixmap().blurred(EFFECT_BLUR_RADIUS, true));
        }
        self.selection_image
            .clone()
            .unwrap_or_else(|| Bitmap::new(0, 0))
    }

    /// Blits the cached pixmap onto `canvas` at the bounding box origin.
    pub fn paint(&self, canvas: &mut Bitmap) {
        if let Some(pixmap) = &self.pixmap {
            canvas.draw_bitmap(pixmap, self.bounding.x, self.bounding.y);
        }
    }
}

/// Hit-test shape of a drawable: filled regions plus label boxes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Shape {
    pub polygons: Vec<FillPolygon>,
    pub boxes: Vec<SceneRect>,
}

impl Shape {
    #[must_use]
    pub fn bounding(&self) -> SceneRect {
        let mut rect = SceneRect::default();
        for polygon in &self.polygons {
            rect = rect.united(polygon.bounding());
        }
        for label_box in &self.boxes {
            rect = rect.united(*label_box);
        }
        rect
    }

    /// Even-odd point-in-shape test over polygons, plus containment in any
    /// label box.
    #[must_use]
    pub fn contains(&self, point: ScenePoint) -> bool {
        for label_box in &self.boxes {
            if point.x >= label_box.x
                && point.x <= label_box.x + label_box.width
                && point.y >= label_box.y
                && point.y <= label_box.y + label_box.height
            {
                return true;
            }
        }
        self.polygons
            .iter()
            .any(|polygon| polygon_contains(&polygon.vertices, point))
    }
}

fn polygon_contains(vertices: &[ScenePoint], point: ScenePoint) -> bool {
    let mut inside = false;
    for i in 0..vertices.len() {
        let a = vertices[i];
        let b = vertices[(i + 1) % vertices.len()];
        if (a.y <= point.y && point.y < b.y) || (b.y <= point.y && point.y < a.y) {
            let x = a.x + (point.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if point.x < x {
                inside = !inside;
            }
        }
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> FillPolygon {
        FillPolygon::new(vec![
            ScenePoint::new(0.0, 0.0),
            ScenePoint::new(10.0, 0.0),
            ScenePoint::new(10.0, 10.0),
            ScenePoint::new(0.0, 10.0),
            ScenePoint::new(0.0, 0.0),
        ])
    }

    #[test]
    fn zero_area_geometry_yields_zero_size_valid_pixmap() {
        let mut cache = RenderCache::new();
        cache.rasterize(SceneRect::default(), &[], None, &[], None);
        assert!(cache.pixmap().is_zero_sized());
    }

    #[test]
    fn rasterize_invalidates_effect_images() {
        let mut cache = RenderCache::new();
        let polygon = unit_square();
        let bounding = polygon.bounding();
        let paint = FillPaint::solid(Color::WHITE);

        cache.rasterize(bounding, &[polygon.clone()], Some(&paint), &[], None);
        let first_effect = cache.selection_effect();
        assert!(!first_effect.is_zero_sized());

        cache.rasterize(SceneRect::default(), &[], None, &[], None);
        assert!(cache.selection_effect().is_zero_sized());
    }

    #[test]
    fn shape_contains_polygon_interior_and_label_boxes() {
        let shape = Shape {
            polygons: vec![unit_square()],
            boxes: vec![SceneRect::new(20.0, 20.0, 5.0, 2.0)],
        };
        assert!(shape.contains(ScenePoint::new(5.0, 5.0)));
        assert!(shape.contains(ScenePoint::new(22.0, 21.0)));
        assert!(!shape.contains(ScenePoint::new(15.0, 15.0)));
    }
}
