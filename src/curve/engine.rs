use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use crate::core::column::{ColumnId, DataColumn};
use crate::core::coords::CartesianCoordinateSystem;
use crate::core::types::{FillPolygon, SceneLine, SceneRect};
use crate::curve::fill::{self, FillAnchor};
use crate::curve::geometry::{self, CurveGeometry};
use crate::curve::style::{CurveStyle, ValuesStyle};
use crate::curve::values::{
    self, FontMetrics, FontSpec, HeuristicFontMetrics, ValueLabel, ValueLayoutParams, ValuesMode,
    ValuesPosition,
};
use crate::render::bitmap::{Bitmap, FillPaint};
use crate::render::cache::RenderCache;
use crate::render::primitives::{BrushStyle, Color, ColorStyle, FillKind, ImageStyle};
use crate::render::{Drawable, Shape};

/// Proof that an update cascade is already in flight. Stage internals take
/// a reference to one and never recompute the shape themselves; only the
/// public entry points create the token and run the shape recalculation
/// once, after all stages settle.
struct UpdateGuard(());

impl UpdateGuard {
    fn new() -> Self {
        Self(())
    }
}

/// One curve: column bindings, style, and all derived geometry.
///
/// Derived state is rebuilt through a staged cascade. A full retransform
/// runs geometry, then value labels, then fill regions, and finishes with
/// exactly one shape/bounding-rect recalculation and pixmap refresh, no
/// matter how many stages the trigger touched.
#[derive(Debug)]
pub struct CurveEngine {
    name: String,
    coordinate_system: Weak<CartesianCoordinateSystem>,
    x_column: Option<Rc<DataColumn>>,
    y_column: Option<Rc<DataColumn>>,
    values_column: Option<Rc<DataColumn>>,
    style: CurveStyle,
    metrics: Box<dyn FontMetrics>,
    visible: bool,

    geometry: CurveGeometry,
    scene_lines: Vec<SceneLine>,
    labels: Vec<ValueLabel>,
    label_boxes: Vec<SceneRect>,
    fill_polygons: Vec<FillPolygon>,
    shape: Shape,
    bounding: SceneRect,
    cache: RenderCache,
}

impl CurveEngine {
    #[must_use]
    pub fn new(name: impl Into<String>, cs: &Rc<CartesianCoordinateSystem>) -> Self {
        Self {
            name: name.into(),
            coordinate_system: Rc::downgrade(cs),
            x_column: None,
            y_column: None,
            values_column: None,
            style: CurveStyle::default(),
            metrics: Box::new(HeuristicFontMetrics),
            visible: true,
            geometry: CurveGeometry::empty(),
            scene_lines: Vec::new(),
            labels: Vec::new(),
            label_boxes: Vec::new(),
            fill_polygons: Vec::new(),
            shape: Shape::default(),
            bounding: SceneRect::default(),
            cache: RenderCache::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn style(&self) -> &CurveStyle {
        &self.style
    }

    pub fn geometry(&self) -> &CurveGeometry {
        &self.geometry
    }

    pub fn labels(&self) -> &[ValueLabel] {
        &self.labels
    }

    pub fn fill_polygons(&self) -> &[FillPolygon] {
        &self.fill_polygons
    }

    pub fn x_column(&self) -> Option<&Rc<DataColumn>> {
        self.x_column.as_ref()
    }

    pub fn y_column(&self) -> Option<&Rc<DataColumn>> {
        self.y_column.as_ref()
    }

    pub fn values_column(&self) -> Option<&Rc<DataColumn>> {
        self.values_column.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Flips visibility and returns the previous state, so the caller can
    /// build an undoable toggle from it.
    pub fn swap_visible(&mut self, visible: bool) -> bool {
        let old = self.visible;
        self.visible = visible;
        old
    }

    pub fn set_coordinate_system(&mut self, cs: &Rc<CartesianCoordinateSystem>) {
        self.coordinate_system = Rc::downgrade(cs);
        self.retransform();
    }

    pub fn set_font_metrics(&mut self, metrics: Box<dyn FontMetrics>) {
        self.metrics = metrics;
        self.update_values();
    }

    // Column bindings. Rebinding x or y invalidates everything downstream.

    pub fn set_x_column(&mut self, column: Option<Rc<DataColumn>>) {
        self.x_column = column;
        self.retransform();
    }

    pub fn set_y_column(&mut self, column: Option<Rc<DataColumn>>) {
        self.y_column = column;
        self.retransform();
    }

    pub fn set_values_column(&mut self, column: Option<Rc<DataColumn>>) {
        self.values_column = column;
        self.update_values();
    }

    // Value label properties. Geometry-affecting ones rerun the label
    // stage; paint-only ones just refresh the pixmap.

    pub fn set_values_mode(&mut self, mode: ValuesMode) {
        self.style.values.mode = mode;
        self.update_values();
    }

    pub fn set_values_position(&mut self, position: ValuesPosition) {
        self.style.values.position = position;
        self.update_values();
    }

    pub fn set_values_distance(&mut self, distance: f64) {
        self.style.values.distance = distance;
        self.update_values();
    }

    pub fn set_values_rotation(&mut self, rotation: f64) {
        self.style.values.rotation = rotation;
        self.update_values();
    }

    pub fn set_values_prefix(&mut self, prefix: String) {
        self.style.values.prefix = prefix;
        self.update_values();
    }

    pub fn set_values_suffix(&mut self, suffix: String) {
        self.style.values.suffix = suffix;
        self.update_values();
    }

    pub fn set_values_font(&mut self, font: FontSpec) {
        self.style.values.font = font;
        self.update_values();
    }

    pub fn set_values_opacity(&mut self, opacity: f64) {
        self.style.values.opacity = opacity;
        self.update_pixmap();
    }

    pub fn set_values_color(&mut self, color: Color) {
        self.style.values.color = color;
        self.update_pixmap();
    }

    // Filling properties. Only the anchor and gap handling change the
    // region geometry; the rest is paint.

    pub fn set_fill_anchor(&mut self, anchor: Option<FillAnchor>) {
        self.style.filling.anchor = anchor;
        self.update_filling();
    }

    pub fn set_fill_split_on_gaps(&mut self, split: bool) {
        self.style.filling.split_on_gaps = split;
        self.update_filling();
    }

    pub fn set_fill_kind(&mut self, kind: FillKind) {
        self.style.filling.kind = kind;
        self.update_pixmap();
    }

    pub fn set_fill_color_style(&mut self, style: ColorStyle) {
        self.style.filling.color_style = style;
        self.update_pixmap();
    }

    pub fn set_fill_image_style(&mut self, style: ImageStyle) {
        self.style.filling.image_style = style;
        self.update_pixmap();
    }

    pub fn set_fill_brush_style(&mut self, style: BrushStyle) {
        self.style.filling.brush_style = style;
        self.update_pixmap();
    }

    pub fn set_fill_first_color(&mut self, color: Color) {
        self.style.filling.first_color = color;
        self.update_pixmap();
    }

    pub fn set_fill_second_color(&mut self, color: Color) {
        self.style.filling.second_color = color;
        self.update_pixmap();
    }

    pub fn set_fill_file_name(&mut self, file_name: String) {
        self.style.filling.file_name = file_name;
        self.update_pixmap();
    }

    pub fn set_fill_opacity(&mut self, opacity: f64) {
        self.style.filling.opacity = opacity;
        self.update_pixmap();
    }

    /// Replaces the whole style, rerunning the full downstream cascade.
    pub fn set_style(&mut self, style: CurveStyle) {
        self.style = style;
        let guard = UpdateGuard::new();
        self.update_values_stage(&guard);
        self.update_filling_stage(&guard);
        self.recalc_shape_and_bounding_rect();
    }

    // Column change notifications from the owning document.

    pub fn notify_column_changed(&mut self, id: ColumnId) {
        let data_bound = self.x_column.as_ref().is_some_and(|c| c.id() == id)
            || self.y_column.as_ref().is_some_and(|c| c.id() == id);
        if data_bound {
            self.retransform();
        } else if self.values_column.as_ref().is_some_and(|c| c.id() == id) {
            self.update_values();
        }
    }

    pub fn notify_column_removed(&mut self, id: ColumnId) {
        let mut data_dropped = false;
        if self.x_column.as_ref().is_some_and(|c| c.id() == id) {
            self.x_column = None;
            data_dropped = true;
        }
        if self.y_column.as_ref().is_some_and(|c| c.id() == id) {
            self.y_column = None;
            data_dropped = true;
        }
        let values_dropped = self.values_column.as_ref().is_some_and(|c| c.id() == id);
        if values_dropped {
            self.values_column = None;
        }
        if data_dropped {
            self.retransform();
        } else if values_dropped {
            self.update_values();
        }
    }

    // Cascade entry points. Each creates the guard, runs its stage and
    // everything downstream of it, then recalculates shape and bounding
    // rect exactly once.

    /// Full geometry rebuild from the bound columns.
    pub fn retransform(&mut self) {
        let guard = UpdateGuard::new();
        self.retransform_stage(&guard);
        self.recalc_shape_and_bounding_rect();
    }

    /// Rebuilds value labels from the current geometry.
    pub fn update_values(&mut self) {
        let guard = UpdateGuard::new();
        self.update_values_stage(&guard);
        self.recalc_shape_and_bounding_rect();
    }

    /// Rebuilds fill regions from the current geometry.
    pub fn update_filling(&mut self) {
        let guard = UpdateGuard::new();
        self.update_filling_stage(&guard);
        self.recalc_shape_and_bounding_rect();
    }

    fn retransform_stage(&mut self, guard: &UpdateGuard) {
        let Some(cs) = self.coordinate_system.upgrade() else {
            debug!(curve = %self.name, "no coordinate system, clearing geometry");
            self.geometry = CurveGeometry::empty();
            self.scene_lines.clear();
            self.update_values_stage(guard);
            self.update_filling_stage(guard);
            return;
        };

        match geometry::recompute(self.x_column.as_deref(), self.y_column.as_deref(), &cs) {
            Ok(geometry) => self.geometry = geometry,
            Err(err) => {
                warn!(curve = %self.name, error = %err, "geometry rebuild failed, curve is empty");
                self.geometry = CurveGeometry::empty();
            }
        }
        self.scene_lines = self.geometry.scene_lines(&cs);

        self.update_values_stage(guard);
        self.update_filling_stage(guard);
    }

    fn update_values_stage(&mut self, _guard: &UpdateGuard) {
        let style: &ValuesStyle = &self.style.values;
        let params = ValueLayoutParams {
            mode: style.mode,
            position: style.position,
            distance: style.distance,
            rotation: style.rotation,
            prefix: &style.prefix,
            suffix: &style.suffix,
            font: &style.font,
            values_column: self.values_column.as_deref(),
        };
        self.labels = values::layout(
            &self.geometry.logical_points,
            &self.geometry.scene_points,
            &self.geometry.visible,
            &params,
            self.metrics.as_ref(),
        );
        self.label_boxes = self
            .labels
            .iter()
            .map(|label| label.bounding(&self.style.values.font, self.metrics.as_ref()))
            .collect();
    }

    fn update_filling_stage(&mut self, _guard: &UpdateGuard) {
        let Some(anchor) = self.style.filling.anchor else {
            self.fill_polygons.clear();
            return;
        };
        let Some(cs) = self.coordinate_system.upgrade() else {
            self.fill_polygons.clear();
            return;
        };
        self.fill_polygons = fill::build_fill(
            &self.geometry.logical_points,
            &self.geometry.connected,
            &self.scene_lines,
            &cs,
            anchor,
            self.style.filling.split_on_gaps,
        );
    }

    fn recalc_shape_and_bounding_rect(&mut self) {
        self.shape = Shape {
            polygons: self.fill_polygons.clone(),
            boxes: self.label_boxes.clone(),
        };
        self.bounding = self.shape.bounding();
        self.update_pixmap();
    }

    /// Re-rasterizes the cached pixmap from the current derived state.
    pub fn update_pixmap(&mut self) {
        let fill_paint = self.style.filling.anchor.map(|_| FillPaint {
            kind: self.style.filling.kind,
            color_style: self.style.filling.color_style,
            brush_style: self.style.filling.brush_style,
            first_color: self.style.filling.first_color,
            second_color: self.style.filling.second_color,
            opacity: self.style.filling.opacity,
        });
        let label_color = (self.style.values.mode != ValuesMode::None)
            .then_some(self.style.values.color.with_alpha(self.style.values.opacity));
        self.cache.rasterize(
            self.bounding,
            &self.fill_polygons,
            fill_paint.as_ref(),
            &self.label_boxes,
            label_color,
        );
    }

    pub fn pixmap(&self) -> Bitmap {
        self.cache.pixmap()
    }

    pub fn hover_effect(&mut self) -> Bitmap {
        self.cache.hover_effect()
    }

    pub fn selection_effect(&mut self) -> Bitmap {
        self.cache.selection_effect()
    }
}

impl Drawable for CurveEngine {
    fn bounding_box(&self) -> SceneRect {
        self.bounding
    }

    fn shape(&self) -> Shape {
        self.shape.clone()
    }

    fn paint(&self, canvas: &mut Bitmap) {
        if !self.visible {
            return;
        }
        self.cache.paint(canvas);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::PlotExtent;

    fn engine_with_parabola() -> (CurveEngine, Rc<CartesianCoordinateSystem>) {
        let extent = PlotExtent::new(0.0, 4.0, 0.0, 16.0).expect("extent");
        let cs = Rc::new(CartesianCoordinateSystem::identity(extent).expect("coordinate system"));
        let mut engine = CurveEngine::new("parabola", &cs);
        let xs: Vec<f64> = vec![0.0, 1.0, 2.0, 3.0, 4.0];
        let ys: Vec<f64> = xs.iter().map(|x| x * x).collect();
        engine.set_x_column(Some(Rc::new(DataColumn::from_values(1, "x", &xs))));
        engine.set_y_column(Some(Rc::new(DataColumn::from_values(2, "y", &ys))));
        (engine, cs)
    }

    #[test]
    fn retransform_populates_all_derived_state() {
        let (mut engine, _cs) = engine_with_parabola();
        engine.set_fill_anchor(Some(FillAnchor::Below));
        engine.set_values_mode(ValuesMode::Y);

        assert_eq!(engine.geometry().len(), 5);
        assert_eq!(engine.labels().len(), 5);
        assert_eq!(engine.fill_polygons().len(), 1);
        assert!(!engine.bounding_box().is_empty());
        assert!(engine.pixmap().width() > 0);
    }

    #[test]
    fn dropped_coordinate_system_degrades_to_empty() {
        let (mut engine, cs) = engine_with_parabola();
        assert!(!engine.geometry().is_empty());
        drop(cs);
        engine.retransform();
        assert!(engine.geometry().is_empty());
        assert!(engine.fill_polygons().is_empty());
        assert!(engine.labels().is_empty());
    }

    #[test]
    fn non_numeric_binding_degrades_instead_of_failing() {
        let (mut engine, _cs) = engine_with_parabola();
        let mut text = DataColumn::new(9, "t", crate::core::column::ColumnMode::Text);
        text.push_text("a");
        engine.set_y_column(Some(Rc::new(text)));
        assert!(engine.geometry().is_empty());
    }

    #[test]
    fn column_notifications_route_to_the_right_stage() {
        let (mut engine, _cs) = engine_with_parabola();
        engine.set_values_mode(ValuesMode::CustomColumn);
        let names = {
            let mut c = DataColumn::new(3, "names", crate::core::column::ColumnMode::Text);
            for name in ["a", "b", "c", "d", "e"] {
                c.push_text(name);
            }
            Rc::new(c)
        };
        engine.set_values_column(Some(names));
        assert_eq!(engine.labels().len(), 5);

        engine.notify_column_removed(3);
        assert!(engine.values_column().is_none());
        assert!(engine.labels().is_empty());
        // Geometry untouched by a values-column removal.
        assert_eq!(engine.geometry().len(), 5);

        engine.notify_column_removed(2);
        assert!(engine.y_column().is_none());
        assert!(engine.geometry().is_empty());
    }

    #[test]
    fn disabling_the_fill_clears_the_regions() {
        let (mut engine, _cs) = engine_with_parabola();
        engine.set_fill_anchor(Some(FillAnchor::Below));
        assert!(!engine.fill_polygons().is_empty());
        engine.set_fill_anchor(None);
        assert!(engine.fill_polygons().is_empty());
        assert!(engine.bounding_box().is_empty());
    }

    #[test]
    fn shape_contains_points_inside_the_fill() {
        let (mut engine, _cs) = engine_with_parabola();
        engine.set_fill_anchor(Some(FillAnchor::Below));
        let shape = engine.shape();
        assert!(shape.contains(crate::core::types::ScenePoint::new(3.0, 1.0)));
        assert!(!shape.contains(crate::core::types::ScenePoint::new(0.5, 15.0)));
    }
}
