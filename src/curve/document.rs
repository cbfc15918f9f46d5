use std::rc::Rc;

use indexmap::IndexMap;
use tracing::debug;

use crate::core::column::{ColumnId, DataColumn};
use crate::core::coords::CartesianCoordinateSystem;
use crate::core::types::PlotExtent;
use crate::curve::commands::{CurveCommand, PropertyCommand};
use crate::curve::engine::CurveEngine;
use crate::curve::fill::FillAnchor;
use crate::curve::values::{ValuesMode, ValuesPosition};
use crate::render::primitives::Color;

/// Relative padding applied on each side when a data range collapses to a
/// single value, so autoscaling never produces an empty extent.
const DEGENERATE_RANGE_PADDING: f64 = 0.1;

/// Owns the plot's curves, its column store, the shared coordinate system
/// and the undo history. Curves hold the coordinate system weakly; the
/// document is the only strong owner.
#[derive(Debug, Default)]
pub struct Document {
    coordinate_system: Option<Rc<CartesianCoordinateSystem>>,
    curves: IndexMap<String, CurveEngine>,
    columns: IndexMap<ColumnId, Rc<DataColumn>>,
    undo_stack: Vec<(String, Box<dyn CurveCommand>)>,
    redo_stack: Vec<(String, Box<dyn CurveCommand>)>,
}

impl Document {
    #[must_use]
    pub fn new(coordinate_system: CartesianCoordinateSystem) -> Self {
        Self {
            coordinate_system: Some(Rc::new(coordinate_system)),
            ..Self::default()
        }
    }

    pub fn coordinate_system(&self) -> Option<&Rc<CartesianCoordinateSystem>> {
        self.coordinate_system.as_ref()
    }

    /// Swaps in a new coordinate system and retransforms every curve
    /// against it.
    pub fn set_coordinate_system(&mut self, coordinate_system: CartesianCoordinateSystem) {
        let cs = Rc::new(coordinate_system);
        self.coordinate_system = Some(Rc::clone(&cs));
        for curve in self.curves.values_mut() {
            curve.set_coordinate_system(&cs);
        }
    }

    // Column store.

    pub fn add_column(&mut self, column: DataColumn) -> Rc<DataColumn> {
        let column = Rc::new(column);
        self.columns.insert(column.id(), Rc::clone(&column));
        column
    }

    pub fn column(&self, id: ColumnId) -> Option<&Rc<DataColumn>> {
        self.columns.get(&id)
    }

    /// Replaces a column's data in place and notifies every curve bound to
    /// it.
    pub fn replace_column(&mut self, column: DataColumn) -> Rc<DataColumn> {
        let id = column.id();
        let column = Rc::new(column);
        self.columns.insert(id, Rc::clone(&column));
        for curve in self.curves.values_mut() {
            // Rebind before notifying so the refresh sees the new data.
            if curve.x_column().is_some_and(|c| c.id() == id) {
                curve.set_x_column(Some(Rc::clone(&column)));
            }
            if curve.y_column().is_some_and(|c| c.id() == id) {
                curve.set_y_column(Some(Rc::clone(&column)));
            }
            if curve.values_column().is_some_and(|c| c.id() == id) {
                curve.set_values_column(Some(Rc::clone(&column)));
            }
        }
        column
    }

    pub fn remove_column(&mut self, id: ColumnId) {
        if self.columns.shift_remove(&id).is_some() {
            debug!(column = id, "column removed, notifying curves");
            for curve in self.curves.values_mut() {
                curve.notify_column_removed(id);
            }
        }
    }

    // Curve registry.

    pub fn add_curve(&mut self, name: impl Into<String>) -> Option<&mut CurveEngine> {
        let name = name.into();
        let cs = self.coordinate_system.as_ref()?;
        let curve = CurveEngine::new(name.clone(), cs);
        self.curves.insert(name.clone(), curve);
        self.curves.get_mut(&name)
    }

    pub fn curve(&self, name: &str) -> Option<&CurveEngine> {
        self.curves.get(name)
    }

    pub fn curve_mut(&mut self, name: &str) -> Option<&mut CurveEngine> {
        self.curves.get_mut(name)
    }

    pub fn remove_curve(&mut self, name: &str) -> bool {
        let removed = self.curves.shift_remove(name).is_some();
        if removed {
            // History entries for a dead curve can no longer be replayed.
            self.undo_stack.retain(|(curve, _)| curve != name);
            self.redo_stack.retain(|(curve, _)| curve != name);
        }
        removed
    }

    pub fn curves(&self) -> impl Iterator<Item = &CurveEngine> {
        self.curves.values()
    }

    // Undo history.

    /// Applies a command to the named curve and records it. A fresh edit
    /// always clears the redo branch.
    pub fn exec(&mut self, curve_name: &str, command: Box<dyn CurveCommand>) -> bool {
        let Some(curve) = self.curves.get_mut(curve_name) else {
            return false;
        };
        debug!(curve = curve_name, command = command.description(), "exec");
        command.apply(curve);
        self.undo_stack.push((curve_name.to_owned(), command));
        self.redo_stack.clear();
        true
    }

    pub fn undo(&mut self) -> bool {
        let Some((name, command)) = self.undo_stack.pop() else {
            return false;
        };
        if let Some(curve) = self.curves.get_mut(&name) {
            debug!(curve = %name, command = command.description(), "undo");
            command.revert(curve);
        }
        self.redo_stack.push((name, command));
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some((name, command)) = self.redo_stack.pop() else {
            return false;
        };
        if let Some(curve) = self.curves.get_mut(&name) {
            debug!(curve = %name, command = command.description(), "redo");
            command.apply(curve);
        }
        self.undo_stack.push((name, command));
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    // Undoable property setters. Each skips no-op changes so the history
    // only records real edits.

    pub fn set_x_column(&mut self, curve_name: &str, column: Option<Rc<DataColumn>>) -> bool {
        let Some(curve) = self.curves.get(curve_name) else {
            return false;
        };
        let old = curve.x_column().cloned();
        if old.as_ref().map(|c| c.id()) == column.as_ref().map(|c| c.id()) {
            return false;
        }
        self.exec(
            curve_name,
            Box::new(PropertyCommand::new(
                "assign x column",
                old,
                column,
                CurveEngine::set_x_column,
            )),
        )
    }

    pub fn set_y_column(&mut self, curve_name: &str, column: Option<Rc<DataColumn>>) -> bool {
        let Some(curve) = self.curves.get(curve_name) else {
            return false;
        };
        let old = curve.y_column().cloned();
        if old.as_ref().map(|c| c.id()) == column.as_ref().map(|c| c.id()) {
            return false;
        }
        self.exec(
            curve_name,
            Box::new(PropertyCommand::new(
                "assign y column",
                old,
                column,
                CurveEngine::set_y_column,
            )),
        )
    }

    pub fn set_values_column(&mut self, curve_name: &str, column: Option<Rc<DataColumn>>) -> bool {
        let Some(curve) = self.curves.get(curve_name) else {
            return false;
        };
        let old = curve.values_column().cloned();
        if old.as_ref().map(|c| c.id()) == column.as_ref().map(|c| c.id()) {
            return false;
        }
        self.exec(
            curve_name,
            Box::new(PropertyCommand::new(
                "assign values column",
                old,
                column,
                CurveEngine::set_values_column,
            )),
        )
    }

    pub fn set_values_mode(&mut self, curve_name: &str, mode: ValuesMode) -> bool {
        let Some(curve) = self.curves.get(curve_name) else {
            return false;
        };
        let old = curve.style().values.mode;
        if old == mode {
            return false;
        }
        self.exec(
            curve_name,
            Box::new(PropertyCommand::new(
                "change values mode",
                old,
                mode,
                CurveEngine::set_values_mode,
            )),
        )
    }

    pub fn set_values_position(&mut self, curve_name: &str, position: ValuesPosition) -> bool {
        let Some(curve) = self.curves.get(curve_name) else {
            return false;
        };
        let old = curve.style().values.position;
        if old == position {
            return false;
        }
        self.exec(
            curve_name,
            Box::new(PropertyCommand::new(
                "change values position",
                old,
                position,
                CurveEngine::set_values_position,
            )),
        )
    }

    pub fn set_values_distance(&mut self, curve_name: &str, distance: f64) -> bool {
        let Some(curve) = self.curves.get(curve_name) else {
            return false;
        };
        let old = curve.style().values.distance;
        if old == distance {
            return false;
        }
        self.exec(
            curve_name,
            Box::new(PropertyCommand::new(
                "change values distance",
                old,
                distance,
                CurveEngine::set_values_distance,
            )),
        )
    }

    pub fn set_values_rotation(&mut self, curve_name: &str, rotation: f64) -> bool {
        let Some(curve) = self.curves.get(curve_name) else {
            return false;
        };
        let old = curve.style().values.rotation;
        if old == rotation {
            return false;
        }
        self.exec(
            curve_name,
            Box::new(PropertyCommand::new(
                "rotate values",
                old,
                rotation,
                CurveEngine::set_values_rotation,
            )),
        )
    }

    pub fn set_values_prefix(&mut self, curve_name: &str, prefix: String) -> bool {
        let Some(curve) = self.curves.get(curve_name) else {
            return false;
        };
        let old = curve.style().values.prefix.clone();
        if old == prefix {
            return false;
        }
        self.exec(
            curve_name,
            Box::new(PropertyCommand::new(
                "change values prefix",
                old,
                prefix,
                CurveEngine::set_values_prefix,
            )),
        )
    }

    pub fn set_values_suffix(&mut self, curve_name: &str, suffix: String) -> bool {
        let Some(curve) = self.curves.get(curve_name) else {
            return false;
        };
        let old = curve.style().values.suffix.clone();
        if old == suffix {
            return false;
        }
        self.exec(
            curve_name,
            Box::new(PropertyCommand::new(
                "change values suffix",
                old,
                suffix,
                CurveEngine::set_values_suffix,
            )),
        )
    }

    pub fn set_values_opacity(&mut self, curve_name: &str, opacity: f64) -> bool {
        let Some(curve) = self.curves.get(curve_name) else {
            return false;
        };
        let old = curve.style().values.opacity;
        if old == opacity {
            return false;
        }
        self.exec(
            curve_name,
            Box::new(PropertyCommand::new(
                "change values opacity",
                old,
                opacity,
                CurveEngine::set_values_opacity,
            )),
        )
    }

    pub fn set_values_color(&mut self, curve_name: &str, color: Color) -> bool {
        let Some(curve) = self.curves.get(curve_name) else {
            return false;
        };
        let old = curve.style().values.color;
        if old == color {
            return false;
        }
        self.exec(
            curve_name,
            Box::new(PropertyCommand::new(
                "change values color",
                old,
                color,
                CurveEngine::set_values_color,
            )),
        )
    }

    pub fn set_fill_anchor(&mut self, curve_name: &str, anchor: Option<FillAnchor>) -> bool {
        let Some(curve) = self.curves.get(curve_name) else {
            return false;
        };
        let old = curve.style().filling.anchor;
        if old == anchor {
            return false;
        }
        self.exec(
            curve_name,
            Box::new(PropertyCommand::new(
                "change filling position",
                old,
                anchor,
                CurveEngine::set_fill_anchor,
            )),
        )
    }

    pub fn set_fill_first_color(&mut self, curve_name: &str, color: Color) -> bool {
        let Some(curve) = self.curves.get(curve_name) else {
            return false;
        };
        let old = curve.style().filling.first_color;
        if old == color {
            return false;
        }
        self.exec(
            curve_name,
            Box::new(PropertyCommand::new(
                "change filling color",
                old,
                color,
                CurveEngine::set_fill_first_color,
            )),
        )
    }

    pub fn set_fill_opacity(&mut self, curve_name: &str, opacity: f64) -> bool {
        let Some(curve) = self.curves.get(curve_name) else {
            return false;
        };
        let old = curve.style().filling.opacity;
        if old == opacity {
            return false;
        }
        self.exec(
            curve_name,
            Box::new(PropertyCommand::new(
                "change filling opacity",
                old,
                opacity,
                CurveEngine::set_fill_opacity,
            )),
        )
    }

    // Autoscaling.

    /// Tight logical extent over all visible curves' bound data, with
    /// degenerate ranges padded on both sides. `None` when no visible
    /// curve has any usable data.
    #[must_use]
    pub fn auto_extent(&self) -> Option<PlotExtent> {
        let mut x_min = f64::INFINITY;
        let mut x_max = f64::NEG_INFINITY;
        let mut y_min = f64::INFINITY;
        let mut y_max = f64::NEG_INFINITY;

        for curve in self.curves.values() {
            if !curve.is_visible() {
                continue;
            }
            let (Some(x), Some(y)) = (curve.x_column(), curve.y_column()) else {
                continue;
            };
            x_min = x_min.min(x.minimum());
            x_max = x_max.max(x.maximum());
            y_min = y_min.min(y.minimum());
            y_max = y_max.max(y.maximum());
        }

        if !x_min.is_finite() || !x_max.is_finite() || !y_min.is_finite() || !y_max.is_finite() {
            return None;
        }

        let (x_min, x_max) = nice_range(x_min, x_max);
        let (y_min, y_max) = nice_range(y_min, y_max);
        PlotExtent::new(x_min, x_max, y_min, y_max).ok()
    }
}

/// Pads a degenerate range so it spans something. A zero-width range
/// around a nonzero value gets ±10% of the value; around zero it falls
/// back to a unit span.
#[must_use]
pub fn nice_range(min: f64, max: f64) -> (f64, f64) {
    if min < max {
        return (min, max);
    }
    if min == 0.0 && max == 0.0 {
        return (-0.5, 0.5);
    }
    let pad = min.abs() * DEGENERATE_RANGE_PADDING;
    (min - pad, max + pad)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> Document {
        let extent = PlotExtent::new(0.0, 10.0, 0.0, 10.0).expect("extent");
        Document::new(CartesianCoordinateSystem::identity(extent).expect("coordinate system"))
    }

    #[test]
    fn exec_undo_redo_walk_the_history() {
        let mut doc = document();
        doc.add_curve("c").expect("curve");

        assert!(doc.set_values_distance("c", 9.0));
        assert!(doc.set_values_rotation("c", 45.0));
        assert!(doc.can_undo());

        assert!(doc.undo());
        assert_eq!(doc.curve("c").unwrap().style().values.rotation, 0.0);
        assert_eq!(doc.curve("c").unwrap().style().values.distance, 9.0);

        assert!(doc.redo());
        assert_eq!(doc.curve("c").unwrap().style().values.rotation, 45.0);

        assert!(doc.undo());
        assert!(doc.undo());
        assert_eq!(doc.curve("c").unwrap().style().values.distance, 5.0);
        assert!(!doc.can_undo());
    }

    #[test]
    fn no_op_edits_do_not_pollute_the_history() {
        let mut doc = document();
        doc.add_curve("c").expect("curve");
        assert!(!doc.set_values_distance("c", 5.0));
        assert!(!doc.can_undo());
    }

    #[test]
    fn fresh_edit_clears_the_redo_branch() {
        let mut doc = document();
        doc.add_curve("c").expect("curve");
        doc.set_values_distance("c", 9.0);
        doc.undo();
        assert!(doc.can_redo());
        doc.set_values_rotation("c", 30.0);
        assert!(!doc.can_redo());
    }

    #[test]
    fn column_rebinding_is_undoable() {
        let mut doc = document();
        doc.add_curve("c").expect("curve");
        let x = doc.add_column(DataColumn::from_values(1, "x", &[1.0, 2.0]));
        let y = doc.add_column(DataColumn::from_values(2, "y", &[3.0, 4.0]));

        assert!(doc.set_x_column("c", Some(x)));
        assert!(doc.set_y_column("c", Some(y)));
        assert_eq!(doc.curve("c").unwrap().geometry().len(), 2);

        doc.undo();
        assert!(doc.curve("c").unwrap().y_column().is_none());
        assert!(doc.curve("c").unwrap().geometry().is_empty());
    }

    #[test]
    fn replace_column_refreshes_bound_curves() {
        let mut doc = document();
        doc.add_curve("c").expect("curve");
        let x = doc.add_column(DataColumn::from_values(1, "x", &[1.0, 2.0]));
        let y = doc.add_column(DataColumn::from_values(2, "y", &[3.0, 4.0]));
        doc.set_x_column("c", Some(x));
        doc.set_y_column("c", Some(y));

        doc.replace_column(DataColumn::from_values(2, "y", &[3.0, 4.0, 5.0]));
        // Third row has no x value, so still two points.
        assert_eq!(doc.curve("c").unwrap().geometry().len(), 2);

        doc.replace_column(DataColumn::from_values(1, "x", &[1.0, 2.0, 3.0]));
        assert_eq!(doc.curve("c").unwrap().geometry().len(), 3);
    }

    #[test]
    fn removing_a_column_unbinds_every_curve() {
        let mut doc = document();
        doc.add_curve("c").expect("curve");
        let x = doc.add_column(DataColumn::from_values(1, "x", &[1.0]));
        let y = doc.add_column(DataColumn::from_values(2, "y", &[2.0]));
        doc.set_x_column("c", Some(x));
        doc.set_y_column("c", Some(y));

        doc.remove_column(2);
        assert!(doc.curve("c").unwrap().y_column().is_none());
        assert!(doc.curve("c").unwrap().geometry().is_empty());
    }

    #[test]
    fn auto_extent_covers_all_visible_curves() {
        let mut doc = document();
        doc.add_curve("c").expect("curve");
        let x = doc.add_column(DataColumn::from_values(1, "x", &[1.0, 4.0]));
        let y = doc.add_column(DataColumn::from_values(2, "y", &[-3.0, 7.0]));
        doc.set_x_column("c", Some(x));
        doc.set_y_column("c", Some(y));

        let extent = doc.auto_extent().expect("extent");
        assert_eq!(extent.x_min, 1.0);
        assert_eq!(extent.x_max, 4.0);
        assert_eq!(extent.y_min, -3.0);
        assert_eq!(extent.y_max, 7.0);
    }

    #[test]
    fn degenerate_ranges_are_padded() {
        assert_eq!(nice_range(0.0, 0.0), (-0.5, 0.5));
        let (min, max) = nice_range(10.0, 10.0);
        assert_eq!(min, 9.0);
        assert_eq!(max, 11.0);
        assert_eq!(nice_range(1.0, 2.0), (1.0, 2.0));
    }

    #[test]
    fn removing_a_curve_drops_its_history() {
        let mut doc = document();
        doc.add_curve("c").expect("curve");
        doc.set_values_distance("c", 9.0);
        assert!(doc.remove_curve("c"));
        assert!(!doc.can_undo());
        assert!(!doc.undo());
    }
}
