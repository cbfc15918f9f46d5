use std::fmt;

use crate::curve::engine::CurveEngine;

/// An undoable mutation of one curve. Commands capture both the old and
/// the new value at construction, so apply and revert are symmetric and
/// never need to re-read engine state.
pub trait CurveCommand: fmt::Debug {
    fn description(&self) -> &str;
    fn apply(&self, curve: &mut CurveEngine);
    fn revert(&self, curve: &mut CurveEngine);
}

/// Generic old/new property command. The setter is a plain function
/// pointer into the engine, so one type covers every undoable property.
pub struct PropertyCommand<T: Clone> {
    description: String,
    old: T,
    new: T,
    set: fn(&mut CurveEngine, T),
}

impl<T: Clone> PropertyCommand<T> {
    #[must_use]
    pub fn new(description: impl Into<String>, old: T, new: T, set: fn(&mut CurveEngine, T)) -> Self {
        Self {
            description: description.into(),
            old,
            new,
            set,
        }
    }
}

impl<T: Clone> fmt::Debug for PropertyCommand<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyCommand")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl<T: Clone> CurveCommand for PropertyCommand<T> {
    fn description(&self) -> &str {
        &self.description
    }

    fn apply(&self, curve: &mut CurveEngine) {
        (self.set)(curve, self.new.clone());
    }

    fn revert(&self, curve: &mut CurveEngine) {
        (self.set)(curve, self.old.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::coords::CartesianCoordinateSystem;
    use crate::core::types::PlotExtent;
    use std::rc::Rc;

    #[test]
    fn apply_and_revert_are_symmetric() {
        let extent = PlotExtent::new(0.0, 1.0, 0.0, 1.0).expect("extent");
        let cs = Rc::new(CartesianCoordinateSystem::identity(extent).expect("coordinate system"));
        let mut curve = CurveEngine::new("c", &cs);

        let command = PropertyCommand::new(
            "change values distance",
            curve.style().values.distance,
            12.0,
            CurveEngine::set_values_distance,
        );

        command.apply(&mut curve);
        assert_eq!(curve.style().values.distance, 12.0);
        command.revert(&mut curve);
        assert_eq!(curve.style().values.distance, 5.0);
    }
}
