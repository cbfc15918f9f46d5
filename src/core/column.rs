use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity of a column inside a document, used to match change and
/// removal notifications against curve bindings.
pub type ColumnId = u64;

/// Declared interpretation of a column's cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnMode {
    Numeric,
    Text,
    DateTime,
    Month,
    Day,
}

/// One stored cell. `Empty` models a missing value: the row exists but is
/// invalid for every mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Number(f64),
    Text(String),
    DateTime(DateTime<Utc>),
    Empty,
}

/// Ordered sequence of typed cells with validity and mask flags.
///
/// Columns are owned by the containing document; curves hold shared
/// references and are notified of changes and removals by the owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataColumn {
    id: ColumnId,
    name: String,
    mode: ColumnMode,
    cells: Vec<Cell>,
    masked: Vec<bool>,
}

impl DataColumn {
    #[must_use]
    pub fn new(id: ColumnId, name: impl Into<String>, mode: ColumnMode) -> Self {
        Self {
            id,
            name: name.into(),
            mode,
            cells: Vec::new(),
            masked: Vec::new(),
        }
    }

    /// Numeric column from a plain value slice. Non-finite entries become
    /// empty (invalid) cells rather than being dropped, preserving row
    /// indices.
    #[must_use]
    pub fn from_values(id: ColumnId, name: impl Into<String>, values: &[f64]) -> Self {
        let mut column = Self::new(id, name, ColumnMode::Numeric);
        for value in values {
            if value.is_finite() {
                column.push_value(*value);
            } else {
                column.push_empty();
            }
        }
        column
    }

    #[must_use]
    pub fn id(&self) -> ColumnId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn column_mode(&self) -> ColumnMode {
        self.mode
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.cells.len()
    }

    pub fn push_value(&mut self, value: f64) {
        self.cells.push(Cell::Number(value));
        self.masked.push(false);
    }

    pub fn push_text(&mut self, text: impl Into<String>) {
        self.cells.push(Cell::Text(text.into()));
        self.masked.push(false);
    }

    pub fn push_datetime(&mut self, value: DateTime<Utc>) {
        self.cells.push(Cell::DateTime(value));
        self.masked.push(false);
    }

    pub fn push_empty(&mut self) {
        self.cells.push(Cell::Empty);
        self.masked.push(false);
    }

    pub fn set_masked(&mut self, row: usize, masked: bool) {
        if let Some(flag) = self.masked.get_mut(row) {
            *flag = masked;
        }
    }

    #[must_use]
    pub fn is_masked(&self, row: usize) -> bool {
        self.masked.get(row).copied().unwrap_or(false)
    }

    /// A row is valid when it exists and its cell matches the column mode.
    /// Numeric cells must additionally hold a finite value.
    #[must_use]
    pub fn is_valid(&self, row: usize) -> bool {
        match self.cells.get(row) {
            Some(Cell::Number(value)) => {
                matches!(
                    self.mode,
                    ColumnMode::Numeric | ColumnMode::Month | ColumnMode::Day
                ) && value.is_finite()
            }
            Some(Cell::Text(_)) => self.mode == ColumnMode::Text,
            Some(Cell::DateTime(_)) => self.mode == ColumnMode::DateTime,
            Some(Cell::Empty) | None => false,
        }
    }

    /// Stored numeric value; NaN for non-numeric or out-of-range rows.
    #[must_use]
    pub fn value_at(&self, row: usize) -> f64 {
        match self.cells.get(row) {
            Some(Cell::Number(value)) => *value,
            _ => f64::NAN,
        }
    }

    #[must_use]
    pub fn text_at(&self, row: usize) -> Option<&str> {
        match self.cells.get(row) {
            Some(Cell::Text(text)) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub fn datetime_at(&self, row: usize) -> Option<DateTime<Utc>> {
        match self.cells.get(row) {
            Some(Cell::DateTime(value)) => Some(*value),
            _ => None,
        }
    }

    /// Smallest valid, unmasked numeric value; `INFINITY` when none exists,
    /// so callers can detect the empty case the way auto-scaling does.
    #[must_use]
    pub fn minimum(&self) -> f64 {
        self.numeric_values().fold(f64::INFINITY, f64::min)
    }

    /// Largest valid, unmasked numeric value; `NEG_INFINITY` when none.
    #[must_use]
    pub fn maximum(&self) -> f64 {
        self.numeric_values().fold(f64::NEG_INFINITY, f64::max)
    }

    fn numeric_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(row, cell)| match cell {
                Cell::Number(value)
                    if value.is_finite() && !self.is_masked(row) && self.is_valid(row) =>
                {
                    Some(*value)
                }
                _ => None,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_values_preserves_row_indices_for_non_finite_entries() {
        let column = DataColumn::from_values(1, "x", &[1.0, f64::NAN, 3.0]);
        assert_eq!(column.row_count(), 3);
        assert!(column.is_valid(0));
        assert!(!column.is_valid(1));
        assert!(column.is_valid(2));
        assert!(column.value_at(1).is_nan());
    }

    #[test]
    fn masking_does_not_affect_validity() {
        let mut column = DataColumn::from_values(1, "x", &[1.0, 2.0]);
        column.set_masked(1, true);
        assert!(column.is_valid(1));
        assert!(column.is_masked(1));
        assert!(!column.is_masked(5));
    }

    #[test]
    fn min_max_skip_masked_and_invalid_rows() {
        let mut column = DataColumn::from_values(1, "x", &[5.0, -2.0, f64::NAN, 9.0]);
        column.set_masked(3, true);
        assert_eq!(column.minimum(), -2.0);
        assert_eq!(column.maximum(), 5.0);

        let empty = DataColumn::new(2, "empty", ColumnMode::Numeric);
        assert_eq!(empty.minimum(), f64::INFINITY);
        assert_eq!(empty.maximum(), f64::NEG_INFINITY);
    }

    #[test]
    fn mode_mismatched_cells_are_invalid() {
        let mut column = DataColumn::new(1, "t", ColumnMode::Text);
        column.push_text("alpha");
        column.push_value(4.0);
        assert!(column.is_valid(0));
        assert!(!column.is_valid(1));
        assert_eq!(column.text_at(0), Some("alpha"));
        assert!(column.text_at(1).is_none());
    }

    #[test]
    fn datetime_columns_round_trip_through_serde() {
        use chrono::TimeZone;

        let mut column = DataColumn::new(4, "when", ColumnMode::DateTime);
        column.push_datetime(Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 0).unwrap());
        column.push_empty();
        column.set_masked(1, true);

        let json = serde_json::to_string(&column).expect("serialize");
        let restored: DataColumn = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored, column);
        assert_eq!(
            restored.datetime_at(0),
            Some(Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 0).unwrap())
        );
    }
}
