//! Core data model types.
//!
//! Ingestion produces a [`RawTable`] (an ordered header plus loosely typed [`RawRow`]s). The
//! normalizer turns that into canonical [`Observation`]s, grouped by region in a
//! [`crate::series::SeriesIndex`].

use std::borrow::Cow;
use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single raw cell as it came out of the source file.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// Missing or blank cell.
    #[default]
    Empty,
    /// Textual cell, stored untrimmed.
    Text(String),
    /// Numeric cell (spreadsheets, Parquet, JSON numbers).
    Number(f64),
}

impl CellValue {
    /// Build a text cell; whitespace-only input becomes [`CellValue::Empty`].
    pub fn from_text(s: impl Into<String>) -> Self {
        let s = s.into();
        if s.trim().is_empty() {
            Self::Empty
        } else {
            Self::Text(s)
        }
    }

    /// Returns `true` for [`CellValue::Empty`].
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Trimmed textual form of the cell, or `None` when empty.
    ///
    /// Integral numbers render without a fractional part (`2020.0` -> `"2020"`), so numeric
    /// year or region-code cells read the same as their CSV spelling.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Empty => None,
            Self::Text(s) => {
                let t = s.trim();
                (!t.is_empty()).then_some(Cow::Borrowed(t))
            }
            Self::Number(n) => Some(Cow::Owned(format_number(*n))),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::from_text(s)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::from_text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

pub(crate) fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

static EMPTY_CELL: CellValue = CellValue::Empty;

/// One raw input row: column name -> cell.
///
/// Columns absent from the row read as [`CellValue::Empty`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawRow {
    cells: HashMap<String, CellValue>,
}

impl RawRow {
    /// Create an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row from `(column, cell)` pairs.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<CellValue>,
    {
        Self {
            cells: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Set a cell, replacing any previous value for `column`.
    pub fn insert(&mut self, column: impl Into<String>, cell: impl Into<CellValue>) {
        self.cells.insert(column.into(), cell.into());
    }

    /// Cell for `column`; missing columns yield [`CellValue::Empty`].
    pub fn get(&self, column: &str) -> &CellValue {
        self.cells.get(column).unwrap_or(&EMPTY_CELL)
    }

    /// Number of cells present in the row.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` if the row carries no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// A raw table: ordered header plus rows.
///
/// The header order matters for schema detection (ties between synonym matches resolve in header
/// order, and wide date columns keep header order).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    /// Column names in source order.
    pub header: Vec<String>,
    /// Data rows (header excluded).
    pub rows: Vec<RawRow>,
}

impl RawTable {
    /// Create a table from header and rows.
    pub fn new(header: Vec<String>, rows: Vec<RawRow>) -> Self {
        Self { header, rows }
    }

    /// Build a table from positional text records, zipping each record with the header.
    ///
    /// Records shorter than the header leave the trailing columns empty; extra trailing cells
    /// are ignored.
    pub fn from_text_rows<S: AsRef<str>>(header: &[S], records: &[Vec<S>]) -> Self {
        let header: Vec<String> = header.iter().map(|h| h.as_ref().to_owned()).collect();
        let rows = records
            .iter()
            .map(|record| {
                RawRow::from_pairs(
                    header
                        .iter()
                        .zip(record.iter())
                        .map(|(h, c)| (h.clone(), CellValue::from_text(c.as_ref()))),
                )
            })
            .collect();
        Self { header, rows }
    }

    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// One validated (region, date, value) triple.
///
/// Invariants: `region` is non-empty and trimmed, `value` is finite. Dates are plain calendar
/// dates (no timezone), so month comparisons are unambiguous.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub region: String,
    pub date: NaiveDate,
    pub value: f64,
}

impl Observation {
    /// Create an observation. Callers in this crate only construct validated values.
    pub fn new(region: impl Into<String>, date: NaiveDate, value: f64) -> Self {
        Self {
            region: region.into(),
            date,
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CellValue, RawRow, RawTable};

    #[test]
    fn blank_text_becomes_empty_cell() {
        assert_eq!(CellValue::from_text("   "), CellValue::Empty);
        assert_eq!(CellValue::from_text(" a "), CellValue::Text(" a ".to_string()));
    }

    #[test]
    fn as_text_trims_and_formats_integral_numbers() {
        assert_eq!(CellValue::from_text(" Metro A ").as_text().as_deref(), Some("Metro A"));
        assert_eq!(CellValue::Number(2020.0).as_text().as_deref(), Some("2020"));
        assert_eq!(CellValue::Number(1.5).as_text().as_deref(), Some("1.5"));
        assert_eq!(CellValue::Empty.as_text(), None);
    }

    #[test]
    fn missing_column_reads_as_empty() {
        let row = RawRow::from_pairs([("city", "X")]);
        assert_eq!(row.get("city"), &CellValue::Text("X".to_string()));
        assert!(row.get("date").is_empty());
    }

    #[test]
    fn from_text_rows_pads_short_records() {
        let table = RawTable::from_text_rows(&["city", "date", "index"], &[vec!["X", "2021-01"]]);
        assert_eq!(table.row_count(), 1);
        assert!(table.rows[0].get("index").is_empty());
        assert_eq!(table.rows[0].len(), 2);
    }
}
