//! Raw rows -> canonical observations.

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::config::{DuplicatePolicy, NormalizeOptions};
use crate::error::{LoadError, LoadResult};
use crate::series::{sort_observations, SeriesIndex};
use crate::types::{CellValue, Observation, RawRow, RawTable};

use super::dates::DateChain;
use super::detect::{Layout, SchemaDescriptor};

/// Aggregate counters from one normalization run.
///
/// A candidate is one (row, date column) pair for wide tables and one row for long tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NormalizeReport {
    pub rows: usize,
    pub candidates: usize,
    pub kept: usize,
    pub dropped_region: usize,
    pub dropped_date: usize,
    pub dropped_value: usize,
    /// Observations sharing a (region, date) with an earlier one.
    pub duplicates: usize,
    /// Duplicates removed under [`DuplicatePolicy::KeepLast`].
    pub duplicates_removed: usize,
}

impl NormalizeReport {
    pub fn dropped(&self) -> usize {
        self.dropped_region + self.dropped_date + self.dropped_value
    }
}

/// Turns raw rows into a [`SeriesIndex`] according to a [`SchemaDescriptor`].
#[derive(Debug)]
pub struct Normalizer {
    options: NormalizeOptions,
    dates: DateChain,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(NormalizeOptions::default())
    }
}

impl Normalizer {
    pub fn new(options: NormalizeOptions) -> Self {
        Self {
            options,
            dates: DateChain::with_fallback(options.date_fallback),
        }
    }

    /// Replace the date parser chain (e.g. to add a site-specific encoding).
    pub fn with_date_chain(mut self, dates: DateChain) -> Self {
        self.dates = dates;
        self
    }

    pub fn options(&self) -> NormalizeOptions {
        self.options
    }

    pub fn normalize_table(&self, table: &RawTable, schema: &SchemaDescriptor) -> LoadResult<SeriesIndex> {
        self.normalize(&table.rows, schema)
    }

    /// Normalize `rows`.
    ///
    /// Rows with a blank region, an unparseable date or a non-numeric/non-finite value are
    /// skipped. Fails with [`LoadError::EmptyResult`] only when nothing survives.
    pub fn normalize(&self, rows: &[RawRow], schema: &SchemaDescriptor) -> LoadResult<SeriesIndex> {
        let mut report = NormalizeReport {
            rows: rows.len(),
            ..NormalizeReport::default()
        };

        let mut observations = match &schema.layout {
            Layout::Wide { date_columns } => {
                self.collect_wide(rows, &schema.region_column, date_columns, &mut report)
            }
            Layout::Long {
                date_column,
                value_column,
            } => self.collect_long(rows, &schema.region_column, date_column, value_column, &mut report),
        };

        sort_observations(&mut observations);
        report.duplicates = count_duplicates(&observations);
        if self.options.duplicates == DuplicatePolicy::KeepLast {
            let before = observations.len();
            observations = keep_last(observations);
            report.duplicates_removed = before - observations.len();
        }
        report.kept = observations.len();

        debug!(
            rows = report.rows,
            candidates = report.candidates,
            kept = report.kept,
            dropped_region = report.dropped_region,
            dropped_date = report.dropped_date,
            dropped_value = report.dropped_value,
            "normalized observations"
        );
        if report.duplicates > 0 {
            warn!(
                duplicates = report.duplicates,
                removed = report.duplicates_removed,
                "repeated (region, date) pairs in input"
            );
        }

        if observations.is_empty() {
            return Err(LoadError::EmptyResult { rows: rows.len() });
        }
        Ok(SeriesIndex::from_sorted(observations, report))
    }

    fn collect_wide(
        &self,
        rows: &[RawRow],
        region_column: &str,
        date_columns: &[String],
        report: &mut NormalizeReport,
    ) -> Vec<Observation> {
        // Dates come from the header, so parse each column name once.
        let columns: Vec<(&str, Option<NaiveDate>)> = date_columns
            .iter()
            .map(|c| (c.as_str(), self.dates.parse(c)))
            .collect();

        let mut out = Vec::with_capacity(rows.len() * columns.len());
        for row in rows {
            report.candidates += columns.len();
            let Some(region) = row.get(region_column).as_text() else {
                report.dropped_region += columns.len();
                continue;
            };
            for &(column, date) in &columns {
                let Some(date) = date else {
                    report.dropped_date += 1;
                    continue;
                };
                match parse_value(row.get(column)) {
                    Some(value) => out.push(Observation::new(&*region, date, value)),
                    None => report.dropped_value += 1,
                }
            }
        }
        out
    }

    fn collect_long(
        &self,
        rows: &[RawRow],
        region_column: &str,
        date_column: &str,
        value_column: &str,
        report: &mut NormalizeReport,
    ) -> Vec<Observation> {
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            report.candidates += 1;
            let Some(region) = row.get(region_column).as_text() else {
                report.dropped_region += 1;
                continue;
            };
            let Some(date) = self.parse_date_cell(row.get(date_column)) else {
                report.dropped_date += 1;
                continue;
            };
            match parse_value(row.get(value_column)) {
                Some(value) => out.push(Observation::new(region, date, value)),
                None => report.dropped_value += 1,
            }
        }
        out
    }

    fn parse_date_cell(&self, cell: &CellValue) -> Option<NaiveDate> {
        cell.as_text().and_then(|s| self.dates.parse(&s))
    }
}

/// Normalize with default options.
pub fn normalize(rows: &[RawRow], schema: &SchemaDescriptor) -> LoadResult<SeriesIndex> {
    Normalizer::default().normalize(rows, schema)
}

/// Numeric value of a cell; blank, non-numeric and non-finite cells are `None`.
pub fn parse_value(cell: &CellValue) -> Option<f64> {
    let v = match cell {
        CellValue::Empty => return None,
        CellValue::Number(n) => *n,
        CellValue::Text(s) => s.trim().parse::<f64>().ok()?,
    };
    v.is_finite().then_some(v)
}

fn same_key(a: &Observation, b: &Observation) -> bool {
    a.date == b.date && a.region == b.region
}

/// Expects sorted input, where equal keys are adjacent.
fn count_duplicates(sorted: &[Observation]) -> usize {
    sorted.windows(2).filter(|w| same_key(&w[0], &w[1])).count()
}

fn keep_last(sorted: Vec<Observation>) -> Vec<Observation> {
    let mut out: Vec<Observation> = Vec::with_capacity(sorted.len());
    for obs in sorted {
        match out.last_mut() {
            Some(prev) if same_key(prev, &obs) => *prev = obs,
            _ => out.push(obs),
        }
    }
    out
}
