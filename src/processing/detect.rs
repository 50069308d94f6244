//! Schema detection: which column holds the region, and is the table wide or long?
//!
//! Detection only looks at header names, so the outcome is deterministic for a given header
//! regardless of row content.
//!
//! Column resolution walks a ranked synonym list: for each synonym in list order, the first
//! header (in header order) whose lowercased name contains the synonym wins. Swapping the two
//! loops changes which column is picked when several synonyms match.

use tracing::debug;

use crate::config::DetectorConfig;
use crate::error::{LoadError, LoadResult};
use crate::types::RawTable;

use super::dates::looks_like_date_header;

/// Table orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// One row per region, one column per date.
    Wide,
    /// One row per (region, date, value) triple.
    Long,
}

/// Orientation-specific column assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    /// Columns whose header names encode a date, in header order.
    Wide { date_columns: Vec<String> },
    /// Explicit date and value columns.
    Long {
        date_column: String,
        value_column: String,
    },
}

/// Output of schema detection. Every referenced column exists in the inspected header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDescriptor {
    pub region_column: String,
    pub layout: Layout,
}

impl SchemaDescriptor {
    /// Orientation tag of [`Self::layout`].
    pub fn orientation(&self) -> Orientation {
        match self.layout {
            Layout::Wide { .. } => Orientation::Wide,
            Layout::Long { .. } => Orientation::Long,
        }
    }

    /// All columns the normalizer will read.
    pub fn referenced_columns(&self) -> Vec<&str> {
        let mut cols = vec![self.region_column.as_str()];
        match &self.layout {
            Layout::Wide { date_columns } => cols.extend(date_columns.iter().map(String::as_str)),
            Layout::Long {
                date_column,
                value_column,
            } => {
                cols.push(date_column);
                cols.push(value_column);
            }
        }
        cols
    }
}

/// Header-based schema detector.
#[derive(Debug, Clone, Default)]
pub struct SchemaDetector {
    config: DetectorConfig,
}

impl SchemaDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Detect the schema of `table` from its header.
    pub fn detect_table(&self, table: &RawTable) -> LoadResult<SchemaDescriptor> {
        self.detect(&table.header)
    }

    /// Classify `header` and resolve the region, date and value column(s).
    ///
    /// Fails with [`LoadError::Schema`] when no region column matches, or when a long table has
    /// no date or no value column.
    pub fn detect<S: AsRef<str>>(&self, header: &[S]) -> LoadResult<SchemaDescriptor> {
        let header: Vec<&str> = header.iter().map(AsRef::as_ref).collect();
        let cfg = &self.config;

        let region_column = find_column(&header, &cfg.region_synonyms)
            .ok_or_else(|| LoadError::schema(format!("no region column. headers={header:?}")))?
            .to_owned();

        let remaining: Vec<&str> = header
            .iter()
            .copied()
            .filter(|h| *h != region_column)
            .collect();
        let date_columns: Vec<String> = remaining
            .iter()
            .filter(|h| looks_like_date_header(h))
            .map(|h| (*h).to_owned())
            .collect();

        let needed = (cfg.min_wide_date_columns as f64).max(cfg.wide_date_ratio * remaining.len() as f64);
        if date_columns.len() as f64 >= needed {
            debug!(
                region_column = %region_column,
                date_columns = date_columns.len(),
                "detected wide layout"
            );
            return Ok(SchemaDescriptor {
                region_column,
                layout: Layout::Wide { date_columns },
            });
        }

        let date_column = find_column(&remaining, &cfg.date_synonyms);
        let value_column = date_column.and_then(|date_col| {
            let candidates: Vec<&str> = remaining.iter().copied().filter(|h| *h != date_col).collect();
            find_column(&candidates, &cfg.value_synonyms)
        });

        match (date_column, value_column) {
            (Some(date_column), Some(value_column)) => {
                debug!(
                    region_column = %region_column,
                    date_column,
                    value_column,
                    "detected long layout"
                );
                Ok(SchemaDescriptor {
                    region_column,
                    layout: Layout::Long {
                        date_column: date_column.to_owned(),
                        value_column: value_column.to_owned(),
                    },
                })
            }
            _ => Err(LoadError::schema(format!(
                "no date/value column (date={date_column:?}, value={value_column:?}). headers={header:?}"
            ))),
        }
    }
}

/// Detect with the default synonym lists and thresholds.
pub fn detect<S: AsRef<str>>(header: &[S]) -> LoadResult<SchemaDescriptor> {
    SchemaDetector::default().detect(header)
}

/// Ranked synonym lookup: synonym order first, then header order.
fn find_column<'a>(header: &[&'a str], synonyms: &[String]) -> Option<&'a str> {
    let lowered: Vec<String> = header.iter().map(|h| h.to_lowercase()).collect();
    synonyms
        .iter()
        .map(|s| s.to_lowercase())
        .filter(|s| !s.is_empty())
        .find_map(|syn| {
            lowered
                .iter()
                .position(|low| low.contains(&syn))
                .map(|i| header[i])
        })
}
