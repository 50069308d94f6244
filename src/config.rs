//! Tunables for schema detection and normalization.
//!
//! Everything has a [`Default`] matching the stock detection heuristics. A [`LoadConfig`] can
//! also be read from JSON; missing keys fall back to defaults:
//!
//! ```rust
//! use price_series::config::{DuplicatePolicy, LoadConfig};
//!
//! let cfg = LoadConfig::from_json_str(r#"{
//!     "detector": { "min_wide_date_columns": 3 },
//!     "normalize": { "duplicates": "keep_last" }
//! }"#).unwrap();
//! assert_eq!(cfg.detector.min_wide_date_columns, 3);
//! assert_eq!(cfg.detector.region_synonyms[0], "city");
//! assert_eq!(cfg.normalize.duplicates, DuplicatePolicy::KeepLast);
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::LoadResult;

/// Ranked synonym lists and orientation thresholds used by the schema detector.
///
/// Synonym lists are matched case-insensitively, in list order; see
/// [`crate::processing::detect`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub region_synonyms: Vec<String>,
    pub date_synonyms: Vec<String>,
    pub value_synonyms: Vec<String>,
    /// Absolute floor on the number of date-like headers for a wide table.
    pub min_wide_date_columns: usize,
    /// Fraction of non-region columns that must be date-like for a wide table.
    pub wide_date_ratio: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            region_synonyms: strings(&[
                "city",
                "regionname",
                "region",
                "metro",
                "location",
                "area",
                "name",
            ]),
            date_synonyms: strings(&["date", "month", "time", "period", "year_month"]),
            value_synonyms: strings(&[
                "index",
                "value",
                "hpi",
                "price",
                "priceindex",
                "nsa",
                "house_price_index",
            ]),
            min_wide_date_columns: 6,
            wide_date_ratio: 0.3,
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}

/// What to do when a date cell matches none of the strict formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFallback {
    /// Try a set of common free-form encodings (RFC 3339, RFC 2822, `Jan 2020`, ...).
    #[default]
    Generic,
    /// Strict formats only; anything else is discarded.
    Disabled,
}

/// How repeated (region, date) pairs are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Keep every observation, in input order.
    #[default]
    KeepAll,
    /// Keep only the last observation seen for each (region, date).
    KeepLast,
}

/// Options for [`crate::processing::normalize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct NormalizeOptions {
    pub date_fallback: DateFallback,
    pub duplicates: DuplicatePolicy,
}

/// Detector + normalizer configuration bundle.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    pub detector: DetectorConfig,
    pub normalize: NormalizeOptions,
}

impl LoadConfig {
    /// Parse a configuration from a JSON document.
    pub fn from_json_str(input: &str) -> LoadResult<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Read a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> LoadResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}
