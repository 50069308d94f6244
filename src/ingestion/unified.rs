//! Unified loading entrypoint.
//!
//! Most callers should use [`load_from_path`], which reads a file into a
//! [`crate::types::RawTable`], detects its schema and normalizes it into a
//! [`crate::series::SeriesIndex`].
//!
//! - If [`LoadOptions::format`] is `None`, the input format is inferred from the file extension.
//! - If a [`super::observability::LoadObserver`] is provided, success/failure/alerts are
//!   reported to it.

use std::error::Error as StdError;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::config::LoadConfig;
use crate::error::{LoadError, LoadResult};
use crate::processing::{Normalizer, SchemaDescriptor, SchemaDetector};
use crate::series::SeriesIndex;
use crate::types::RawTable;

use super::observability::{LoadContext, LoadObserver, LoadSeverity, LoadStats};
use super::{csv, json, parquet};

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Comma-separated values.
    Csv,
    /// JSON array-of-objects or NDJSON.
    Json,
    /// Apache Parquet.
    Parquet,
    /// Spreadsheet/workbook formats (feature-gated behind `excel`).
    Excel,
}

impl InputFormat {
    /// Parse an input format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" | "ndjson" => Some(Self::Json),
            "parquet" | "pq" => Some(Self::Parquet),
            "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => Some(Self::Excel),
            _ => None,
        }
    }
}

/// Options controlling unified loading.
///
/// Use [`Default`] for common cases.
#[derive(Clone, Default)]
pub struct LoadOptions {
    /// If `None`, auto-detect format from file extension.
    pub format: Option<InputFormat>,
    /// Sheet to read from a workbook; `None` means the first sheet.
    pub excel_sheet: Option<String>,
    /// Detector and normalizer configuration.
    pub config: LoadConfig,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn LoadObserver>>,
    /// Severity threshold at which `on_alert` is invoked. `None` disables alerts.
    pub alert_at_or_above: Option<LoadSeverity>,
}

impl fmt::Debug for LoadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadOptions")
            .field("format", &self.format)
            .field("excel_sheet", &self.excel_sheet)
            .field("config", &self.config)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

/// Result of a successful load: the detected schema and the normalized series.
#[derive(Debug, Clone)]
pub struct LoadedSeries {
    pub schema: SchemaDescriptor,
    pub index: SeriesIndex,
}

impl LoadedSeries {
    fn stats(&self) -> LoadStats {
        let report = self.index.report();
        LoadStats {
            rows: report.rows,
            observations: self.index.len(),
            regions: self.index.region_count(),
            dropped: report.dropped(),
            duplicates: report.duplicates,
        }
    }
}

/// Detect and normalize an already materialized table.
///
/// Fails with [`LoadError::Schema`] or [`LoadError::EmptyResult`]; no partial result is returned.
pub fn load_table(table: &RawTable, config: &LoadConfig) -> LoadResult<LoadedSeries> {
    let schema = SchemaDetector::new(config.detector.clone()).detect_table(table)?;
    let index = Normalizer::new(config.normalize).normalize_table(table, &schema)?;
    Ok(LoadedSeries { schema, index })
}

/// Read a raw table from `path` without normalizing it.
pub fn read_table_from_path(path: impl AsRef<Path>, options: &LoadOptions) -> LoadResult<RawTable> {
    let path = path.as_ref();
    let fmt = match options.format {
        Some(f) => f,
        None => infer_format_from_path(path)?,
    };
    read_table(path, fmt, options.excel_sheet.as_deref())
}

/// Unified loading entry point for path-based sources.
///
/// When an observer is configured, this function reports:
///
/// - `on_success` on success, with row/observation/region counts
/// - `on_failure` on failure, with a computed severity
/// - `on_alert` on failure when the computed severity is >= `options.alert_at_or_above`
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
///
/// use price_series::ingestion::{load_from_path, LoadOptions, LoadSeverity, TracingObserver};
///
/// # fn main() -> Result<(), price_series::LoadError> {
/// let opts = LoadOptions {
///     observer: Some(Arc::new(TracingObserver)),
///     alert_at_or_above: Some(LoadSeverity::Critical),
///     ..Default::default()
/// };
///
/// let loaded = load_from_path("cities-month-NSA.csv", &opts)?;
/// println!("regions={}", loaded.index.region_count());
/// # Ok(())
/// # }
/// ```
pub fn load_from_path(path: impl AsRef<Path>, options: &LoadOptions) -> LoadResult<LoadedSeries> {
    let path = path.as_ref();
    let fmt = match options.format {
        Some(f) => f,
        None => infer_format_from_path(path)?,
    };

    let ctx = LoadContext {
        path: path.to_path_buf(),
        format: fmt,
    };

    let result = read_table(path, fmt, options.excel_sheet.as_deref()).and_then(|table| {
        debug!(
            path = %path.display(),
            rows = table.row_count(),
            columns = table.header.len(),
            "read raw table"
        );
        load_table(&table, &options.config)
    });

    if let Some(obs) = options.observer.as_ref() {
        match &result {
            Ok(loaded) => obs.on_success(&ctx, loaded.stats()),
            Err(e) => {
                let sev = severity_for_error(e);
                obs.on_failure(&ctx, sev, e);
                if options.alert_at_or_above.is_some_and(|threshold| sev >= threshold) {
                    obs.on_alert(&ctx, sev, e);
                }
            }
        }
    }

    result
}

fn read_table(path: &Path, fmt: InputFormat, sheet: Option<&str>) -> LoadResult<RawTable> {
    match fmt {
        InputFormat::Csv => csv::read_csv_from_path(path),
        InputFormat::Json => json::read_json_from_path(path),
        InputFormat::Parquet => parquet::read_parquet_from_path(path),
        InputFormat::Excel => read_excel_dispatch(path, sheet),
    }
}

fn severity_for_error(e: &LoadError) -> LoadSeverity {
    match e {
        LoadError::Io(_) => LoadSeverity::Critical,
        LoadError::Parquet(err) => {
            // Parquet errors often wrap IO, but not always in a structured way.
            if error_chain_contains_io(err) {
                LoadSeverity::Critical
            } else {
                LoadSeverity::Error
            }
        }
        LoadError::Csv(err) => match err.kind() {
            ::csv::ErrorKind::Io(_) => LoadSeverity::Critical,
            _ => LoadSeverity::Error,
        },
        #[cfg(feature = "excel")]
        LoadError::Excel(_) => LoadSeverity::Error,
        LoadError::Json(_)
        | LoadError::Format { .. }
        | LoadError::Schema { .. }
        | LoadError::EmptyResult { .. } => LoadSeverity::Error,
    }
}

fn error_chain_contains_io(e: &(dyn StdError + 'static)) -> bool {
    let mut cur: Option<&(dyn StdError + 'static)> = Some(e);
    while let Some(err) = cur {
        if err.is::<std::io::Error>() {
            return true;
        }
        cur = err.source();
    }
    false
}

fn path_extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|s| s.to_str())
}

fn infer_format_from_path(path: &Path) -> LoadResult<InputFormat> {
    let ext = path_extension(path).ok_or_else(|| {
        LoadError::format(format!(
            "cannot infer format: path has no extension ({})",
            path.display()
        ))
    })?;

    InputFormat::from_extension(ext).ok_or_else(|| {
        LoadError::format(format!(
            "cannot infer format from extension '{ext}' for path ({})",
            path.display()
        ))
    })
}

fn read_excel_dispatch(path: &Path, sheet: Option<&str>) -> LoadResult<RawTable> {
    // Avoid unused warnings when the feature is off.
    let _ = (path, sheet);

    #[cfg(feature = "excel")]
    {
        super::excel::read_excel_from_path(path, sheet)
    }

    #[cfg(not(feature = "excel"))]
    {
        Err(LoadError::format(
            "excel ingestion not enabled (enable cargo feature 'excel')",
        ))
    }
}
