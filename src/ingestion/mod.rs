//! Loading entrypoints and format readers.
//!
//! Most callers should use [`load_from_path`] (from [`unified`]) which:
//!
//! - auto-detects format by file extension (or you can override via [`LoadOptions`])
//! - reads the file into a [`crate::types::RawTable`]
//! - detects the schema and normalizes the rows into a [`crate::series::SeriesIndex`]
//! - optionally reports success/failure/alerts to a [`LoadObserver`]
//!
//! Format-specific readers are also available under:
//! - [`csv`]
//! - [`json`]
//! - [`parquet`]

pub mod csv;
#[cfg(feature = "excel")]
pub mod excel;
pub mod json;
pub mod observability;
pub mod parquet;
pub mod unified;

pub use observability::{
    CompositeObserver, FileObserver, LoadContext, LoadObserver, LoadSeverity, LoadStats, TracingObserver,
};
pub use unified::{
    load_from_path, load_table, read_table_from_path, InputFormat, LoadOptions, LoadedSeries,
};
