//! `price-series` turns loosely structured regional price-index tables into a canonical,
//! region-grouped time series ready for charting.
//!
//! Real-world exports disagree on everything: column names (`City`, `RegionName`, `metro`),
//! orientation (one column per month, or one row per observation) and date encoding
//! (`2020-01`, `2020/01/31`, `202001`, `2020`). The crate guesses the layout from the header,
//! normalizes every row it can, silently drops the ones it cannot, and hands back a sorted
//! [`series::SeriesIndex`].
//!
//! ## Pipeline
//!
//! ```text
//! file --ingestion--> RawTable --detect--> SchemaDescriptor --normalize--> SeriesIndex
//! SeriesIndex + Session --scene()--> Scene --> Renderer
//! ```
//!
//! ## Quick example: wide table
//!
//! ```rust
//! use price_series::processing::{detect, normalize, Orientation};
//! use price_series::types::RawTable;
//!
//! let table = RawTable::from_text_rows(
//!     &["RegionName", "2020-01", "2020-02", "2020-03", "2020-04", "2020-05", "2020-06"],
//!     &[vec!["Metro A", "100", "101", "99", "102", "103", "104"]],
//! );
//!
//! let schema = detect(&table.header).unwrap();
//! assert_eq!(schema.orientation(), Orientation::Wide);
//!
//! let index = normalize(&table.rows, &schema).unwrap();
//! assert_eq!(index.get("Metro A").unwrap().len(), 6);
//! ```
//!
//! ## Loading a file
//!
//! ```no_run
//! use price_series::ingestion::{load_from_path, LoadOptions};
//! use price_series::scenes::Session;
//!
//! # fn main() -> Result<(), price_series::LoadError> {
//! let loaded = load_from_path("cities-month-NSA.csv", &LoadOptions::default())?;
//! let session = Session::new(&loaded.index);
//! let scene = session.scene(&loaded.index);
//! println!("regions={} scene={:?}", loaded.index.region_count(), scene.map(|s| s.title()));
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: format readers (CSV, JSON, Parquet, Excel) and the unified loader
//! - [`processing`]: schema detection, date parsing and normalization
//! - [`series`]: the canonical [`series::SeriesIndex`] and its exports
//! - [`scenes`]: chart scene models, the [`scenes::Renderer`] trait and [`scenes::Session`]
//! - [`config`]: detector/normalizer tunables
//! - [`types`]: raw table and observation types
//! - [`error`]: the shared error type
//! - [`telemetry`]: optional tracing subscriber setup

pub mod config;
pub mod error;
pub mod ingestion;
pub mod processing;
pub mod scenes;
pub mod series;
pub mod telemetry;
pub mod types;

pub use error::{LoadError, LoadResult};
