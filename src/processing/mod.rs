//! The normalization core: schema detection, date parsing and row normalization.
//!
//! The core is pure and synchronous. It never fails on a single bad row; the only errors are
//! [`crate::LoadError::Schema`] (required columns not found) and
//! [`crate::LoadError::EmptyResult`] (nothing survived validation).
//!
//! ## Example: detect -> normalize
//!
//! ```rust
//! use price_series::processing::{detect, normalize, Orientation};
//! use price_series::types::RawTable;
//!
//! let table = RawTable::from_text_rows(
//!     &["city", "date", "index"],
//!     &[
//!         vec!["X", "2021/01", "50"],
//!         vec!["X", "", "60"],
//!         vec!["X", "2021/02", "bad"],
//!     ],
//! );
//!
//! let schema = detect(&table.header).unwrap();
//! assert_eq!(schema.orientation(), Orientation::Long);
//!
//! let index = normalize(&table.rows, &schema).unwrap();
//! assert_eq!(index.len(), 1);
//! assert_eq!(index.latest("X").unwrap().value, 50.0);
//! ```

pub mod dates;
pub mod detect;
pub mod normalize;

pub use dates::{looks_like_date_header, parse_date_smart, DateChain, DateParser, GenericDateParser, StrictFormat};
pub use detect::{detect, Layout, Orientation, SchemaDescriptor, SchemaDetector};
pub use normalize::{normalize, parse_value, NormalizeReport, Normalizer};
