use thiserror::Error;

/// Convenience result type for loading and normalization.
pub type LoadResult<T> = Result<T, LoadError>;

/// Error type returned by ingestion, schema detection and normalization.
///
/// A single enum is shared across CSV/JSON/Parquet (and optional Excel) ingestion and the
/// normalization core. Per-row defects (bad dates, bad numbers, blank regions) are never
/// reported through this type; they are filtered during normalization.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "excel")]
    /// Excel ingestion error (feature-gated behind `excel`).
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// CSV ingestion or export error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON parse error (input data or configuration).
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Parquet ingestion error.
    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// The input cannot be read as a table at all (unknown extension, non-object JSON rows, ...).
    #[error("unreadable input: {message}")]
    Format { message: String },

    /// Schema detection could not identify the region, date or value column(s).
    #[error("schema error: {message}")]
    Schema { message: String },

    /// The structure was identified but no row survived validation.
    #[error("no usable data: 0 observations survived normalization of {rows} row(s)")]
    EmptyResult { rows: usize },
}

impl LoadError {
    pub(crate) fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }

    pub(crate) fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }

    /// Short text suitable for an empty/error state in a UI.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Schema { .. } => "cannot read this file's structure",
            Self::EmptyResult { .. } => "no usable data",
            _ => "failed to load file",
        }
    }
}
