//! Export errors.

/// Errors that can occur while writing sample exports.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Unsupported export format '{0}' (expected csv or parquet)")]
    UnsupportedFormat(String),
}

/// Result alias for this crate.
pub type StorageResult<T> = Result<T, StorageError>;
