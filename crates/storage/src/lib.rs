//! Tabular export of synthetic test samples.
//!
//! Both formats carry every [`LabeledSample`](types::LabeledSample) field in
//! [`COLUMNS`] order:
//! - **CSV**: header row, RFC 4180 quoting
//! - **Parquet**: Arrow schema, Snappy compression

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use types::LabeledSample;

pub mod csv_writer;
pub mod error;
pub mod parquet_writer;

pub use csv_writer::{write_csv, write_csv_to};
pub use error::{StorageError, StorageResult};
pub use parquet_writer::{ParquetWriter, sample_schema, write_parquet};

/// Export column names, in order.
pub const COLUMNS: [&str; 12] = [
    "test_id",
    "test_category",
    "test_type",
    "temperature",
    "humidity",
    "vibration",
    "pressure",
    "risk_score",
    "pass_fail",
    "test_duration",
    "test_date",
    "standard",
];

/// Output file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Parquet,
}

impl ExportFormat {
    /// Infer from a file extension; anything but `.parquet` is CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("parquet") => ExportFormat::Parquet,
            _ => ExportFormat::Csv,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Parquet => "parquet",
        })
    }
}

impl FromStr for ExportFormat {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "parquet" => Ok(ExportFormat::Parquet),
            other => Err(StorageError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Write `samples` to `path` in `format`. Returns the row count.
pub fn export_samples<P: AsRef<Path>>(
    path: P,
    samples: &[LabeledSample],
    format: ExportFormat,
) -> StorageResult<usize> {
    match format {
        ExportFormat::Csv => write_csv(path, samples),
        ExportFormat::Parquet => write_parquet(path, samples),
    }
}
