//! Buffered Parquet writer for labeled samples.
//!
//! Columns follow [`COLUMNS`]. Categorical fields are UTF-8 strings,
//! `test_date` is an Arrow `Date32`, and pages are Snappy-compressed.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Date32Builder, Float64Builder, StringBuilder, UInt32Builder};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, NaiveDate};
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use tracing::debug;
use types::LabeledSample;

use crate::error::StorageResult;

/// Buffer size before flushing a row group (number of samples).
const BUFFER_SIZE: usize = 10_000;

/// `NaiveDate::num_days_from_ce` of 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

fn date32(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

/// Arrow schema for exported samples.
pub fn sample_schema() -> Schema {
    Schema::new(vec![
        Field::new("test_id", DataType::Utf8, false),
        Field::new("test_category", DataType::Utf8, false),
        Field::new("test_type", DataType::Utf8, false),
        Field::new("temperature", DataType::Float64, false),
        Field::new("humidity", DataType::Float64, false),
        Field::new("vibration", DataType::Float64, false),
        Field::new("pressure", DataType::Float64, false),
        Field::new("risk_score", DataType::Float64, false),
        Field::new("pass_fail", DataType::Utf8, false),
        Field::new("test_duration", DataType::UInt32, false),
        Field::new("test_date", DataType::Date32, false),
        Field::new("standard", DataType::Utf8, false),
    ])
}

/// Buffered Parquet writer for [`LabeledSample`]s.
pub struct ParquetWriter {
    schema: SchemaRef,
    buffer: Vec<LabeledSample>,
    writer: Option<ArrowWriter<File>>,
    /// Samples already flushed to the file.
    records_written: usize,
}

impl ParquetWriter {
    /// Create the file (and parent directories) and write the schema.
    pub fn new<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        let path = path.as_ref();
        let schema: SchemaRef = Arc::new(sample_schema());

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;

        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build();
        let writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;

        Ok(Self {
            schema,
            buffer: Vec::with_capacity(BUFFER_SIZE),
            writer: Some(writer),
            records_written: 0,
        })
    }

    /// Buffer one sample; flushes when the buffer is full.
    pub fn write_sample(&mut self, sample: &LabeledSample) -> StorageResult<()> {
        self.buffer.push(sample.clone());
        if self.buffer.len() >= BUFFER_SIZE {
            self.flush()?;
        }
        Ok(())
    }

    /// Flush buffered samples as one record batch.
    pub fn flush(&mut self) -> StorageResult<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let batch = self.build_record_batch()?;
        if let Some(ref mut writer) = self.writer {
            writer.write(&batch)?;
        }

        self.records_written += self.buffer.len();
        self.buffer.clear();
        Ok(())
    }

    fn build_record_batch(&self) -> StorageResult<RecordBatch> {
        let num_rows = self.buffer.len();

        let mut test_id = StringBuilder::with_capacity(num_rows, num_rows * 11);
        let mut category = StringBuilder::with_capacity(num_rows, num_rows * 11);
        let mut test_type = StringBuilder::with_capacity(num_rows, num_rows * 20);
        let mut features: Vec<Float64Builder> = (0..types::N_FEATURES)
            .map(|_| Float64Builder::with_capacity(num_rows))
            .collect();
        let mut risk_score = Float64Builder::with_capacity(num_rows);
        let mut pass_fail = StringBuilder::with_capacity(num_rows, num_rows * 4);
        let mut duration = UInt32Builder::with_capacity(num_rows);
        let mut date = Date32Builder::with_capacity(num_rows);
        let mut standard = StringBuilder::with_capacity(num_rows, num_rows * 24);

        for sample in &self.buffer {
            test_id.append_value(&sample.test_id);
            category.append_value(sample.test_category.as_str());
            test_type.append_value(sample.test_type.as_str());
            for (builder, value) in features.iter_mut().zip(sample.features()) {
                builder.append_value(value);
            }
            risk_score.append_value(sample.risk_score);
            pass_fail.append_value(sample.pass_fail.as_str());
            duration.append_value(sample.test_duration);
            date.append_value(date32(sample.test_date));
            standard.append_value(&sample.standard);
        }

        let mut columns: Vec<ArrayRef> = vec![
            Arc::new(test_id.finish()),
            Arc::new(category.finish()),
            Arc::new(test_type.finish()),
        ];
        for builder in features.iter_mut() {
            columns.push(Arc::new(builder.finish()));
        }
        columns.push(Arc::new(risk_score.finish()));
        columns.push(Arc::new(pass_fail.finish()));
        columns.push(Arc::new(duration.finish()));
        columns.push(Arc::new(date.finish()));
        columns.push(Arc::new(standard.finish()));

        Ok(RecordBatch::try_new(self.schema.clone(), columns)?)
    }

    /// Flush and close the file. Returns the total number of samples.
    pub fn finish(mut self) -> StorageResult<usize> {
        self.flush()?;
        if let Some(writer) = self.writer.take() {
            writer.close()?;
        }
        Ok(self.records_written)
    }

    /// Samples accepted so far, including buffered ones.
    pub fn records_written(&self) -> usize {
        self.records_written + self.buffer.len()
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }
}

/// Write all samples to a Parquet file.
pub fn write_parquet<P: AsRef<Path>>(path: P, samples: &[LabeledSample]) -> StorageResult<usize> {
    let path = path.as_ref();
    let mut writer = ParquetWriter::new(path)?;
    for sample in samples {
        writer.write_sample(sample)?;
    }
    let rows = writer.finish()?;
    debug!(path = %path.display(), rows, "Wrote Parquet export");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_matches_columns() {
        let schema = sample_schema();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(names, crate::COLUMNS);
    }

    #[test]
    fn test_date32_epoch() {
        assert_eq!(date32(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()), 0);
        assert_eq!(date32(NaiveDate::from_ymd_opt(1970, 1, 31).unwrap()), 30);
        assert_eq!(date32(NaiveDate::from_ymd_opt(1969, 12, 31).unwrap()), -1);
    }
}
