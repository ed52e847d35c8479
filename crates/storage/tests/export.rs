//! Export generated samples and read them back.

use std::fs::File;

use arrow::array::{Array, Date32Array, Float64Array, StringArray, UInt32Array};
use chrono::NaiveDate;
use datagen::{GeneratorConfig, SyntheticDataGenerator};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use storage::{COLUMNS, ExportFormat, export_samples};
use types::LabeledSample;

fn samples(n: usize) -> Vec<LabeledSample> {
    let config = GeneratorConfig::default()
        .with_reference_date(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    SyntheticDataGenerator::new(config, 42).generate(n)
}

#[test]
fn csv_has_header_and_one_line_per_sample() {
    let data = samples(25);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out").join("samples.csv");

    let rows = export_samples(&path, &data, ExportFormat::Csv).unwrap();
    assert_eq!(rows, 25);

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(headers, COLUMNS);

    let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 25);
    let first = &records[0];
    assert_eq!(first.len(), COLUMNS.len());
    assert_eq!(&first[0], "TEST_000001");
    assert_eq!(first[3].parse::<f64>().unwrap(), data[0].parameters.temperature);
    assert_eq!(&first[8], data[0].pass_fail.as_str());
    assert_eq!(first[9].parse::<u32>().unwrap(), data[0].test_duration);
}

#[test]
fn parquet_round_trips_every_column() {
    let data = samples(40);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("samples.parquet");

    let format = ExportFormat::from_path(&path);
    assert_eq!(format, ExportFormat::Parquet);
    assert_eq!(export_samples(&path, &data, format).unwrap(), 40);

    let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(&path).unwrap())
        .unwrap()
        .build()
        .unwrap();
    let batches: Vec<_> = reader.map(|b| b.unwrap()).collect();
    let total: usize = batches.iter().map(|b| b.num_rows()).sum();
    assert_eq!(total, 40);

    let batch = &batches[0];
    assert_eq!(batch.num_columns(), COLUMNS.len());

    let ids = batch
        .column(0)
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    assert_eq!(ids.value(0), "TEST_000001");

    let humidity = batch
        .column(4)
        .as_any()
        .downcast_ref::<Float64Array>()
        .unwrap();
    assert_eq!(humidity.value(1), data[1].parameters.humidity);

    let duration = batch
        .column(9)
        .as_any()
        .downcast_ref::<UInt32Array>()
        .unwrap();
    assert_eq!(duration.value(2), data[2].test_duration);

    let dates = batch
        .column(10)
        .as_any()
        .downcast_ref::<Date32Array>()
        .unwrap();
    assert_eq!(dates.len(), batch.num_rows());
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
    let expected = (data[0].test_date - epoch).num_days() as i32;
    assert_eq!(dates.value(0), expected);
}
