//! CSV export of labeled samples.
//!
//! One header row, then one row per sample in [`COLUMNS`] order. Quoting
//! follows RFC 4180 via [`csv::Writer`].

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;
use types::LabeledSample;

use crate::COLUMNS;
use crate::error::StorageResult;

/// Flat CSV view of a [`LabeledSample`]; field order matches [`COLUMNS`].
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    test_id: &'a str,
    test_category: &'static str,
    test_type: &'static str,
    temperature: f64,
    humidity: f64,
    vibration: f64,
    pressure: f64,
    risk_score: f64,
    pass_fail: &'static str,
    test_duration: u32,
    test_date: NaiveDate,
    standard: &'a str,
}

impl<'a> From<&'a LabeledSample> for CsvRow<'a> {
    fn from(sample: &'a LabeledSample) -> Self {
        let p = &sample.parameters;
        Self {
            test_id: &sample.test_id,
            test_category: sample.test_category.as_str(),
            test_type: sample.test_type.as_str(),
            temperature: p.temperature,
            humidity: p.humidity,
            vibration: p.vibration,
            pressure: p.pressure,
            risk_score: sample.risk_score,
            pass_fail: sample.pass_fail.as_str(),
            test_duration: sample.test_duration,
            test_date: sample.test_date,
            standard: &sample.standard,
        }
    }
}

/// Write samples as CSV to any writer.
///
/// The header is written explicitly so an empty export still has one.
pub fn write_csv_to<W: Write>(writer: W, samples: &[LabeledSample]) -> StorageResult<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(COLUMNS)?;
    for sample in samples {
        wtr.serialize(CsvRow::from(sample))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write samples to a CSV file, creating parent directories.
///
/// Returns the number of data rows written.
pub fn write_csv<P: AsRef<Path>>(path: P, samples: &[LabeledSample]) -> StorageResult<usize> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    write_csv_to(File::create(path)?, samples)?;
    debug!(path = %path.display(), rows = samples.len(), "Wrote CSV export");
    Ok(samples.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{TestParameters, TestType, Verdict};

    fn sample() -> LabeledSample {
        LabeledSample {
            test_id: "TEST_000001".into(),
            test_category: TestType::Condensation.category(),
            test_type: TestType::Condensation,
            parameters: TestParameters::new(25.5, 90.0, 5.25, 1013.0),
            risk_score: 0.325,
            pass_fail: Verdict::Pass,
            test_duration: 120,
            test_date: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
            standard: "ISO 16750-4".into(),
        }
    }

    fn read_back(buf: &[u8]) -> (csv::StringRecord, Vec<csv::StringRecord>) {
        let mut rdr = csv::Reader::from_reader(buf);
        let headers = rdr.headers().unwrap().clone();
        let rows = rdr.records().map(|r| r.unwrap()).collect();
        (headers, rows)
    }

    #[test]
    fn test_rows() {
        let mut buf = Vec::new();
        write_csv_to(&mut buf, &[sample()]).unwrap();
        let (headers, rows) = read_back(&buf);

        assert_eq!(headers.iter().collect::<Vec<_>>(), COLUMNS.to_vec());
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(&row[0], "TEST_000001");
        assert_eq!(&row[1], "humidity");
        assert_eq!(&row[2], "condensation");
        assert_eq!(row[3].parse::<f64>().unwrap(), 25.5);
        assert_eq!(row[4].parse::<f64>().unwrap(), 90.0);
        assert_eq!(row[5].parse::<f64>().unwrap(), 5.25);
        assert_eq!(row[6].parse::<f64>().unwrap(), 1013.0);
        assert_eq!(row[7].parse::<f64>().unwrap(), 0.325);
        assert_eq!(&row[8], "PASS");
        assert_eq!(&row[9], "120");
        assert_eq!(&row[10], "2024-03-09");
        assert_eq!(&row[11], "ISO 16750-4");
    }

    #[test]
    fn test_empty_export_keeps_header() {
        let mut buf = Vec::new();
        write_csv_to(&mut buf, &[]).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), format!("{}\n", COLUMNS.join(",")));
    }

    #[test]
    fn test_quoted_standard() {
        let mut s = sample();
        s.standard = "MIL-STD-810, Method \"507.7\"".into();
        let mut buf = Vec::new();
        write_csv_to(&mut buf, &[s]).unwrap();

        let text = String::from_utf8(buf.clone()).unwrap();
        assert!(text.ends_with(",\"MIL-STD-810, Method \"\"507.7\"\"\"\n"));
        let (_, rows) = read_back(&buf);
        assert_eq!(rows[0].len(), COLUMNS.len());
        assert_eq!(&rows[0][11], "MIL-STD-810, Method \"507.7\"");
    }
}
