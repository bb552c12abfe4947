//! Price-file loading.
//!
//! The input is a CSV file with one row per trading day: a `Date` column
//! followed by one column of closing prices per asset. Cells that do not
//! parse as numbers become missing (`NaN`), mirroring a lenient numeric
//! coercion. Structural problems (no date column, unparseable or unordered
//! dates, no rows) are errors.

use crate::error::ReferenceError;
use chrono::{NaiveDate, NaiveDateTime};
use std::path::{Path, PathBuf};
use util::frame::Frame;

/// Something that yields the run's price table.
pub trait PriceSource {
    fn load(&self) -> Result<Frame, ReferenceError>;

    /// Human-readable origin, used in logs and diagnostics.
    fn describe(&self) -> String;
}

/// Reads prices from a CSV file on disk.
#[derive(Debug, Clone)]
pub struct CsvPriceSource {
    path: PathBuf,
}

impl CsvPriceSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PriceSource for CsvPriceSource {
    fn load(&self) -> Result<Frame, ReferenceError> {
        read_price_csv(&self.path)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

fn parse_number(raw: &str) -> f64 {
    raw.parse::<f64>().unwrap_or(f64::NAN)
}

/// Loads a date-indexed price table from `path`.
///
/// # Errors
///
/// [`ReferenceError::Data`] when the file cannot be read, has no `Date`
/// column (matched case-insensitively), has no price columns or rows, or
/// contains a date that is unparseable or not strictly after its
/// predecessor.
pub fn read_price_csv(path: &Path) -> Result<Frame, ReferenceError> {
    let data_err = |message: String| ReferenceError::Data {
        path: path.display().to_string(),
        message,
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| data_err(e.to_string()))?;

    let headers = reader
        .headers()
        .map_err(|e| data_err(format!("unreadable header: {e}")))?
        .clone();

    let date_idx = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case("date"))
        .ok_or_else(|| data_err("missing 'Date' column".to_string()))?;

    let value_cols: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != date_idx)
        .map(|(i, h)| (i, h.to_string()))
        .collect();

    if value_cols.is_empty() {
        return Err(data_err("no price columns next to 'Date'".to_string()));
    }

    let mut index: Vec<NaiveDate> = Vec::new();
    let mut data: Vec<Vec<f64>> = vec![Vec::new(); value_cols.len()];

    for (line, record) in reader.records().enumerate() {
        // +2: one for the header, one for 1-based line numbers.
        let row_no = line + 2;
        let record = record.map_err(|e| data_err(format!("row {row_no}: {e}")))?;

        let raw_date = record.get(date_idx).unwrap_or("");
        let date = parse_date(raw_date)
            .ok_or_else(|| data_err(format!("row {row_no}: unparseable date '{raw_date}'")))?;

        if let Some(prev) = index.last() {
            if date <= *prev {
                return Err(data_err(format!(
                    "row {row_no}: date {date} is not after {prev}; dates must be strictly ascending"
                )));
            }
        }
        index.push(date);

        for (slot, (col_idx, _)) in data.iter_mut().zip(&value_cols) {
            slot.push(parse_number(record.get(*col_idx).unwrap_or("")));
        }
    }

    if index.is_empty() {
        return Err(data_err("file contains no rows".to_string()));
    }

    let columns = value_cols.into_iter().map(|(_, name)| name).collect();
    let frame = Frame::new(index, columns, data)?;

    tracing::debug!(
        path = %path.display(),
        rows = frame.n_rows(),
        columns = frame.n_cols(),
        "loaded price data"
    );

    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use util::test_helpers::{synthetic_prices, write_price_csv, write_temp_file};

    #[test]
    fn test_reads_synthetic_file() {
        let (_tmp, path) = write_price_csv(30);
        let frame = CsvPriceSource::new(&path).load().unwrap();
        let expected = synthetic_prices(30);
        assert_eq!(frame.columns, expected.columns);
        assert_eq!(frame.index, expected.index);
        for (a, b) in frame.data.iter().zip(&expected.data) {
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_non_numeric_cells_become_nan() {
        let (_tmp, path) = write_temp_file(
            "p.csv",
            "Date,SP500,DJIA\n2020-01-02,100.5,n/a\n2020-01-03,,200\n",
        );
        let frame = read_price_csv(&path).unwrap();
        assert_eq!(frame.shape(), (2, 2));
        assert_eq!(frame.column("SP500").unwrap()[0], 100.5);
        assert!(frame.column("SP500").unwrap()[1].is_nan());
        assert!(frame.column("DJIA").unwrap()[0].is_nan());
        assert_eq!(frame.column("DJIA").unwrap()[1], 200.0);
    }

    #[test]
    fn test_accepts_timestamps_and_lowercase_header() {
        let (_tmp, path) = write_temp_file(
            "p.csv",
            "date,A\n2020-01-02 00:00:00,1\n2020-01-03 00:00:00,2\n",
        );
        let frame = read_price_csv(&path).unwrap();
        assert_eq!(frame.index[1], NaiveDate::from_ymd_opt(2020, 1, 3).unwrap());
    }

    #[test]
    fn test_rejects_unsorted_dates() {
        let (_tmp, path) =
            write_temp_file("p.csv", "Date,A\n2020-01-03,1\n2020-01-02,2\n");
        let err = read_price_csv(&path).unwrap_err();
        assert!(err.to_string().contains("strictly ascending"), "{err}");
    }

    #[test]
    fn test_rejects_duplicate_dates() {
        let (_tmp, path) =
            write_temp_file("p.csv", "Date,A\n2020-01-02,1\n2020-01-02,2\n");
        assert!(matches!(
            read_price_csv(&path),
            Err(ReferenceError::Data { .. })
        ));
    }

    #[test]
    fn test_rejects_missing_date_column() {
        let (_tmp, path) = write_temp_file("p.csv", "Day,A\n2020-01-02,1\n");
        let err = read_price_csv(&path).unwrap_err();
        assert!(err.to_string().contains("missing 'Date' column"), "{err}");
    }

    #[test]
    fn test_rejects_empty_file() {
        let (_tmp, path) = write_temp_file("p.csv", "Date,A\n");
        let err = read_price_csv(&path).unwrap_err();
        assert!(err.to_string().contains("no rows"), "{err}");
    }

    #[test]
    fn test_rejects_bad_date() {
        let (_tmp, path) = write_temp_file("p.csv", "Date,A\nyesterday,1\n");
        let err = read_price_csv(&path).unwrap_err();
        assert!(err.to_string().contains("unparseable date"), "{err}");
    }

    #[test]
    fn test_missing_file() {
        let source = CsvPriceSource::new("/definitely/not/here.csv");
        assert!(matches!(source.load(), Err(ReferenceError::Data { .. })));
    }
}
