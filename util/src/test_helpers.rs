//! Fixtures shared by the workspace's tests.

use crate::frame::Frame;
use chrono::{Datelike, NaiveDate, Weekday};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Asset columns used by the homework data set.
pub const ASSET_COLUMNS: [&str; 3] = ["SP500", "NASDAQ", "DJIA"];

/// Consecutive weekdays starting on 2015-01-02.
pub fn trading_days(n: usize) -> Vec<NaiveDate> {
    let mut day = NaiveDate::from_ymd_opt(2015, 1, 2).expect("valid date");
    let mut out = Vec::with_capacity(n);
    while out.len() < n {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            out.push(day);
        }
        day = day.succ_opt().expect("date in range");
    }
    out
}

/// A deterministic, trending and oscillating price table with one column
/// per entry of [`ASSET_COLUMNS`].
pub fn synthetic_prices(rows: usize) -> Frame {
    let index = trading_days(rows);
    let data = ASSET_COLUMNS
        .iter()
        .enumerate()
        .map(|(k, _)| {
            let k = k as f64;
            (0..rows)
                .map(|t| {
                    let t = t as f64;
                    let drift = 0.0004 * (k + 1.0) * t;
                    let wave = 0.03 * (t * 0.11 + k).sin() + 0.01 * (t * 0.73 + 2.0 * k).cos();
                    (1000.0 + 500.0 * k) * (drift + wave).exp()
                })
                .collect()
        })
        .collect();
    Frame::new(
        index,
        ASSET_COLUMNS.iter().map(|c| c.to_string()).collect(),
        data,
    )
    .expect("synthetic frame is well formed")
}

/// Renders a frame as CSV with a leading `Date` column. NaN cells are left empty.
pub fn frame_to_csv(frame: &Frame) -> String {
    let mut out = String::from("Date");
    for c in &frame.columns {
        out.push(',');
        out.push_str(c);
    }
    out.push('\n');
    for (row, date) in frame.index.iter().enumerate() {
        out.push_str(&date.format("%Y-%m-%d").to_string());
        for col in &frame.data {
            out.push(',');
            if !col[row].is_nan() {
                out.push_str(&format!("{}", col[row]));
            }
        }
        out.push('\n');
    }
    out
}

/// Writes `contents` to `name` inside a fresh temporary directory.
///
/// Keep the returned `TempDir` in scope for as long as you need the file.
pub fn write_temp_file(name: &str, contents: &str) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let path = tmp.path().join(name);
    fs::write(&path, contents).expect("failed to write fixture");
    (tmp, path)
}

/// Writes a synthetic price table of `rows` rows to `price_data.csv`.
pub fn write_price_csv(rows: usize) -> (TempDir, PathBuf) {
    write_temp_file("price_data.csv", &frame_to_csv(&synthetic_prices(rows)))
}
