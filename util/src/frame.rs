//! Date-indexed numeric data exchanged between the reference engine,
//! student code and the comparators.
//!
//! Missing observations are stored as `f64::NAN`. On the wire (JSON) a
//! missing value is written as `null` and `null` is read back as NaN, see
//! [`nan_as_null`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("column '{column}' has {actual} rows, index has {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
    #[error("{columns} column names for {data} data columns")]
    ColumnCountMismatch { columns: usize, data: usize },
    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),
    #[error("series has {actual} values, index has {expected}")]
    SeriesLength { expected: usize, actual: usize },
}

/// A date-indexed table of `f64` columns, stored column-major.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    pub index: Vec<NaiveDate>,
    pub columns: Vec<String>,
    #[serde(with = "nan_as_null::nested")]
    pub data: Vec<Vec<f64>>,
}

impl Frame {
    /// Builds a frame, checking that every column matches the index length
    /// and that column names are unique.
    pub fn new(
        index: Vec<NaiveDate>,
        columns: Vec<String>,
        data: Vec<Vec<f64>>,
    ) -> Result<Self, FrameError> {
        let frame = Self {
            index,
            columns,
            data,
        };
        frame.validate()?;
        Ok(frame)
    }

    /// Checks the invariants [`Frame::new`] enforces: one data column per
    /// name, unique names and every column as long as the index.
    ///
    /// Frames that arrive through deserialization or are built field by
    /// field skip `new`, so anything read from student code is checked with
    /// this before use.
    pub fn validate(&self) -> Result<(), FrameError> {
        if self.columns.len() != self.data.len() {
            return Err(FrameError::ColumnCountMismatch {
                columns: self.columns.len(),
                data: self.data.len(),
            });
        }

        let mut seen = HashSet::new();
        for (name, values) in self.columns.iter().zip(&self.data) {
            if !seen.insert(name.as_str()) {
                return Err(FrameError::DuplicateColumn(name.clone()));
            }
            if values.len() != self.index.len() {
                return Err(FrameError::LengthMismatch {
                    column: name.clone(),
                    expected: self.index.len(),
                    actual: values.len(),
                });
            }
        }
        Ok(())
    }

    pub fn n_rows(&self) -> usize {
        self.index.len()
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// `(rows, columns)`, in the order a dataframe library would print it.
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows(), self.n_cols())
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .position(|c| c == name)
            .and_then(|i| self.data.get(i))
            .map(Vec::as_slice)
    }

    pub fn iter_columns(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.data.iter().map(Vec::as_slice))
    }

    /// Applies `f` to every column, keeping index and column names.
    pub fn map_columns<F>(&self, mut f: F) -> Frame
    where
        F: FnMut(&str, &[f64]) -> Vec<f64>,
    {
        let data = self.iter_columns().map(|(name, col)| f(name, col)).collect();
        Frame {
            index: self.index.clone(),
            columns: self.columns.clone(),
            data,
        }
    }

    /// Returns a copy with an extra column appended.
    pub fn with_column(&self, name: &str, values: Vec<f64>) -> Result<Frame, FrameError> {
        let mut columns = self.columns.clone();
        let mut data = self.data.clone();
        columns.push(name.to_string());
        data.push(values);
        Frame::new(self.index.clone(), columns, data)
    }

    /// Extracts one column as a [`Series`].
    pub fn to_series(&self, name: &str) -> Option<Series> {
        self.column(name).map(|values| Series {
            name: name.to_string(),
            index: self.index.clone(),
            values: values.to_vec(),
        })
    }

    /// True when both frames share the same index dates.
    pub fn same_index(&self, other: &Frame) -> bool {
        self.index == other.index
    }
}

/// A named, date-indexed vector of `f64`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub index: Vec<NaiveDate>,
    #[serde(with = "nan_as_null::vec")]
    pub values: Vec<f64>,
}

impl Series {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Checks that there is one value per index date.
    pub fn validate(&self) -> Result<(), FrameError> {
        if self.values.len() != self.index.len() {
            return Err(FrameError::SeriesLength {
                expected: self.index.len(),
                actual: self.values.len(),
            });
        }
        Ok(())
    }

    pub fn to_frame(&self) -> Frame {
        Frame {
            index: self.index.clone(),
            columns: vec![self.name.clone()],
            data: vec![self.values.clone()],
        }
    }
}

/// The value a gradable function returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Output {
    Scalar {
        #[serde(with = "nan_as_null::scalar")]
        value: f64,
    },
    Series(Series),
    Frame(Frame),
    Metrics {
        #[serde(with = "nan_as_null::map")]
        values: BTreeMap<String, f64>,
    },
}

impl Output {
    /// Short shape name used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Output::Scalar { .. } => "scalar",
            Output::Series(_) => "series",
            Output::Frame(_) => "frame",
            Output::Metrics { .. } => "metrics",
        }
    }
}

impl From<Frame> for Output {
    fn from(frame: Frame) -> Self {
        Output::Frame(frame)
    }
}

impl From<Series> for Output {
    fn from(series: Series) -> Self {
        Output::Series(series)
    }
}

/// Serde adapters that write NaN as `null` and read `null` as NaN.
///
/// `serde_json` already writes non-finite floats as `null` but refuses to
/// read `null` into an `f64`; these adapters make the encoding symmetric.
/// Infinities therefore come back as NaN after a JSON round trip.
pub mod nan_as_null {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    fn to_opt(v: f64) -> Option<f64> {
        if v.is_finite() { Some(v) } else { None }
    }

    fn from_opt(v: Option<f64>) -> f64 {
        v.unwrap_or(f64::NAN)
    }

    pub mod scalar {
        use super::*;

        pub fn serialize<S: Serializer>(value: &f64, s: S) -> Result<S::Ok, S::Error> {
            to_opt(*value).serialize(s)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
            Ok(from_opt(Option::<f64>::deserialize(d)?))
        }
    }

    pub mod vec {
        use super::*;

        pub fn serialize<S: Serializer>(values: &[f64], s: S) -> Result<S::Ok, S::Error> {
            let raw: Vec<Option<f64>> = values.iter().copied().map(to_opt).collect();
            raw.serialize(s)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<f64>, D::Error> {
            let raw = Vec::<Option<f64>>::deserialize(d)?;
            Ok(raw.into_iter().map(from_opt).collect())
        }
    }

    pub mod nested {
        use super::*;

        pub fn serialize<S: Serializer>(columns: &[Vec<f64>], s: S) -> Result<S::Ok, S::Error> {
            let raw: Vec<Vec<Option<f64>>> = columns
                .iter()
                .map(|col| col.iter().copied().map(to_opt).collect())
                .collect();
            raw.serialize(s)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Vec<f64>>, D::Error> {
            let raw = Vec::<Vec<Option<f64>>>::deserialize(d)?;
            Ok(raw
                .into_iter()
                .map(|col| col.into_iter().map(from_opt).collect())
                .collect())
        }
    }

    pub mod map {
        use super::*;

        pub fn serialize<S: Serializer>(
            values: &BTreeMap<String, f64>,
            s: S,
        ) -> Result<S::Ok, S::Error> {
            let raw: BTreeMap<&str, Option<f64>> = values
                .iter()
                .map(|(k, v)| (k.as_str(), to_opt(*v)))
                .collect();
            raw.serialize(s)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            d: D,
        ) -> Result<BTreeMap<String, f64>, D::Error> {
            let raw = BTreeMap::<String, Option<f64>>::deserialize(d)?;
            Ok(raw.into_iter().map(|(k, v)| (k, from_opt(v))).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dates(n: usize) -> Vec<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..n)
            .map(|i| start + chrono::Duration::days(i as i64))
            .collect()
    }

    #[test]
    fn test_new_rejects_short_column() {
        let err = Frame::new(dates(3), vec!["A".into()], vec![vec![1.0, 2.0]]).unwrap_err();
        assert_eq!(
            err,
            FrameError::LengthMismatch {
                column: "A".into(),
                expected: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn test_new_rejects_duplicate_columns() {
        let err = Frame::new(
            dates(1),
            vec!["A".into(), "A".into()],
            vec![vec![1.0], vec![2.0]],
        )
        .unwrap_err();
        assert_eq!(err, FrameError::DuplicateColumn("A".into()));
    }

    #[test]
    fn test_validate_catches_frames_built_without_new() {
        let missing_data = Frame {
            index: dates(2),
            columns: vec!["A".into(), "B".into(), "C".into()],
            data: vec![vec![1.0, 2.0]],
        };
        assert_eq!(
            missing_data.validate(),
            Err(FrameError::ColumnCountMismatch { columns: 3, data: 1 })
        );
        // Lookups stay in bounds even on a malformed frame.
        assert!(missing_data.column("C").is_none());

        let empty_columns = Frame {
            index: dates(2),
            columns: vec!["A".into()],
            data: vec![Vec::new()],
        };
        assert!(matches!(
            empty_columns.validate(),
            Err(FrameError::LengthMismatch { expected: 2, actual: 0, .. })
        ));
    }

    #[test]
    fn test_validate_series_length() {
        let series = Series {
            name: "TSMOM".into(),
            index: dates(3),
            values: vec![0.1],
        };
        assert_eq!(
            series.validate(),
            Err(FrameError::SeriesLength { expected: 3, actual: 1 })
        );
    }

    #[test]
    fn test_deserialized_frame_is_not_checked_until_validated() {
        let json = r#"{"kind":"frame","index":["2024-01-01"],"columns":["A","A"],"data":[[1.0],[2.0]]}"#;
        let Output::Frame(frame) = serde_json::from_str::<Output>(json).unwrap() else {
            panic!("expected a frame");
        };
        assert_eq!(frame.validate(), Err(FrameError::DuplicateColumn("A".into())));
    }

    #[test]
    fn test_column_lookup_and_series() {
        let frame = Frame::new(
            dates(2),
            vec!["A".into(), "B".into()],
            vec![vec![1.0, 2.0], vec![3.0, 4.0]],
        )
        .unwrap();
        assert_eq!(frame.shape(), (2, 2));
        assert_eq!(frame.column("B"), Some(&[3.0, 4.0][..]));
        assert!(frame.column("C").is_none());

        let series = frame.to_series("A").unwrap();
        assert_eq!(series.values, vec![1.0, 2.0]);
        assert_eq!(series.to_frame().columns, vec!["A".to_string()]);
    }

    #[test]
    fn test_nan_is_written_as_null_and_read_back() {
        let frame = Frame::new(dates(2), vec!["A".into()], vec![vec![f64::NAN, 1.5]]).unwrap();
        let json = serde_json::to_value(Output::Frame(frame)).unwrap();
        assert_eq!(json["kind"], "frame");
        assert!(json["data"][0][0].is_null());
        assert_eq!(json["data"][0][1], 1.5);
        assert_eq!(json["index"][0], "2024-01-01");

        let back: Output = serde_json::from_value(json).unwrap();
        match back {
            Output::Frame(f) => {
                assert!(f.data[0][0].is_nan());
                assert_eq!(f.data[0][1], 1.5);
            }
            other => panic!("unexpected kind {}", other.kind()),
        }
    }

    #[test]
    fn test_metrics_output_parses_nulls() {
        let json = r#"{"kind":"metrics","values":{"sharpe_ratio":null,"annualized_return":0.1}}"#;
        let out: Output = serde_json::from_str(json).unwrap();
        match out {
            Output::Metrics { values } => {
                assert!(values["sharpe_ratio"].is_nan());
                assert_eq!(values["annualized_return"], 0.1);
            }
            other => panic!("unexpected kind {}", other.kind()),
        }
    }
}
