//! A comparator for scalars, series and tables that awards partial credit
//! element by element.
//!
//! Shapes must agree before any value is looked at: a well-formed student
//! output (see [`Frame::validate`]), same output kind, same index dates and
//! (for tables) the same set of column names. Columns are
//! matched by name, so their order does not matter. When the shapes agree,
//! the fraction is the mean of the per-element credits.

use crate::comparators::tally::Tally;
use crate::traits::comparator::OutputComparator;
use crate::types::{Comparison, StructuralMismatch};
use chrono::NaiveDate;
use std::collections::BTreeSet;
use util::execution_config::ToleranceSpec;
use util::frame::{Frame, Output, Series};

#[derive(Debug, Clone)]
pub struct NumericComparator {
    tolerance: ToleranceSpec,
}

impl NumericComparator {
    pub fn new(tolerance: ToleranceSpec) -> Self {
        Self { tolerance }
    }

    fn compare_frames(&self, expected: &Frame, actual: &Frame) -> Comparison {
        if let Err(e) = actual.validate() {
            return Comparison::structural(StructuralMismatch::Malformed(e));
        }
        if let Err(mismatch) = check_index(&expected.index, &actual.index) {
            return Comparison::structural(mismatch);
        }

        let expected_cols: BTreeSet<&str> = expected.columns.iter().map(String::as_str).collect();
        let actual_cols: BTreeSet<&str> = actual.columns.iter().map(String::as_str).collect();
        if expected_cols != actual_cols {
            return Comparison::structural(StructuralMismatch::Columns {
                missing: expected_cols
                    .difference(&actual_cols)
                    .map(|c| c.to_string())
                    .collect(),
                unexpected: actual_cols
                    .difference(&expected_cols)
                    .map(|c| c.to_string())
                    .collect(),
            });
        }

        let mut tally = Tally::new(&self.tolerance, expected.n_rows() * expected.n_cols());
        for (name, reference) in expected.iter_columns() {
            let Some(student) = actual.column(name) else {
                continue;
            };
            for (row, (e, a)) in reference.iter().zip(student).enumerate() {
                tally.add(*e, *a, || format!("{name} {}", expected.index[row]));
            }
        }
        tally.finish()
    }

    fn compare_series(&self, expected: &Series, actual: &Series) -> Comparison {
        if let Err(e) = actual.validate() {
            return Comparison::structural(StructuralMismatch::Malformed(e));
        }
        if let Err(mismatch) = check_index(&expected.index, &actual.index) {
            return Comparison::structural(mismatch);
        }

        let mut tally = Tally::new(&self.tolerance, expected.len());
        for (row, (e, a)) in expected.values.iter().zip(&actual.values).enumerate() {
            tally.add(*e, *a, || expected.index[row].to_string());
        }
        tally.finish()
    }
}

impl OutputComparator for NumericComparator {
    fn compare(&self, expected: &Output, actual: &Output) -> Comparison {
        match (expected, actual) {
            (Output::Frame(e), Output::Frame(a)) => self.compare_frames(e, a),
            (Output::Series(e), Output::Series(a)) => self.compare_series(e, a),
            (Output::Scalar { value: e }, Output::Scalar { value: a }) => {
                let mut tally = Tally::new(&self.tolerance, 1);
                tally.add(*e, *a, || "value".to_string());
                tally.finish()
            }
            (Output::Metrics { values: e }, Output::Metrics { values: a }) => {
                let mut tally = Tally::new(&self.tolerance, e.len());
                for (key, reference) in e {
                    let student = a.get(key).copied().unwrap_or(f64::NAN);
                    tally.add(*reference, student, || key.clone());
                }
                tally.finish()
            }
            _ => Comparison::structural(StructuralMismatch::Kind {
                expected: expected.kind(),
                actual: actual.kind(),
            }),
        }
    }
}

fn check_index(expected: &[NaiveDate], actual: &[NaiveDate]) -> Result<(), StructuralMismatch> {
    if expected.len() != actual.len() {
        return Err(StructuralMismatch::IndexLength {
            expected: expected.len(),
            actual: actual.len(),
        });
    }
    match expected.iter().zip(actual).position(|(e, a)| e != a) {
        Some(row) => Err(StructuralMismatch::IndexDates {
            row,
            expected: expected[row],
            actual: actual[row],
        }),
        None => Ok(()),
    }
}
