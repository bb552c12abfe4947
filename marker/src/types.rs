//! # Types Module
//!
//! Core data structures shared by the comparators, the scorer and the
//! report: the outcome of one comparison and the result of one graded test.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use util::frame::FrameError;

/// Why a student function earned nothing without being compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The function could not be located in the submission.
    LoadError,
    /// The function raised, crashed or returned something unreadable.
    ExecutionError,
    /// The function did not return within its time budget.
    Timeout,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FailureKind::LoadError => "load_error",
            FailureKind::ExecutionError => "execution_error",
            FailureKind::Timeout => "timeout",
        })
    }
}

/// Console and report status of a test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TestStatus {
    Pass,
    Partial,
    Fail,
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TestStatus::Pass => "PASS",
            TestStatus::Partial => "PARTIAL",
            TestStatus::Fail => "FAIL",
        })
    }
}

/// A difference in shape that makes element-wise comparison meaningless.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StructuralMismatch {
    #[error("expected {expected} output but got {actual}")]
    Kind {
        expected: &'static str,
        actual: &'static str,
    },
    #[error("expected {expected} rows but got {actual}")]
    IndexLength { expected: usize, actual: usize },
    #[error("index differs at row {row}: expected {expected}, got {actual}")]
    IndexDates {
        row: usize,
        expected: NaiveDate,
        actual: NaiveDate,
    },
    #[error("column mismatch (missing: [{}], unexpected: [{}])", .missing.join(", "), .unexpected.join(", "))]
    Columns {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },
    #[error("missing metrics: {}", .0.join(", "))]
    MissingMetrics(Vec<String>),
    #[error("malformed output: {0}")]
    Malformed(FrameError),
}

/// The outcome of comparing one student output with its reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    /// Earned share of the test's weight, in `[0, 1]`.
    pub fraction: f64,
    pub diagnostic: String,
    /// Share of compared elements that earned full credit.
    pub pass_rate: f64,
    pub mismatch: Option<StructuralMismatch>,
}

impl Comparison {
    pub fn structural(mismatch: StructuralMismatch) -> Self {
        Self {
            fraction: 0.0,
            diagnostic: mismatch.to_string(),
            pass_rate: 0.0,
            mismatch: Some(mismatch),
        }
    }
}

/// Represents the result of a single graded test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    /// The gradable function this test covers.
    pub name: String,
    /// Earned share of `possible`, in `[0, 1]`.
    pub fraction: f64,
    /// Points available for this test.
    pub possible: f64,
    pub diagnostic: String,
    /// Set when the student function never produced a comparable output.
    pub error: Option<FailureKind>,
}

impl TestResult {
    /// A test whose output was compared against the reference.
    pub fn scored(name: impl Into<String>, possible: f64, comparison: Comparison) -> Self {
        Self {
            name: name.into(),
            fraction: comparison.fraction.clamp(0.0, 1.0),
            possible,
            diagnostic: comparison.diagnostic,
            error: None,
        }
    }

    /// A test that earned nothing because the student code failed.
    pub fn failed(
        name: impl Into<String>,
        possible: f64,
        kind: FailureKind,
        diagnostic: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            fraction: 0.0,
            possible,
            diagnostic: format!("{kind}: {}", diagnostic.into()),
            error: Some(kind),
        }
    }

    pub fn earned(&self) -> f64 {
        self.fraction * self.possible
    }

    pub fn status(&self) -> TestStatus {
        if self.fraction >= 1.0 {
            TestStatus::Pass
        } else if self.fraction > 0.0 {
            TestStatus::Partial
        } else {
            TestStatus::Fail
        }
    }
}
