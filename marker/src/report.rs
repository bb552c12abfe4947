//! # Grade Report Module
//!
//! The persisted record of one grading run.
//!
//! ## JSON Output Example
//!
//! ```json
//! {
//!   "repository": "course-org/hw1-johndoe",
//!   "lookback_days": 100,
//!   "total": 87.5,
//!   "max_total": 100.0,
//!   "generated_at": "2025-02-03T10:15:00Z",
//!   "tests": [
//!     {
//!       "name": "read_data",
//!       "earned": 10.0,
//!       "possible": 10.0,
//!       "fraction": 1.0,
//!       "status": "PASS",
//!       "diagnostic": "all 7560 values within tolerance",
//!       "error": null
//!     }
//!   ]
//! }
//! ```
//!
//! Scores are rounded to two decimals when the report is built; the
//! unrounded values stay in the [`TestResult`]s.

use crate::error::MarkerError;
use crate::scorer::{compute_total, max_total, round2};
use crate::types::{FailureKind, TestResult, TestStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One test as it appears in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub name: String,
    pub earned: f64,
    pub possible: f64,
    pub fraction: f64,
    pub status: TestStatus,
    pub diagnostic: String,
    pub error: Option<FailureKind>,
}

impl From<&TestResult> for ReportEntry {
    fn from(result: &TestResult) -> Self {
        Self {
            name: result.name.clone(),
            earned: round2(result.earned()),
            possible: round2(result.possible),
            fraction: round2(result.fraction),
            status: result.status(),
            diagnostic: result.diagnostic.clone(),
            error: result.error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeReport {
    pub repository: String,
    pub lookback_days: u32,
    pub total: f64,
    pub max_total: f64,
    pub generated_at: DateTime<Utc>,
    pub tests: Vec<ReportEntry>,
}

impl GradeReport {
    /// Builds the report for `results`, in the order given.
    pub fn new(
        repository: impl Into<String>,
        lookback_days: u32,
        results: &[TestResult],
        generated_at: DateTime<Utc>,
    ) -> Result<Self, MarkerError> {
        Ok(Self {
            repository: repository.into(),
            lookback_days,
            total: round2(compute_total(results)?),
            max_total: round2(max_total(results)),
            generated_at,
            tests: results.iter().map(ReportEntry::from).collect(),
        })
    }

    pub fn is_full_marks(&self) -> bool {
        self.total >= self.max_total
    }

    pub fn to_json_pretty(&self) -> Result<String, MarkerError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes the report as pretty JSON, creating parent directories.
    pub fn write_json(&self, path: &Path) -> Result<(), MarkerError> {
        let json = self.to_json_pretty()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| MarkerError::Io {
                path: parent.display().to_string(),
                source,
            })?;
        }
        fs::write(path, json).map_err(|source| MarkerError::Io {
            path: path.display().to_string(),
            source,
        })?;
        tracing::info!(path = %path.display(), total = self.total, "grade report written");
        Ok(())
    }
}
