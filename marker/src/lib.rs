//! # Marker Library
//!
//! Scores student outputs against reference outputs and turns the scores
//! into a grade report.
//!
//! ## Key Concepts
//! - **Comparators**: Pluggable strategies for comparing a student output with
//!   the reference output (element-wise numeric, named metrics).
//! - **Tolerance**: Per-value partial credit between a full-credit and a
//!   zero-credit bound.
//! - **Scorer**: Aggregates per-test fractions into the weighted total.
//! - **Reports**: Serializable summary of a grading run, written as JSON.

pub mod comparators;
pub mod error;
pub mod report;
pub mod scorer;
pub mod tolerance;
pub mod traits;
pub mod types;

pub use comparators::comparator_for;
pub use comparators::metrics_comparator::GRADED_METRICS;
pub use error::MarkerError;
pub use report::GradeReport;
pub use traits::comparator::OutputComparator;
pub use types::{Comparison, FailureKind, TestResult, TestStatus};
