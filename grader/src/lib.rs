//! # Grader
//!
//! Grades a momentum-strategy homework submission: derives the student's
//! look-back parameter, computes reference outputs, calls each student
//! function once and writes a weighted grade report.

pub mod console;
pub mod error;
pub mod runner;
pub mod suite;

pub use error::GraderError;
pub use runner::{RunSettings, RunState, Runner, exit_code};
pub use suite::{TestCase, TestSuite};
