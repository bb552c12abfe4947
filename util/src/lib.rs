//! Shared building blocks for the grading workspace.
//!
//! - [`config`]: process configuration loaded from the environment.
//! - [`execution_config`]: grading configuration (weights, tolerances, time limits).
//! - [`frame`]: date-indexed numeric tables and series exchanged with student code.
//! - [`functions`]: the catalogue of gradable functions and their call payloads.
//! - [`lookback`]: per-student look-back derivation.

pub mod config;
pub mod execution_config;
pub mod frame;
pub mod functions;
pub mod lookback;
pub mod test_helpers;
