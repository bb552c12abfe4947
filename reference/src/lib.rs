//! # Reference Engine
//!
//! Ground-truth implementations of every gradable function. The grader uses
//! these to produce the expected output that student results are compared
//! against.
//!
//! - Every operation is pure and deterministic; inputs are never mutated.
//! - Positions whose rolling window is not yet full are missing (`NaN`),
//!   never truncated or padded.
//! - [`pipeline::ReferencePipeline`] chains the operations once per grading
//!   run so each test receives reference inputs and expectations.

pub mod engine;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod rolling;

pub use engine::{PerformanceMetrics, ReferenceEngine};
pub use error::ReferenceError;
pub use io::{CsvPriceSource, PriceSource};
pub use pipeline::{MIN_PRICE_ROWS, ReferencePipeline};

/// Trading days used to annualize daily statistics.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;
/// Default rolling window for volatility.
pub const VOL_LOOKBACK_DAYS: usize = 252;
/// Default target volatility for strategy scaling.
pub const TARGET_VOL: f64 = 0.10;
/// Name of the equal-weight portfolio column in strategy returns.
pub const PORTFOLIO_COLUMN: &str = "TSMOM";
