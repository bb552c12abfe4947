//! # Scorer Module
//!
//! Aggregates individual test results into the run's total score.

use crate::error::MarkerError;
use crate::types::TestResult;

/// Round a float to two decimal places.
#[inline]
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Sum of the points available across `results`.
pub fn max_total(results: &[TestResult]) -> f64 {
    results.iter().map(|r| r.possible).sum()
}

/// Computes the total score as the sum of `fraction * possible` over all
/// results.
///
/// The total is clamped to `[0, max_total]`, so rounding noise in a fraction
/// can never push a run past full marks.
///
/// # Errors
///
/// [`MarkerError::WeightMismatch`] when a result carries a negative or
/// non-finite weight.
///
/// # Example
///
/// ```
/// use marker::scorer::compute_total;
/// use marker::types::{Comparison, TestResult};
///
/// let half = Comparison { fraction: 0.5, diagnostic: String::new(), pass_rate: 0.5, mismatch: None };
/// let full = Comparison { fraction: 1.0, diagnostic: String::new(), pass_rate: 1.0, mismatch: None };
/// let results = vec![
///     TestResult::scored("calculate_returns", 15.0, half),
///     TestResult::scored("read_data", 10.0, full),
/// ];
/// assert_eq!(compute_total(&results).unwrap(), 17.5);
/// assert_eq!(compute_total(&[]).unwrap(), 0.0);
/// ```
pub fn compute_total(results: &[TestResult]) -> Result<f64, MarkerError> {
    if let Some(bad) = results
        .iter()
        .find(|r| !r.possible.is_finite() || r.possible < 0.0)
    {
        return Err(MarkerError::WeightMismatch(format!(
            "test '{}' has weight {}",
            bad.name, bad.possible
        )));
    }

    let earned: f64 = results
        .iter()
        .map(|r| r.fraction.clamp(0.0, 1.0) * r.possible)
        .sum();

    Ok(earned.clamp(0.0, max_total(results)))
}
