//! # Comparators
//!
//! Comparators score a student's output against the reference output of the
//! same function. All of them implement [`OutputComparator`], so the suite
//! can pick one per function without knowing how it works.
//!
//! The available comparators are:
//! - [`numeric_comparator`]: element-wise partial credit for scalars, series and tables.
//! - [`metrics_comparator`]: partial credit over a fixed set of named statistics.

pub mod metrics_comparator;
pub mod numeric_comparator;
mod tally;

use crate::error::MarkerError;
use crate::tolerance::check_spec;
use crate::traits::comparator::OutputComparator;
use metrics_comparator::MetricsComparator;
use numeric_comparator::NumericComparator;
use util::execution_config::ExecutionConfig;
use util::functions::GradableFunction;

/// Builds the comparator `function` is graded with, using the tolerance
/// profile the configuration assigns to it.
pub fn comparator_for(
    function: GradableFunction,
    config: &ExecutionConfig,
) -> Result<Box<dyn OutputComparator>, MarkerError> {
    let tolerance = config.tolerance_for(function);
    check_spec(function.name(), &tolerance)?;

    Ok(match function {
        GradableFunction::CalculatePerformance => Box::new(MetricsComparator::new(tolerance)),
        _ => Box::new(NumericComparator::new(tolerance)),
    })
}
