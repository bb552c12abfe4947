//! A comparator for named performance statistics.
//!
//! Only the configured keys are graded. Extra keys in the student's output
//! are ignored; a graded key missing from it is a structural mismatch.

use crate::comparators::tally::Tally;
use crate::traits::comparator::OutputComparator;
use crate::types::{Comparison, StructuralMismatch};
use util::execution_config::ToleranceSpec;
use util::frame::Output;

/// Statistics graded for `calculate_performance`.
pub const GRADED_METRICS: [&str; 3] = ["annualized_return", "annualized_volatility", "sharpe_ratio"];

#[derive(Debug, Clone)]
pub struct MetricsComparator {
    tolerance: ToleranceSpec,
    graded: Vec<String>,
}

impl MetricsComparator {
    pub fn new(tolerance: ToleranceSpec) -> Self {
        Self::with_keys(tolerance, GRADED_METRICS)
    }

    pub fn with_keys<I, S>(tolerance: ToleranceSpec, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tolerance,
            graded: keys.into_iter().map(Into::into).collect(),
        }
    }
}

impl OutputComparator for MetricsComparator {
    fn compare(&self, expected: &Output, actual: &Output) -> Comparison {
        let (Output::Metrics { values: reference }, Output::Metrics { values: student }) =
            (expected, actual)
        else {
            return Comparison::structural(StructuralMismatch::Kind {
                expected: expected.kind(),
                actual: actual.kind(),
            });
        };

        let missing: Vec<String> = self
            .graded
            .iter()
            .filter(|key| reference.contains_key(*key) && !student.contains_key(*key))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Comparison::structural(StructuralMismatch::MissingMetrics(missing));
        }

        let graded_in_reference = self
            .graded
            .iter()
            .filter(|key| reference.contains_key(*key))
            .count();
        let mut tally = Tally::new(&self.tolerance, graded_in_reference);
        for key in &self.graded {
            if let (Some(e), Some(a)) = (reference.get(key), student.get(key)) {
                tally.add(*e, *a, || key.clone());
            }
        }
        tally.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use util::execution_config::Tolerance;

    fn comparator() -> MetricsComparator {
        MetricsComparator::new(ToleranceSpec::new(
            Tolerance::new(1e-3, 1e-6),
            Tolerance::new(1e-1, 1e-3),
        ))
    }

    fn metrics(pairs: &[(&str, f64)]) -> Output {
        Output::Metrics {
            values: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    fn reference() -> Output {
        metrics(&[
            ("annualized_return", 0.08),
            ("annualized_volatility", 0.12),
            ("sharpe_ratio", 0.6667),
            ("max_drawdown", -0.25),
            ("cumulative_return", 1.4),
        ])
    }

    #[test]
    fn test_only_graded_keys_count() {
        let student = metrics(&[
            ("annualized_return", 0.08),
            ("annualized_volatility", 0.12),
            ("sharpe_ratio", 0.6667),
            ("max_drawdown", 99.0),
            ("extra", 1.0),
        ]);
        let c = comparator().compare(&reference(), &student);
        assert_eq!(c.fraction, 1.0);
        assert_eq!(c.diagnostic, "all 3 values within tolerance");
    }

    #[test]
    fn test_missing_graded_key_is_structural() {
        let student = metrics(&[("annualized_return", 0.08), ("annualized_volatility", 0.12)]);
        let c = comparator().compare(&reference(), &student);
        assert_eq!(c.fraction, 0.0);
        assert_eq!(c.diagnostic, "missing metrics: sharpe_ratio");
    }

    #[test]
    fn test_one_wrong_metric_gives_partial_credit() {
        let student = metrics(&[
            ("annualized_return", 0.08),
            ("annualized_volatility", 0.12),
            ("sharpe_ratio", 5.0),
        ]);
        let c = comparator().compare(&reference(), &student);
        assert!((c.fraction - 2.0 / 3.0).abs() < 1e-12);
        assert!(c.diagnostic.contains("worst at sharpe_ratio"), "{}", c.diagnostic);
    }

    #[test]
    fn test_non_metrics_output_is_structural() {
        let c = comparator().compare(&reference(), &Output::Scalar { value: 0.1 });
        assert!(matches!(c.mismatch, Some(StructuralMismatch::Kind { .. })));
    }
}
