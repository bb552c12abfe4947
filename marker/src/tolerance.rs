//! Per-value partial credit.
//!
//! A value within the full-credit bound of a [`ToleranceSpec`] earns `1.0`,
//! a value at or beyond the zero-credit bound earns `0.0`, and distances in
//! between are interpolated linearly. Credit never increases as the distance
//! to the reference grows.

use crate::error::MarkerError;
use util::execution_config::ToleranceSpec;

/// Credit in `[0, 1]` for `actual` against the reference value `expected`.
///
/// Missing values (`NaN`) match only missing values. Infinities match only
/// the same infinity.
///
/// ```
/// use marker::tolerance::scalar_credit;
/// use util::execution_config::{Tolerance, ToleranceSpec};
///
/// let spec = ToleranceSpec::new(Tolerance::new(0.0, 1.0), Tolerance::new(0.0, 3.0));
/// assert_eq!(scalar_credit(10.0, 10.5, &spec), 1.0);
/// assert_eq!(scalar_credit(10.0, 12.0, &spec), 0.5);
/// assert_eq!(scalar_credit(10.0, 14.0, &spec), 0.0);
/// ```
pub fn scalar_credit(expected: f64, actual: f64, spec: &ToleranceSpec) -> f64 {
    match (expected.is_nan(), actual.is_nan()) {
        (true, true) => return 1.0,
        (true, false) | (false, true) => return 0.0,
        (false, false) => {}
    }
    if expected.is_infinite() || actual.is_infinite() {
        return if expected == actual { 1.0 } else { 0.0 };
    }

    let distance = (actual - expected).abs();
    let full = spec.full.threshold(expected);
    let zero = spec.zero.threshold(expected).max(full);

    if distance <= full {
        1.0
    } else if distance >= zero {
        0.0
    } else {
        (zero - distance) / (zero - full)
    }
}

/// Validates a tolerance profile before it is used for grading.
pub fn check_spec(profile: &str, spec: &ToleranceSpec) -> Result<(), MarkerError> {
    spec.validate(profile)
        .map_err(|e| MarkerError::InvalidTolerance(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use util::execution_config::Tolerance;

    fn spec() -> ToleranceSpec {
        ToleranceSpec::new(Tolerance::new(1e-4, 1e-6), Tolerance::new(1e-2, 1e-4))
    }

    #[test]
    fn test_exact_and_within_full_bound() {
        assert_eq!(scalar_credit(0.5, 0.5, &spec()), 1.0);
        // 1e-6 relative error is inside atol + rtol * |r|.
        assert_eq!(scalar_credit(0.5, 0.5 * (1.0 + 1e-6), &spec()), 1.0);
    }

    #[test]
    fn test_boundaries() {
        let s = ToleranceSpec::new(Tolerance::new(0.0, 1.0), Tolerance::new(0.0, 2.0));
        assert_eq!(scalar_credit(0.0, 1.0, &s), 1.0);
        assert_eq!(scalar_credit(0.0, 2.0, &s), 0.0);
        assert_eq!(scalar_credit(0.0, -1.5, &s), 0.5);
    }

    #[test]
    fn test_monotonic_in_distance() {
        let s = spec();
        let mut previous = 1.0;
        for step in 0..400 {
            let actual = 1.0 + step as f64 * 5e-5;
            let credit = scalar_credit(1.0, actual, &s);
            assert!(credit <= previous, "credit rose at step {step}");
            assert!((0.0..=1.0).contains(&credit));
            previous = credit;
        }
        assert_eq!(previous, 0.0);
    }

    #[test]
    fn test_missing_values_are_symmetric() {
        assert_eq!(scalar_credit(f64::NAN, f64::NAN, &spec()), 1.0);
        assert_eq!(scalar_credit(f64::NAN, 0.1, &spec()), 0.0);
        assert_eq!(scalar_credit(0.1, f64::NAN, &spec()), 0.0);
    }

    #[test]
    fn test_infinities() {
        assert_eq!(scalar_credit(f64::INFINITY, f64::INFINITY, &spec()), 1.0);
        assert_eq!(scalar_credit(f64::INFINITY, f64::NEG_INFINITY, &spec()), 0.0);
        assert_eq!(scalar_credit(1.0, f64::INFINITY, &spec()), 0.0);
    }

    #[test]
    fn test_equal_bounds_are_pass_fail() {
        let t = Tolerance::new(0.0, 1e-3);
        let s = ToleranceSpec::new(t, t);
        assert_eq!(scalar_credit(0.0, 5e-4, &s), 1.0);
        assert_eq!(scalar_credit(0.0, 2e-3, &s), 0.0);
    }

    #[test]
    fn test_check_spec_rejects_inverted_bounds() {
        let s = ToleranceSpec::new(Tolerance::new(1e-2, 1e-4), Tolerance::new(1e-4, 1e-6));
        assert!(matches!(check_spec("strict", &s), Err(MarkerError::InvalidTolerance(_))));
        assert!(check_spec("strict", &spec()).is_ok());
    }
}
