use crate::types::Comparison;
use util::frame::Output;

/// OutputComparator is a strategy trait for comparing outputs.
/// Each implementation scores one student output against the reference
/// output of the same gradable function.
pub trait OutputComparator: Send + Sync {
    /// Compare a student's output with the expected output.
    ///
    /// - `expected`: the reference engine's output.
    /// - `actual`: what the student function returned.
    ///
    /// Never fails: shape problems are reported as a zero-credit
    /// [`Comparison`] carrying a structural mismatch.
    fn compare(&self, expected: &Output, actual: &Output) -> Comparison;
}
