//! Accumulates per-element credit into a [`Comparison`].

use crate::tolerance::scalar_credit;
use crate::types::Comparison;
use util::execution_config::ToleranceSpec;

#[derive(Debug, Clone)]
struct Worst {
    label: String,
    expected: f64,
    actual: f64,
    credit: f64,
}

impl Worst {
    fn distance(&self) -> f64 {
        let d = (self.actual - self.expected).abs();
        if d.is_nan() { f64::INFINITY } else { d }
    }
}

/// Running totals over the elements of one comparison.
///
/// `expected` is the number of reference elements. Any of them that never
/// reach [`Tally::add`] count as zero credit.
#[derive(Debug)]
pub(crate) struct Tally<'a> {
    spec: &'a ToleranceSpec,
    expected: usize,
    count: usize,
    credit_sum: f64,
    full: usize,
    missing_mismatches: usize,
    worst: Option<Worst>,
}

impl<'a> Tally<'a> {
    pub(crate) fn new(spec: &'a ToleranceSpec, expected: usize) -> Self {
        Self {
            spec,
            expected,
            count: 0,
            credit_sum: 0.0,
            full: 0,
            missing_mismatches: 0,
            worst: None,
        }
    }

    /// Scores one element. `label` is only built when the element becomes
    /// the worst seen so far.
    pub(crate) fn add<L>(&mut self, expected: f64, actual: f64, label: L)
    where
        L: FnOnce() -> String,
    {
        let credit = scalar_credit(expected, actual, self.spec);
        self.count += 1;
        self.credit_sum += credit;
        if credit >= 1.0 {
            self.full += 1;
            return;
        }
        if expected.is_nan() != actual.is_nan() {
            self.missing_mismatches += 1;
        }

        let candidate = Worst {
            label: String::new(),
            expected,
            actual,
            credit,
        };
        let replace = match &self.worst {
            None => true,
            Some(w) => {
                credit < w.credit || (credit == w.credit && candidate.distance() > w.distance())
            }
        };
        if replace {
            self.worst = Some(Worst {
                label: label(),
                ..candidate
            });
        }
    }

    pub(crate) fn finish(self) -> Comparison {
        let total = self.count.max(self.expected);
        if total == 0 {
            return Comparison {
                fraction: 1.0,
                diagnostic: "nothing to compare".to_string(),
                pass_rate: 1.0,
                mismatch: None,
            };
        }

        let fraction = self.credit_sum / total as f64;
        let pass_rate = self.full as f64 / total as f64;
        let not_returned = total - self.count;

        let diagnostic = if self.worst.is_none() && not_returned == 0 {
            format!("all {total} values within tolerance")
        } else {
            let mut msg = format!(
                "{}/{} values within tolerance ({:.1}%)",
                self.full,
                total,
                pass_rate * 100.0
            );
            if not_returned > 0 {
                msg.push_str(&format!(", {not_returned} values not returned"));
            }
            if self.missing_mismatches > 0 {
                msg.push_str(&format!(
                    ", {} missing-value mismatches",
                    self.missing_mismatches
                ));
            }
            if let Some(w) = self.worst {
                msg.push_str(&format!(
                    "; worst at {}: expected {}, got {}",
                    w.label,
                    fmt_value(w.expected),
                    fmt_value(w.actual)
                ));
                if w.distance().is_finite() {
                    msg.push_str(&format!(" (diff {:.3e})", w.distance()));
                }
            }
            msg
        };

        Comparison {
            fraction,
            diagnostic,
            pass_rate,
            mismatch: None,
        }
    }
}

fn fmt_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else {
        format!("{v:.6}")
    }
}
