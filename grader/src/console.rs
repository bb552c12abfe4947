//! Human-readable summary printed at the end of a run.

use colored::*;
use marker::report::ReportEntry;
use marker::{GradeReport, TestStatus};

const RULE_WIDTH: usize = 60;
const STATUS_COLUMN: usize = 44;

fn status_tag(status: TestStatus) -> ColoredString {
    let tag = format!("[{status}]");
    match status {
        TestStatus::Pass => tag.green(),
        TestStatus::Partial => tag.yellow(),
        TestStatus::Fail => tag.red(),
    }
}

fn render_entry(entry: &ReportEntry) -> String {
    let label = format!("{} {}", status_tag(entry.status), entry.name.bold());
    // Pad on the visible width, ignoring colour escape codes.
    let visible = entry.status.to_string().len() + 3 + entry.name.len();
    let dots = ".".repeat(STATUS_COLUMN.saturating_sub(visible));
    let mut out = format!(
        "{label} {dots} {:.2}/{:.2}\n",
        entry.earned, entry.possible
    );
    out.push_str(&format!("    {}\n", entry.diagnostic.dimmed()));
    out
}

/// Renders `report` as the console summary.
pub fn render(report: &GradeReport) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();

    out.push_str(&format!("{rule}\n"));
    out.push_str(&format!("Grading {}\n", report.repository.bold()));
    out.push_str(&format!("Look-back period: {} days\n", report.lookback_days));
    out.push_str(&format!("{rule}\n"));

    for entry in &report.tests {
        out.push_str(&render_entry(entry));
    }

    let total = format!("TOTAL: {:.2}/{:.2}", report.total, report.max_total);
    let total = if report.is_full_marks() {
        total.green().bold()
    } else {
        total.bold()
    };
    out.push_str(&format!("{rule}\n{total}\n{rule}\n"));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use marker::{Comparison, FailureKind, TestResult};

    fn report() -> GradeReport {
        let results = vec![
            TestResult::scored(
                "read_data",
                10.0,
                Comparison {
                    fraction: 1.0,
                    diagnostic: "all 900 values within tolerance".into(),
                    pass_rate: 1.0,
                    mismatch: None,
                },
            ),
            TestResult::failed(
                "calculate_momentum",
                20.0,
                FailureKind::Timeout,
                "exceeded time limit of 10s",
            ),
        ];
        GradeReport::new("org/hw1-johndoe", 100, &results, Utc::now()).unwrap()
    }

    #[test]
    fn test_render_contains_every_test() {
        colored::control::set_override(false);
        let text = render(&report());
        assert!(text.contains("Look-back period: 100 days"), "{text}");
        assert!(text.contains("[PASS] read_data"), "{text}");
        assert!(text.contains("10.00/10.00"), "{text}");
        assert!(text.contains("[FAIL] calculate_momentum"), "{text}");
        assert!(text.contains("timeout: exceeded time limit of 10s"), "{text}");
        assert!(text.contains("TOTAL: 10.00/30.00"), "{text}");
    }
}
