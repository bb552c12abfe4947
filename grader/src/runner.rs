//! Drives one grading run through its states:
//! `Init -> Running -> Aggregating -> Reported -> Done`.
//!
//! Everything that can fail for reasons outside the student's control is
//! checked in `Init`; after that the run always produces a report.

use crate::console;
use crate::error::GraderError;
use crate::suite::TestSuite;
use chrono::Utc;
use code_runner::SubmissionLoader;
use marker::{GradeReport, TestResult};
use reference::{CsvPriceSource, PriceSource, ReferenceEngine, ReferencePipeline};
use std::fmt;
use std::path::{Path, PathBuf};
use util::config::AppConfig;
use util::execution_config::ExecutionConfig;
use util::lookback::derive_lookback;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Init,
    Running,
    Aggregating,
    Reported,
    Done,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Init => "init",
            RunState::Running => "running",
            RunState::Aggregating => "aggregating",
            RunState::Reported => "reported",
            RunState::Done => "done",
        };
        f.write_str(name)
    }
}

/// Inputs of a run, resolved from the environment and CLI overrides.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub repository: Option<String>,
    pub data_path: PathBuf,
    pub results_path: PathBuf,
    pub config_path: Option<PathBuf>,
    /// Overrides the configured per-call time limit.
    pub timeout_secs: Option<u64>,
    /// Print the console summary when the report is written.
    pub print_summary: bool,
}

impl RunSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            repository: config.repository.clone(),
            data_path: config.data_path.clone(),
            results_path: config.results_path.clone(),
            config_path: config.config_path.clone(),
            timeout_secs: None,
            print_summary: true,
        }
    }
}

/// Everything `Init` established.
struct Prepared {
    repository: String,
    lookback_days: u32,
    suite: TestSuite,
}

pub struct Runner {
    settings: RunSettings,
    state: RunState,
}

impl Runner {
    pub fn new(settings: RunSettings) -> Self {
        Self {
            settings,
            state: RunState::Init,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    fn advance(&mut self, next: RunState) {
        tracing::info!(from = %self.state, to = %next, "runner state change");
        self.state = next;
    }

    /// Grades the submission behind `loader` and writes the report.
    ///
    /// # Errors
    ///
    /// Any [`GraderError`] comes from `Init` or from writing the report; in
    /// both cases no partial report is left behind by this call.
    pub async fn run(&mut self, loader: &dyn SubmissionLoader) -> Result<GradeReport, GraderError> {
        tracing::info!(submission = %loader.describe(), "starting grading run");
        let prepared = self.init()?;

        self.advance(RunState::Running);
        let results = prepared.suite.run(loader).await;

        self.advance(RunState::Aggregating);
        let report = aggregate(&prepared, &results)?;

        report.write_json(&self.settings.results_path)?;
        if self.settings.print_summary {
            print!("{}", console::render(&report));
        }
        self.advance(RunState::Reported);

        self.advance(RunState::Done);
        Ok(report)
    }

    fn init(&mut self) -> Result<Prepared, GraderError> {
        let repository = self
            .settings
            .repository
            .clone()
            .filter(|r| !r.trim().is_empty())
            .ok_or(GraderError::MissingRepository)?;
        let lookback_days = derive_lookback(&repository)?;
        tracing::info!(%repository, lookback_days, "derived look-back");

        let mut config = ExecutionConfig::load_or_default(self.settings.config_path.as_deref())?;
        if let Some(secs) = self.settings.timeout_secs {
            config.execution.timeout_secs = secs;
        }
        config.validate()?;

        let source = CsvPriceSource::new(&self.settings.data_path);
        let prices = source.load()?;
        tracing::info!(
            source = %source.describe(),
            rows = prices.n_rows(),
            columns = ?prices.columns,
            "price data loaded"
        );

        let pipeline = ReferencePipeline::build(
            &ReferenceEngine::new(),
            prices,
            lookback_days,
            config.strategy.vol_lookback,
            config.strategy.target_vol,
        )?;

        let data_path = absolute(&self.settings.data_path);
        let suite = TestSuite::new(&pipeline, &config, &data_path.display().to_string())?;

        Ok(Prepared {
            repository,
            lookback_days,
            suite,
        })
    }
}

fn aggregate(prepared: &Prepared, results: &[TestResult]) -> Result<GradeReport, GraderError> {
    let report = GradeReport::new(
        prepared.repository.clone(),
        prepared.lookback_days,
        results,
        Utc::now(),
    )?;
    tracing::info!(total = report.total, max_total = report.max_total, "scores aggregated");
    Ok(report)
}

/// `path` made absolute, so a bridge running elsewhere can still open it.
fn absolute(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Process exit status for a completed run.
///
/// `0` unless `strict` is set and the run fell short of full marks.
pub fn exit_code(report: &GradeReport, strict: bool) -> u8 {
    if strict && !report.is_full_marks() { 1 } else { 0 }
}
