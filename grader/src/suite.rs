//! One test per gradable function.
//!
//! Every test hands the student function *reference* inputs, so a mistake
//! in one function never changes the inputs another is graded on. Failures
//! inside a test are recorded in its [`TestResult`] and never propagate.

use code_runner::{InvocationError, SubmissionLoader, invoke_with_timeout};
use marker::{FailureKind, OutputComparator, TestResult, comparator_for};
use marker::MarkerError;
use reference::ReferencePipeline;
use std::time::{Duration, Instant};
use util::execution_config::ExecutionConfig;
use util::frame::Output;
use util::functions::{FunctionCall, GradableFunction};

/// A prepared test: what to call, what to expect and how to score it.
pub struct TestCase {
    pub function: GradableFunction,
    pub call: FunctionCall,
    pub expected: Output,
    pub weight: f64,
    comparator: Box<dyn OutputComparator>,
}

impl TestCase {
    /// Calls the student's implementation once and scores the result.
    pub async fn run(&self, loader: &dyn SubmissionLoader, limit: Duration) -> TestResult {
        let name = self.function.name();
        let started = Instant::now();

        let student = match loader.load(self.function) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(test = name, error = %e, "could not load student function");
                return TestResult::failed(name, self.weight, FailureKind::LoadError, e.to_string());
            }
        };

        let output = match invoke_with_timeout(student.as_ref(), &self.call, limit).await {
            Ok(output) => output,
            Err(e) => {
                let kind = match &e {
                    InvocationError::Timeout(_) => FailureKind::Timeout,
                    InvocationError::MissingFunction(_) => FailureKind::LoadError,
                    _ => FailureKind::ExecutionError,
                };
                tracing::warn!(test = name, %kind, error = %e, "student function failed");
                return TestResult::failed(name, self.weight, kind, e.to_string());
            }
        };

        let comparison = self.comparator.compare(&self.expected, &output);
        let result = TestResult::scored(name, self.weight, comparison);
        tracing::info!(
            test = name,
            fraction = result.fraction,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "test graded"
        );
        result
    }
}

/// The ordered set of tests for one run.
pub struct TestSuite {
    cases: Vec<TestCase>,
    limit: Duration,
}

impl TestSuite {
    /// Builds every test from the reference pipeline.
    ///
    /// `data_path` is what the student's `read_data` is called with.
    pub fn new(
        pipeline: &ReferencePipeline,
        config: &ExecutionConfig,
        data_path: &str,
    ) -> Result<Self, MarkerError> {
        let cases = GradableFunction::ALL
            .into_iter()
            .map(|function| {
                let (call, expected) = fixture(function, pipeline, data_path);
                Ok(TestCase {
                    function,
                    call,
                    expected,
                    weight: config.weight(function),
                    comparator: comparator_for(function, config)?,
                })
            })
            .collect::<Result<Vec<_>, MarkerError>>()?;

        Ok(Self {
            cases,
            limit: config.timeout(),
        })
    }

    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }

    /// Runs the tests in declaration order, one call each.
    pub async fn run(&self, loader: &dyn SubmissionLoader) -> Vec<TestResult> {
        let mut results = Vec::with_capacity(self.cases.len());
        for case in &self.cases {
            results.push(case.run(loader, self.limit).await);
        }
        results
    }
}

/// Inputs and expected output for `function`.
fn fixture(
    function: GradableFunction,
    p: &ReferencePipeline,
    data_path: &str,
) -> (FunctionCall, Output) {
    match function {
        GradableFunction::ReadData => (
            FunctionCall::ReadData {
                filepath: data_path.to_string(),
            },
            p.prices.clone().into(),
        ),
        GradableFunction::CalculateReturns => (
            FunctionCall::CalculateReturns {
                prices: p.prices.clone(),
            },
            p.daily_returns.clone().into(),
        ),
        GradableFunction::CalculateMomentum => (
            FunctionCall::CalculateMomentum {
                daily_returns: p.daily_returns.clone(),
                lookback_days: p.lookback_days,
            },
            p.momentum.clone().into(),
        ),
        GradableFunction::GenerateSignals => (
            FunctionCall::GenerateSignals {
                momentum: p.momentum.clone(),
            },
            p.signals.clone().into(),
        ),
        GradableFunction::CalculateVolatility => (
            FunctionCall::CalculateVolatility {
                daily_returns: p.daily_returns.clone(),
                vol_lookback: p.vol_lookback,
            },
            p.volatility.clone().into(),
        ),
        GradableFunction::CalculateStrategyReturns => (
            FunctionCall::CalculateStrategyReturns {
                signals: p.signals.clone(),
                daily_returns: p.daily_returns.clone(),
                volatility: p.volatility.clone(),
                target_vol: p.target_vol,
            },
            p.strategy_returns.clone().into(),
        ),
        GradableFunction::CalculatePerformance => (
            FunctionCall::CalculatePerformance {
                daily_returns: p.tsmom.clone(),
            },
            Output::Metrics {
                values: p.performance.to_map(),
            },
        ),
    }
}
