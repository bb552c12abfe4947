//! Grading configuration: time limits, the weight table, tolerance profiles
//! and the fixed strategy inputs handed to student code.
//!
//! Every field has a serde default, so an empty JSON object (or no file at
//! all) yields the standard homework configuration.

use crate::functions::GradableFunction;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no weight configured for '{0}'")]
    MissingWeight(GradableFunction),
    #[error("grading weights must be non-negative and sum to {expected}, got {actual}")]
    WeightMismatch { expected: f64, actual: f64 },
    #[error("invalid tolerance profile '{profile}': {reason}")]
    InvalidTolerance { profile: String, reason: String },
    #[error("invalid execution limits: {0}")]
    InvalidLimits(String),
}

/// Total of the weight table.
pub const TOTAL_WEIGHT: f64 = 100.0;

/// A numpy-style closeness bound: `|actual - expected| <= atol + rtol * |expected|`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Tolerance {
    pub rtol: f64,
    pub atol: f64,
}

impl Tolerance {
    pub const fn new(rtol: f64, atol: f64) -> Self {
        Self { rtol, atol }
    }

    /// Absolute distance allowed around `expected`.
    pub fn threshold(&self, expected: f64) -> f64 {
        self.atol + self.rtol * expected.abs()
    }
}

/// Full-credit and zero-credit bounds. Distances between the two earn
/// linearly interpolated partial credit.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct ToleranceSpec {
    pub full: Tolerance,
    pub zero: Tolerance,
}

impl ToleranceSpec {
    pub const fn new(full: Tolerance, zero: Tolerance) -> Self {
        Self { full, zero }
    }

    /// Checks that all bounds are finite, non-negative and that the
    /// zero-credit bound is at least as wide as the full-credit one.
    pub fn validate(&self, profile: &str) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidTolerance {
            profile: profile.to_string(),
            reason,
        };

        for (label, v) in [
            ("full.rtol", self.full.rtol),
            ("full.atol", self.full.atol),
            ("zero.rtol", self.zero.rtol),
            ("zero.atol", self.zero.atol),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(invalid(format!("{label} must be finite and >= 0, got {v}")));
            }
        }
        if self.zero.rtol < self.full.rtol || self.zero.atol < self.full.atol {
            return Err(invalid(
                "zero-credit bound must not be tighter than the full-credit bound".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToleranceProfiles {
    #[serde(default = "default_strict")]
    pub strict: ToleranceSpec,
    #[serde(default = "default_loose")]
    pub loose: ToleranceSpec,
    #[serde(default = "default_metrics")]
    pub metrics: ToleranceSpec,
}

impl Default for ToleranceProfiles {
    fn default() -> Self {
        Self {
            strict: default_strict(),
            loose: default_loose(),
            metrics: default_metrics(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExecutionLimits {
    /// Wall-clock budget for one call into student code.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ExecutionLimits {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MarkingOptions {
    #[serde(default = "default_weights")]
    pub weights: BTreeMap<GradableFunction, f64>,

    #[serde(default)]
    pub tolerances: ToleranceProfiles,
}

impl Default for MarkingOptions {
    fn default() -> Self {
        Self {
            weights: default_weights(),
            tolerances: ToleranceProfiles::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StrategyOptions {
    /// Target volatility passed to the strategy-returns test.
    #[serde(default = "default_target_vol")]
    pub target_vol: f64,

    /// Rolling window for the volatility test and the strategy pipeline.
    #[serde(default = "default_vol_lookback")]
    pub vol_lookback: usize,
}

impl Default for StrategyOptions {
    fn default() -> Self {
        Self {
            target_vol: default_target_vol(),
            vol_lookback: default_vol_lookback(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ExecutionConfig {
    #[serde(default)]
    pub execution: ExecutionLimits,

    #[serde(default)]
    pub marking: MarkingOptions,

    #[serde(default)]
    pub strategy: StrategyOptions,
}

impl ExecutionConfig {
    pub fn default_config() -> Self {
        Self::default()
    }

    /// Reads a JSON config file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = serde_json::from_str(&contents)?;
        tracing::debug!(path = %path.display(), "loaded grading config");
        Ok(config)
    }

    /// Loads `path` when given, otherwise returns the default configuration.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    /// Validates weights (one per function, non-negative, summing to
    /// [`TOTAL_WEIGHT`]), tolerance profiles and time limits.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut total = 0.0;
        for function in GradableFunction::ALL {
            let weight = self
                .marking
                .weights
                .get(&function)
                .copied()
                .ok_or(ConfigError::MissingWeight(function))?;
            if !weight.is_finite() || weight < 0.0 {
                return Err(ConfigError::WeightMismatch {
                    expected: TOTAL_WEIGHT,
                    actual: weight,
                });
            }
            total += weight;
        }
        if (total - TOTAL_WEIGHT).abs() > 1e-9 {
            return Err(ConfigError::WeightMismatch {
                expected: TOTAL_WEIGHT,
                actual: total,
            });
        }

        let profiles = &self.marking.tolerances;
        profiles.strict.validate("strict")?;
        profiles.loose.validate("loose")?;
        profiles.metrics.validate("metrics")?;

        if self.execution.timeout_secs == 0 {
            return Err(ConfigError::InvalidLimits(
                "timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.strategy.vol_lookback < 2 {
            return Err(ConfigError::InvalidLimits(
                "vol_lookback must be at least 2".to_string(),
            ));
        }
        Ok(())
    }

    pub fn weight(&self, function: GradableFunction) -> f64 {
        self.marking
            .weights
            .get(&function)
            .copied()
            .unwrap_or_else(|| function.default_weight())
    }

    /// The tolerance profile a function is graded with.
    pub fn tolerance_for(&self, function: GradableFunction) -> ToleranceSpec {
        let profiles = &self.marking.tolerances;
        match function {
            GradableFunction::ReadData
            | GradableFunction::CalculateReturns
            | GradableFunction::GenerateSignals => profiles.strict,
            GradableFunction::CalculateMomentum
            | GradableFunction::CalculateVolatility
            | GradableFunction::CalculateStrategyReturns => profiles.loose,
            GradableFunction::CalculatePerformance => profiles.metrics,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.execution.timeout_secs)
    }
}

// Default functions

fn default_timeout_secs() -> u64 {
    10
}

fn default_weights() -> BTreeMap<GradableFunction, f64> {
    GradableFunction::ALL
        .into_iter()
        .map(|f| (f, f.default_weight()))
        .collect()
}

fn default_strict() -> ToleranceSpec {
    ToleranceSpec::new(Tolerance::new(1e-4, 1e-6), Tolerance::new(1e-2, 1e-4))
}

fn default_loose() -> ToleranceSpec {
    ToleranceSpec::new(Tolerance::new(1e-2, 1e-4), Tolerance::new(1e-1, 1e-3))
}

fn default_metrics() -> ToleranceSpec {
    ToleranceSpec::new(Tolerance::new(1e-3, 1e-6), Tolerance::new(1e-1, 1e-3))
}

fn default_target_vol() -> f64 {
    0.40
}

fn default_vol_lookback() -> usize {
    252
}
