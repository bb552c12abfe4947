//! The catalogue of gradable functions and the payloads used to call them.

use crate::frame::{Frame, Series};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One student-implemented operation evaluated by the grader.
///
/// The declaration order is the order the runner grades them in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum GradableFunction {
    ReadData,
    CalculateReturns,
    CalculateMomentum,
    GenerateSignals,
    CalculateVolatility,
    CalculateStrategyReturns,
    CalculatePerformance,
}

impl GradableFunction {
    pub const ALL: [GradableFunction; 7] = [
        GradableFunction::ReadData,
        GradableFunction::CalculateReturns,
        GradableFunction::CalculateMomentum,
        GradableFunction::GenerateSignals,
        GradableFunction::CalculateVolatility,
        GradableFunction::CalculateStrategyReturns,
        GradableFunction::CalculatePerformance,
    ];

    pub fn name(self) -> &'static str {
        match self {
            GradableFunction::ReadData => "read_data",
            GradableFunction::CalculateReturns => "calculate_returns",
            GradableFunction::CalculateMomentum => "calculate_momentum",
            GradableFunction::GenerateSignals => "generate_signals",
            GradableFunction::CalculateVolatility => "calculate_volatility",
            GradableFunction::CalculateStrategyReturns => "calculate_strategy_returns",
            GradableFunction::CalculatePerformance => "calculate_performance",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    /// Points awarded for a perfect implementation; the table sums to 100.
    pub fn default_weight(self) -> f64 {
        match self {
            GradableFunction::ReadData => 10.0,
            GradableFunction::CalculateReturns => 15.0,
            GradableFunction::CalculateMomentum => 20.0,
            GradableFunction::GenerateSignals => 10.0,
            GradableFunction::CalculateVolatility => 10.0,
            GradableFunction::CalculateStrategyReturns => 25.0,
            GradableFunction::CalculatePerformance => 10.0,
        }
    }
}

impl fmt::Display for GradableFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Arguments for one invocation of a student function.
///
/// Serialized as `{"function": "<name>", "args": {...}}` for out-of-process
/// submissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "function", content = "args", rename_all = "snake_case")]
pub enum FunctionCall {
    ReadData {
        filepath: String,
    },
    CalculateReturns {
        prices: Frame,
    },
    CalculateMomentum {
        daily_returns: Frame,
        lookback_days: u32,
    },
    GenerateSignals {
        momentum: Frame,
    },
    CalculateVolatility {
        daily_returns: Frame,
        vol_lookback: usize,
    },
    CalculateStrategyReturns {
        signals: Frame,
        daily_returns: Frame,
        volatility: Frame,
        target_vol: f64,
    },
    CalculatePerformance {
        daily_returns: Series,
    },
}

impl FunctionCall {
    pub fn function(&self) -> GradableFunction {
        match self {
            FunctionCall::ReadData { .. } => GradableFunction::ReadData,
            FunctionCall::CalculateReturns { .. } => GradableFunction::CalculateReturns,
            FunctionCall::CalculateMomentum { .. } => GradableFunction::CalculateMomentum,
            FunctionCall::GenerateSignals { .. } => GradableFunction::GenerateSignals,
            FunctionCall::CalculateVolatility { .. } => GradableFunction::CalculateVolatility,
            FunctionCall::CalculateStrategyReturns { .. } => {
                GradableFunction::CalculateStrategyReturns
            }
            FunctionCall::CalculatePerformance { .. } => GradableFunction::CalculatePerformance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_100() {
        let total: f64 = GradableFunction::ALL.iter().map(|f| f.default_weight()).sum();
        assert_eq!(total, 100.0);
    }

    #[test]
    fn test_names_round_trip() {
        for f in GradableFunction::ALL {
            assert_eq!(GradableFunction::from_name(f.name()), Some(f));
            assert_eq!(
                serde_json::to_value(f).unwrap(),
                serde_json::Value::String(f.name().to_string())
            );
        }
        assert_eq!(GradableFunction::from_name("calculate_alpha"), None);
    }

    #[test]
    fn test_call_wire_format() {
        let call = FunctionCall::ReadData {
            filepath: "data/price_data.csv".into(),
        };
        let json = serde_json::to_value(&call).unwrap();
        assert_eq!(json["function"], "read_data");
        assert_eq!(json["args"]["filepath"], "data/price_data.csv");
        assert_eq!(call.function(), GradableFunction::ReadData);
    }
}
