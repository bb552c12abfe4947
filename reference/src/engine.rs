use crate::error::ReferenceError;
use crate::io::read_price_csv;
use crate::rolling::{cumprod_skipna, mean_skipna, pct_change, rolling_std, sample_std, shift, sign};
use crate::{PORTFOLIO_COLUMN, TRADING_DAYS_PER_YEAR};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use util::frame::{Frame, Series};

/// Summary statistics of a daily return series.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PerformanceMetrics {
    pub annualized_return: f64,
    pub annualized_volatility: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub cumulative_return: f64,
}

impl PerformanceMetrics {
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("annualized_return".to_string(), self.annualized_return),
            ("annualized_volatility".to_string(), self.annualized_volatility),
            ("sharpe_ratio".to_string(), self.sharpe_ratio),
            ("max_drawdown".to_string(), self.max_drawdown),
            ("cumulative_return".to_string(), self.cumulative_return),
        ])
    }
}

/// A stateless calculator holding the ground-truth version of every
/// gradable function.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReferenceEngine;

impl ReferenceEngine {
    pub fn new() -> Self {
        Self
    }

    /// Loads the price table from a CSV file.
    pub fn read_data(&self, path: &Path) -> Result<Frame, ReferenceError> {
        read_price_csv(path)
    }

    /// Daily simple returns per column over forward-filled prices. The first
    /// row is missing.
    pub fn calculate_returns(&self, prices: &Frame) -> Frame {
        prices.map_columns(|_, col| pct_change(col))
    }

    /// Trailing momentum over `lookback_days`, skipping the most recent day.
    ///
    /// With `C` the cumulative growth of `1 + r`, the value at `t` is
    /// `C[t-1] / C[t-lookback-1] - 1`. The first defined row is
    /// `lookback + 2`.
    pub fn calculate_momentum(
        &self,
        daily_returns: &Frame,
        lookback_days: u32,
    ) -> Result<Frame, ReferenceError> {
        if lookback_days == 0 {
            return Err(ReferenceError::InvalidArgument(
                "lookback_days must be positive".to_string(),
            ));
        }
        let lag = lookback_days as usize + 1;

        Ok(daily_returns.map_columns(|_, col| {
            let growth: Vec<f64> = col.iter().map(|r| 1.0 + r).collect();
            let cum = cumprod_skipna(&growth);
            let recent = shift(&cum, 1);
            let lagged = shift(&cum, lag);
            recent
                .iter()
                .zip(&lagged)
                .map(|(a, b)| a / b - 1.0)
                .collect()
        }))
    }

    /// Trend-following position per asset: the sign of momentum, with
    /// missing momentum mapped to a flat (`0`) position.
    pub fn generate_signals(&self, momentum: &Frame) -> Frame {
        momentum.map_columns(|_, col| {
            col.iter()
                .map(|&m| {
                    let s = sign(m);
                    if s.is_nan() { 0.0 } else { s }
                })
                .collect()
        })
    }

    /// Annualized rolling volatility of daily returns.
    pub fn calculate_volatility(
        &self,
        daily_returns: &Frame,
        vol_lookback: usize,
    ) -> Result<Frame, ReferenceError> {
        if vol_lookback < 2 {
            return Err(ReferenceError::InvalidArgument(format!(
                "vol_lookback must be at least 2, got {vol_lookback}"
            )));
        }
        let annualize = TRADING_DAYS_PER_YEAR.sqrt();
        Ok(daily_returns.map_columns(|_, col| {
            rolling_std(col, vol_lookback)
                .into_iter()
                .map(|v| v * annualize)
                .collect()
        }))
    }

    /// Volatility-scaled strategy returns per asset plus the equal-weight
    /// portfolio column [`PORTFOLIO_COLUMN`].
    ///
    /// Positions are sized with the previous day's volatility estimate:
    /// `signal[t] * (target_vol / vol[t-1]) * r[t]`. The portfolio column is
    /// the mean of the present asset returns on each row.
    pub fn calculate_strategy_returns(
        &self,
        signals: &Frame,
        daily_returns: &Frame,
        volatility: &Frame,
        target_vol: f64,
    ) -> Result<Frame, ReferenceError> {
        for (label, other) in [("daily_returns", daily_returns), ("volatility", volatility)] {
            if !signals.same_index(other) {
                return Err(ReferenceError::ShapeMismatch(format!(
                    "signals and {label} have different indexes"
                )));
            }
            if signals.columns != other.columns {
                return Err(ReferenceError::ShapeMismatch(format!(
                    "signals columns {:?} differ from {label} columns {:?}",
                    signals.columns, other.columns
                )));
            }
        }

        let assets = signals.map_columns(|name, sig| {
            // Presence checked above.
            let ret = daily_returns.column(name).unwrap_or_default();
            let lagged_vol = shift(volatility.column(name).unwrap_or_default(), 1);
            sig.iter()
                .zip(ret)
                .zip(&lagged_vol)
                .map(|((s, r), v)| s * (target_vol / v) * r)
                .collect()
        });

        let portfolio: Vec<f64> = (0..assets.n_rows())
            .map(|row| mean_skipna(assets.data.iter().map(|col| col[row])))
            .collect();

        Ok(assets.with_column(PORTFOLIO_COLUMN, portfolio)?)
    }

    /// Annualized statistics of a daily return series, computed over its
    /// present values.
    pub fn calculate_performance(
        &self,
        daily_returns: &Series,
    ) -> Result<PerformanceMetrics, ReferenceError> {
        let r: Vec<f64> = daily_returns
            .values
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .collect();

        if r.is_empty() {
            return Err(ReferenceError::NotEnoughData(format!(
                "series '{}' has no values",
                daily_returns.name
            )));
        }

        let mean = r.iter().sum::<f64>() / r.len() as f64;
        let annualized_return = mean * TRADING_DAYS_PER_YEAR;
        let annualized_volatility = sample_std(&r) * TRADING_DAYS_PER_YEAR.sqrt();
        let sharpe_ratio = if annualized_volatility != 0.0 {
            annualized_return / annualized_volatility
        } else {
            0.0
        };

        let wealth = cumprod_skipna(&r.iter().map(|v| 1.0 + v).collect::<Vec<_>>());
        let mut peak = f64::NEG_INFINITY;
        let mut max_drawdown = f64::INFINITY;
        for &w in &wealth {
            peak = peak.max(w);
            max_drawdown = max_drawdown.min((w - peak) / peak);
        }
        let cumulative_return = wealth.last().copied().unwrap_or(1.0) - 1.0;

        Ok(PerformanceMetrics {
            annualized_return,
            annualized_volatility,
            sharpe_ratio,
            max_drawdown,
            cumulative_return,
        })
    }
}
