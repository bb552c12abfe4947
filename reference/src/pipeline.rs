use crate::engine::{PerformanceMetrics, ReferenceEngine};
use crate::error::ReferenceError;
use crate::{PORTFOLIO_COLUMN, TARGET_VOL};
use util::frame::{Frame, Series};
use util::lookback::LOOKBACK_MAX;

/// Fewest price rows a run accepts: enough for the longest possible
/// momentum window plus the return and skip-day offsets.
pub const MIN_PRICE_ROWS: usize = LOOKBACK_MAX as usize + 3;

/// Every intermediate result of the reference chain for one run.
///
/// Built once at start-up; tests read their inputs and expectations from
/// here so that a student mistake in one function never leaks into the
/// grading of another.
#[derive(Debug, Clone)]
pub struct ReferencePipeline {
    pub lookback_days: u32,
    pub vol_lookback: usize,
    pub target_vol: f64,
    pub prices: Frame,
    pub daily_returns: Frame,
    pub momentum: Frame,
    pub signals: Frame,
    pub volatility: Frame,
    /// Strategy returns scaled to `target_vol`.
    pub strategy_returns: Frame,
    /// Portfolio returns scaled to the default [`TARGET_VOL`].
    pub tsmom: Series,
    pub performance: PerformanceMetrics,
}

impl ReferencePipeline {
    pub fn build(
        engine: &ReferenceEngine,
        prices: Frame,
        lookback_days: u32,
        vol_lookback: usize,
        target_vol: f64,
    ) -> Result<Self, ReferenceError> {
        let required = MIN_PRICE_ROWS.max(vol_lookback + 3);
        if prices.n_rows() < required {
            return Err(ReferenceError::NotEnoughData(format!(
                "price data has {} rows, at least {required} are required",
                prices.n_rows()
            )));
        }
        if !(target_vol.is_finite() && target_vol > 0.0) {
            return Err(ReferenceError::InvalidArgument(format!(
                "target_vol must be positive, got {target_vol}"
            )));
        }

        let daily_returns = engine.calculate_returns(&prices);
        let momentum = engine.calculate_momentum(&daily_returns, lookback_days)?;
        let signals = engine.generate_signals(&momentum);
        let volatility = engine.calculate_volatility(&daily_returns, vol_lookback)?;
        let strategy_returns =
            engine.calculate_strategy_returns(&signals, &daily_returns, &volatility, target_vol)?;

        let tsmom = engine
            .calculate_strategy_returns(&signals, &daily_returns, &volatility, TARGET_VOL)?
            .to_series(PORTFOLIO_COLUMN)
            .ok_or_else(|| {
                ReferenceError::ShapeMismatch(format!("missing '{PORTFOLIO_COLUMN}' column"))
            })?;

        let present = tsmom.values.iter().filter(|v| !v.is_nan()).count();
        if present < 2 {
            return Err(ReferenceError::NotEnoughData(format!(
                "portfolio returns have {present} defined values, at least 2 are required"
            )));
        }
        let performance = engine.calculate_performance(&tsmom)?;

        tracing::info!(
            rows = prices.n_rows(),
            assets = prices.n_cols(),
            lookback_days,
            vol_lookback,
            target_vol,
            "reference outputs computed"
        );

        Ok(Self {
            lookback_days,
            vol_lookback,
            target_vol,
            prices,
            daily_returns,
            momentum,
            signals,
            volatility,
            strategy_returns,
            tsmom,
            performance,
        })
    }
}
