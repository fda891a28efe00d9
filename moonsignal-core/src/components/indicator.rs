//! Indicator trait for series-producing indicators.
//!
//! Indicators are pure functions: candle history in, numeric series out.
//! The scoring engine only ever needs the latest value, but the full series
//! is what the look-ahead and warmup tests inspect.

use crate::domain::Candle;

/// Trait for single-series indicators.
///
/// Indicators take a full candle series and produce an output series of the
/// same length. The first `lookback()` values are `f64::NAN` (warmup).
///
/// # Look-ahead contamination guard
/// No indicator value at bar t may depend on price data from bar t+1 or later.
/// Every indicator must pass the truncated-vs-full series test.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "rsi_14", "adx_14").
    fn name(&self) -> &str;

    /// Number of bars before the indicator produces valid output.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire candle series.
    ///
    /// Returns a `Vec<f64>` of the same length as `candles`.
    fn compute(&self, candles: &[Candle]) -> Vec<f64>;

    /// Value on the latest candle, `None` while still warming up.
    fn latest(&self, candles: &[Candle]) -> Option<f64> {
        self.compute(candles).last().copied().filter(|v| v.is_finite())
    }
}
