//! Exponential Moving Average (EMA) and the EMA trend reading.
//!
//! Recursive: EMA[t] = alpha * close[t] + (1 - alpha) * EMA[t-1]
//! Seed: EMA[period-1] = SMA of first `period` close values.
//! Lookback: period - 1.

use serde::{Deserialize, Serialize};

use crate::components::indicator::Indicator;
use crate::domain::{sign, Candle, IndicatorReading};

#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    name: String,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "EMA period must be >= 1");
        Self {
            period,
            name: format!("ema_{period}"),
        }
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        ema_of_series(&closes, self.period)
    }
}

/// Compute raw EMA values from a pre-extracted f64 slice.
/// Used by composed indicators (MACD, EMA trend) that need EMA of arbitrary series.
pub fn ema_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if n < period || period == 0 {
        return result;
    }

    let alpha = 2.0 / (period as f64 + 1.0);

    // Seed: SMA of first `period` values
    let mut sum = 0.0;
    for &v in values.iter().take(period) {
        if v.is_nan() {
            return result;
        }
        sum += v;
    }
    let seed = sum / period as f64;
    result[period - 1] = seed;

    let mut prev = seed;
    for i in period..n {
        if values[i].is_nan() {
            for val in result.iter_mut().skip(i) {
                *val = f64::NAN;
            }
            return result;
        }
        // Incremental form keeps a constant series exactly constant.
        let ema = prev + alpha * (values[i] - prev);
        result[i] = ema;
        prev = ema;
    }

    result
}

/// Fast/slow/trend EMA alignment on the latest bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmaTrend {
    pub price: f64,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub ema_trend: f64,
    pub bullish_cross: bool,
    pub bearish_cross: bool,
}

impl EmaTrend {
    /// ±0.4 for price vs trend EMA, ±0.4 for fast vs slow, ±0.2 for a fresh
    /// crossover. Exact ties contribute nothing.
    pub fn reading(&self) -> IndicatorReading {
        let mut strength = 0.4 * sign(self.price - self.ema_trend);
        strength += 0.4 * sign(self.ema_fast - self.ema_slow);
        if self.bullish_cross {
            strength += 0.2;
        } else if self.bearish_cross {
            strength -= 0.2;
        }
        IndicatorReading::new(Some(self.ema_fast - self.ema_slow), strength)
    }
}

/// EMA trend state, absent until every EMA has a previous value to compare.
pub fn ema_trend(closes: &[f64], fast: usize, slow: usize, trend: usize) -> Option<EmaTrend> {
    let needed = fast.max(slow).max(trend) + 1;
    if fast == 0 || slow == 0 || trend == 0 || closes.len() < needed {
        return None;
    }

    let fast_series = ema_of_series(closes, fast);
    let slow_series = ema_of_series(closes, slow);
    let trend_series = ema_of_series(closes, trend);

    let n = closes.len();
    let (fast_now, fast_prev) = (fast_series[n - 1], fast_series[n - 2]);
    let (slow_now, slow_prev) = (slow_series[n - 1], slow_series[n - 2]);
    let trend_now = trend_series[n - 1];

    if [fast_now, fast_prev, slow_now, slow_prev, trend_now]
        .iter()
        .any(|v| !v.is_finite())
    {
        return None;
    }

    Some(EmaTrend {
        price: closes[n - 1],
        ema_fast: fast_now,
        ema_slow: slow_now,
        ema_trend: trend_now,
        bullish_cross: fast_prev <= slow_prev && fast_now > slow_now,
        bearish_cross: fast_prev >= slow_prev && fast_now < slow_now,
    })
}
