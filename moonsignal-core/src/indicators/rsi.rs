//! Relative Strength Index (RSI).
//!
//! Uses Wilder smoothing of average gains and average losses, seeded by the
//! simple average of the first `period` changes.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Lookback: period.
//! Edge cases: avg_loss == 0 → RSI = 100 (also for a series with no movement);
//! avg_gain == 0 → RSI = 0.

use serde::{Deserialize, Serialize};

use crate::components::indicator::Indicator;
use crate::domain::{Candle, IndicatorReading};

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        smoothed_averages(&closes, self.period)
            .into_iter()
            .map(|avg| avg.map_or(f64::NAN, |(gain, loss)| compute_rsi(gain, loss)))
            .collect()
    }
}

/// Wilder-smoothed (avg_gain, avg_loss) per index, `None` during warmup or
/// once a NaN close has been seen.
fn smoothed_averages(closes: &[f64], period: usize) -> Vec<Option<(f64, f64)>> {
    let n = closes.len();
    let mut result = vec![None; n];

    if period == 0 || n < period + 1 {
        return result;
    }

    let change = |i: usize| closes[i] - closes[i - 1];

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for i in 1..=period {
        let ch = change(i);
        if ch.is_nan() {
            return result;
        }
        if ch > 0.0 {
            avg_gain += ch;
        } else {
            avg_loss -= ch;
        }
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;
    result[period] = Some((avg_gain, avg_loss));

    let p = period as f64;
    for i in (period + 1)..n {
        let ch = change(i);
        if ch.is_nan() {
            return result;
        }
        let gain = ch.max(0.0);
        let loss = (-ch).max(0.0);

        avg_gain = (avg_gain * (p - 1.0) + gain) / p;
        avg_loss = (avg_loss * (p - 1.0) + loss) / p;
        result[i] = Some((avg_gain, avg_loss));
    }

    result
}

fn compute_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else if avg_gain == 0.0 {
        0.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

/// RSI on the latest close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RsiReading {
    pub value: f64,
    /// No gains and no losses across the smoothing history.
    pub flat: bool,
}

impl RsiReading {
    /// A flat series reports RSI 100 but carries no directional information.
    pub fn reading(&self) -> IndicatorReading {
        if self.flat {
            IndicatorReading::neutral(Some(self.value))
        } else {
            IndicatorReading::new(Some(self.value), rsi_strength(self.value))
        }
    }
}

/// Latest RSI, `None` with fewer than `period + 1` closes.
pub fn rsi_latest(closes: &[f64], period: usize) -> Option<RsiReading> {
    let (gain, loss) = smoothed_averages(closes, period).last().copied().flatten()?;
    Some(RsiReading {
        value: compute_rsi(gain, loss),
        flat: gain == 0.0 && loss == 0.0,
    })
}

/// Contrarian mapping: oversold is bullish, overbought bearish.
pub fn rsi_strength(rsi: f64) -> f64 {
    if rsi <= 20.0 {
        1.0
    } else if rsi <= 30.0 {
        0.7
    } else if rsi <= 40.0 {
        0.3
    } else if rsi < 60.0 {
        0.0
    } else if rsi < 70.0 {
        -0.3
    } else if rsi < 80.0 {
        -0.7
    } else {
        -1.0
    }
}
