//! ADX: Average Directional Index (Wilder).
//!
//! Steps:
//! 1. Compute TR, +DM and -DM from consecutive candles
//! 2. Wilder-sum each (seed = sum of first `period` raw values)
//! 3. +DI = 100 * sum(+DM) / sum(TR), -DI likewise
//! 4. DX = 100 * |+DI - -DI| / (+DI + -DI)
//! 5. ADX = mean of the last `period` DX values
//!
//! Lookback: 2 * period - 1 (needs 2 * period candles).

use serde::{Deserialize, Serialize};

use crate::components::indicator::Indicator;
use crate::domain::{sign, Candle, Direction, IndicatorReading};
use crate::indicators::wilder::{directional_movement, true_range, wilder_sum};

/// ADX at or above this marks a trending market.
pub const TRENDING_ADX: f64 = 20.0;
/// ADX at or above this marks a strong trend.
pub const STRONG_TREND_ADX: f64 = 40.0;

#[derive(Debug, Clone)]
pub struct Adx {
    period: usize,
    name: String,
}

impl Adx {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ADX period must be >= 1");
        Self {
            period,
            name: format!("adx_{period}"),
        }
    }
}

impl Indicator for Adx {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        2 * self.period - 1
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        let lines = directional_lines(candles, self.period);
        let n = candles.len();
        let mut result = vec![f64::NAN; n];

        let first = self.lookback();
        for i in first..n {
            let window = &lines.dx[(i + 1 - self.period)..=i];
            if window.iter().any(|v| v.is_nan()) {
                continue;
            }
            result[i] = window.iter().sum::<f64>() / self.period as f64;
        }

        result
    }
}

struct DirectionalLines {
    plus_di: Vec<f64>,
    minus_di: Vec<f64>,
    dx: Vec<f64>,
}

fn directional_lines(candles: &[Candle], period: usize) -> DirectionalLines {
    let n = candles.len();
    let mut lines = DirectionalLines {
        plus_di: vec![f64::NAN; n],
        minus_di: vec![f64::NAN; n],
        dx: vec![f64::NAN; n],
    };

    if n < 2 || period == 0 {
        return lines;
    }

    // TR[0] has no previous close; the raw series start at index 1.
    let tr = true_range(candles);
    let (plus_dm, minus_dm) = directional_movement(candles);
    let sum_tr = wilder_sum(&tr, period, 1);
    let sum_plus = wilder_sum(&plus_dm, period, 1);
    let sum_minus = wilder_sum(&minus_dm, period, 1);

    for i in 0..n {
        if sum_tr[i].is_nan() || sum_plus[i].is_nan() || sum_minus[i].is_nan() {
            continue;
        }
        let (plus_di, minus_di) = if sum_tr[i] == 0.0 {
            (0.0, 0.0)
        } else {
            (
                100.0 * sum_plus[i] / sum_tr[i],
                100.0 * sum_minus[i] / sum_tr[i],
            )
        };
        let di_sum = plus_di + minus_di;

        lines.plus_di[i] = plus_di;
        lines.minus_di[i] = minus_di;
        lines.dx[i] = if di_sum == 0.0 {
            0.0
        } else {
            100.0 * (plus_di - minus_di).abs() / di_sum
        };
    }

    lines
}

/// Trend strength on the latest candle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendStrength {
    pub adx: f64,
    pub plus_di: f64,
    pub minus_di: f64,
    pub direction: Direction,
    pub trending: bool,
    pub strong_trend: bool,
}

impl TrendStrength {
    /// Directional read: the DI spread's sign scaled by ADX/50, only when
    /// the market is trending.
    pub fn reading(&self) -> IndicatorReading {
        let strength = if self.trending {
            sign(self.plus_di - self.minus_di) * (self.adx / 50.0).min(1.0)
        } else {
            0.0
        };
        IndicatorReading::new(Some(self.adx), strength)
    }

    /// True when the DI direction agrees with the sign of `base`.
    pub fn aligned_with(&self, base: f64) -> bool {
        matches!(
            (self.direction, sign(base) as i8),
            (Direction::Bullish, 1) | (Direction::Bearish, -1)
        )
    }
}

/// ADX with its directional lines on the latest candle, `None` with fewer
/// than `2 * period` candles.
pub fn trend_strength(candles: &[Candle], period: usize) -> Option<TrendStrength> {
    if period == 0 || candles.len() < 2 * period {
        return None;
    }

    let adx = *Adx::new(period).compute(candles).last()?;
    let lines = directional_lines(candles, period);
    let last = candles.len() - 1;
    let (plus_di, minus_di) = (lines.plus_di[last], lines.minus_di[last]);

    if !adx.is_finite() || !plus_di.is_finite() || !minus_di.is_finite() {
        return None;
    }

    Some(TrendStrength {
        adx,
        plus_di,
        minus_di,
        direction: Direction::from_strength(plus_di - minus_di),
        trending: adx >= TRENDING_ADX,
        strong_trend: adx >= STRONG_TREND_ADX,
    })
}
