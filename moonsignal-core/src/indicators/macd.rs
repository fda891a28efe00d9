//! MACD: Moving Average Convergence Divergence.
//!
//! macd_line = EMA(fast) - EMA(slow)
//! signal_line = EMA(signal) over the macd_line history
//! histogram = macd_line - signal_line
//!
//! Lookback: slow + signal - 2 (first bar where the signal line exists).

use serde::{Deserialize, Serialize};

use crate::components::indicator::Indicator;
use crate::domain::{sign, Candle, IndicatorReading};
use crate::indicators::ema::ema_of_series;

/// Which MACD line an `Macd` indicator instance emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdLine {
    Macd,
    Signal,
    Histogram,
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: usize,
    slow: usize,
    signal: usize,
    line: MacdLine,
    name: String,
}

impl Macd {
    pub fn new(fast: usize, slow: usize, signal: usize, line: MacdLine) -> Self {
        assert!(fast >= 1 && signal >= 1, "MACD periods must be >= 1");
        assert!(fast < slow, "MACD fast period must be below slow period");
        let suffix = match line {
            MacdLine::Macd => "line",
            MacdLine::Signal => "signal",
            MacdLine::Histogram => "hist",
        };
        Self {
            fast,
            slow,
            signal,
            line,
            name: format!("macd_{suffix}_{fast}_{slow}_{signal}"),
        }
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        match self.line {
            MacdLine::Macd => self.slow - 1,
            MacdLine::Signal | MacdLine::Histogram => self.slow + self.signal - 2,
        }
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let (macd_line, signal_line) = macd_series(&closes, self.fast, self.slow, self.signal);
        match self.line {
            MacdLine::Macd => macd_line,
            MacdLine::Signal => signal_line,
            MacdLine::Histogram => macd_line
                .iter()
                .zip(&signal_line)
                .map(|(m, s)| m - s)
                .collect(),
        }
    }
}

/// Full MACD and signal line series, NaN during warmup.
fn macd_series(closes: &[f64], fast: usize, slow: usize, signal: usize) -> (Vec<f64>, Vec<f64>) {
    let n = closes.len();
    let fast_ema = ema_of_series(closes, fast);
    let slow_ema = ema_of_series(closes, slow);
    let macd_line: Vec<f64> = fast_ema.iter().zip(&slow_ema).map(|(f, s)| f - s).collect();

    let mut signal_line = vec![f64::NAN; n];
    let start = slow.saturating_sub(1);
    if start < n {
        let history = ema_of_series(&macd_line[start..], signal);
        signal_line[start..].copy_from_slice(&history);
    }

    (macd_line, signal_line)
}

/// Histograms within this fraction of the MACD line are treated as zero.
const HISTOGRAM_TIE_TOLERANCE: f64 = 1e-9;

/// MACD state on the latest bar.
///
/// `bullish` holds when MACD is above its signal line, or sits on it while
/// the MACD line is above zero (a steady linear trend).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdState {
    pub macd_line: f64,
    pub signal_line: f64,
    pub histogram: f64,
    pub prev_histogram: f64,
    pub bullish: bool,
}

impl MacdState {
    /// ±0.5 histogram sign, ±0.3 histogram rising/falling, ±0.2 MACD line
    /// above/below zero. Ties contribute nothing.
    pub fn reading(&self) -> IndicatorReading {
        let strength = 0.5 * sign(self.histogram)
            + 0.3 * sign(self.histogram - self.prev_histogram)
            + 0.2 * sign(self.macd_line);
        IndicatorReading::new(Some(self.histogram), strength)
    }
}

/// Latest MACD, `None` with fewer than `slow + signal` closes.
pub fn macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> Option<MacdState> {
    if fast == 0 || signal == 0 || fast >= slow || closes.len() < slow + signal {
        return None;
    }

    let (macd_line, signal_line) = macd_series(closes, fast, slow, signal);
    let n = closes.len();
    let histogram = macd_line[n - 1] - signal_line[n - 1];
    let prev_histogram = macd_line[n - 2] - signal_line[n - 2];

    if !histogram.is_finite() || !prev_histogram.is_finite() {
        return None;
    }

    let tolerance = HISTOGRAM_TIE_TOLERANCE * macd_line[n - 1].abs();
    let snap = |h: f64| if h.abs() <= tolerance { 0.0 } else { h };
    let histogram = snap(histogram);
    let prev_histogram = snap(prev_histogram);

    Some(MacdState {
        macd_line: macd_line[n - 1],
        signal_line: signal_line[n - 1],
        histogram,
        prev_histogram,
        bullish: histogram > 0.0 || (histogram == 0.0 && macd_line[n - 1] > 0.0),
    })
}
