//! Indicator library.
//!
//! Series-producing indicators (SMA, EMA, RSI, MACD, Bollinger, ADX) implement
//! the `Indicator` trait so their warmup and look-ahead behavior can be checked
//! uniformly. Each module also exposes a latest-bar function returning a typed
//! result, `None` when the series is shorter than the indicator's lookback.
//!
//! Inputs that are not price-derived (sentiment index, derivatives figures)
//! map straight to readings.

pub mod adx;
pub mod bollinger;
pub mod demark;
pub mod derivatives;
pub mod ema;
pub mod liquidation;
pub mod macd;
pub mod rsi;
pub mod sentiment;
pub mod sma;
pub mod volume;
pub mod wilder;

pub use adx::{trend_strength, Adx, TrendStrength};
pub use bollinger::{bollinger, Bollinger, BollingerBand, BollingerBands};
pub use demark::{demark_scan, DemarkTracker, ExhaustionState, Reversal, SetupKind, DEMARK_LOOKBACK};
pub use derivatives::{derivatives_reading, DerivativesInput};
pub use ema::{ema_of_series, ema_trend, Ema, EmaTrend};
pub use liquidation::liquidation_reading;
pub use macd::{macd, Macd, MacdLine, MacdState};
pub use rsi::{rsi_latest, rsi_strength, Rsi, RsiReading};
pub use sentiment::{fear_greed_label, sentiment_strength, SentimentReading};
pub use sma::{sma_of_series, Sma};
pub use volume::{relative_volume, VolumeClass, VolumeReading};
pub use wilder::{directional_movement, true_range, wilder_sum};

/// Create synthetic candles from close prices for testing.
///
/// Generates plausible OHLCV: open = prev_close (or close for first candle),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_candles(closes: &[f64]) -> Vec<crate::domain::Candle> {
    use crate::domain::Candle;
    use chrono::TimeZone;
    let base = chrono::Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Candle {
                timestamp: base + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
