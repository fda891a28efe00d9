//! Deterministic synthetic candles for demos, benchmarks and tests.
//!
//! The walk is seeded from a BLAKE3 hash of the symbol, so the same symbol
//! always yields the same series. Never use it as market data.

use chrono::{DateTime, Duration, Utc};
use moonsignal_core::domain::{Candle, PriceSeries, SeriesError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// 2024-01-01T00:00:00Z, the first synthetic candle.
const SYNTHETIC_EPOCH_SECS: i64 = 1_704_067_200;

const START_PRICE: f64 = 100.0;

/// Generate `bars` daily candles for `symbol`.
///
/// Returns `SeriesError::Empty` when `bars` is zero.
pub fn synthetic_series(symbol: &str, bars: usize) -> Result<PriceSeries, SeriesError> {
    PriceSeries::new(synthetic_candles(symbol, bars))
}

/// Random-walk candles: daily returns in ±3%, wicks up to 1% past the body.
pub fn synthetic_candles(symbol: &str, bars: usize) -> Vec<Candle> {
    let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);
    let start = DateTime::<Utc>::from_timestamp(SYNTHETIC_EPOCH_SECS, 0).unwrap_or_default();

    let mut price = START_PRICE;
    let mut candles = Vec::with_capacity(bars);
    for i in 0..bars {
        let daily_return: f64 = rng.gen_range(-0.03..0.03);
        let open = price;
        let close = price * (1.0 + daily_return);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(500_000..5_000_000u64) as f64;

        candles.push(Candle {
            timestamp: start + Duration::days(i as i64),
            open,
            high,
            low,
            close,
            volume,
        });
        price = close;
    }
    candles
}
