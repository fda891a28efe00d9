//! Candle and PriceSeries: the market data the engine consumes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// OHLCV candle for a single asset.
///
/// Only `high`, `low`, `close` and `volume` feed the indicators; `open` and
/// `timestamp` are carried through for display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Returns true if any OHLCV field is NaN.
    pub fn is_void(&self) -> bool {
        self.open.is_nan()
            || self.high.is_nan()
            || self.low.is_nan()
            || self.close.is_nan()
            || self.volume.is_nan()
    }

    /// Basic OHLC sanity check: high >= low, high >= open/close, low <= open/close.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.volume >= 0.0
    }
}

/// Errors raised when building a `PriceSeries`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("price series is empty")]
    Empty,
    #[error("candle {index} is earlier than the candle before it")]
    NotChronological { index: usize },
    #[error("candle {index} repeats timestamp {timestamp}")]
    DuplicateTimestamp {
        index: usize,
        timestamp: DateTime<Utc>,
    },
}

/// Chronological, non-empty candle sequence with unique timestamps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    candles: Vec<Candle>,
}

impl PriceSeries {
    pub fn new(candles: Vec<Candle>) -> Result<Self, SeriesError> {
        if candles.is_empty() {
            return Err(SeriesError::Empty);
        }
        for (i, pair) in candles.windows(2).enumerate() {
            let index = i + 1;
            if pair[1].timestamp == pair[0].timestamp {
                return Err(SeriesError::DuplicateTimestamp {
                    index,
                    timestamp: pair[1].timestamp,
                });
            }
            if pair[1].timestamp < pair[0].timestamp {
                return Err(SeriesError::NotChronological { index });
            }
        }
        Ok(Self { candles })
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    /// Always false; kept for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// Most recent candle. The series is never empty.
    pub fn last(&self) -> &Candle {
        &self.candles[self.candles.len() - 1]
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.volume).collect()
    }

    pub fn into_candles(self) -> Vec<Candle> {
        self.candles
    }
}

impl<'de> Deserialize<'de> for PriceSeries {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            candles: Vec<Candle>,
        }
        let raw = Raw::deserialize(deserializer)?;
        PriceSeries::new(raw.candles).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn candle_at(day: i64, close: f64) -> Candle {
        Candle {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(day),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000.0,
        }
    }

    #[test]
    fn candle_is_sane() {
        assert!(candle_at(0, 100.0).is_sane());
    }

    #[test]
    fn candle_detects_void() {
        let mut candle = candle_at(0, 100.0);
        candle.close = f64::NAN;
        assert!(candle.is_void());
        assert!(!candle.is_sane());
    }

    #[test]
    fn series_rejects_empty() {
        assert_eq!(PriceSeries::new(Vec::new()), Err(SeriesError::Empty));
    }

    #[test]
    fn series_rejects_out_of_order() {
        let err = PriceSeries::new(vec![candle_at(1, 100.0), candle_at(0, 101.0)]).unwrap_err();
        assert_eq!(err, SeriesError::NotChronological { index: 1 });
    }

    #[test]
    fn series_rejects_duplicate_timestamp() {
        let err = PriceSeries::new(vec![
            candle_at(0, 100.0),
            candle_at(1, 101.0),
            candle_at(1, 102.0),
        ])
        .unwrap_err();
        assert!(matches!(err, SeriesError::DuplicateTimestamp { index: 2, .. }));
    }

    #[test]
    fn series_extracts_columns() {
        let series = PriceSeries::new(vec![candle_at(0, 100.0), candle_at(1, 102.0)]).unwrap();
        assert_eq!(series.closes(), vec![100.0, 102.0]);
        assert_eq!(series.volumes(), vec![1000.0, 1000.0]);
        assert_eq!(series.last().close, 102.0);
    }

    #[test]
    fn series_json_roundtrip_validates() {
        let series = PriceSeries::new(vec![candle_at(0, 100.0), candle_at(1, 102.0)]).unwrap();
        let json = serde_json::to_string(&series).unwrap();
        let back: PriceSeries = serde_json::from_str(&json).unwrap();
        assert_eq!(series, back);

        let broken = json.replace("2024-01-02", "2023-12-31");
        assert!(serde_json::from_str::<PriceSeries>(&broken).is_err());
    }
}
