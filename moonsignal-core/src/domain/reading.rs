//! Typed indicator readings: what every indicator reports to the scoring engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Directional bias of a single reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Bullish,
    Bearish,
    Neutral,
}

impl Direction {
    /// Sign of a strength: positive is bullish, negative bearish, zero neutral.
    pub fn from_strength(strength: f64) -> Self {
        if strength > 0.0 {
            Direction::Bullish
        } else if strength < 0.0 {
            Direction::Bearish
        } else {
            Direction::Neutral
        }
    }
}

/// The indicators the composite engine knows how to weight.
///
/// Ordering is fixed (declaration order) so every aggregation over kinds runs
/// in the same sequence regardless of how readings were produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorKind {
    Rsi,
    Macd,
    Adx,
    Demark,
    Volume,
    Sentiment,
    Derivatives,
    EmaTrend,
    Bollinger,
    Liquidation,
}

impl IndicatorKind {
    pub const ALL: [IndicatorKind; 10] = [
        IndicatorKind::Rsi,
        IndicatorKind::Macd,
        IndicatorKind::Adx,
        IndicatorKind::Demark,
        IndicatorKind::Volume,
        IndicatorKind::Sentiment,
        IndicatorKind::Derivatives,
        IndicatorKind::EmaTrend,
        IndicatorKind::Bollinger,
        IndicatorKind::Liquidation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorKind::Rsi => "rsi",
            IndicatorKind::Macd => "macd",
            IndicatorKind::Adx => "adx",
            IndicatorKind::Demark => "demark",
            IndicatorKind::Volume => "volume",
            IndicatorKind::Sentiment => "sentiment",
            IndicatorKind::Derivatives => "derivatives",
            IndicatorKind::EmaTrend => "ema_trend",
            IndicatorKind::Bollinger => "bollinger",
            IndicatorKind::Liquidation => "liquidation",
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One indicator's contribution-ready output.
///
/// Construct through [`IndicatorReading::new`]: the strength is clamped to
/// [-1, 1], a non-finite strength collapses to 0 and a non-finite value is
/// dropped. A reading that is absent altogether is modelled as `None` by the
/// producing indicator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorReading {
    pub value: Option<f64>,
    pub direction: Direction,
    pub strength: f64,
}

impl IndicatorReading {
    pub fn new(value: Option<f64>, strength: f64) -> Self {
        let strength = clamp_unit(strength);
        Self {
            value: value.filter(|v| v.is_finite()),
            direction: Direction::from_strength(strength),
            strength,
        }
    }

    pub fn neutral(value: Option<f64>) -> Self {
        Self::new(value, 0.0)
    }
}

/// Clamp to [-1, 1]; NaN maps to 0.
pub fn clamp_unit(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(-1.0, 1.0)
    }
}

/// +1, -1 or 0 for positive, negative or zero (and NaN) inputs.
pub fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reading_clamps_strength() {
        let r = IndicatorReading::new(Some(1.0), 3.5);
        assert_eq!(r.strength, 1.0);
        assert_eq!(r.direction, Direction::Bullish);

        let r = IndicatorReading::new(Some(1.0), -7.0);
        assert_eq!(r.strength, -1.0);
        assert_eq!(r.direction, Direction::Bearish);
    }

    #[test]
    fn reading_scrubs_non_finite() {
        let r = IndicatorReading::new(Some(f64::NAN), f64::NAN);
        assert_eq!(r.value, None);
        assert_eq!(r.strength, 0.0);
        assert_eq!(r.direction, Direction::Neutral);
    }

    #[test]
    fn kinds_are_ordered_and_named() {
        let mut sorted = IndicatorKind::ALL;
        sorted.sort();
        assert_eq!(sorted, IndicatorKind::ALL);
        assert_eq!(IndicatorKind::EmaTrend.to_string(), "ema_trend");
    }

    #[test]
    fn sign_handles_zero_and_nan() {
        assert_eq!(sign(0.0), 0.0);
        assert_eq!(sign(f64::NAN), 0.0);
        assert_eq!(sign(-0.5), -1.0);
    }
}
