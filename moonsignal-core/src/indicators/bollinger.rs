//! Bollinger Bands: moving average +/- standard deviation multiplier.
//!
//! Three bands (separate Indicator instances):
//! - Middle: SMA(close, period)
//! - Upper: middle + mult * stddev(close, period)
//! - Lower: middle - mult * stddev(close, period)
//!
//! Uses population stddev (divide by N).
//! Lookback: period - 1.

use serde::{Deserialize, Serialize};

use crate::components::indicator::Indicator;
use crate::domain::{Candle, IndicatorReading};
use crate::indicators::sma::population_stddev;

/// Which band of the Bollinger Bands to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BollingerBand {
    Upper,
    Middle,
    Lower,
}

#[derive(Debug, Clone)]
pub struct Bollinger {
    period: usize,
    multiplier: f64,
    band: BollingerBand,
    name: String,
}

impl Bollinger {
    pub fn new(period: usize, multiplier: f64, band: BollingerBand) -> Self {
        assert!(period >= 1, "Bollinger period must be >= 1");
        let label = match band {
            BollingerBand::Upper => "upper",
            BollingerBand::Middle => "middle",
            BollingerBand::Lower => "lower",
        };
        Self {
            period,
            multiplier,
            band,
            name: format!("bollinger_{label}_{period}_{multiplier}"),
        }
    }
}

impl Indicator for Bollinger {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        let n = candles.len();
        let mut result = vec![f64::NAN; n];

        if n < self.period {
            return result;
        }

        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        for i in (self.period - 1)..n {
            let window = &closes[(i + 1 - self.period)..=i];
            if window.iter().any(|v| v.is_nan()) {
                continue;
            }
            let (lower, middle, upper) = bands(window, self.multiplier);
            result[i] = match self.band {
                BollingerBand::Upper => upper,
                BollingerBand::Middle => middle,
                BollingerBand::Lower => lower,
            };
        }

        result
    }
}

fn bands(window: &[f64], multiplier: f64) -> (f64, f64, f64) {
    let middle = window.iter().sum::<f64>() / window.len() as f64;
    let stddev = population_stddev(window);
    (middle - multiplier * stddev, middle, middle + multiplier * stddev)
}

/// Bands and %B on the latest close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    pub percent_b: f64,
}

impl BollingerBands {
    /// Mean-reversion read of %B: outside the bands is strongest, the
    /// middle of the band scales linearly through zero.
    pub fn reading(&self) -> IndicatorReading {
        let pb = self.percent_b;
        let strength = if pb < 0.0 {
            0.8
        } else if pb <= 0.2 {
            0.5
        } else if pb >= 1.0 {
            -0.8
        } else if pb >= 0.8 {
            -0.5
        } else {
            (0.5 - pb) * 0.4
        };
        IndicatorReading::new(Some(pb), strength)
    }
}

/// Latest Bollinger Bands, `None` with fewer than `period` closes.
/// Collapsed bands report %B = 0.5.
pub fn bollinger(closes: &[f64], period: usize, multiplier: f64) -> Option<BollingerBands> {
    if period == 0 || closes.len() < period {
        return None;
    }

    let window = &closes[closes.len() - period..];
    if window.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let (lower, middle, upper) = bands(window, multiplier);
    let close = closes[closes.len() - 1];
    let width = upper - lower;
    let percent_b = if width > 0.0 {
        (close - lower) / width
    } else {
        0.5
    };

    Some(BollingerBands {
        upper,
        middle,
        lower,
        percent_b,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Direction;
    use crate::indicators::{assert_approx, make_candles, DEFAULT_EPSILON};

    #[test]
    fn bollinger_middle_is_sma() {
        let candles = make_candles(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let result = Bollinger::new(3, 2.0, BollingerBand::Middle).compute(&candles);

        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_approx(result[2], 11.0, DEFAULT_EPSILON);
        assert_approx(result[3], 12.0, DEFAULT_EPSILON);
    }

    #[test]
    fn bollinger_bands_symmetric() {
        let candles = make_candles(&[10.0, 12.0, 14.0, 13.0, 11.0]);
        let upper = Bollinger::new(3, 2.0, BollingerBand::Upper).compute(&candles);
        let middle = Bollinger::new(3, 2.0, BollingerBand::Middle).compute(&candles);
        let lower = Bollinger::new(3, 2.0, BollingerBand::Lower).compute(&candles);

        for i in 2..5 {
            assert_approx(upper[i] - middle[i], middle[i] - lower[i], DEFAULT_EPSILON);
        }
    }

    #[test]
    fn bollinger_collapsed_bands_are_midpoint() {
        let bands = bollinger(&[100.0; 20], 20, 2.0).unwrap();
        assert_eq!(bands.upper, bands.lower);
        assert_eq!(bands.percent_b, 0.5);
        assert_eq!(bands.reading().strength, 0.0);
        assert_eq!(bands.reading().direction, Direction::Neutral);
    }

    #[test]
    fn bollinger_percent_b_known_value() {
        // Window 2,4,4,4,5,5,7,9: mean 5, stddev 2, bands 1..9 at 2 stddev.
        let bands = bollinger(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0], 8, 2.0).unwrap();
        assert_approx(bands.middle, 5.0, DEFAULT_EPSILON);
        assert_approx(bands.upper, 9.0, DEFAULT_EPSILON);
        assert_approx(bands.lower, 1.0, DEFAULT_EPSILON);
        assert_approx(bands.percent_b, 1.0, DEFAULT_EPSILON);
    }

    #[test]
    fn bollinger_mapping_is_mean_reverting() {
        let at = |percent_b: f64| {
            BollingerBands {
                upper: 0.0,
                middle: 0.0,
                lower: 0.0,
                percent_b,
            }
            .reading()
            .strength
        };
        assert_eq!(at(-0.1), 0.8);
        assert_eq!(at(0.1), 0.5);
        assert_approx(at(0.25), 0.1, DEFAULT_EPSILON);
        assert_eq!(at(0.5), 0.0);
        assert_eq!(at(0.9), -0.5);
        assert_eq!(at(1.2), -0.8);
    }

    #[test]
    fn bollinger_too_short() {
        assert!(bollinger(&[1.0, 2.0], 3, 2.0).is_none());
    }
}
