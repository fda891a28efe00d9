//! Relative volume: latest volume against the mean of the preceding window.

use serde::{Deserialize, Serialize};

use crate::domain::{sign, IndicatorReading};

/// Ratio above this is high volume.
pub const HIGH_VOLUME_RATIO: f64 = 1.5;
/// Ratio below this is low volume.
pub const LOW_VOLUME_RATIO: f64 = 0.5;
/// Ratio at which a volume spike counts at full strength.
pub const SPIKE_VOLUME_RATIO: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeClass {
    High,
    Normal,
    Low,
}

impl VolumeClass {
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio > HIGH_VOLUME_RATIO {
            VolumeClass::High
        } else if ratio < LOW_VOLUME_RATIO {
            VolumeClass::Low
        } else {
            VolumeClass::Normal
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeReading {
    pub ratio: f64,
    pub class: VolumeClass,
}

impl VolumeReading {
    /// High volume backs whatever move the other indicators see.
    pub fn confirms_move(&self) -> bool {
        self.class == VolumeClass::High
    }

    /// Volume confirms the latest price move: a spike in the direction of
    /// the close-to-close change. Normal or low volume carries no direction.
    pub fn reading(&self, price_change: f64) -> IndicatorReading {
        let magnitude = if self.ratio >= SPIKE_VOLUME_RATIO {
            1.0
        } else if self.class == VolumeClass::High {
            0.6
        } else {
            0.0
        };
        IndicatorReading::new(Some(self.ratio), sign(price_change) * magnitude)
    }
}

/// Latest volume over the mean of the `period` volumes before it.
///
/// `None` with fewer than `period + 1` values, or when the preceding mean is
/// zero, negative or not finite.
pub fn relative_volume(volumes: &[f64], period: usize) -> Option<VolumeReading> {
    let n = volumes.len();
    if period == 0 || n < period + 1 {
        return None;
    }

    let latest = volumes[n - 1];
    let preceding = &volumes[(n - 1 - period)..(n - 1)];
    let mean = preceding.iter().sum::<f64>() / period as f64;

    if !mean.is_finite() || mean <= 0.0 || !latest.is_finite() {
        return None;
    }

    let ratio = latest / mean;
    Some(VolumeReading {
        ratio,
        class: VolumeClass::from_ratio(ratio),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Direction;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn relative_volume_uses_preceding_window() {
        // Preceding 3 = [100, 200, 300] → mean 200; latest 400 → ratio 2.
        let reading = relative_volume(&[9999.0, 100.0, 200.0, 300.0, 400.0], 3).unwrap();
        assert_approx(reading.ratio, 2.0, DEFAULT_EPSILON);
        assert_eq!(reading.class, VolumeClass::High);
    }

    #[test]
    fn relative_volume_classes() {
        assert_eq!(VolumeClass::from_ratio(1.6), VolumeClass::High);
        assert_eq!(VolumeClass::from_ratio(1.5), VolumeClass::Normal);
        assert_eq!(VolumeClass::from_ratio(0.5), VolumeClass::Normal);
        assert_eq!(VolumeClass::from_ratio(0.4), VolumeClass::Low);
    }

    #[test]
    fn relative_volume_zero_mean_is_absent() {
        assert!(relative_volume(&[0.0, 0.0, 0.0, 50.0], 3).is_none());
    }

    #[test]
    fn relative_volume_too_short() {
        assert!(relative_volume(&[1.0, 1.0, 1.0], 3).is_none());
    }

    #[test]
    fn volume_reading_follows_price() {
        let spike = VolumeReading {
            ratio: 2.5,
            class: VolumeClass::High,
        };
        assert_eq!(spike.reading(1.0).strength, 1.0);
        assert_eq!(spike.reading(-1.0).strength, -1.0);
        assert_eq!(spike.reading(0.0).direction, Direction::Neutral);

        let high = VolumeReading {
            ratio: 1.7,
            class: VolumeClass::High,
        };
        assert_eq!(high.reading(1.0).strength, 0.6);

        let normal = VolumeReading {
            ratio: 1.0,
            class: VolumeClass::Normal,
        };
        assert_eq!(normal.reading(1.0).strength, 0.0);
    }
}
