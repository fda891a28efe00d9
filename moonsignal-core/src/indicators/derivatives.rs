//! Derivatives positioning: funding rate and long/short account ratio.
//!
//! Crowded positioning is read contrarian. Positive funding means longs pay
//! shorts, so a high rate is bearish; the long/short ratio works the same way.

use serde::{Deserialize, Serialize};

use crate::domain::{clamp_unit, IndicatorReading};

/// Figures from a derivatives venue. Either may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivativesInput {
    pub funding_rate: Option<f64>,
    pub long_short_ratio: Option<f64>,
}

impl DerivativesInput {
    pub fn is_empty(&self) -> bool {
        self.funding_rate.is_none() && self.long_short_ratio.is_none()
    }
}

fn funding_strength(rate: f64) -> f64 {
    if rate > 0.001 {
        -0.6
    } else if rate > 0.0005 {
        -0.3
    } else if rate < -0.001 {
        0.6
    } else if rate < -0.0005 {
        0.3
    } else {
        0.0
    }
}

fn long_short_strength(ratio: f64) -> f64 {
    if ratio > 2.0 {
        -0.3
    } else if ratio > 1.5 {
        -0.15
    } else if ratio < 0.5 {
        0.3
    } else if ratio < 0.67 {
        0.15
    } else {
        0.0
    }
}

/// Combined positioning reading, `None` when neither figure is present.
/// Non-finite figures are ignored.
pub fn derivatives_reading(input: &DerivativesInput) -> Option<IndicatorReading> {
    let funding = input.funding_rate.filter(|v| v.is_finite());
    let ratio = input.long_short_ratio.filter(|v| v.is_finite());
    if funding.is_none() && ratio.is_none() {
        return None;
    }

    let strength = funding.map_or(0.0, funding_strength) + ratio.map_or(0.0, long_short_strength);
    Some(IndicatorReading::new(funding.or(ratio), clamp_unit(strength)))
}
