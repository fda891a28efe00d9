//! Liquidation pressure estimate from band extension and funding extremes.
//!
//! Price stretched to the upper band with crowded longs leaves liquidation
//! clusters below it, which pull price down; the mirror case pulls it up.

use crate::domain::{clamp_unit, IndicatorReading};

/// %B above this counts as extended high.
pub const EXTENDED_HIGH_PERCENT_B: f64 = 0.9;
/// %B below this counts as extended low.
pub const EXTENDED_LOW_PERCENT_B: f64 = 0.1;

fn band_pressure(percent_b: f64) -> f64 {
    if percent_b > EXTENDED_HIGH_PERCENT_B {
        -0.3
    } else if percent_b < EXTENDED_LOW_PERCENT_B {
        0.3
    } else {
        0.0
    }
}

fn funding_pressure(rate: f64) -> f64 {
    if rate > 0.0005 {
        -0.4
    } else if rate < -0.0005 {
        0.4
    } else if rate > 0.0002 {
        -0.2
    } else if rate < -0.0002 {
        0.2
    } else {
        0.0
    }
}

/// Combined pressure reading, `None` when neither %B nor a funding rate is
/// available. The reported value is the funding rate, else %B.
pub fn liquidation_reading(
    percent_b: Option<f64>,
    funding_rate: Option<f64>,
) -> Option<IndicatorReading> {
    let percent_b = percent_b.filter(|v| v.is_finite());
    let funding = funding_rate.filter(|v| v.is_finite());
    if percent_b.is_none() && funding.is_none() {
        return None;
    }

    let strength = percent_b.map_or(0.0, band_pressure) + funding.map_or(0.0, funding_pressure);
    Some(IndicatorReading::new(funding.or(percent_b), clamp_unit(strength)))
}
