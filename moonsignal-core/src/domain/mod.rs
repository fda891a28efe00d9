//! Domain types for the signal engine

pub mod candle;
pub mod reading;

pub use candle::{Candle, PriceSeries, SeriesError};
pub use reading::{clamp_unit, sign, Direction, IndicatorKind, IndicatorReading};

/// Symbol type alias
pub type Symbol = String;
