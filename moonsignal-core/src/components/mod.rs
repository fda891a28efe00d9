//! Component traits shared across the indicator library.

pub mod indicator;

pub use indicator::Indicator;
