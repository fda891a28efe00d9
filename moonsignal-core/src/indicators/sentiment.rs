//! Fear & Greed index mapping.
//!
//! The index arrives as an external 0-100 value; the mapping is contrarian:
//! fear is bullish, greed bearish.

use serde::{Deserialize, Serialize};

use crate::domain::IndicatorReading;

/// Sentiment index with its classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentReading {
    pub value: u8,
    pub label: String,
}

impl SentimentReading {
    /// Values above 100 are clamped to 100.
    pub fn new(value: u8) -> Self {
        let value = value.min(100);
        Self {
            value,
            label: fear_greed_label(value).to_string(),
        }
    }

    pub fn reading(&self) -> IndicatorReading {
        IndicatorReading::new(Some(f64::from(self.value)), sentiment_strength(self.value))
    }
}

pub fn sentiment_strength(value: u8) -> f64 {
    match value.min(100) {
        0..=20 => 0.3,
        21..=35 => 0.15,
        36..=65 => 0.0,
        66..=80 => -0.15,
        _ => -0.3,
    }
}

pub fn fear_greed_label(value: u8) -> &'static str {
    match value.min(100) {
        0..=20 => "Extreme Fear",
        21..=40 => "Fear",
        41..=60 => "Neutral",
        61..=80 => "Greed",
        _ => "Extreme Greed",
    }
}
