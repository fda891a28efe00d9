//! Inputs to one scoring call and the indicator state computed from them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{IndicatorKind, IndicatorReading, PriceSeries};
use crate::indicators::{
    BollingerBands, DerivativesInput, EmaTrend, ExhaustionState, MacdState, RsiReading,
    SentimentReading, TrendStrength, VolumeReading,
};

/// Everything a single asset contributes to one scoring call.
#[derive(Debug, Clone, Copy)]
pub struct ScoreInputs<'a> {
    pub series: &'a PriceSeries,
    /// Separate volume series for relative volume; the candles' own volume
    /// is used when absent.
    pub volumes: Option<&'a [f64]>,
    /// Fear & Greed index, 0-100.
    pub sentiment: Option<u8>,
    pub derivatives: Option<DerivativesInput>,
}

impl<'a> ScoreInputs<'a> {
    pub fn new(series: &'a PriceSeries) -> Self {
        Self {
            series,
            volumes: None,
            sentiment: None,
            derivatives: None,
        }
    }

    pub fn with_volumes(mut self, volumes: &'a [f64]) -> Self {
        self.volumes = Some(volumes);
        self
    }

    pub fn with_sentiment(mut self, index: u8) -> Self {
        self.sentiment = Some(index);
        self
    }

    pub fn with_derivatives(mut self, derivatives: DerivativesInput) -> Self {
        self.derivatives = Some(derivatives);
        self
    }
}

/// Indicator results for one asset: the typed per-indicator state plus the
/// normalized readings the composite is built from.
///
/// Readings live in a `BTreeMap` keyed by `IndicatorKind`, so aggregation
/// order never depends on the order indicators were evaluated in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub readings: BTreeMap<IndicatorKind, IndicatorReading>,
    pub rsi: Option<RsiReading>,
    /// RSI value per view period.
    pub rsi_views: BTreeMap<usize, f64>,
    pub macd: Option<MacdState>,
    pub bollinger: Option<BollingerBands>,
    pub ema_trend: Option<EmaTrend>,
    pub trend: Option<TrendStrength>,
    pub exhaustion: Option<ExhaustionState>,
    pub volume: Option<VolumeReading>,
    pub sentiment: Option<SentimentReading>,
    pub derivatives: Option<DerivativesInput>,
}

impl IndicatorSnapshot {
    pub fn insert(&mut self, kind: IndicatorKind, reading: IndicatorReading) {
        self.readings.insert(kind, reading);
    }

    pub fn reading(&self, kind: IndicatorKind) -> Option<&IndicatorReading> {
        self.readings.get(&kind)
    }
}
