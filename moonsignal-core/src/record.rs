//! Signal record: the display-ready result for one asset.
//!
//! Pure assembly from a snapshot and its composite score, plus passthrough
//! market fields supplied by the caller. Floats are rounded for display.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Direction, PriceSeries, Symbol};
use crate::indicators::{ExhaustionState, SentimentReading, TrendStrength};
use crate::scoring::engine::CompositeScore;
use crate::scoring::snapshot::IndicatorSnapshot;

/// Passthrough fields describing the asset and its latest market state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketContext {
    pub symbol: Symbol,
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: f64,
    /// Percent change over the last 24 hours.
    pub change_24h: Option<f64>,
    pub volume_24h: Option<f64>,
}

impl MarketContext {
    /// Derive price, 24h change and 24h volume from the series itself.
    ///
    /// The change is measured against the latest candle at least 24 hours
    /// older than the last one; the volume sums candles inside the window.
    pub fn from_series(symbol: impl Into<Symbol>, series: &PriceSeries) -> Self {
        let last = series.last();
        let cutoff = last.timestamp - Duration::hours(24);
        let candles = series.candles();

        let change_24h = candles
            .iter()
            .rev()
            .find(|c| c.timestamp <= cutoff)
            .filter(|c| c.close != 0.0 && c.close.is_finite())
            .map(|c| (last.close - c.close) / c.close * 100.0);
        let volume_24h = candles
            .iter()
            .filter(|c| c.timestamp > cutoff)
            .map(|c| c.volume)
            .sum();

        Self {
            symbol: symbol.into(),
            name: None,
            category: None,
            price: last.close,
            change_24h,
            volume_24h: Some(volume_24h),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// Which side of the market the signal leans to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bias {
    Above,
    Below,
    Neutral,
}

impl Bias {
    pub fn from_score(score: i8) -> Self {
        match score {
            s if s > 0 => Bias::Above,
            s if s < 0 => Bias::Below,
            _ => Bias::Neutral,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownEntry {
    pub value: Option<f64>,
    pub direction: Direction,
    pub strength: f64,
    pub weight: f64,
    pub contribution: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRecord {
    pub symbol: Symbol,
    pub name: Option<String>,
    pub category: Option<String>,
    /// Timestamp of the latest candle scored.
    pub as_of: DateTime<Utc>,
    pub price: f64,
    pub change_24h: Option<f64>,
    pub volume_24h: Option<f64>,
    pub score: i8,
    pub label: String,
    pub composite: f64,
    pub confidence: f64,
    pub bias: Bias,
    pub breakdown: BTreeMap<String, BreakdownEntry>,
    /// RSI value per view period.
    pub rsi: BTreeMap<String, f64>,
    pub adx: Option<TrendStrength>,
    pub demark: Option<ExhaustionState>,
    pub sentiment: Option<SentimentReading>,
    pub funding_rate: Option<f64>,
    pub long_short_ratio: Option<f64>,
    pub config_fingerprint: String,
}

impl SignalRecord {
    pub fn assemble(
        context: &MarketContext,
        as_of: DateTime<Utc>,
        snapshot: &IndicatorSnapshot,
        score: &CompositeScore,
        config_fingerprint: &str,
    ) -> Self {
        let breakdown = score
            .breakdown
            .iter()
            .map(|(kind, c)| {
                (
                    kind.to_string(),
                    BreakdownEntry {
                        value: c.value.map(|v| round_to(v, 4)),
                        direction: c.direction,
                        strength: round_to(c.strength, 4),
                        weight: c.weight,
                        contribution: round_to(c.contribution, 4),
                    },
                )
            })
            .collect();

        let rsi = snapshot
            .rsi_views
            .iter()
            .map(|(period, value)| (period.to_string(), round_to(*value, 2)))
            .collect();

        let adx = snapshot.trend.map(|t| TrendStrength {
            adx: round_to(t.adx, 2),
            plus_di: round_to(t.plus_di, 2),
            minus_di: round_to(t.minus_di, 2),
            ..t
        });

        let derivatives = snapshot.derivatives.unwrap_or_default();

        Self {
            symbol: context.symbol.clone(),
            name: context.name.clone(),
            category: context.category.clone(),
            as_of,
            price: context.price,
            change_24h: context.change_24h.map(|v| round_to(v, 2)),
            volume_24h: context.volume_24h,
            score: score.score(),
            label: score.label().to_string(),
            composite: round_to(score.composite, 4),
            confidence: round_to(score.confidence, 2),
            bias: Bias::from_score(score.score()),
            breakdown,
            rsi,
            adx,
            demark: snapshot.exhaustion,
            sentiment: snapshot.sentiment.clone(),
            funding_rate: derivatives.funding_rate,
            long_short_ratio: derivatives.long_short_ratio,
            config_fingerprint: config_fingerprint.to_string(),
        }
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WeightConfig;
    use crate::domain::Candle;
    use crate::indicators::make_candles;
    use crate::scoring::{ScoreInputs, ScoringEngine};
    use chrono::TimeZone;

    #[test]
    fn context_from_daily_series() {
        let series = PriceSeries::new(make_candles(&[100.0, 110.0])).unwrap();
        let ctx = MarketContext::from_series("BTC", &series);
        assert_eq!(ctx.price, 110.0);
        assert!((ctx.change_24h.unwrap() - 10.0).abs() < 1e-9);
        assert_eq!(ctx.volume_24h, Some(1000.0));
    }

    #[test]
    fn context_from_hourly_series() {
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let candles: Vec<Candle> = (0..30)
            .map(|i| {
                let close = 100.0 + i as f64;
                Candle {
                    timestamp: base + Duration::hours(i),
                    open: close,
                    high: close,
                    low: close,
                    close,
                    volume: 10.0,
                }
            })
            .collect();
        let ctx = MarketContext::from_series("ETH", &PriceSeries::new(candles).unwrap());
        // Last candle at hour 29, reference at hour 5 (close 105).
        assert!((ctx.change_24h.unwrap() - (129.0 - 105.0) / 105.0 * 100.0).abs() < 1e-9);
        // Hours 6..=29 are inside the window.
        assert_eq!(ctx.volume_24h, Some(240.0));
    }

    #[test]
    fn context_without_history_has_no_change() {
        let series = PriceSeries::new(make_candles(&[100.0])).unwrap();
        let ctx = MarketContext::from_series("SOL", &series)
            .with_name("Solana")
            .with_category("layer1");
        assert_eq!(ctx.change_24h, None);
        assert_eq!(ctx.name.as_deref(), Some("Solana"));
    }

    #[test]
    fn bias_follows_score() {
        assert_eq!(Bias::from_score(2), Bias::Above);
        assert_eq!(Bias::from_score(-1), Bias::Below);
        assert_eq!(Bias::from_score(0), Bias::Neutral);
    }

    #[test]
    fn record_carries_score_and_passthrough() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.4).sin() * 4.0).collect();
        let series = PriceSeries::new(make_candles(&closes)).unwrap();
        let engine = ScoringEngine::new(WeightConfig::default()).unwrap();
        let ctx = MarketContext::from_series("BTC", &series).with_category("major");

        let inputs = ScoreInputs::new(&series).with_sentiment(15);
        let record = engine.evaluate(&inputs, &ctx);
        let score = engine.score(&inputs);

        assert_eq!(record.symbol, "BTC");
        assert_eq!(record.category.as_deref(), Some("major"));
        assert_eq!(record.as_of, series.last().timestamp);
        assert_eq!(record.score, score.score());
        assert_eq!(record.label, score.label());
        assert_eq!(record.bias, Bias::from_score(score.score()));
        assert_eq!(record.config_fingerprint, engine.fingerprint());
        assert_eq!(record.sentiment.as_ref().map(|s| s.value), Some(15));
        assert!(record.breakdown.contains_key("sentiment"));
        assert_eq!(record.rsi.len(), 4);
        assert!(record.adx.is_some());
        assert!(record.demark.is_some());
        assert_eq!(record.funding_rate, None);
    }

    #[test]
    fn rounding() {
        assert_eq!(round_to(0.123456, 4), 0.1235);
        assert_eq!(round_to(-0.56, 1), -0.6);
    }
}
