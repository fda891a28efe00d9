//! Composite scoring engine.
//!
//! Per call:
//! 1. Compute every indicator reading from the inputs (absent when the
//!    series is too short).
//! 2. Weighted mean of strengths, normalized by the weights of the readings
//!    actually present.
//! 3. Scale by the ADX band multiplier and clamp to [-1, 1].
//! 4. Optionally push a decided composite further out on high volume.
//! 5. Map to a tier; confidence from indicator agreement plus an ADX bonus.
//!
//! The engine holds only its validated configuration and is shared by
//! reference across threads.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::components::indicator::Indicator;
use crate::config::{ConfigError, WeightConfig};
use crate::domain::{clamp_unit, Direction, IndicatorKind, IndicatorReading};
use crate::indicators::{
    bollinger, demark_scan, derivatives_reading, ema_trend, liquidation_reading, macd,
    relative_volume, rsi_latest, trend_strength, Adx, Bollinger, BollingerBand, Ema, Macd, MacdLine, Rsi, SentimentReading,
    DEMARK_LOOKBACK,
};
use crate::record::{MarketContext, SignalRecord};
use crate::scoring::modifier::{adx_confidence_bonus, adx_multiplier};
use crate::scoring::snapshot::{IndicatorSnapshot, ScoreInputs};
use crate::scoring::tier::Tier;

/// Readings weaker than this do not count toward agreement.
pub const AGREEMENT_MIN_STRENGTH: f64 = 0.1;
/// Confidence floor before agreement and ADX terms.
pub const BASE_CONFIDENCE: f64 = 0.4;
/// Weight of the agreement ratio in confidence.
pub const AGREEMENT_WEIGHT: f64 = 0.4;
/// Composite shift applied by the volume boost.
pub const VOLUME_BOOST: f64 = 0.1;
/// The volume boost only applies beyond this composite magnitude.
pub const VOLUME_BOOST_MIN_COMPOSITE: f64 = 0.2;

/// One indicator's share of the composite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub value: Option<f64>,
    pub direction: Direction,
    pub strength: f64,
    /// Configured (unnormalized) weight.
    pub weight: f64,
    /// `weight / total_weight_used * strength`; contributions sum to `base`.
    pub contribution: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeScore {
    pub tier: Tier,
    /// Clamped to [-1, 1].
    pub composite: f64,
    /// Weighted mean before the ADX multiplier.
    pub base: f64,
    pub adx_modifier: f64,
    /// Shift added by the volume boost, 0 when it did not apply.
    #[serde(default)]
    pub volume_boost: f64,
    /// Clamped to [0, 1].
    pub confidence: f64,
    pub agreement: f64,
    pub breakdown: BTreeMap<IndicatorKind, Contribution>,
}

impl CompositeScore {
    pub fn score(&self) -> i8 {
        self.tier.score()
    }

    pub fn label(&self) -> &'static str {
        self.tier.label()
    }
}

#[derive(Debug, Clone)]
pub struct ScoringEngine {
    config: WeightConfig,
    fingerprint: String,
}

impl ScoringEngine {
    /// Validates the configuration; a malformed one is the engine's only
    /// hard failure.
    pub fn new(config: WeightConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let fingerprint = config.fingerprint();
        debug!(config = %config.name, %fingerprint, "scoring engine ready");
        Ok(Self {
            config,
            fingerprint,
        })
    }

    pub fn config(&self) -> &WeightConfig {
        &self.config
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Candles needed before every price-derived indicator is present.
    pub fn required_bars(&self) -> usize {
        let p = &self.config.periods;
        let ema_longest = p.ema_fast.max(p.ema_slow).max(p.ema_trend);
        let indicators: Vec<Box<dyn Indicator>> = vec![
            Box::new(Rsi::new(p.rsi)),
            Box::new(Macd::new(
                p.macd_fast,
                p.macd_slow,
                p.macd_signal,
                MacdLine::Histogram,
            )),
            Box::new(Adx::new(p.adx)),
            Box::new(Bollinger::new(
                p.bollinger_period,
                p.bollinger_stddev,
                BollingerBand::Middle,
            )),
            Box::new(Ema::new(ema_longest)),
        ];
        let warmup = indicators.iter().map(|i| i.lookback()).max().unwrap_or(0);
        // MACD and EMA trend also compare against the previous bar; relative
        // volume needs one bar beyond its window; DeMark its 4-bar lookback.
        (warmup + 2).max(p.volume + 1).max(DEMARK_LOOKBACK + 1)
    }

    /// Compute every indicator.
    pub fn analyze(&self, inputs: &ScoreInputs<'_>) -> IndicatorSnapshot {
        self.analyze_kinds(inputs, &IndicatorKind::ALL)
    }

    /// Compute the listed indicators, in the order given. Kinds not listed
    /// are absent from the snapshot.
    pub fn analyze_kinds(
        &self,
        inputs: &ScoreInputs<'_>,
        kinds: &[IndicatorKind],
    ) -> IndicatorSnapshot {
        let p = &self.config.periods;
        let candles = inputs.series.candles();
        let closes = inputs.series.closes();
        let mut snapshot = IndicatorSnapshot::default();

        for &kind in kinds {
            let reading = match kind {
                IndicatorKind::Rsi => {
                    for &period in &p.rsi_views {
                        if let Some(view) = rsi_latest(&closes, period) {
                            snapshot.rsi_views.insert(period, view.value);
                        }
                    }
                    snapshot.rsi = rsi_latest(&closes, p.rsi);
                    snapshot.rsi.map(|r| r.reading())
                }
                IndicatorKind::Macd => {
                    snapshot.macd = macd(&closes, p.macd_fast, p.macd_slow, p.macd_signal);
                    snapshot.macd.map(|m| m.reading())
                }
                IndicatorKind::Adx => {
                    snapshot.trend = trend_strength(candles, p.adx);
                    snapshot.trend.map(|t| t.reading())
                }
                IndicatorKind::Demark => {
                    snapshot.exhaustion = demark_scan(&closes);
                    snapshot.exhaustion.map(|e| e.reading())
                }
                IndicatorKind::Volume => {
                    let own;
                    let volumes = match inputs.volumes {
                        Some(v) => v,
                        None => {
                            own = inputs.series.volumes();
                            own.as_slice()
                        }
                    };
                    let change = match closes.as_slice() {
                        [.., prev, last] => last - prev,
                        _ => 0.0,
                    };
                    snapshot.volume = relative_volume(volumes, p.volume);
                    snapshot.volume.map(|v| v.reading(change))
                }
                IndicatorKind::Sentiment => {
                    snapshot.sentiment = inputs.sentiment.map(SentimentReading::new);
                    snapshot.sentiment.as_ref().map(|s| s.reading())
                }
                IndicatorKind::Derivatives => {
                    snapshot.derivatives = inputs.derivatives.filter(|d| !d.is_empty());
                    snapshot.derivatives.as_ref().and_then(derivatives_reading)
                }
                IndicatorKind::EmaTrend => {
                    snapshot.ema_trend = ema_trend(&closes, p.ema_fast, p.ema_slow, p.ema_trend);
                    snapshot.ema_trend.map(|e| e.reading())
                }
                IndicatorKind::Bollinger => {
                    snapshot.bollinger =
                        bollinger(&closes, p.bollinger_period, p.bollinger_stddev);
                    snapshot.bollinger.map(|b| b.reading())
                }
                IndicatorKind::Liquidation => {
                    // Computed here so the reading does not depend on
                    // whether Bollinger ran first.
                    let percent_b = bollinger(&closes, p.bollinger_period, p.bollinger_stddev)
                        .map(|b| b.percent_b);
                    let funding = inputs.derivatives.and_then(|d| d.funding_rate);
                    liquidation_reading(percent_b, funding)
                }
            };

            match reading {
                Some(reading) => snapshot.insert(kind, reading),
                None => debug!(indicator = %kind, bars = closes.len(), "indicator absent"),
            }
        }

        snapshot
    }

    /// Fuse a snapshot's readings into a composite score.
    pub fn score_snapshot(&self, snapshot: &IndicatorSnapshot) -> CompositeScore {
        let weights = &self.config.weights;

        let used: Vec<(IndicatorKind, f64, &IndicatorReading)> = snapshot
            .readings
            .iter()
            .map(|(&kind, reading)| (kind, weights.get(kind), reading))
            .filter(|(_, weight, _)| *weight > 0.0)
            .collect();

        let total_weight: f64 = used.iter().map(|(_, w, _)| w).sum();
        let mut breakdown = BTreeMap::new();
        let mut base = 0.0;
        for &(kind, weight, reading) in &used {
            let contribution = if total_weight > 0.0 {
                weight / total_weight * reading.strength
            } else {
                0.0
            };
            base += contribution;
            breakdown.insert(
                kind,
                Contribution {
                    value: reading.value,
                    direction: reading.direction,
                    strength: reading.strength,
                    weight,
                    contribution,
                },
            );
        }
        let base = clamp_unit(base);

        let trend = snapshot.trend.as_ref();
        let adx_modifier = adx_multiplier(&self.config.adx_modifier, trend, base);
        let composite = clamp_unit(base * adx_modifier);
        let volume_boost = self.volume_boost(snapshot, composite);
        let composite = clamp_unit(composite + volume_boost);
        let tier = self.config.thresholds.classify(composite);

        let (bullish, bearish) = used.iter().fold((0usize, 0usize), |(bull, bear), (_, _, r)| {
            if r.strength > AGREEMENT_MIN_STRENGTH {
                (bull + 1, bear)
            } else if r.strength < -AGREEMENT_MIN_STRENGTH {
                (bull, bear + 1)
            } else {
                (bull, bear)
            }
        });
        let considered = bullish + bearish;
        let agreement = if considered == 0 {
            0.0
        } else {
            bullish.max(bearish) as f64 / considered as f64
        };
        let bonus = adx_confidence_bonus(&self.config.adx_confidence, trend);
        let confidence = (BASE_CONFIDENCE + AGREEMENT_WEIGHT * agreement + bonus).clamp(0.0, 1.0);

        CompositeScore {
            tier,
            composite,
            base,
            adx_modifier,
            volume_boost,
            confidence,
            agreement,
            breakdown,
        }
    }

    fn volume_boost(&self, snapshot: &IndicatorSnapshot, composite: f64) -> f64 {
        let confirmed = snapshot.volume.is_some_and(|v| v.confirms_move());
        if self.config.volume_boost && confirmed && composite.abs() > VOLUME_BOOST_MIN_COMPOSITE {
            VOLUME_BOOST * composite.signum()
        } else {
            0.0
        }
    }

    pub fn score(&self, inputs: &ScoreInputs<'_>) -> CompositeScore {
        self.score_snapshot(&self.analyze(inputs))
    }

    /// Score and assemble the display record.
    pub fn evaluate(&self, inputs: &ScoreInputs<'_>, context: &MarketContext) -> SignalRecord {
        let snapshot = self.analyze(inputs);
        let score = self.score_snapshot(&snapshot);
        debug!(
            symbol = %context.symbol,
            tier = score.score(),
            composite = score.composite,
            confidence = score.confidence,
            "asset scored"
        );
        SignalRecord::assemble(
            context,
            inputs.series.last().timestamp,
            &snapshot,
            &score,
            &self.fingerprint,
        )
    }
}
