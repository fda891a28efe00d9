//! Weight configuration: indicator periods, weights, tier cutoffs and the
//! ADX tables.
//!
//! Loaded once (TOML or a preset), validated by `ScoringEngine::new`, then
//! shared read-only across every scoring call.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::IndicatorKind;
use crate::scoring::modifier::{AdxBand, AdxConfidenceBand};
use crate::scoring::tier::TierThresholds;

/// Errors raised while loading or validating a `WeightConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("tier threshold `{name}` must be finite and within [-1, 1], got {value}")]
    ThresholdOutOfRange { name: &'static str, value: f64 },
    #[error("tier thresholds must be strictly descending: `{upper}` is not above `{lower}`")]
    ThresholdsNotDescending {
        upper: &'static str,
        lower: &'static str,
    },
    #[error("weight for {indicator} must be finite and non-negative, got {weight}")]
    InvalidWeight { indicator: IndicatorKind, weight: f64 },
    #[error("at least one indicator weight must be positive")]
    NoWeights,
    #[error("period `{0}` must be at least 1")]
    ZeroPeriod(&'static str),
    #[error("period `{fast}` must be shorter than `{slow}`")]
    PeriodOrder {
        fast: &'static str,
        slow: &'static str,
    },
    #[error("bollinger stddev multiplier must be finite and positive, got {0}")]
    InvalidStddev(f64),
    #[error("invalid {table} table: {reason}")]
    InvalidAdxTable { table: &'static str, reason: String },
    #[error("read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("render config TOML: {0}")]
    Render(#[from] toml::ser::Error),
}

/// Lookback periods for every indicator. The DeMark lookback is fixed at 4.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorPeriods {
    pub rsi: usize,
    /// Extra RSI periods reported in records; only `rsi` is scored.
    pub rsi_views: Vec<usize>,
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub ema_trend: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bollinger_period: usize,
    pub bollinger_stddev: f64,
    pub adx: usize,
    pub volume: usize,
}

impl Default for IndicatorPeriods {
    fn default() -> Self {
        Self {
            rsi: 14,
            rsi_views: vec![7, 10, 14, 21],
            ema_fast: 12,
            ema_slow: 26,
            ema_trend: 50,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bollinger_period: 20,
            bollinger_stddev: 2.0,
            adx: 14,
            volume: 7,
        }
    }
}

impl IndicatorPeriods {
    fn validate(&self) -> Result<(), ConfigError> {
        let periods = [
            ("rsi", self.rsi),
            ("ema_fast", self.ema_fast),
            ("ema_slow", self.ema_slow),
            ("ema_trend", self.ema_trend),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
            ("bollinger_period", self.bollinger_period),
            ("adx", self.adx),
            ("volume", self.volume),
        ];
        for (name, period) in periods {
            if period == 0 {
                return Err(ConfigError::ZeroPeriod(name));
            }
        }
        if self.rsi_views.contains(&0) {
            return Err(ConfigError::ZeroPeriod("rsi_views"));
        }
        if self.ema_fast >= self.ema_slow {
            return Err(ConfigError::PeriodOrder {
                fast: "ema_fast",
                slow: "ema_slow",
            });
        }
        if self.macd_fast >= self.macd_slow {
            return Err(ConfigError::PeriodOrder {
                fast: "macd_fast",
                slow: "macd_slow",
            });
        }
        if !self.bollinger_stddev.is_finite() || self.bollinger_stddev <= 0.0 {
            return Err(ConfigError::InvalidStddev(self.bollinger_stddev));
        }
        Ok(())
    }
}

/// Per-indicator weights. They need not sum to 1; the engine normalizes by
/// the weights of the readings actually present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorWeights {
    pub rsi: f64,
    pub macd: f64,
    pub adx: f64,
    pub demark: f64,
    pub volume: f64,
    pub sentiment: f64,
    pub derivatives: f64,
    pub ema_trend: f64,
    pub bollinger: f64,
    pub liquidation: f64,
}

impl Default for IndicatorWeights {
    fn default() -> Self {
        Self {
            rsi: 0.25,
            macd: 0.15,
            adx: 0.15,
            demark: 0.15,
            volume: 0.05,
            sentiment: 0.05,
            derivatives: 0.10,
            ema_trend: 0.0,
            bollinger: 0.0,
            liquidation: 0.0,
        }
    }
}

impl IndicatorWeights {
    pub fn get(&self, kind: IndicatorKind) -> f64 {
        match kind {
            IndicatorKind::Rsi => self.rsi,
            IndicatorKind::Macd => self.macd,
            IndicatorKind::Adx => self.adx,
            IndicatorKind::Demark => self.demark,
            IndicatorKind::Volume => self.volume,
            IndicatorKind::Sentiment => self.sentiment,
            IndicatorKind::Derivatives => self.derivatives,
            IndicatorKind::EmaTrend => self.ema_trend,
            IndicatorKind::Bollinger => self.bollinger,
            IndicatorKind::Liquidation => self.liquidation,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for kind in IndicatorKind::ALL {
            let weight = self.get(kind);
            if !weight.is_finite() || weight < 0.0 {
                return Err(ConfigError::InvalidWeight {
                    indicator: kind,
                    weight,
                });
            }
        }
        if IndicatorKind::ALL.iter().all(|&k| self.get(k) == 0.0) {
            return Err(ConfigError::NoWeights);
        }
        Ok(())
    }
}

/// Complete, named scoring configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightConfig {
    pub name: String,
    /// Push a decided composite 0.1 further out when volume is high.
    pub volume_boost: bool,
    pub periods: IndicatorPeriods,
    pub weights: IndicatorWeights,
    pub thresholds: TierThresholds,
    /// Composite multiplier by ADX band, ascending `min_adx` starting at 0.
    pub adx_modifier: Vec<AdxBand>,
    /// Confidence bonus by ADX band, ascending `min_adx` starting at 0.
    pub adx_confidence: Vec<AdxConfidenceBand>,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            name: "default".into(),
            volume_boost: false,
            periods: IndicatorPeriods::default(),
            weights: IndicatorWeights::default(),
            thresholds: TierThresholds::default(),
            adx_modifier: AdxBand::default_table(),
            adx_confidence: AdxConfidenceBand::default_table(),
        }
    }
}

impl WeightConfig {
    /// Earlier weighting scheme with EMA trend and Bollinger components.
    pub fn trend_following() -> Self {
        Self {
            name: "trend_following".into(),
            weights: IndicatorWeights {
                rsi: 0.15,
                macd: 0.15,
                adx: 0.10,
                demark: 0.10,
                volume: 0.05,
                sentiment: 0.05,
                derivatives: 0.10,
                ema_trend: 0.20,
                bollinger: 0.10,
                liquidation: 0.05,
            },
            ..Self::default()
        }
    }

    /// Trend-confirming weights on short lookbacks, for series of about a
    /// month of daily candles. Momentum, ADX and the EMA stack carry the
    /// composite; RSI keeps a small contrarian share.
    pub fn short_trend() -> Self {
        Self {
            name: "short_trend".into(),
            periods: IndicatorPeriods {
                ema_fast: 5,
                ema_slow: 10,
                ema_trend: 20,
                macd_fast: 5,
                macd_slow: 10,
                macd_signal: 4,
                ..IndicatorPeriods::default()
            },
            weights: IndicatorWeights {
                rsi: 0.15,
                macd: 0.15,
                adx: 0.30,
                demark: 0.10,
                volume: 0.0,
                sentiment: 0.0,
                derivatives: 0.0,
                ema_trend: 0.30,
                bollinger: 0.0,
                liquidation: 0.0,
            },
            ..Self::default()
        }
    }

    /// Look up a preset by name: `default`, `trend_following` or
    /// `short_trend` (dashes accepted in place of underscores).
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "default" => Some(Self::default()),
            "trend_following" | "trend-following" => Some(Self::trend_following()),
            "short_trend" | "short-trend" => Some(Self::short_trend()),
            _ => None,
        }
    }

    /// Load a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a configuration from a TOML string. Missing sections take their
    /// defaults. The result is not validated.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.periods.validate()?;
        self.weights.validate()?;
        self.thresholds.validate()?;
        AdxBand::validate_table(&self.adx_modifier)?;
        AdxConfidenceBand::validate_table(&self.adx_confidence)?;
        Ok(())
    }

    /// BLAKE3 hex digest of the canonical JSON encoding.
    pub fn fingerprint(&self) -> String {
        let json = serde_json::to_string(self).expect("WeightConfig must serialize");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        WeightConfig::default().validate().unwrap();
        WeightConfig::trend_following().validate().unwrap();
        WeightConfig::short_trend().validate().unwrap();
    }

    #[test]
    fn presets_by_name() {
        assert_eq!(WeightConfig::preset("default"), Some(WeightConfig::default()));
        assert_eq!(
            WeightConfig::preset("trend-following").map(|c| c.name),
            Some("trend_following".to_string())
        );
        assert_eq!(
            WeightConfig::preset("short-trend"),
            Some(WeightConfig::short_trend())
        );
        assert!(WeightConfig::preset("bogus").is_none());
    }

    #[test]
    fn default_weights_leave_trend_components_out() {
        let weights = IndicatorWeights::default();
        assert_eq!(weights.get(IndicatorKind::EmaTrend), 0.0);
        assert_eq!(weights.get(IndicatorKind::Bollinger), 0.0);
        assert_eq!(weights.get(IndicatorKind::Rsi), 0.25);
    }

    #[test]
    fn rejects_negative_weight() {
        let mut config = WeightConfig::default();
        config.weights.macd = -0.1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidWeight {
                indicator: IndicatorKind::Macd,
                ..
            })
        ));
    }

    #[test]
    fn rejects_all_zero_weights() {
        let mut config = WeightConfig::default();
        config.weights = IndicatorWeights {
            rsi: 0.0,
            macd: 0.0,
            adx: 0.0,
            demark: 0.0,
            volume: 0.0,
            sentiment: 0.0,
            derivatives: 0.0,
            ema_trend: 0.0,
            bollinger: 0.0,
            liquidation: 0.0,
        };
        assert!(matches!(config.validate(), Err(ConfigError::NoWeights)));
    }

    #[test]
    fn rejects_zero_period() {
        let mut config = WeightConfig::default();
        config.periods.adx = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroPeriod("adx"))));

        let mut config = WeightConfig::default();
        config.periods.rsi_views = vec![7, 0];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroPeriod("rsi_views"))
        ));
    }

    #[test]
    fn rejects_inverted_periods() {
        let mut config = WeightConfig::default();
        config.periods.macd_fast = 30;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::PeriodOrder {
                fast: "macd_fast",
                ..
            })
        ));
    }

    #[test]
    fn rejects_bad_stddev() {
        let mut config = WeightConfig::default();
        config.periods.bollinger_stddev = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidStddev(_))
        ));
    }

    #[test]
    fn toml_round_trip() {
        let config = WeightConfig::trend_following();
        let text = config.to_toml().unwrap();
        let back = WeightConfig::from_toml(&text).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let config = WeightConfig::from_toml(
            r#"
name = "custom"

[weights]
rsi = 0.5
"#,
        )
        .unwrap();
        assert_eq!(config.name, "custom");
        assert_eq!(config.weights.rsi, 0.5);
        assert_eq!(config.weights.macd, 0.15);
        assert_eq!(config.periods, IndicatorPeriods::default());
        assert_eq!(config.adx_modifier, AdxBand::default_table());
        assert_eq!(config.weights.liquidation, 0.0);
        assert!(!config.volume_boost);
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(
            WeightConfig::from_toml("weights = 3"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = WeightConfig::from_file(Path::new("/nonexistent/moonsignal.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn fingerprint_tracks_content() {
        let a = WeightConfig::default();
        let b = WeightConfig::default();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);

        let mut c = WeightConfig::default();
        c.weights.rsi = 0.3;
        assert_ne!(a.fingerprint(), c.fingerprint());
    }
}
