//! MoonSignal Core: indicator library, DeMark tracker, composite scoring, signal records.
//!
//! This crate contains the whole scoring pipeline for a single asset:
//! - Domain types (candles, validated price series, indicator readings)
//! - Indicator library (RSI, EMA/SMA, MACD, Bollinger, ADX, relative volume,
//!   sentiment, derivatives positioning)
//! - DeMark Sequential setup tracker (full rescan and incremental)
//! - Composite scoring engine with ADX modifier, tiers and confidence
//! - Weight configuration (TOML, presets, validation, fingerprint)
//! - Signal record assembly
//!
//! Everything here is pure and synchronous; batching across assets lives in
//! `moonsignal-runner`.

pub mod components;
pub mod config;
pub mod domain;
pub mod indicators;
pub mod record;
pub mod scoring;

pub use config::{ConfigError, IndicatorPeriods, IndicatorWeights, WeightConfig};
pub use domain::{Candle, Direction, IndicatorKind, IndicatorReading, PriceSeries, SeriesError};
pub use record::{Bias, MarketContext, SignalRecord};
pub use scoring::{CompositeScore, IndicatorSnapshot, ScoreInputs, ScoringEngine, Tier};
