//! Composite scoring: weighted fusion, ADX modifier, tiers and confidence.

pub mod engine;
pub mod modifier;
pub mod snapshot;
pub mod tier;

pub use engine::{CompositeScore, Contribution, ScoringEngine};
pub use modifier::{adx_confidence_bonus, adx_multiplier, AdxBand, AdxConfidenceBand};
pub use snapshot::{IndicatorSnapshot, ScoreInputs};
pub use tier::{Tier, TierThresholds};
