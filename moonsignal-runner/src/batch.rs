//! Batch scoring across many assets.
//!
//! Each asset is scored independently against one shared, read-only
//! `ScoringEngine`, so the batch parallelizes with no locking. Results are
//! sorted by (tier, composite) descending regardless of execution order.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use moonsignal_core::domain::{Candle, PriceSeries, SeriesError, Symbol};
use moonsignal_core::indicators::DerivativesInput;
use moonsignal_core::scoring::{ScoreInputs, ScoringEngine, Tier};
use moonsignal_core::{MarketContext, SignalRecord};

/// Errors from batch orchestration. Individual assets never fail the batch.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// One asset's already-fetched inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetInput {
    pub symbol: Symbol,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    pub candles: Vec<Candle>,
    /// Separate volume series for relative volume.
    #[serde(default)]
    pub volumes: Option<Vec<f64>>,
    /// Fear & Greed index, 0-100.
    #[serde(default)]
    pub sentiment: Option<u8>,
    #[serde(default)]
    pub derivatives: Option<DerivativesInput>,
    /// Passthrough market fields; derived from the candles when absent.
    #[serde(default)]
    pub context: Option<MarketContext>,
}

impl AssetInput {
    pub fn new(symbol: impl Into<Symbol>, candles: Vec<Candle>) -> Self {
        Self {
            symbol: symbol.into(),
            name: None,
            category: None,
            candles,
            volumes: None,
            sentiment: None,
            derivatives: None,
            context: None,
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

    pub fn with_sentiment(mut self, index: u8) -> Self {
        self.sentiment = Some(index);
        self
    }

    pub fn with_derivatives(mut self, derivatives: DerivativesInput) -> Self {
        self.derivatives = Some(derivatives);
        self
    }

    /// Score this asset alone.
    pub fn score(&self, engine: &ScoringEngine) -> Result<SignalRecord, SeriesError> {
        let series = PriceSeries::new(self.candles.clone())?;

        let mut inputs = ScoreInputs::new(&series);
        if let Some(volumes) = &self.volumes {
            inputs = inputs.with_volumes(volumes);
        }
        inputs.sentiment = self.sentiment;
        inputs.derivatives = self.derivatives;

        let mut context = self
            .context
            .clone()
            .unwrap_or_else(|| MarketContext::from_series(self.symbol.clone(), &series));
        if context.name.is_none() {
            context.name = self.name.clone();
        }
        if context.category.is_none() {
            context.category = self.category.clone();
        }

        Ok(engine.evaluate(&inputs, &context))
    }
}

/// How a batch is executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    /// Score assets on the rayon pool; sequential otherwise.
    pub parallel: bool,
    /// Dedicated pool size. `None` uses the global pool.
    pub worker_threads: Option<usize>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            worker_threads: None,
        }
    }
}

impl BatchOptions {
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            worker_threads: None,
        }
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.worker_threads = Some(threads);
        self
    }
}

/// Signal counts across a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub bullish: usize,
    pub bearish: usize,
    pub neutral: usize,
    /// Records with |tier| >= 2.
    pub strong_signals: usize,
    /// Count per tier score, every tier from -3 to 3 present.
    pub by_tier: BTreeMap<i8, usize>,
}

impl BatchSummary {
    pub fn from_records(records: &[SignalRecord]) -> Self {
        let mut summary = Self {
            by_tier: Tier::ALL.iter().map(|tier| (tier.score(), 0)).collect(),
            ..Self::default()
        };
        for record in records {
            match record.score {
                s if s > 0 => summary.bullish += 1,
                s if s < 0 => summary.bearish += 1,
                _ => summary.neutral += 1,
            }
            if record.score.abs() >= 2 {
                summary.strong_signals += 1;
            }
            *summary.by_tier.entry(record.score).or_insert(0) += 1;
        }
        summary
    }
}

/// Listing order for filtered records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Tier, then composite.
    #[default]
    Score,
    Symbol,
    Price,
    Change24h,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "score" => Ok(Self::Score),
            "symbol" => Ok(Self::Symbol),
            "price" => Ok(Self::Price),
            "change_24h" | "change-24h" | "change" => Ok(Self::Change24h),
            other => Err(format!(
                "unknown sort key '{other}' (expected score, symbol, price or change_24h)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(format!("unknown sort direction '{other}' (expected asc or desc)")),
        }
    }
}

impl SortKey {
    /// Ascending order for this key. A missing 24h change sorts below
    /// every present one.
    fn compare(&self, a: &SignalRecord, b: &SignalRecord) -> Ordering {
        match self {
            SortKey::Score => a
                .score
                .cmp(&b.score)
                .then_with(|| a.composite.total_cmp(&b.composite)),
            SortKey::Symbol => a.symbol.cmp(&b.symbol),
            SortKey::Price => a.price.total_cmp(&b.price),
            SortKey::Change24h => match (a.change_24h, b.change_24h) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                (Some(_), None) => Ordering::Greater,
                (None, Some(_)) => Ordering::Less,
                (None, None) => Ordering::Equal,
            },
        }
    }
}

/// Listing filters over an already computed report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignalFilter {
    /// Case-insensitive category match.
    pub category: Option<String>,
    pub min_tier: Option<i8>,
    pub max_tier: Option<i8>,
    pub limit: Option<usize>,
    pub sort_by: SortKey,
    pub sort_dir: SortDirection,
}

impl SignalFilter {
    fn matches(&self, record: &SignalRecord) -> bool {
        if let Some(category) = &self.category {
            let same = record
                .category
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(category));
            if !same {
                return false;
            }
        }
        self.min_tier.map_or(true, |min| record.score >= min)
            && self.max_tier.map_or(true, |max| record.score <= max)
    }

    /// Ties on the sort key break by symbol ascending.
    fn order(&self, a: &SignalRecord, b: &SignalRecord) -> Ordering {
        let primary = self.sort_by.compare(a, b);
        let primary = match self.sort_dir {
            SortDirection::Asc => primary,
            SortDirection::Desc => primary.reverse(),
        };
        primary.then_with(|| a.symbol.cmp(&b.symbol))
    }
}

/// Bucket for records without a category.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Per-category signal counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub count: usize,
    pub bullish: usize,
    pub bearish: usize,
    pub neutral: usize,
}

/// Scored batch: sorted records plus their summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
    /// Assets scored; equals `records.len()`.
    pub total_assets: usize,
    /// Assets dropped because their series was invalid.
    #[serde(default)]
    pub skipped: usize,
    pub summary: BatchSummary,
    pub records: Vec<SignalRecord>,
}

impl BatchReport {
    /// Sort records by (tier, composite) descending, symbol ascending on ties.
    pub fn new(mut records: Vec<SignalRecord>, skipped: usize) -> Self {
        let order = SignalFilter::default();
        records.sort_by(|a, b| order.order(a, b));
        Self {
            generated_at: None,
            total_assets: records.len(),
            skipped,
            summary: BatchSummary::from_records(&records),
            records,
        }
    }

    pub fn with_generated_at(mut self, at: DateTime<Utc>) -> Self {
        self.generated_at = Some(at);
        self
    }

    /// Assets submitted to the batch, scored or not.
    pub fn submitted(&self) -> usize {
        self.records.len().saturating_add(self.skipped)
    }

    /// Records matching `filter`, in the filter's sort order.
    pub fn filter(&self, filter: &SignalFilter) -> Vec<&SignalRecord> {
        let mut matched: Vec<&SignalRecord> =
            self.records.iter().filter(|r| filter.matches(r)).collect();
        matched.sort_by(|a, b| filter.order(a, b));
        matched.truncate(filter.limit.unwrap_or(usize::MAX));
        matched
    }

    /// Record for `symbol`, matched case-insensitively.
    pub fn get(&self, symbol: &str) -> Option<&SignalRecord> {
        self.records
            .iter()
            .find(|r| r.symbol.eq_ignore_ascii_case(symbol))
    }

    /// Signal counts per category, records without one under
    /// [`UNCATEGORIZED`].
    pub fn categories(&self) -> BTreeMap<String, CategoryCounts> {
        let mut categories: BTreeMap<String, CategoryCounts> = BTreeMap::new();
        for record in &self.records {
            let name = record.category.as_deref().unwrap_or(UNCATEGORIZED);
            let counts = categories.entry(name.to_string()).or_default();
            counts.count += 1;
            match record.score {
                s if s > 0 => counts.bullish += 1,
                s if s < 0 => counts.bearish += 1,
                _ => counts.neutral += 1,
            }
        }
        categories
    }
}

/// Score every asset. Assets with an invalid series are logged and skipped.
pub fn score_batch(
    engine: &ScoringEngine,
    assets: &[AssetInput],
    options: &BatchOptions,
) -> Result<BatchReport, BatchError> {
    info!(
        assets = assets.len(),
        parallel = options.parallel,
        threads = ?options.worker_threads,
        "scoring batch"
    );

    let outcomes: Vec<Option<SignalRecord>> = if options.parallel {
        match options.worker_threads {
            Some(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()?;
                pool.install(|| {
                    assets
                        .par_iter()
                        .map(|asset| score_or_skip(engine, asset))
                        .collect()
                })
            }
            None => assets
                .par_iter()
                .map(|asset| score_or_skip(engine, asset))
                .collect(),
        }
    } else {
        assets
            .iter()
            .map(|asset| score_or_skip(engine, asset))
            .collect()
    };

    let records: Vec<SignalRecord> = outcomes.into_iter().flatten().collect();
    let skipped = assets.len().saturating_sub(records.len());
    let report = BatchReport::new(records, skipped);
    info!(
        scored = report.total_assets,
        skipped = report.skipped,
        bullish = report.summary.bullish,
        bearish = report.summary.bearish,
        "batch complete"
    );
    Ok(report)
}

fn score_or_skip(engine: &ScoringEngine, asset: &AssetInput) -> Option<SignalRecord> {
    match asset.score(engine) {
        Ok(record) => {
            debug!(symbol = %asset.symbol, score = record.score, "asset done");
            Some(record)
        }
        Err(e) => {
            warn!(symbol = %asset.symbol, error = %e, "skipping asset with invalid series");
            None
        }
    }
}
