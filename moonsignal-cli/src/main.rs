//! MoonSignal CLI: score one asset, score a directory, print configurations.
//!
//! Commands:
//! - `score` scores a candle file (or a synthetic series) and prints the signal record
//! - `batch` scores every `*.csv` / `*.json` file in a directory and prints the report,
//!   one record (`--symbol`) or the per-category counts (`--categories`)
//! - `config` prints a weight configuration preset as TOML

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use moonsignal_core::indicators::DerivativesInput;
use moonsignal_core::scoring::ScoringEngine;
use moonsignal_core::WeightConfig;
use moonsignal_runner::{
    load_asset, load_asset_dir, score_batch, synthetic_candles, AssetInput, BatchOptions,
    SignalFilter, SortDirection, SortKey,
};

#[derive(Parser)]
#[command(
    name = "moonsignal",
    about = "MoonSignal CLI: multi-indicator composite signals for price series"
)]
struct Cli {
    /// Emit logs as JSON lines instead of human-readable text.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score one asset and print its signal record as JSON.
    Score {
        /// Candle file (.csv or .json).
        #[arg(long, conflicts_with = "synthetic")]
        input: Option<PathBuf>,

        /// Score N synthetic daily candles instead of a file.
        #[arg(long)]
        synthetic: Option<usize>,

        /// Symbol. Defaults to the file stem, or SYNTH for synthetic data.
        #[arg(long)]
        symbol: Option<String>,

        /// Weight configuration TOML file.
        #[arg(long, conflicts_with = "preset")]
        config: Option<PathBuf>,

        /// Named preset: default, trend-following, short-trend.
        #[arg(long)]
        preset: Option<String>,

        /// Fear & Greed index value (0-100).
        #[arg(long)]
        fear_greed: Option<u8>,

        /// Perpetual funding rate (e.g. 0.0001).
        #[arg(long)]
        funding_rate: Option<f64>,

        /// Long/short account ratio.
        #[arg(long)]
        long_short_ratio: Option<f64>,
    },
    /// Score every candle file in a directory and print the batch report.
    Batch {
        /// Directory of .csv / .json candle files.
        #[arg(long)]
        dir: PathBuf,

        /// Weight configuration TOML file.
        #[arg(long, conflicts_with = "preset")]
        config: Option<PathBuf>,

        /// Named preset: default, trend-following, short-trend.
        #[arg(long)]
        preset: Option<String>,

        /// Worker threads. Defaults to one per core.
        #[arg(long)]
        threads: Option<usize>,

        /// Score assets one at a time.
        #[arg(long, default_value_t = false)]
        sequential: bool,

        /// Only list this category (case-insensitive).
        #[arg(long)]
        category: Option<String>,

        /// Only list records with at least this tier (-3..=3).
        #[arg(long, allow_hyphen_values = true)]
        min_tier: Option<i8>,

        /// Only list records with at most this tier (-3..=3).
        #[arg(long, allow_hyphen_values = true)]
        max_tier: Option<i8>,

        /// Maximum number of records listed.
        #[arg(long)]
        limit: Option<usize>,

        /// Listing order: score, symbol, price or change_24h.
        #[arg(long, default_value = "score")]
        sort_by: SortKey,

        /// Listing direction: asc or desc.
        #[arg(long, default_value = "desc")]
        sort_dir: SortDirection,

        /// Print only this symbol's record (case-insensitive).
        #[arg(long, conflicts_with = "categories")]
        symbol: Option<String>,

        /// Print signal counts per category instead of the records.
        #[arg(long, default_value_t = false)]
        categories: bool,
    },
    /// Print a weight configuration as TOML.
    Config {
        /// Named preset: default, trend-following, short-trend.
        #[arg(long, default_value = "default")]
        preset: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.json_logs);

    match cli.command {
        Commands::Score {
            input,
            synthetic,
            symbol,
            config,
            preset,
            fear_greed,
            funding_rate,
            long_short_ratio,
        } => {
            let derivatives = DerivativesInput {
                funding_rate,
                long_short_ratio,
            };
            run_score(
                input,
                synthetic,
                symbol,
                config.as_deref(),
                preset.as_deref(),
                fear_greed,
                derivatives,
            )
        }
        Commands::Batch {
            dir,
            config,
            preset,
            threads,
            sequential,
            category,
            min_tier,
            max_tier,
            limit,
            sort_by,
            sort_dir,
            symbol,
            categories,
        } => {
            let filter = SignalFilter {
                category,
                min_tier,
                max_tier,
                limit,
                sort_by,
                sort_dir,
            };
            let view = match (symbol, categories) {
                (Some(symbol), _) => BatchView::Symbol(symbol),
                (None, true) => BatchView::Categories,
                (None, false) => BatchView::Report(filter),
            };
            run_batch(
                &dir,
                config.as_deref(),
                preset.as_deref(),
                threads,
                sequential,
                &view,
            )
        }
        Commands::Config { preset } => run_config(&preset),
    }
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}

fn load_config(path: Option<&Path>, preset: Option<&str>) -> Result<WeightConfig> {
    if let Some(path) = path {
        return WeightConfig::from_file(path)
            .with_context(|| format!("loading weight config {}", path.display()));
    }
    let name = preset.unwrap_or("default");
    match WeightConfig::preset(name) {
        Some(config) => Ok(config),
        None => bail!("unknown preset '{name}' (expected default, trend-following or short-trend)"),
    }
}

fn run_score(
    input: Option<PathBuf>,
    synthetic: Option<usize>,
    symbol: Option<String>,
    config_path: Option<&Path>,
    preset: Option<&str>,
    fear_greed: Option<u8>,
    derivatives: DerivativesInput,
) -> Result<()> {
    if let Some(index) = fear_greed {
        if index > 100 {
            bail!("--fear-greed must be between 0 and 100, got {index}");
        }
    }

    let mut asset = match (input, synthetic) {
        (Some(path), None) => load_asset(&path)?,
        (None, Some(bars)) => {
            if bars == 0 {
                bail!("--synthetic needs at least one candle");
            }
            let name = symbol.clone().unwrap_or_else(|| "SYNTH".to_string());
            let candles = synthetic_candles(&name, bars);
            AssetInput::new(name, candles)
        }
        _ => bail!("one of --input or --synthetic is required"),
    };
    if let Some(symbol) = symbol {
        asset.symbol = symbol;
    }
    if fear_greed.is_some() {
        asset.sentiment = fear_greed;
    }
    if !derivatives.is_empty() {
        asset.derivatives = Some(derivatives);
    }

    let engine = ScoringEngine::new(load_config(config_path, preset)?)?;
    if asset.candles.len() < engine.required_bars() {
        info!(
            candles = asset.candles.len(),
            required = engine.required_bars(),
            "series shorter than full indicator coverage; missing indicators score neutral"
        );
    }

    let record = asset.score(&engine)?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

/// What `batch` prints.
enum BatchView {
    Report(SignalFilter),
    Symbol(String),
    Categories,
}

fn run_batch(
    dir: &Path,
    config_path: Option<&Path>,
    preset: Option<&str>,
    threads: Option<usize>,
    sequential: bool,
    view: &BatchView,
) -> Result<()> {
    let engine = ScoringEngine::new(load_config(config_path, preset)?)?;
    let assets = load_asset_dir(dir)?;
    if assets.is_empty() {
        bail!("no loadable .csv or .json candle files in {}", dir.display());
    }

    let options = BatchOptions {
        parallel: !sequential,
        worker_threads: threads,
    };
    let mut report = score_batch(&engine, &assets, &options)?.with_generated_at(Utc::now());

    match view {
        BatchView::Report(filter) => {
            if *filter != SignalFilter::default() {
                report.records = report.filter(filter).into_iter().cloned().collect();
            }
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        BatchView::Symbol(symbol) => match report.get(symbol) {
            Some(record) => println!("{}", serde_json::to_string_pretty(record)?),
            None => bail!("no scored asset '{symbol}' in {}", dir.display()),
        },
        BatchView::Categories => {
            println!("{}", serde_json::to_string_pretty(&report.categories())?);
        }
    }
    Ok(())
}

fn run_config(preset: &str) -> Result<()> {
    let config = load_config(None, Some(preset))?;
    print!("{}", config.to_toml()?);
    Ok(())
}
