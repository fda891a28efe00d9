//! Candle loading from CSV and JSON files.
//!
//! CSV files carry a `timestamp,open,high,low,close,volume` header with
//! RFC 3339 timestamps. JSON files are either a bare candle array or an
//! asset object (`symbol`, `name`, `category`, `sentiment`, `derivatives`,
//! `candles`). Every load is validated into a `PriceSeries`; candles with a
//! NaN field, inverted range or negative volume are rejected.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use moonsignal_core::domain::{Candle, PriceSeries, SeriesError};
use moonsignal_core::indicators::DerivativesInput;

use crate::batch::AssetInput;

/// Errors from the file loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid CSV in {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid price series in {path}: {source}")]
    Series { path: PathBuf, source: SeriesError },

    #[error("malformed candle at row {index} in {path}")]
    MalformedCandle { path: PathBuf, index: usize },

    #[error("unsupported file type for {0} (expected .csv or .json)")]
    UnsupportedFormat(PathBuf),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonFile {
    Bare(Vec<Candle>),
    Asset(JsonAsset),
}

#[derive(Deserialize)]
struct JsonAsset {
    #[serde(default)]
    symbol: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    sentiment: Option<u8>,
    #[serde(default)]
    derivatives: Option<DerivativesInput>,
    candles: Vec<Candle>,
}

/// Load a CSV candle file.
pub fn load_candles_csv(path: &Path) -> Result<PriceSeries, LoadError> {
    let candles = read_csv(path)?;
    validate(path, candles)
}

/// Load a JSON candle file (bare array or asset object).
pub fn load_candles_json(path: &Path) -> Result<PriceSeries, LoadError> {
    let candles = match read_json(path)? {
        JsonFile::Bare(candles) => candles,
        JsonFile::Asset(asset) => asset.candles,
    };
    validate(path, candles)
}

/// Load candles, choosing the format by file extension.
pub fn load_candles(path: &Path) -> Result<PriceSeries, LoadError> {
    match Format::of(path)? {
        Format::Csv => load_candles_csv(path),
        Format::Json => load_candles_json(path),
    }
}

/// Load one asset. The symbol defaults to the upper-cased file stem; JSON
/// asset objects may override it and supply metadata.
pub fn load_asset(path: &Path) -> Result<AssetInput, LoadError> {
    let stem_symbol = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_uppercase())
        .unwrap_or_default();

    let asset = match Format::of(path)? {
        Format::Csv => AssetInput::new(stem_symbol, read_csv(path)?),
        Format::Json => match read_json(path)? {
            JsonFile::Bare(candles) => AssetInput::new(stem_symbol, candles),
            JsonFile::Asset(file) => AssetInput {
                symbol: file.symbol.unwrap_or(stem_symbol),
                name: file.name,
                category: file.category,
                candles: file.candles,
                volumes: None,
                sentiment: file.sentiment,
                derivatives: file.derivatives,
                context: None,
            },
        },
    };

    // Validated at load time so errors name the file.
    let series = validate(path, asset.candles)?;
    debug!(path = %path.display(), symbol = %asset.symbol, candles = series.len(), "asset loaded");
    Ok(AssetInput {
        candles: series.into_candles(),
        ..asset
    })
}

/// Load every `*.csv` / `*.json` file in `dir`, sorted by file name.
///
/// Unreadable or invalid files are logged and skipped.
pub fn load_asset_dir(dir: &Path) -> Result<Vec<AssetInput>, LoadError> {
    let entries = std::fs::read_dir(dir).map_err(|source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && Format::of(path).is_ok())
        .collect();
    paths.sort();

    let mut assets = Vec::with_capacity(paths.len());
    for path in &paths {
        match load_asset(path) {
            Ok(asset) => assets.push(asset),
            Err(e) => warn!(error = %e, "skipping file"),
        }
    }
    info!(dir = %dir.display(), files = paths.len(), loaded = assets.len(), "asset directory loaded");
    Ok(assets)
}

enum Format {
    Csv,
    Json,
}

impl Format {
    fn of(path: &Path) -> Result<Self, LoadError> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase());
        match ext.as_deref() {
            Some("csv") => Ok(Self::Csv),
            Some("json") => Ok(Self::Json),
            _ => Err(LoadError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

fn read_csv(path: &Path) -> Result<Vec<Candle>, LoadError> {
    let csv_err = |source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(csv_err)?;
    reader
        .deserialize::<Candle>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(csv_err)
}

fn read_json(path: &Path) -> Result<JsonFile, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn validate(path: &Path, candles: Vec<Candle>) -> Result<PriceSeries, LoadError> {
    if let Some(index) = candles.iter().position(|c| !c.is_sane()) {
        return Err(LoadError::MalformedCandle {
            path: path.to_path_buf(),
            index,
        });
    }
    PriceSeries::new(candles).map_err(|source| LoadError::Series {
        path: path.to_path_buf(),
        source,
    })
}
