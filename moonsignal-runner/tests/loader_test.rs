//! Integration tests for candle loading from CSV and JSON files.

use std::io::Write;
use std::path::Path;

use moonsignal_runner::{
    load_asset, load_asset_dir, load_candles, load_candles_csv, load_candles_json,
    synthetic_candles, LoadError,
};
use tempfile::TempDir;

const CSV: &str = "\
timestamp,open,high,low,close,volume
2024-01-01T00:00:00Z,100.0,102.0,99.0,101.0,1500
2024-01-02T00:00:00Z,101.0,103.5,100.5,103.0,1800.5
2024-01-03T00:00:00Z,103.0,104.0,101.0,101.5,1200
";

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

#[test]
fn csv_loads_into_series() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "btc.csv", CSV);

    let series = load_candles_csv(&path).unwrap();
    assert_eq!(series.len(), 3);
    assert_eq!(series.last().close, 101.5);
    assert_eq!(series.candles()[1].volume, 1800.5);
    assert_eq!(series.last().timestamp.to_rfc3339(), "2024-01-03T00:00:00+00:00");
}

#[test]
fn json_accepts_bare_array_and_asset_object() {
    let dir = TempDir::new().unwrap();
    let candles = synthetic_candles("ETH", 20);

    let bare = write(dir.path(), "eth.json", &serde_json::to_string(&candles).unwrap());
    assert_eq!(load_candles_json(&bare).unwrap().len(), 20);

    let object = serde_json::json!({
        "symbol": "WETH",
        "name": "Wrapped Ether",
        "category": "DeFi",
        "sentiment": 30,
        "derivatives": { "funding_rate": 0.0012, "long_short_ratio": null },
        "candles": candles,
    });
    let wrapped = write(dir.path(), "weth.json", &object.to_string());
    assert_eq!(load_candles(&wrapped).unwrap().len(), 20);

    let asset = load_asset(&wrapped).unwrap();
    assert_eq!(asset.symbol, "WETH");
    assert_eq!(asset.name.as_deref(), Some("Wrapped Ether"));
    assert_eq!(asset.sentiment, Some(30));
    assert_eq!(asset.derivatives.unwrap().funding_rate, Some(0.0012));
}

#[test]
fn csv_asset_symbol_comes_from_file_stem() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "sol.csv", CSV);
    let asset = load_asset(&path).unwrap();
    assert_eq!(asset.symbol, "SOL");
    assert_eq!(asset.candles.len(), 3);
    assert!(asset.name.is_none());
}

#[test]
fn out_of_order_rows_are_rejected() {
    let dir = TempDir::new().unwrap();
    let swapped = "\
timestamp,open,high,low,close,volume
2024-01-02T00:00:00Z,101.0,103.5,100.5,103.0,1800
2024-01-01T00:00:00Z,100.0,102.0,99.0,101.0,1500
";
    let path = write(dir.path(), "bad.csv", swapped);
    let err = load_candles(&path).unwrap_err();
    assert!(matches!(err, LoadError::Series { .. }), "{err}");
}

#[test]
fn malformed_candles_are_rejected_with_file_and_row() {
    let dir = TempDir::new().unwrap();
    let rows = [
        ("inverted.csv", "2024-01-02T00:00:00Z,101.0,99.0,103.0,100.0,1800"),
        ("nan.csv", "2024-01-02T00:00:00Z,101.0,103.5,100.5,NaN,1800"),
        ("negvol.csv", "2024-01-02T00:00:00Z,101.0,103.5,100.5,103.0,-5"),
    ];
    for (name, row) in rows {
        let content = format!(
            "timestamp,open,high,low,close,volume\n2024-01-01T00:00:00Z,100.0,102.0,99.0,101.0,1500\n{row}\n"
        );
        let path = write(dir.path(), name, &content);
        let err = load_candles(&path).unwrap_err();
        match &err {
            LoadError::MalformedCandle { path: bad, index } => {
                assert_eq!(bad, &path);
                assert_eq!(*index, 1);
            }
            other => panic!("{name}: expected malformed candle, got {other}"),
        }
        assert!(err.to_string().contains(name), "{err}");
    }
}

#[test]
fn directory_load_skips_malformed_candles() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "btc.csv", CSV);
    write(
        dir.path(),
        "bad.csv",
        "timestamp,open,high,low,close,volume\n2024-01-01T00:00:00Z,100.0,90.0,110.0,101.0,1500\n",
    );
    let assets = load_asset_dir(dir.path()).unwrap();
    let symbols: Vec<&str> = assets.iter().map(|a| a.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["BTC"]);
}

#[test]
fn header_only_file_is_empty_series() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "empty.csv", "timestamp,open,high,low,close,volume\n");
    assert!(matches!(
        load_candles_csv(&path),
        Err(LoadError::Series { .. })
    ));
}

#[test]
fn malformed_files_report_their_format() {
    let dir = TempDir::new().unwrap();
    let csv = write(
        dir.path(),
        "x.csv",
        "timestamp,open,high,low,close,volume\nyesterday,1,2,0,1,5\n",
    );
    assert!(matches!(load_candles(&csv), Err(LoadError::Csv { .. })));

    let json = write(dir.path(), "x.json", "{\"candles\": 3}");
    assert!(matches!(load_candles(&json), Err(LoadError::Json { .. })));

    let txt = write(dir.path(), "x.txt", CSV);
    assert!(matches!(
        load_candles(&txt),
        Err(LoadError::UnsupportedFormat(_))
    ));

    let missing = dir.path().join("missing.json");
    assert!(matches!(load_candles(&missing), Err(LoadError::Io { .. })));
}

#[test]
fn directory_load_skips_bad_and_foreign_files() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "btc.csv", CSV);
    write(
        dir.path(),
        "eth.json",
        &serde_json::to_string(&synthetic_candles("ETH", 10)).unwrap(),
    );
    write(dir.path(), "notes.txt", "ignore me");
    write(dir.path(), "broken.json", "[");

    let assets = load_asset_dir(dir.path()).unwrap();
    let symbols: Vec<&str> = assets.iter().map(|a| a.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["BTC", "ETH"]);
}

#[test]
fn missing_directory_is_io_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope");
    assert!(matches!(
        load_asset_dir(&missing),
        Err(LoadError::Io { .. })
    ));
}
