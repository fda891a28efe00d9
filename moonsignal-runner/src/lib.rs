//! MoonSignal Runner: batch scoring, candle loading, synthetic series.
//!
//! This crate builds on `moonsignal-core` to provide:
//! - Batch scoring of many assets on a rayon worker pool
//! - Batch summary, category counts, symbol lookup, sorting and filters
//! - Candle loading from CSV and JSON files
//! - Deterministic synthetic series for demos and benchmarks

pub mod batch;
pub mod loader;
pub mod synthetic;

pub use batch::{
    score_batch, AssetInput, BatchError, BatchOptions, BatchReport, BatchSummary, CategoryCounts,
    SignalFilter, SortDirection, SortKey, UNCATEGORIZED,
};
pub use loader::{
    load_asset, load_asset_dir, load_candles, load_candles_csv, load_candles_json, LoadError,
};
pub use synthetic::{synthetic_candles, synthetic_series};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn asset_input_is_send_sync() {
        assert_send::<AssetInput>();
        assert_sync::<AssetInput>();
    }

    #[test]
    fn batch_options_are_send_sync() {
        assert_send::<BatchOptions>();
        assert_sync::<BatchOptions>();
        assert_send::<SignalFilter>();
        assert_sync::<SignalFilter>();
    }

    #[test]
    fn batch_report_is_send_sync() {
        assert_send::<BatchReport>();
        assert_sync::<BatchReport>();
        assert_send::<BatchSummary>();
        assert_sync::<BatchSummary>();
    }

    #[test]
    fn errors_are_send_sync() {
        assert_send::<BatchError>();
        assert_sync::<BatchError>();
        assert_send::<LoadError>();
        assert_sync::<LoadError>();
    }
}
