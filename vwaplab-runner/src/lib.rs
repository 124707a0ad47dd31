//! VWAPLab Runner: backtest orchestration, grid search, walk-forward, reports.
//!
//! This crate builds on `vwaplab-core` to provide:
//! - Data loading from CSV/Parquet, with optional feature computation
//! - Single-backtest runner with costs and metrics
//! - Chronological A/B/C splits
//! - Parallel grid search on A with out-of-sample evaluation on B and C
//! - TOML run configuration
//! - CSV/JSON/Markdown artifact export

pub mod config;
pub mod data_loader;
pub mod grid;
pub mod metrics;
pub mod reporting;
pub mod runner;
pub mod splits;

pub use config::{BacktestConfig, ConfigError};
pub use data_loader::{load_bars, read_frame, write_frame, LoadError, LoadedBars};
pub use grid::{
    run_grid_on_train, run_walkforward_abc, GridError, GridItem, GridResult, GridRun,
    GridSearch, ParamGrid, WalkForwardReport,
};
pub use metrics::PerformanceMetrics;
pub use runner::{run_one, run_one_frame, BacktestResult, RunError};
pub use splits::{make_abc_split_by_ts, pick_cutoffs_by_ratio, AbcSplit, SplitCutoffs, SplitError};
