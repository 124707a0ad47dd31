//! VWAPLab CLI: backtest, walk-forward, report, and data preparation commands.
//!
//! Commands:
//! - `backtest`: run one parameter set from a TOML config and export artifacts
//! - `walkforward`: grid search on A, evaluate the winner on B and C
//! - `report`: rebuild equity curve, summary and Markdown from a trades CSV
//! - `features`: compute engine feature columns from a raw OHLCV file
//! - `synth`: write a synthetic bar file for demos and smoke tests

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vwaplab_core::data::{
    append_f64_columns, bars_to_frame, cycle_bars, random_walk, raw_bars_from_frame,
    raw_bars_to_frame, ColumnMap,
};
use vwaplab_core::features::{build_feature_bars, build_indicator_columns, FeatureConfig};
use vwaplab_runner::reporting::{export_run_with_report, report_from_trades_csv, ArtifactManager};
use vwaplab_runner::{
    load_bars, make_abc_split_by_ts, pick_cutoffs_by_ratio, read_frame, run_one, write_frame,
    BacktestConfig, BacktestResult, GridSearch, PerformanceMetrics, WalkForwardReport,
};

#[derive(Parser)]
#[command(
    name = "vwaplab",
    version,
    about = "VWAPLab CLI: single-asset VWAP pullback backtesting"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one backtest from a TOML config and export artifacts.
    Backtest {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Override `[data].path`.
        #[arg(long)]
        data: Option<PathBuf>,

        /// Override `[output].dir`.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Also write a Markdown report.
        #[arg(long, default_value_t = false)]
        report: bool,
    },
    /// A/B/C walk-forward: select on A, evaluate on B and C.
    Walkforward {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Override `[data].path`.
        #[arg(long)]
        data: Option<PathBuf>,

        /// Override `[output].dir`.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Evaluate the grid on one thread.
        #[arg(long, default_value_t = false)]
        serial: bool,
    },
    /// Rebuild equity curve, summary and report from a trades CSV.
    Report {
        /// trades.csv written by `backtest` or `walkforward`.
        #[arg(long)]
        trades: PathBuf,

        /// Output directory. Defaults to the trades file's directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Compute engine and indicator columns from a raw OHLCV file
    /// (ts, open, high, low, close, volume).
    Features {
        #[arg(long)]
        input: PathBuf,

        /// Output `.csv` or `.parquet`.
        #[arg(long)]
        output: PathBuf,

        /// Optional TOML config; its `[features]` and `[columns]` sections are used.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Write synthetic bars.
    Synth {
        #[arg(long, value_enum, default_value_t = SynthKind::Walk)]
        kind: SynthKind,

        /// Bars for `walk`, cycles for `cycle`.
        #[arg(long, default_value_t = 5_000)]
        n: usize,

        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Output `.csv` or `.parquet`.
        #[arg(long)]
        output: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SynthKind {
    /// Raw OHLCV random walk (run `features` on it next).
    Walk,
    /// Engine-ready four-bar trade cycles.
    Cycle,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("RUST_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    let result = if json {
        registry.with(fmt::layer().json().with_writer(std::io::stderr)).try_init()
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
    };
    result.ok();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Backtest {
            config,
            data,
            output_dir,
            report,
        } => run_backtest_cmd(&config, data, output_dir, report),
        Commands::Walkforward {
            config,
            data,
            output_dir,
            serial,
        } => run_walkforward_cmd(&config, data, output_dir, serial),
        Commands::Report { trades, output_dir } => run_report_cmd(&trades, output_dir),
        Commands::Features {
            input,
            output,
            config,
        } => run_features_cmd(&input, &output, config.as_deref()),
        Commands::Synth {
            kind,
            n,
            seed,
            output,
        } => run_synth_cmd(kind, n, seed, &output),
    }
}

fn load_config(
    path: &Path,
    data: Option<PathBuf>,
    output_dir: Option<PathBuf>,
) -> Result<BacktestConfig> {
    let mut cfg = BacktestConfig::from_file(path)?;
    if let Some(data) = data {
        cfg.data.path = data;
    }
    if let Some(dir) = output_dir {
        cfg.output.dir = dir;
    }
    if cfg.data.path.as_os_str().is_empty() {
        bail!("no data file: set [data].path or pass --data");
    }
    Ok(cfg)
}

fn run_backtest_cmd(
    config_path: &Path,
    data: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    report: bool,
) -> Result<()> {
    let cfg = load_config(config_path, data, output_dir)?;
    let loaded = load_bars(&cfg.data, &cfg.columns, &cfg.features)?;

    let result = run_one(&loaded.bars, &cfg.symbol, &cfg.base_item())?;
    print_summary(&cfg.symbol, &result.metrics);

    let paths = export_run_with_report(&cfg.output.dir, &result, "", report)?;
    info!(manifest = %paths.manifest.display(), "artifacts saved");
    println!("Artifacts saved to: {}", cfg.output.dir.display());
    print_ledger_tail(&result);
    Ok(())
}

fn run_walkforward_cmd(
    config_path: &Path,
    data: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    serial: bool,
) -> Result<()> {
    let cfg = load_config(config_path, data, output_dir)?;
    let loaded = load_bars(&cfg.data, &cfg.columns, &cfg.features)?;

    let cutoffs = match (cfg.split.a_end, cfg.split.b_end) {
        (Some(a_end), Some(b_end)) => vwaplab_runner::SplitCutoffs { a_end, b_end },
        _ => pick_cutoffs_by_ratio(&loaded.bars, cfg.split.a_ratio, cfg.split.b_ratio)?,
    };
    let split = make_abc_split_by_ts(&loaded.bars, cutoffs.a_end, cutoffs.b_end)?;
    let (a, b, c) = split.sizes();
    info!(a_end = cutoffs.a_end, b_end = cutoffs.b_end, a, b, c, "split");

    let grid = cfg.grid_items();
    let report = GridSearch::new()
        .with_parallelism(!serial)
        .walkforward(&split, &cfg.symbol, &grid)?;
    print_walkforward(&report);

    let manager = ArtifactManager::new(&cfg.output.dir)?;
    let paths = manager.save_walkforward(&report)?;
    println!("Walk-forward summary: {}", paths.walkforward_json.display());
    println!("Grid table:           {}", paths.grid_runs_csv.display());
    Ok(())
}

fn run_report_cmd(trades: &Path, output_dir: Option<PathBuf>) -> Result<()> {
    let out = match output_dir {
        Some(dir) => dir,
        None => trades
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    };
    let (paths, metrics) = report_from_trades_csv(trades, &out)?;
    print_summary(&trades.display().to_string(), &metrics);
    println!("Equity:  {}", paths.equity_csv.display());
    println!("Summary: {}", paths.summary_json.display());
    println!("Report:  {}", paths.report_markdown.display());
    Ok(())
}

fn run_features_cmd(input: &Path, output: &Path, config: Option<&Path>) -> Result<()> {
    let (features, columns) = match config {
        Some(path) => {
            let cfg = BacktestConfig::from_file(path)?;
            (cfg.features, cfg.columns)
        }
        None => (FeatureConfig::default(), ColumnMap::default()),
    };

    let raw = raw_bars_from_frame(&read_frame(input)?)?;
    let bars = build_feature_bars(&raw, &features);
    let indicators = build_indicator_columns(&raw, &features);

    let mut out = bars_to_frame(&bars, &columns)?;
    append_f64_columns(&mut out, indicators.named(&features))?;
    write_frame(&mut out, output)?;

    info!(
        rows = bars.len(),
        warmup = features.warmup_bars(),
        out = %output.display(),
        "features written"
    );
    println!("Wrote {} feature bars to {}", bars.len(), output.display());
    Ok(())
}

fn run_synth_cmd(kind: SynthKind, n: usize, seed: u64, output: &Path) -> Result<()> {
    let mut df = match kind {
        SynthKind::Walk => raw_bars_to_frame(&random_walk(n, seed))?,
        SynthKind::Cycle => bars_to_frame(&cycle_bars(n), &ColumnMap::default())?,
    };
    write_frame(&mut df, output)
        .with_context(|| format!("failed to write synthetic bars to {}", output.display()))?;
    println!("Wrote {} synthetic bars to {}", df.height(), output.display());
    Ok(())
}

fn print_summary(label: &str, m: &PerformanceMetrics) {
    println!();
    println!("=== {label} ===");
    println!("Trades:        {}", m.trades);
    println!("Win rate:      {:.1}%", m.win_rate * 100.0);
    println!("Expectancy:    {:+.4}", m.expectancy);
    println!("Profit factor: {}", m.profit_factor_display());
    println!("Total net P&L: {:+.4}", m.total_net_pnl);
    println!("Max drawdown:  {:.4}", m.max_drawdown);
    println!();
}

fn print_ledger_tail(result: &BacktestResult) {
    let n = result.pnl.len();
    if n == 0 {
        return;
    }
    println!("Last trades:");
    for p in &result.pnl[n.saturating_sub(5)..] {
        println!(
            "  {} {} -> {}  {:.4} -> {:.4}  net {:+.4}  [{}]",
            p.side, p.entry_ts, p.exit_ts, p.entry_px_eff, p.exit_px_eff, p.net_pnl, p.reasons
        );
    }
}

fn print_walkforward(report: &WalkForwardReport) {
    let s = &report.best_params.strategy;
    println!();
    println!("Best params on A (of {} items):", report.train_grid_runs.len());
    println!(
        "  expiry={} atr_stop_mult={} take_profit_r={} time_stop={:?} min_vol_ratio={:?}",
        s.limit_expiry_bars,
        s.atr_stop_mult,
        s.take_profit_r,
        s.time_stop_bars,
        report.best_params.entry.min_vol_ratio
    );
    print_summary("A (train)", &report.train_metrics);
    print_summary("B (validate)", &report.validate_metrics);
    print_summary("C (test)", &report.test_metrics);
}
