//! Artifact manager for persisting run outputs.

mod equity;
mod grid;
mod manifest;
mod trades;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::grid::WalkForwardReport;
use crate::metrics::PerformanceMetrics;
use crate::runner::BacktestResult;

pub use equity::{build_equity_curve, write_equity_csv, write_equity_parquet, EquityRow};
pub use grid::{write_grid_runs_csv, GRID_COLUMNS};
pub use manifest::{read_manifest, write_json, RunManifest};
pub use trades::{read_trades_csv, write_trades_csv, write_trades_json, TRADE_COLUMNS};

/// Artifact paths returned after export.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub manifest: PathBuf,
    pub summary_json: PathBuf,
    pub trades_csv: PathBuf,
    pub trades_json: PathBuf,
    pub equity_csv: PathBuf,
    pub equity_parquet: PathBuf,
    pub report_markdown: Option<PathBuf>,
}

/// Paths written for a walk-forward run.
#[derive(Debug, Clone)]
pub struct WalkForwardPaths {
    pub walkforward_json: PathBuf,
    pub grid_runs_csv: PathBuf,
    pub validate: ArtifactPaths,
    pub test: ArtifactPaths,
}

/// Writes all artifacts for a run into one output directory.
#[derive(Debug, Clone)]
pub struct ArtifactManager {
    output_dir: PathBuf,
}

impl ArtifactManager {
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&output_dir).with_context(|| {
            format!(
                "failed to create artifact output directory {}",
                output_dir.display()
            )
        })?;
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn path(&self, prefix: &str, name: &str) -> PathBuf {
        if prefix.is_empty() {
            self.output_dir.join(name)
        } else {
            self.output_dir.join(format!("{prefix}_{name}"))
        }
    }

    /// Save the ledger, equity curve, summary and manifest of one run.
    /// A non-empty `prefix` is prepended to every file name.
    pub fn save_run(&self, result: &BacktestResult, prefix: &str) -> Result<ArtifactPaths> {
        self.save_ledger(
            &result.symbol,
            &result.params.fingerprint(),
            &result.pnl,
            &result.metrics,
            prefix,
        )
    }

    fn save_ledger(
        &self,
        symbol: &str,
        fingerprint: &str,
        pnl: &[vwaplab_core::costs::TradePnl],
        metrics: &PerformanceMetrics,
        prefix: &str,
    ) -> Result<ArtifactPaths> {
        let trades_csv = self.path(prefix, "trades.csv");
        let trades_json = self.path(prefix, "trades.json");
        write_trades_csv(&trades_csv, pnl)?;
        write_trades_json(&trades_json, pnl)?;

        let curve = build_equity_curve(pnl);
        let equity_csv = self.path(prefix, "equity.csv");
        let equity_parquet = self.path(prefix, "equity.parquet");
        write_equity_csv(&equity_csv, &curve)?;
        write_equity_parquet(&equity_parquet, &curve)?;

        let summary_json = self.path(prefix, "summary.json");
        write_json(&summary_json, metrics)?;

        let manifest_path = self.path(prefix, "manifest.json");
        let manifest = RunManifest {
            symbol: symbol.to_string(),
            params_fingerprint: fingerprint.to_string(),
            trades_csv: trades_csv.clone(),
            summary_json: summary_json.clone(),
            n_trades: metrics.trades,
            total_net_pnl: metrics.total_net_pnl,
            max_drawdown: metrics.max_drawdown,
            artifacts: vec![
                trades_csv.clone(),
                trades_json.clone(),
                equity_csv.clone(),
                equity_parquet.clone(),
                summary_json.clone(),
            ],
            summary: metrics.clone(),
        };
        write_json(&manifest_path, &manifest)?;

        Ok(ArtifactPaths {
            manifest: manifest_path,
            summary_json,
            trades_csv,
            trades_json,
            equity_csv,
            equity_parquet,
            report_markdown: None,
        })
    }

    /// Save the walk-forward summary, the train grid table, and the
    /// validate/test ledgers of the selected parameters.
    pub fn save_walkforward(&self, report: &WalkForwardReport) -> Result<WalkForwardPaths> {
        let walkforward_json = self.path("", "walkforward.json");
        write_json(&walkforward_json, report)?;

        let grid_runs_csv = self.path("", "grid_runs.csv");
        write_grid_runs_csv(&grid_runs_csv, &report.train_grid_runs)?;

        let fingerprint = report.best_params.fingerprint();
        let validate = self.save_ledger(
            &report.symbol,
            &fingerprint,
            &report.validate_pnl,
            &report.validate_metrics,
            "validate",
        )?;
        let test = self.save_ledger(
            &report.symbol,
            &fingerprint,
            &report.test_pnl,
            &report.test_metrics,
            "test",
        )?;

        Ok(WalkForwardPaths {
            walkforward_json,
            grid_runs_csv,
            validate,
            test,
        })
    }
}
