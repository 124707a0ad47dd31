//! Export orchestrator for artifacts and reports.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::metrics::PerformanceMetrics;
use crate::reporting::artifacts::{
    build_equity_curve, read_trades_csv, write_equity_csv, write_json, ArtifactManager,
    ArtifactPaths,
};
use crate::reporting::reports::MarkdownReportGenerator;
use crate::runner::BacktestResult;

pub fn export_run_with_report(
    output_dir: impl AsRef<Path>,
    result: &BacktestResult,
    prefix: &str,
    include_report: bool,
) -> Result<ArtifactPaths> {
    let manager = ArtifactManager::new(output_dir)?;
    let mut paths = manager.save_run(result, prefix)?;

    if include_report {
        let report_path = paths
            .manifest
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(if prefix.is_empty() {
                "report.md".to_string()
            } else {
                format!("{prefix}_report.md")
            });
        let title = format!("Symbol: `{}`", result.symbol);
        let report = MarkdownReportGenerator.generate(&title, &result.pnl, &result.metrics);
        std::fs::write(&report_path, report)
            .with_context(|| format!("failed to write report {}", report_path.display()))?;
        paths.report_markdown = Some(report_path);
    }

    Ok(paths)
}

/// Files written by [`report_from_trades_csv`].
#[derive(Debug, Clone)]
pub struct ReportPaths {
    pub equity_csv: PathBuf,
    pub summary_json: PathBuf,
    pub report_markdown: PathBuf,
}

/// Rebuild the equity curve, metrics and Markdown report from an existing
/// trades CSV.
pub fn report_from_trades_csv(
    trades_csv: &Path,
    output_dir: &Path,
) -> Result<(ReportPaths, PerformanceMetrics)> {
    let pnl = read_trades_csv(trades_csv)?;
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    let net: Vec<f64> = pnl.iter().map(|p| p.net_pnl).collect();
    let metrics = PerformanceMetrics::compute(&net);

    let equity_csv = output_dir.join("equity.csv");
    write_equity_csv(&equity_csv, &build_equity_curve(&pnl))?;

    let summary_json = output_dir.join("summary.json");
    write_json(&summary_json, &metrics)?;

    let report_markdown = output_dir.join("report.md");
    let title = format!("Source: `{}`", trades_csv.display());
    std::fs::write(
        &report_markdown,
        MarkdownReportGenerator.generate(&title, &pnl, &metrics),
    )
    .with_context(|| format!("failed to write report {}", report_markdown.display()))?;

    info!(
        trades = metrics.trades,
        total_net_pnl = metrics.total_net_pnl,
        out = %output_dir.display(),
        "report written"
    );

    Ok((
        ReportPaths {
            equity_csv,
            summary_json,
            report_markdown,
        },
        metrics,
    ))
}
