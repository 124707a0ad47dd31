//! Run manifest and summary export (JSON).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::metrics::PerformanceMetrics;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub symbol: String,
    pub params_fingerprint: String,
    pub trades_csv: PathBuf,
    pub summary_json: PathBuf,
    pub n_trades: usize,
    pub total_net_pnl: f64,
    pub max_drawdown: f64,
    /// Every file written for this run.
    pub artifacts: Vec<PathBuf>,
    pub summary: PerformanceMetrics,
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .with_context(|| format!("failed to serialize {}", path.display()))?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

pub fn read_manifest(path: &Path) -> Result<RunManifest> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read manifest {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("invalid manifest {}", path.display()))
}
