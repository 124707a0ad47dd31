//! Grid search table export (CSV).

use anyhow::{Context, Result};
use std::path::Path;

use crate::grid::GridRun;

pub const GRID_COLUMNS: [&str; 13] = [
    "index",
    "fingerprint",
    "limit_expiry_bars",
    "atr_stop_mult",
    "take_profit_r",
    "time_stop_bars",
    "min_vol_ratio",
    "trades",
    "win_rate",
    "expectancy",
    "profit_factor",
    "max_drawdown",
    "total_net_pnl",
];

fn opt<T: ToString>(v: Option<T>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

/// One row per grid item, in grid order. Unbounded profit factor is `inf`.
pub fn write_grid_runs_csv(path: &Path, runs: &[GridRun]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create grid CSV {}", path.display()))?;
    wtr.write_record(GRID_COLUMNS)?;

    for run in runs {
        let s = &run.params.strategy;
        let m = &run.metrics;
        wtr.write_record([
            run.index.to_string(),
            run.fingerprint.clone(),
            s.limit_expiry_bars.to_string(),
            s.atr_stop_mult.to_string(),
            s.take_profit_r.to_string(),
            opt(s.time_stop_bars),
            opt(run.params.entry.min_vol_ratio),
            m.trades.to_string(),
            m.win_rate.to_string(),
            m.expectancy.to_string(),
            m.profit_factor
                .map_or_else(|| "inf".to_string(), |pf| pf.to_string()),
            m.max_drawdown.to_string(),
            m.total_net_pnl.to_string(),
        ])?;
    }
    wtr.flush()
        .with_context(|| format!("failed to write grid CSV {}", path.display()))?;
    Ok(())
}
