//! Equity curve over the trade ledger (CSV/Parquet).

use anyhow::{Context, Result};
use polars::prelude::{Column, DataFrame, ParquetWriter};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

use vwaplab_core::costs::TradePnl;

use crate::metrics::{drawdown_series, equity_from_pnls};

/// One point of the per-trade equity curve. Equity is cumulative net P&L.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityRow {
    /// 1-based position in the ledger.
    pub trade_idx: usize,
    pub entry_ts: i64,
    pub exit_ts: i64,
    pub net_pnl: f64,
    pub equity: f64,
    /// `equity - running max(equity)`, always <= 0.
    pub drawdown: f64,
}

pub fn build_equity_curve(pnl: &[TradePnl]) -> Vec<EquityRow> {
    let net: Vec<f64> = pnl.iter().map(|p| p.net_pnl).collect();
    let equity = equity_from_pnls(&net);
    let drawdown = drawdown_series(&equity);

    pnl.iter()
        .zip(equity.iter().zip(drawdown.iter()))
        .enumerate()
        .map(|(i, (p, (&eq, &dd)))| EquityRow {
            trade_idx: i + 1,
            entry_ts: p.entry_ts,
            exit_ts: p.exit_ts,
            net_pnl: p.net_pnl,
            equity: eq,
            drawdown: dd,
        })
        .collect()
}

pub fn write_equity_csv(path: &Path, rows: &[EquityRow]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create equity CSV {}", path.display()))?;
    if rows.is_empty() {
        wtr.write_record(["trade_idx", "entry_ts", "exit_ts", "net_pnl", "equity", "drawdown"])?;
    }
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()
        .with_context(|| format!("failed to write equity CSV {}", path.display()))?;
    Ok(())
}

pub fn write_equity_parquet(path: &Path, rows: &[EquityRow]) -> Result<()> {
    let idx: Vec<u64> = rows.iter().map(|r| r.trade_idx as u64).collect();
    let col_i64 = |f: fn(&EquityRow) -> i64| rows.iter().map(f).collect::<Vec<i64>>();
    let col_f64 = |f: fn(&EquityRow) -> f64| rows.iter().map(f).collect::<Vec<f64>>();

    let mut df = DataFrame::new(vec![
        Column::new("trade_idx".into(), idx),
        Column::new("entry_ts".into(), col_i64(|r| r.entry_ts)),
        Column::new("exit_ts".into(), col_i64(|r| r.exit_ts)),
        Column::new("net_pnl".into(), col_f64(|r| r.net_pnl)),
        Column::new("equity".into(), col_f64(|r| r.equity)),
        Column::new("drawdown".into(), col_f64(|r| r.drawdown)),
    ])
    .context("failed to build equity dataframe")?;

    let mut file = File::create(path)
        .with_context(|| format!("failed to create equity parquet {}", path.display()))?;
    ParquetWriter::new(&mut file)
        .finish(&mut df)
        .context("failed to write equity parquet")?;
    Ok(())
}
