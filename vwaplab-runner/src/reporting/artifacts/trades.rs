//! Trade tape export (CSV/JSON) and CSV read-back.

use anyhow::{bail, Context, Result};
use std::path::Path;

use vwaplab_core::costs::TradePnl;

/// Header of the trades CSV, in column order.
pub const TRADE_COLUMNS: [&str; 15] = [
    "symbol",
    "side",
    "entry_ts",
    "exit_ts",
    "entry_px_raw",
    "exit_px_raw",
    "entry_px_eff",
    "exit_px_eff",
    "gross_pnl",
    "slippage_cost",
    "fee_cost",
    "net_pnl",
    "reasons",
    // Derived from the reason trail for quick filtering
    "exit_reason",
    "hold_secs",
];

/// Columns that map one-to-one onto `TradePnl` fields.
const LEDGER_COLUMNS: usize = 13;

pub fn write_trades_csv(path: &Path, pnl: &[TradePnl]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create trades CSV {}", path.display()))?;
    wtr.write_record(TRADE_COLUMNS)?;

    for p in pnl {
        let exit_reason = p.reasons.rsplit('|').next().unwrap_or_default();
        wtr.write_record([
            p.symbol.clone(),
            p.side.to_string(),
            p.entry_ts.to_string(),
            p.exit_ts.to_string(),
            p.entry_px_raw.to_string(),
            p.exit_px_raw.to_string(),
            p.entry_px_eff.to_string(),
            p.exit_px_eff.to_string(),
            p.gross_pnl.to_string(),
            p.slippage_cost.to_string(),
            p.fee_cost.to_string(),
            p.net_pnl.to_string(),
            p.reasons.clone(),
            exit_reason.to_string(),
            (p.exit_ts - p.entry_ts).to_string(),
        ])?;
    }
    wtr.flush()
        .with_context(|| format!("failed to write trades CSV {}", path.display()))?;
    Ok(())
}

pub fn write_trades_json(path: &Path, pnl: &[TradePnl]) -> Result<()> {
    let json = serde_json::to_string_pretty(pnl).context("failed to serialize trades")?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write trades JSON {}", path.display()))?;
    Ok(())
}

/// Read a trades CSV written by [`write_trades_csv`].
///
/// Every ledger column (the first 13 of [`TRADE_COLUMNS`]) is required;
/// derived and unknown columns are ignored.
pub fn read_trades_csv(path: &Path) -> Result<Vec<TradePnl>> {
    let mut rdr = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open trades CSV {}", path.display()))?;
    let headers = rdr.headers()?.clone();
    let missing: Vec<&str> = TRADE_COLUMNS[..LEDGER_COLUMNS]
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();
    if !missing.is_empty() {
        bail!("{} missing columns: {}", path.display(), missing.join(", "));
    }

    rdr.deserialize::<TradePnl>()
        .enumerate()
        .map(|(i, row)| row.with_context(|| format!("{} row {}", path.display(), i + 1)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use vwaplab_core::domain::Side;

    fn pnl(entry_ts: i64, net: f64) -> TradePnl {
        TradePnl {
            symbol: "TEST".into(),
            side: Side::Long,
            entry_ts,
            exit_ts: entry_ts + 60,
            entry_px_raw: 10.0,
            exit_px_raw: 10.0 + net,
            entry_px_eff: 10.0,
            exit_px_eff: 10.0 + net,
            gross_pnl: net,
            slippage_cost: 0.0,
            fee_cost: 0.0,
            net_pnl: net,
            reasons: "ENTRY_CROSS|ORDER_PLACED|LIMIT_FILLED|TAKE_PROFIT".into(),
        }
    }

    #[test]
    fn csv_roundtrip_preserves_ledger() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trades.csv");
        let ledger = vec![pnl(0, 4.0), pnl(240, -2.0)];

        write_trades_csv(&path, &ledger).unwrap();
        let back = read_trades_csv(&path).unwrap();
        assert_eq!(back, ledger);

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("symbol,side,entry_ts"));
        assert!(text.contains(",TAKE_PROFIT,60"));
    }

    #[test]
    fn missing_ledger_columns_are_all_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trades.csv");
        std::fs::write(&path, "symbol,entry_ts,net_pnl\nTEST,0,1.0\n").unwrap();
        let msg = read_trades_csv(&path).unwrap_err().to_string();
        assert!(msg.contains("side"));
        assert!(msg.contains("fee_cost"));
        assert!(msg.contains("reasons"));
        assert!(!msg.contains("net_pnl"));
    }

    #[test]
    fn derived_and_unknown_columns_are_ignored() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trades.csv");
        let header = TRADE_COLUMNS[..LEDGER_COLUMNS].join(",");
        let row = "TEST,LONG,0,60,10,14,10,14,4,0,0,4,ENTRY_CROSS|TAKE_PROFIT";
        std::fs::write(&path, format!("{header},note\n{row},hand-edited\n")).unwrap();

        let back = read_trades_csv(&path).unwrap();
        assert_eq!(back.len(), 1);
        assert_eq!(back[0].net_pnl, 4.0);
        assert_eq!(back[0].reasons, "ENTRY_CROSS|TAKE_PROFIT");
    }
}
