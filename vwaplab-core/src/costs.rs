//! Cost model: slippage and maker fees applied to a raw trade ledger.
//!
//! Post-processing only. The engine never sees effective prices. Assumes a
//! quantity of one unit per trade.

use crate::domain::{Side, Trade};
use crate::strategy::StrategyParams;
use serde::{Deserialize, Serialize};

/// Slippage and fee rates in basis points.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CostModel {
    /// Adverse slippage applied on both entry and exit.
    pub slippage_bps: f64,
    /// Maker fee charged on notional, per side.
    pub maker_fee_bps: f64,
}

impl CostModel {
    pub fn new(slippage_bps: f64, maker_fee_bps: f64) -> Self {
        Self {
            slippage_bps,
            maker_fee_bps,
        }
    }

    pub fn from_params(params: &StrategyParams) -> Self {
        Self::new(params.slippage_bps, params.maker_fee_bps)
    }

    pub fn frictionless() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Apply adverse slippage to an entry price: buyers pay more, sellers receive less.
    pub fn slipped_entry(&self, raw_price: f64, side: Side) -> f64 {
        raw_price * (1.0 + side.sign() * self.slippage_bps / 10_000.0)
    }

    /// Apply adverse slippage to an exit price.
    pub fn slipped_exit(&self, raw_price: f64, side: Side) -> f64 {
        raw_price * (1.0 - side.sign() * self.slippage_bps / 10_000.0)
    }

    /// Fee on one side's notional.
    pub fn fee(&self, price: f64) -> f64 {
        price.abs() * self.maker_fee_bps / 10_000.0
    }
}

/// Per-trade P&L after costs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradePnl {
    pub symbol: String,
    pub side: Side,
    pub entry_ts: i64,
    pub exit_ts: i64,

    pub entry_px_raw: f64,
    pub exit_px_raw: f64,
    pub entry_px_eff: f64,
    pub exit_px_eff: f64,

    pub gross_pnl: f64,
    /// Gross move minus the move between slipped prices (before fees).
    pub slippage_cost: f64,
    pub fee_cost: f64,
    pub net_pnl: f64,

    /// Reason codes joined with `|`.
    pub reasons: String,
}

/// Apply slippage and fees to one raw trade.
pub fn apply_costs(trade: &Trade, costs: &CostModel) -> TradePnl {
    let side = trade.side;
    let entry_eff = costs.slipped_entry(trade.entry_px, side);
    let exit_eff = costs.slipped_exit(trade.exit_px, side);

    let gross = trade.gross_move();
    let net_move = side.sign() * (exit_eff - entry_eff);
    let fee_cost = costs.fee(entry_eff) + costs.fee(exit_eff);

    TradePnl {
        symbol: trade.symbol.clone(),
        side,
        entry_ts: trade.entry_ts,
        exit_ts: trade.exit_ts,
        entry_px_raw: trade.entry_px,
        exit_px_raw: trade.exit_px,
        entry_px_eff: entry_eff,
        exit_px_eff: exit_eff,
        gross_pnl: gross,
        slippage_cost: gross - net_move,
        fee_cost,
        net_pnl: net_move - fee_cost,
        reasons: trade.reasons_joined(),
    }
}

/// Apply costs to a whole ledger, preserving order.
pub fn apply_costs_all(trades: &[Trade], costs: &CostModel) -> Vec<TradePnl> {
    trades.iter().map(|t| apply_costs(t, costs)).collect()
}
