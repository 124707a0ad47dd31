//! Performance metrics: pure functions over a per-trade net P&L series.
//!
//! Every metric is a pure function: net P&L list in, scalar out. Equity here
//! is cumulative net P&L starting from zero (one unit per trade).

use serde::{Deserialize, Serialize};

/// Aggregate performance metrics for a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub trades: usize,
    pub win_rate: f64,
    /// Mean net P&L per trade.
    pub expectancy: f64,
    /// Gross wins / |gross losses|. `None` when there are wins but no losses
    /// (infinite), serialized as `null`.
    pub profit_factor: Option<f64>,
    /// Most negative drawdown of cumulative net P&L (always <= 0).
    pub max_drawdown: f64,
    pub total_net_pnl: f64,
}

impl PerformanceMetrics {
    /// Compute all metrics from per-trade net P&L, in ledger order.
    pub fn compute(net_pnls: &[f64]) -> Self {
        if net_pnls.is_empty() {
            return Self::empty();
        }
        Self {
            trades: net_pnls.len(),
            win_rate: win_rate(net_pnls),
            expectancy: expectancy(net_pnls),
            profit_factor: profit_factor(net_pnls),
            max_drawdown: max_drawdown(net_pnls),
            total_net_pnl: net_pnls.iter().sum(),
        }
    }

    /// Metrics of a run with no trades: everything zero.
    pub fn empty() -> Self {
        Self {
            trades: 0,
            win_rate: 0.0,
            expectancy: 0.0,
            profit_factor: Some(0.0),
            max_drawdown: 0.0,
            total_net_pnl: 0.0,
        }
    }

    /// Profit factor for display: `inf` when unbounded.
    pub fn profit_factor_display(&self) -> String {
        match self.profit_factor {
            Some(pf) => format!("{pf:.4}"),
            None => "inf".to_string(),
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Fraction of trades with strictly positive net P&L.
pub fn win_rate(net_pnls: &[f64]) -> f64 {
    if net_pnls.is_empty() {
        return 0.0;
    }
    let winners = net_pnls.iter().filter(|&&p| p > 0.0).count();
    winners as f64 / net_pnls.len() as f64
}

/// Mean net P&L per trade.
pub fn expectancy(net_pnls: &[f64]) -> f64 {
    if net_pnls.is_empty() {
        return 0.0;
    }
    net_pnls.iter().sum::<f64>() / net_pnls.len() as f64
}

/// Gross profit / gross loss.
///
/// `Some(0.0)` with no trades; `None` (infinite) when nothing lost.
pub fn profit_factor(net_pnls: &[f64]) -> Option<f64> {
    if net_pnls.is_empty() {
        return Some(0.0);
    }
    let gross_profit: f64 = net_pnls.iter().filter(|&&p| p > 0.0).sum();
    let gross_loss: f64 = net_pnls.iter().filter(|&&p| p < 0.0).map(|p| p.abs()).sum();

    if gross_loss == 0.0 {
        return None;
    }
    Some(gross_profit / gross_loss)
}

/// Cumulative net P&L after each trade.
pub fn equity_from_pnls(net_pnls: &[f64]) -> Vec<f64> {
    net_pnls
        .iter()
        .scan(0.0, |acc, &p| {
            *acc += p;
            Some(*acc)
        })
        .collect()
}

/// Drawdown of cumulative net P&L from its running maximum, per trade.
///
/// The running maximum starts at the first equity point, not at zero.
pub fn drawdown_series(equity: &[f64]) -> Vec<f64> {
    let mut peak = f64::NEG_INFINITY;
    equity
        .iter()
        .map(|&eq| {
            peak = peak.max(eq);
            eq - peak
        })
        .collect()
}

/// Maximum drawdown in P&L units (<= 0). Zero for fewer than one trade.
pub fn max_drawdown(net_pnls: &[f64]) -> f64 {
    drawdown_series(&equity_from_pnls(net_pnls))
        .into_iter()
        .fold(0.0, f64::min)
}
