//! Exit brackets: ATR stop plus R-multiple take profit.
//!
//! Brackets are fixed at entry and never trail. When a single bar's range
//! touches both levels the stop wins, since the intrabar path is unknown.

use crate::domain::{ReasonCode, Side};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stop and take-profit levels for one position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Brackets {
    pub stop_px: f64,
    pub tp_px: f64,
}

impl Brackets {
    /// Initial risk per unit: distance from entry to stop.
    pub fn risk(&self, entry_px: f64) -> f64 {
        (entry_px - self.stop_px).abs()
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BracketError {
    /// Zero, negative or NaN volatility makes the risk undefined.
    #[error("ATR must be > 0 to compute brackets, got {0}")]
    NonPositiveAtr(f64),
}

/// Long brackets: `stop = entry - atr_mult*atr`, `tp = entry + take_profit_r*R`.
pub fn compute_long_brackets(
    entry_px: f64,
    atr: f64,
    atr_mult: f64,
    take_profit_r: f64,
) -> Result<Brackets, BracketError> {
    compute_brackets(Side::Long, entry_px, atr, atr_mult, take_profit_r)
}

/// Side-aware brackets. Short mirrors long around the entry price.
pub fn compute_brackets(
    side: Side,
    entry_px: f64,
    atr: f64,
    atr_mult: f64,
    take_profit_r: f64,
) -> Result<Brackets, BracketError> {
    if !(atr > 0.0) || !atr.is_finite() {
        return Err(BracketError::NonPositiveAtr(atr));
    }

    let sign = side.sign();
    let stop_px = entry_px - sign * atr_mult * atr;
    let r = sign * (entry_px - stop_px);
    let tp_px = entry_px + sign * take_profit_r * r;

    Ok(Brackets { stop_px, tp_px })
}

/// Check a long position's brackets against one bar's range.
///
/// Returns the exact bracket level and its reason; slippage is applied later
/// by the cost model.
pub fn check_long_exit(low: f64, high: f64, brackets: &Brackets) -> Option<(f64, ReasonCode)> {
    check_exit(Side::Long, low, high, brackets)
}

/// Side-aware exit check. Stop takes precedence when both levels are touched.
pub fn check_exit(
    side: Side,
    low: f64,
    high: f64,
    brackets: &Brackets,
) -> Option<(f64, ReasonCode)> {
    let (stop_hit, tp_hit) = match side {
        Side::Long => (low <= brackets.stop_px, high >= brackets.tp_px),
        Side::Short => (high >= brackets.stop_px, low <= brackets.tp_px),
    };

    if stop_hit {
        return Some((brackets.stop_px, ReasonCode::Stop));
    }
    if tp_hit {
        return Some((brackets.tp_px, ReasonCode::TakeProfit));
    }
    None
}
