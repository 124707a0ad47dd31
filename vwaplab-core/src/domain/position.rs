//! Open position state.

use super::reason::{ReasonCode, Side};
use super::trade::Trade;
use crate::strategy::exits::Brackets;
use serde::{Deserialize, Serialize};

/// One open trade.
///
/// Created exactly at order fill, ticked once per bar, consumed into a
/// [`Trade`] when an exit fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub side: Side,
    pub entry_ts: i64,
    pub entry_px: f64,
    pub hold_bars: u32,
    /// Reason log inherited from the originating order.
    pub reasons: Vec<ReasonCode>,
    pub brackets: Brackets,
}

impl Position {
    pub fn open(
        side: Side,
        entry_ts: i64,
        entry_px: f64,
        reasons: Vec<ReasonCode>,
        brackets: Brackets,
    ) -> Self {
        Self {
            side,
            entry_ts,
            entry_px,
            hold_bars: 0,
            reasons,
            brackets,
        }
    }

    /// Increment bars held. Called once per bar while open.
    pub fn tick_bar(&mut self) {
        self.hold_bars += 1;
    }

    /// Close the position and produce the ledger record.
    pub fn close(self, symbol: &str, exit_ts: i64, exit_px: f64, reason: ReasonCode) -> Trade {
        let mut reasons = self.reasons;
        reasons.push(reason);
        Trade {
            symbol: symbol.to_string(),
            side: self.side,
            entry_ts: self.entry_ts,
            entry_px: self.entry_px,
            exit_ts,
            exit_px,
            reasons,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_appends_exit_reason_after_inherited_reasons() {
        let pos = Position::open(
            Side::Long,
            120,
            10.0,
            vec![ReasonCode::EntryCross, ReasonCode::OrderPlaced, ReasonCode::LimitFilled],
            Brackets {
                stop_px: 8.0,
                tp_px: 14.0,
            },
        );
        let trade = pos.close("X", 180, 14.0, ReasonCode::TakeProfit);
        assert_eq!(trade.symbol, "X");
        assert_eq!(trade.entry_ts, 120);
        assert_eq!(
            trade.reasons,
            vec![
                ReasonCode::EntryCross,
                ReasonCode::OrderPlaced,
                ReasonCode::LimitFilled,
                ReasonCode::TakeProfit
            ]
        );
    }

    #[test]
    fn tick_bar_counts_up_from_zero() {
        let mut pos = Position::open(
            Side::Long,
            0,
            1.0,
            Vec::new(),
            Brackets {
                stop_px: 0.5,
                tp_px: 2.0,
            },
        );
        assert_eq!(pos.hold_bars, 0);
        pos.tick_bar();
        pos.tick_bar();
        assert_eq!(pos.hold_bars, 2);
    }
}
