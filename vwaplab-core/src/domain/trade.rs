//! Trade: a completed round trip with its full reason trail.

use super::reason::{ReasonCode, Side};
use serde::{Deserialize, Serialize};

/// A complete round-trip trade record: entry → exit.
///
/// Prices are raw bracket / limit levels. Slippage and fees are applied
/// afterwards by the cost model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub symbol: String,
    pub side: Side,

    pub entry_ts: i64,
    pub entry_px: f64,

    pub exit_ts: i64,
    pub exit_px: f64,

    /// Entry cross → optional volume confirm → order placed → fill → exit reason.
    pub reasons: Vec<ReasonCode>,
}

impl Trade {
    /// The reason that closed the trade (always the last code).
    pub fn exit_reason(&self) -> Option<ReasonCode> {
        self.reasons.last().copied().filter(ReasonCode::is_exit)
    }

    /// Price move in the trade's favour, before costs.
    pub fn gross_move(&self) -> f64 {
        self.side.sign() * (self.exit_px - self.entry_px)
    }

    /// Reason codes joined with `|`, for flat file output.
    pub fn reasons_joined(&self) -> String {
        self.reasons
            .iter()
            .map(ReasonCode::as_str)
            .collect::<Vec<_>>()
            .join("|")
    }
}
