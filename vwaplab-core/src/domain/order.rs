//! The single resting limit order the engine can hold.
//!
//! Lifecycle operations (placement, fill check, aging) live in
//! `engine::fill_model`; this module only defines the data.

use super::reason::{ReasonCode, Side};
use serde::{Deserialize, Serialize};

/// Order lifecycle state. Filled and Expired are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Filled { ts: i64, px: f64 },
    Expired,
}

/// A resting limit order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingOrder {
    pub(crate) side: Side,
    pub(crate) limit_px: f64,
    pub(crate) placed_ts: i64,
    pub(crate) expiry_bars: u32,
    pub(crate) age_bars: u32,
    pub(crate) status: OrderStatus,
    pub(crate) reasons: Vec<ReasonCode>,
}

impl PendingOrder {
    pub fn side(&self) -> Side {
        self.side
    }

    pub fn limit_px(&self) -> f64 {
        self.limit_px
    }

    pub fn placed_ts(&self) -> i64 {
        self.placed_ts
    }

    pub fn expiry_bars(&self) -> u32 {
        self.expiry_bars
    }

    pub fn age_bars(&self) -> u32 {
        self.age_bars
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn reasons(&self) -> &[ReasonCode] {
        &self.reasons
    }

    pub fn is_filled(&self) -> bool {
        matches!(self.status, OrderStatus::Filled { .. })
    }

    pub fn is_expired(&self) -> bool {
        matches!(self.status, OrderStatus::Expired)
    }

    /// Filled or expired; no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        !matches!(self.status, OrderStatus::Pending)
    }

    pub fn fill_ts(&self) -> Option<i64> {
        match self.status {
            OrderStatus::Filled { ts, .. } => Some(ts),
            _ => None,
        }
    }

    pub fn fill_px(&self) -> Option<f64> {
        match self.status {
            OrderStatus::Filled { px, .. } => Some(px),
            _ => None,
        }
    }

    /// Prepend reason codes that led to this order (entry signal reasons).
    pub fn prepend_reasons(&mut self, mut earlier: Vec<ReasonCode>) {
        earlier.append(&mut self.reasons);
        self.reasons = earlier;
    }

    /// Consume the order, handing its reason log to the next owner.
    pub fn into_reasons(self) -> Vec<ReasonCode> {
        self.reasons
    }
}
