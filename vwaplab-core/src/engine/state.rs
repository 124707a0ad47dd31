//! Engine state: exactly one of flat, order pending, or in position.

use crate::domain::{PendingOrder, Position};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The engine's per-symbol state machine.
///
/// The pending order and open position are owned by their variant, so the
/// engine can never observe an order while in position or vice versa.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum EngineState {
    #[default]
    Flat,
    OrderPending(PendingOrder),
    InPosition(Position),
}

impl EngineState {
    pub fn name(&self) -> &'static str {
        match self {
            EngineState::Flat => "FLAT",
            EngineState::OrderPending(_) => "ORDER_PENDING",
            EngineState::InPosition(_) => "IN_POSITION",
        }
    }

    pub fn is_flat(&self) -> bool {
        matches!(self, EngineState::Flat)
    }

    pub fn pending_order(&self) -> Option<&PendingOrder> {
        match self {
            EngineState::OrderPending(order) => Some(order),
            _ => None,
        }
    }

    pub fn position(&self) -> Option<&Position> {
        match self {
            EngineState::InPosition(pos) => Some(pos),
            _ => None,
        }
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
