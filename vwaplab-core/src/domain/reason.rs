//! Trade direction and the reason codes carried through an order's lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of an order or position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    #[default]
    Long,
    Short,
}

impl Side {
    /// +1.0 for long, -1.0 for short.
    pub fn sign(&self) -> f64 {
        match self {
            Side::Long => 1.0,
            Side::Short => -1.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Long => "LONG",
            Side::Short => "SHORT",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why something happened to an order or position.
///
/// Codes are appended in lifecycle order: entry cross, optional volume
/// confirmation, order placed, fill, exit reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    TrendFail,
    EntryCross,
    VolConfirm,
    BreakoutConfirm,

    OrderPlaced,
    LimitFilled,
    LimitExpired,

    Stop,
    TakeProfit,
    TimeStop,
}

impl ReasonCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::TrendFail => "TREND_FAIL",
            ReasonCode::EntryCross => "ENTRY_CROSS",
            ReasonCode::VolConfirm => "VOL_CONFIRM",
            ReasonCode::BreakoutConfirm => "BREAKOUT_CONFIRM",
            ReasonCode::OrderPlaced => "ORDER_PLACED",
            ReasonCode::LimitFilled => "LIMIT_FILLED",
            ReasonCode::LimitExpired => "LIMIT_EXPIRED",
            ReasonCode::Stop => "STOP",
            ReasonCode::TakeProfit => "TAKE_PROFIT",
            ReasonCode::TimeStop => "TIME_STOP",
        }
    }

    /// True for codes that close a position.
    pub fn is_exit(&self) -> bool {
        matches!(
            self,
            ReasonCode::Stop | ReasonCode::TakeProfit | ReasonCode::TimeStop
        )
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
