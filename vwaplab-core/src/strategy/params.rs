//! Strategy and entry-rule parameters.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Invalid parameter values. Raised before any bar is processed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamsError {
    #[error("limit_expiry_bars must be > 0")]
    ZeroExpiry,
    #[error("{name} must be a finite value > 0, got {value}")]
    NonPositive { name: &'static str, value: f64 },
    #[error("time_stop_bars must be > 0 when set")]
    ZeroTimeStop,
    #[error("{name} must be a finite value >= 0, got {value}")]
    NegativeCost { name: &'static str, value: f64 },
    #[error("min_vol_ratio must be finite, got {0}")]
    NonFiniteVolRatio(f64),
}

/// Order, exit and cost parameters for one backtest run.
///
/// Fee and slippage fields are only read by the cost model; the engine
/// itself works on raw prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyParams {
    /// Bars a limit order may rest before it expires.
    pub limit_expiry_bars: u32,

    pub maker_fee_bps: f64,
    pub slippage_bps: f64,

    /// Stop distance in ATR multiples.
    pub atr_stop_mult: f64,
    /// Take-profit distance in R multiples (R = entry - stop).
    pub take_profit_r: f64,
    /// Exit at the close after this many bars held, if no bracket fired.
    pub time_stop_bars: Option<u32>,
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            limit_expiry_bars: 4,
            maker_fee_bps: 0.0,
            slippage_bps: 0.0,
            atr_stop_mult: 1.0,
            take_profit_r: 2.0,
            time_stop_bars: None,
        }
    }
}

impl StrategyParams {
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.limit_expiry_bars == 0 {
            return Err(ParamsError::ZeroExpiry);
        }
        for (name, value) in [
            ("atr_stop_mult", self.atr_stop_mult),
            ("take_profit_r", self.take_profit_r),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ParamsError::NonPositive { name, value });
            }
        }
        if self.time_stop_bars == Some(0) {
            return Err(ParamsError::ZeroTimeStop);
        }
        for (name, value) in [
            ("maker_fee_bps", self.maker_fee_bps),
            ("slippage_bps", self.slippage_bps),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ParamsError::NegativeCost { name, value });
            }
        }
        Ok(())
    }
}

/// Entry rule configuration.
///
/// `min_vol_ratio = None` disables volume confirmation entirely. When set,
/// a bar confirms only if its `vol_ratio` is present and `>=` the threshold.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryRuleParams {
    pub min_vol_ratio: Option<f64>,
}

impl EntryRuleParams {
    pub fn validate(&self) -> Result<(), ParamsError> {
        match self.min_vol_ratio {
            Some(v) if !v.is_finite() => Err(ParamsError::NonFiniteVolRatio(v)),
            _ => Ok(()),
        }
    }
}
