//! Raw OHLCV -> engine bars.

use super::series::{
    ema_of_series, log_return, rolling_std, rolling_vwap, rsi, vol_ratio, wilder_atr,
};
use crate::domain::{Bar, RawBar};
use serde::{Deserialize, Serialize};

/// Feature windows. Defaults match the column names the engine expects
/// (`ema50_1h`, `ema200_1h`, 20-bar VWAP, 14-bar ATR). `rsi_period` and
/// `ret_vol_window` only feed the indicator columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    pub vwap_window: usize,
    pub atr_period: usize,
    pub trend_fast: usize,
    pub trend_slow: usize,
    pub vol_window: usize,
    pub rsi_period: usize,
    pub ret_vol_window: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            vwap_window: 20,
            atr_period: 14,
            trend_fast: 50,
            trend_slow: 200,
            vol_window: 20,
            rsi_period: 14,
            ret_vol_window: 20,
        }
    }
}

impl FeatureConfig {
    /// Bars before every engine column has a value.
    pub fn warmup_bars(&self) -> usize {
        [
            self.vwap_window.saturating_sub(1),
            self.atr_period.saturating_sub(1),
            self.trend_fast.saturating_sub(1),
            self.trend_slow.saturating_sub(1),
            self.vol_window.saturating_sub(1),
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }
}

/// Compute engine bars from raw bars, sorted by timestamp.
///
/// Warmup rows keep NaN features; the engine's trend gate rejects them, so
/// no order can be placed before the features are defined.
pub fn build_feature_bars(raw: &[RawBar], config: &FeatureConfig) -> Vec<Bar> {
    let mut sorted = raw.to_vec();
    sorted.sort_by_key(|b| b.ts);

    let closes: Vec<f64> = sorted.iter().map(|b| b.close).collect();
    let volumes: Vec<f64> = sorted.iter().map(|b| b.volume).collect();

    let vwap = rolling_vwap(&sorted, config.vwap_window);
    let atr = wilder_atr(&sorted, config.atr_period);
    let fast = ema_of_series(&closes, config.trend_fast);
    let slow = ema_of_series(&closes, config.trend_slow);
    let vr = vol_ratio(&volumes, config.vol_window);

    sorted
        .iter()
        .enumerate()
        .map(|(i, b)| Bar {
            ts: b.ts,
            high: b.high,
            low: b.low,
            close: b.close,
            vwap: vwap[i],
            atr: atr[i],
            trend_fast: fast[i],
            trend_slow: slow[i],
            vol_ratio: Some(vr[i]).filter(|v| v.is_finite()),
        })
        .collect()
}

/// Indicator columns the engine does not read, written next to the engine
/// columns by the `features` command.
#[derive(Debug, Clone)]
pub struct IndicatorColumns {
    pub ret_1: Vec<f64>,
    pub ret_vol: Vec<f64>,
    pub rsi: Vec<f64>,
    /// (close - vwap) / close
    pub vwap_dist: Vec<f64>,
}

impl IndicatorColumns {
    /// Column names and values, e.g. `rsi_14` for a 14-bar RSI.
    pub fn named(&self, config: &FeatureConfig) -> Vec<(String, &[f64])> {
        vec![
            ("ret_1".to_string(), self.ret_1.as_slice()),
            (format!("vol_{}", config.ret_vol_window), self.ret_vol.as_slice()),
            (format!("rsi_{}", config.rsi_period), self.rsi.as_slice()),
            (format!("vwap_dist_{}", config.vwap_window), self.vwap_dist.as_slice()),
        ]
    }
}

/// Compute indicator columns in the same row order as [`build_feature_bars`].
pub fn build_indicator_columns(raw: &[RawBar], config: &FeatureConfig) -> IndicatorColumns {
    let mut sorted = raw.to_vec();
    sorted.sort_by_key(|b| b.ts);

    let closes: Vec<f64> = sorted.iter().map(|b| b.close).collect();
    let ret_1 = log_return(&closes);
    let ret_vol = rolling_std(&ret_1, config.ret_vol_window);
    let vwap_dist = rolling_vwap(&sorted, config.vwap_window)
        .into_iter()
        .zip(&closes)
        .map(|(vwap, close)| (close - vwap) / close)
        .collect();

    IndicatorColumns {
        ret_1,
        ret_vol,
        rsi: rsi(&closes, config.rsi_period),
        vwap_dist,
    }
}
