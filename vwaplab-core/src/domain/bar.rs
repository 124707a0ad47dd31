//! Bar: the fundamental market data unit.

use serde::{Deserialize, Serialize};

/// One bar of engine input: prices plus precomputed feature columns.
///
/// Feature columns are computed upstream (see `features`) and must already be
/// causal: the value at bar t may only depend on bars <= t.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub ts: i64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Reference level for the entry cross and the limit price (VWAP-like).
    pub vwap: f64,
    /// Volatility used to size the exit brackets (ATR-like).
    pub atr: f64,
    pub trend_fast: f64,
    pub trend_slow: f64,
    /// Current volume relative to its recent average.
    ///
    /// `None` means "no data for this bar". When a volume confirmation
    /// threshold is configured, absence counts as non-confirmation.
    #[serde(default)]
    pub vol_ratio: Option<f64>,
}

/// Raw OHLCV bar, the input to feature computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    pub ts: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl RawBar {
    /// Typical price: (high + low + close) / 3.
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// Basic OHLC sanity check: high >= low and both bracket open/close.
    pub fn is_sane(&self) -> bool {
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.volume >= 0.0
    }
}
