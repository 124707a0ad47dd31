//! Feature computation: raw OHLCV to the engine's bar columns.

pub mod build;
pub mod series;

pub use build::{build_feature_bars, build_indicator_columns, FeatureConfig, IndicatorColumns};
pub use series::{
    ema_of_series, ewm, log_return, rolling_std, rolling_sum, rolling_vwap, rsi, sma, true_range,
    vol_ratio, wilder_atr, wilder_smooth,
};
