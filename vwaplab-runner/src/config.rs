//! TOML run configuration.
//!
//! ```toml
//! symbol = "BTCUSDT"
//!
//! [data]
//! path = "bars.parquet"
//! compute_features = false
//!
//! [strategy]
//! limit_expiry_bars = 4
//! take_profit_r = 2.0
//!
//! [split]
//! a_ratio = 0.6
//! b_ratio = 0.8
//!
//! [[grid]]
//! strategy = { take_profit_r = 1.0 }
//!
//! [output]
//! dir = "out"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use vwaplab_core::data::ColumnMap;
use vwaplab_core::features::FeatureConfig;
use vwaplab_core::strategy::{EntryRuleParams, ParamsError, StrategyParams};

use crate::grid::{GridItem, ParamGrid};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl From<ParamsError> for ConfigError {
    fn from(e: ParamsError) -> Self {
        ConfigError::Invalid(e.to_string())
    }
}

/// Input data location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// `.csv` or `.parquet`.
    pub path: PathBuf,
    /// Treat the file as raw OHLCV and compute features before running.
    pub compute_features: bool,
}

/// A/B/C split settings. Explicit cutoffs win over ratios.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    pub a_ratio: f64,
    pub b_ratio: f64,
    pub a_end: Option<i64>,
    pub b_end: Option<i64>,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            a_ratio: 0.6,
            b_ratio: 0.8,
            a_end: None,
            b_end: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("out"),
        }
    }
}

/// Complete run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    pub symbol: String,
    pub data: DataConfig,
    pub columns: ColumnMap,
    pub features: FeatureConfig,
    pub strategy: StrategyParams,
    pub entry: EntryRuleParams,
    pub split: SplitConfig,
    /// Explicit grid items for walk-forward selection.
    pub grid: Vec<GridItem>,
    /// Axes expanded onto `strategy`/`entry` and appended after `grid`.
    pub sweep: Option<ParamGrid>,
    pub output: OutputConfig,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            symbol: "SYMBOL".to_string(),
            data: DataConfig::default(),
            columns: ColumnMap::default(),
            features: FeatureConfig::default(),
            strategy: StrategyParams::default(),
            entry: EntryRuleParams::default(),
            split: SplitConfig::default(),
            grid: Vec::new(),
            sweep: None,
            output: OutputConfig::default(),
        }
    }
}

impl BacktestConfig {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// The base parameter set as a grid item.
    pub fn base_item(&self) -> GridItem {
        GridItem {
            strategy: self.strategy.clone(),
            entry: self.entry.clone(),
        }
    }

    /// Grid for walk-forward: explicit items, then the expanded sweep.
    /// Falls back to the base item when neither is configured.
    pub fn grid_items(&self) -> Vec<GridItem> {
        let mut items = self.grid.clone();
        if let Some(sweep) = &self.sweep {
            items.extend(sweep.expand(&self.base_item()));
        }
        if items.is_empty() {
            items.push(self.base_item());
        }
        items
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbol.trim().is_empty() {
            return Err(ConfigError::Invalid("symbol must not be empty".into()));
        }
        self.strategy.validate()?;
        self.entry.validate()?;
        for (i, item) in self.grid.iter().enumerate() {
            item.strategy
                .validate()
                .and_then(|_| item.entry.validate())
                .map_err(|e| ConfigError::Invalid(format!("grid[{i}]: {e}")))?;
        }

        let s = &self.split;
        match (s.a_end, s.b_end) {
            (Some(a), Some(b)) if a >= b => {
                return Err(ConfigError::Invalid(format!(
                    "split.a_end ({a}) must be < split.b_end ({b})"
                )));
            }
            (Some(_), None) | (None, Some(_)) => {
                return Err(ConfigError::Invalid(
                    "split.a_end and split.b_end must be set together".into(),
                ));
            }
            _ => {}
        }
        if !(0.0 < s.a_ratio && s.a_ratio < s.b_ratio && s.b_ratio < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "split ratios must satisfy 0 < a < b < 1, got a={}, b={}",
                s.a_ratio, s.b_ratio
            )));
        }

        let f = &self.features;
        let windows = [
            f.vwap_window,
            f.atr_period,
            f.trend_fast,
            f.trend_slow,
            f.vol_window,
            f.rsi_period,
            f.ret_vol_window,
        ];
        if windows.contains(&0) {
            return Err(ConfigError::Invalid("feature windows must be > 0".into()));
        }
        Ok(())
    }
}
