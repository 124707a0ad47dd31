//! Grid search on the train partition and A/B/C walk-forward evaluation.
//!
//! Every grid item is run as an independent engine instance, so evaluation
//! parallelises across items with rayon. Output order always matches grid
//! order, and selection scans that order, so serial and parallel runs pick
//! the same winner.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use vwaplab_core::costs::TradePnl;
use vwaplab_core::domain::Bar;
use vwaplab_core::strategy::{EntryRuleParams, StrategyParams};

use crate::metrics::PerformanceMetrics;
use crate::runner::{run_one, RunError};
use crate::splits::{AbcSplit, SplitCutoffs};

/// One candidate parameter set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridItem {
    pub strategy: StrategyParams,
    pub entry: EntryRuleParams,
}

impl GridItem {
    /// blake3 hex digest of the item's canonical JSON. Identical parameter
    /// sets always share a fingerprint.
    pub fn fingerprint(&self) -> String {
        // Plain structs of numbers and options: serialization cannot fail.
        let json = serde_json::to_string(self).unwrap_or_default();
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}

/// Cartesian product of parameter axes, expanded onto a base item.
///
/// Empty axes keep the base value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamGrid {
    pub limit_expiry_bars: Vec<u32>,
    pub atr_stop_mult: Vec<f64>,
    pub take_profit_r: Vec<f64>,
    pub time_stop_bars: Vec<Option<u32>>,
    pub min_vol_ratio: Vec<Option<f64>>,
}

impl ParamGrid {
    /// Number of items `expand` yields.
    pub fn size(&self) -> usize {
        [
            self.limit_expiry_bars.len(),
            self.atr_stop_mult.len(),
            self.take_profit_r.len(),
            self.time_stop_bars.len(),
            self.min_vol_ratio.len(),
        ]
        .iter()
        .map(|&n| n.max(1))
        .product()
    }

    pub fn expand(&self, base: &GridItem) -> Vec<GridItem> {
        fn axis<T: Clone>(values: &[T], base: T) -> Vec<T> {
            if values.is_empty() {
                vec![base]
            } else {
                values.to_vec()
            }
        }

        let mut items = Vec::with_capacity(self.size());
        for expiry in axis(&self.limit_expiry_bars, base.strategy.limit_expiry_bars) {
            for mult in axis(&self.atr_stop_mult, base.strategy.atr_stop_mult) {
                for r in axis(&self.take_profit_r, base.strategy.take_profit_r) {
                    for time_stop in axis(&self.time_stop_bars, base.strategy.time_stop_bars) {
                        for vol in axis(&self.min_vol_ratio, base.entry.min_vol_ratio) {
                            items.push(GridItem {
                                strategy: StrategyParams {
                                    limit_expiry_bars: expiry,
                                    atr_stop_mult: mult,
                                    take_profit_r: r,
                                    time_stop_bars: time_stop,
                                    ..base.strategy.clone()
                                },
                                entry: EntryRuleParams { min_vol_ratio: vol },
                            });
                        }
                    }
                }
            }
        }
        items
    }
}

#[derive(Debug, Error)]
pub enum GridError {
    #[error("parameter grid is empty")]
    EmptyGrid,
    #[error("grid item {index} failed: {source}")]
    Run {
        index: usize,
        #[source]
        source: RunError,
    },
}

/// Metrics of one grid item on the train partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridRun {
    pub index: usize,
    pub fingerprint: String,
    pub params: GridItem,
    pub metrics: PerformanceMetrics,
}

/// Outcome of a train-partition grid search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridResult {
    pub best_index: usize,
    pub best_params: GridItem,
    pub best_metrics: PerformanceMetrics,
    pub runs: Vec<GridRun>,
}

/// Everything the A/B/C evaluation produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkForwardReport {
    pub symbol: String,
    pub cutoffs: SplitCutoffs,
    pub split_sizes: [usize; 3],
    pub best_params: GridItem,
    pub train_metrics: PerformanceMetrics,
    pub validate_metrics: PerformanceMetrics,
    pub test_metrics: PerformanceMetrics,
    pub train_grid_runs: Vec<GridRun>,
    /// Costed ledgers of the selected parameters on B and C.
    #[serde(skip)]
    pub validate_pnl: Vec<TradePnl>,
    #[serde(skip)]
    pub test_pnl: Vec<TradePnl>,
}

/// Grid evaluator with a serial/parallel switch.
#[derive(Debug, Clone, Copy)]
pub struct GridSearch {
    parallel: bool,
}

impl Default for GridSearch {
    fn default() -> Self {
        Self { parallel: true }
    }
}

impl GridSearch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables parallel execution.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Evaluate every item on `bars` and select the best by total net P&L.
    ///
    /// Selection is strictly greater-than, so the earliest item wins ties.
    /// Any engine error aborts the whole search.
    pub fn run(&self, bars: &[Bar], symbol: &str, grid: &[GridItem]) -> Result<GridResult, GridError> {
        if grid.is_empty() {
            return Err(GridError::EmptyGrid);
        }

        let eval = |(index, item): (usize, &GridItem)| -> Result<GridRun, GridError> {
            let result =
                run_one(bars, symbol, item).map_err(|source| GridError::Run { index, source })?;
            Ok(GridRun {
                index,
                fingerprint: item.fingerprint(),
                params: item.clone(),
                metrics: result.metrics,
            })
        };

        let runs: Vec<GridRun> = if self.parallel {
            grid.par_iter()
                .enumerate()
                .map(eval)
                .collect::<Result<Vec<_>, _>>()?
        } else {
            grid.iter()
                .enumerate()
                .map(eval)
                .collect::<Result<Vec<_>, _>>()?
        };

        let mut best_index = 0;
        let mut best_score = f64::NEG_INFINITY;
        for run in &runs {
            if run.metrics.total_net_pnl > best_score {
                best_score = run.metrics.total_net_pnl;
                best_index = run.index;
            }
        }
        let best = &runs[best_index];

        info!(
            symbol,
            items = grid.len(),
            best_index,
            best_fingerprint = %best.fingerprint,
            best_total_net_pnl = best.metrics.total_net_pnl,
            "grid search complete"
        );

        Ok(GridResult {
            best_index,
            best_params: best.params.clone(),
            best_metrics: best.metrics.clone(),
            runs,
        })
    }

    /// Select on A (train), then evaluate the winner once on B and once on C.
    pub fn walkforward(
        &self,
        split: &AbcSplit,
        symbol: &str,
        grid: &[GridItem],
    ) -> Result<WalkForwardReport, GridError> {
        let train = self.run(&split.train, symbol, grid)?;
        let best_index = train.best_index;
        let wrap = |source| GridError::Run {
            index: best_index,
            source,
        };

        let validate = run_one(&split.validate, symbol, &train.best_params).map_err(wrap)?;
        let test = run_one(&split.test, symbol, &train.best_params).map_err(wrap)?;

        info!(
            symbol,
            validate_net_pnl = validate.metrics.total_net_pnl,
            test_net_pnl = test.metrics.total_net_pnl,
            "walk-forward complete"
        );

        let (a, b, c) = split.sizes();
        Ok(WalkForwardReport {
            symbol: symbol.to_string(),
            cutoffs: split.cutoffs,
            split_sizes: [a, b, c],
            best_params: train.best_params,
            train_metrics: train.best_metrics,
            validate_metrics: validate.metrics,
            test_metrics: test.metrics,
            train_grid_runs: train.runs,
            validate_pnl: validate.pnl,
            test_pnl: test.pnl,
        })
    }
}

/// Parallel grid search on the train partition.
pub fn run_grid_on_train(
    train: &[Bar],
    symbol: &str,
    grid: &[GridItem],
) -> Result<GridResult, GridError> {
    GridSearch::new().run(train, symbol, grid)
}

/// A/B/C walk-forward with a parallel train search.
pub fn run_walkforward_abc(
    split: &AbcSplit,
    symbol: &str,
    grid: &[GridItem],
) -> Result<WalkForwardReport, GridError> {
    GridSearch::new().walkforward(split, symbol, grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_stable_and_param_sensitive() {
        let a = GridItem::default();
        let mut b = GridItem::default();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);

        b.strategy.take_profit_r = 1.5;
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn empty_grid_is_an_error() {
        let err = run_grid_on_train(&[], "TEST", &[]).unwrap_err();
        assert!(matches!(err, GridError::EmptyGrid));
    }

    #[test]
    fn param_grid_expands_cartesian_product() {
        let grid = ParamGrid {
            take_profit_r: vec![1.0, 2.0, 3.0],
            atr_stop_mult: vec![1.0, 1.5],
            min_vol_ratio: vec![None, Some(1.2)],
            ..Default::default()
        };
        let base = GridItem::default();
        let items = grid.expand(&base);
        assert_eq!(grid.size(), 12);
        assert_eq!(items.len(), 12);
        assert!(items
            .iter()
            .all(|i| i.strategy.limit_expiry_bars == base.strategy.limit_expiry_bars));
        assert_eq!(items[0].strategy.atr_stop_mult, 1.0);
        assert_eq!(items[0].strategy.take_profit_r, 1.0);
        assert_eq!(items[0].entry.min_vol_ratio, None);
        assert_eq!(items[1].entry.min_vol_ratio, Some(1.2));
    }

    #[test]
    fn empty_param_grid_yields_base() {
        let base = GridItem::default();
        assert_eq!(ParamGrid::default().expand(&base), vec![base]);
    }
}
