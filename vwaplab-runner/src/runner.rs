//! Single-run orchestration: engine, cost model, metrics.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use vwaplab_core::costs::{apply_costs_all, CostModel, TradePnl};
use vwaplab_core::data::ColumnMap;
use vwaplab_core::domain::{Bar, Trade};
use vwaplab_core::engine::{run_backtest, run_backtest_frame, EngineError};

use crate::grid::GridItem;
use crate::metrics::PerformanceMetrics;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("backtest engine failed: {0}")]
    Engine(#[from] EngineError),
}

/// Everything produced by one backtest: raw trades, their costed P&L and
/// the summary metrics over net P&L.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub symbol: String,
    pub params: GridItem,
    pub trades: Vec<Trade>,
    pub pnl: Vec<TradePnl>,
    pub metrics: PerformanceMetrics,
}

impl BacktestResult {
    fn from_trades(symbol: &str, item: &GridItem, trades: Vec<Trade>) -> Self {
        let costs = CostModel::from_params(&item.strategy);
        let pnl = apply_costs_all(&trades, &costs);
        let net: Vec<f64> = pnl.iter().map(|p| p.net_pnl).collect();
        let metrics = PerformanceMetrics::compute(&net);

        Self {
            symbol: symbol.to_string(),
            params: item.clone(),
            trades,
            pnl,
            metrics,
        }
    }

    pub fn net_pnls(&self) -> Vec<f64> {
        self.pnl.iter().map(|p| p.net_pnl).collect()
    }
}

/// Run one parameter set over engine-ready bars.
pub fn run_one(bars: &[Bar], symbol: &str, item: &GridItem) -> Result<BacktestResult, RunError> {
    let trades = run_backtest(bars, symbol, &item.strategy, &item.entry)?;
    let result = BacktestResult::from_trades(symbol, item, trades);
    info!(
        symbol,
        bars = bars.len(),
        trades = result.metrics.trades,
        total_net_pnl = result.metrics.total_net_pnl,
        "run complete"
    );
    Ok(result)
}

/// Run one parameter set straight from a DataFrame, resolving columns by name.
pub fn run_one_frame(
    df: &polars::prelude::DataFrame,
    columns: &ColumnMap,
    symbol: &str,
    item: &GridItem,
) -> Result<BacktestResult, RunError> {
    let trades = run_backtest_frame(df, columns, symbol, &item.strategy, &item.entry)?;
    let result = BacktestResult::from_trades(symbol, item, trades);
    info!(
        symbol,
        rows = df.height(),
        trades = result.metrics.trades,
        total_net_pnl = result.metrics.total_net_pnl,
        "run complete"
    );
    Ok(result)
}
