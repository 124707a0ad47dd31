//! VWAPLab Core: domain types, strategy rules, fill model, backtest engine, costs, features.
//!
//! This crate contains the single-asset, single-position backtest engine:
//! - Domain types (bars, pending orders, positions, trades, reason codes)
//! - Strategy rules (trend gate, entry cross, exit brackets)
//! - Limit order fill model
//! - Bar-by-bar state machine (flat / order pending / in position)
//! - Cost model applied to the raw trade ledger
//! - Causal feature computation and DataFrame conversion

pub mod costs;
pub mod data;
pub mod domain;
pub mod engine;
pub mod features;
pub mod strategy;

pub use costs::{apply_costs, CostModel, TradePnl};
pub use domain::{Bar, RawBar, ReasonCode, Side, Trade};
pub use engine::{run_backtest, run_backtest_frame, BacktestEngine, EngineError, EngineState};
pub use strategy::{EntryRuleParams, StrategyParams};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: engine and ledger types are Send + Sync.
    ///
    /// Grid evaluation moves engines and results across rayon worker threads.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::Bar>();
        require_sync::<domain::Bar>();
        require_send::<domain::PendingOrder>();
        require_sync::<domain::PendingOrder>();
        require_send::<domain::Position>();
        require_sync::<domain::Position>();
        require_send::<domain::Trade>();
        require_sync::<domain::Trade>();

        require_send::<engine::BacktestEngine>();
        require_sync::<engine::BacktestEngine>();
        require_send::<engine::EngineError>();
        require_sync::<engine::EngineError>();

        require_send::<strategy::StrategyParams>();
        require_sync::<strategy::StrategyParams>();
        require_send::<costs::TradePnl>();
        require_sync::<costs::TradePnl>();
    }
}
