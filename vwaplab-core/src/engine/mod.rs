//! Backtesting engine: the per-symbol state machine and its fill model.
//!
//! The engine consumes bars with precomputed feature columns (see
//! `features`) in strictly increasing timestamp order and emits a trade
//! ledger. It works on raw prices; costs are applied afterwards by
//! [`crate::costs`].

pub mod error;
pub mod fill_model;
pub mod loop_runner;
pub mod state;

pub use error::EngineError;
pub use fill_model::place_limit_order;
pub use loop_runner::{run_backtest, run_backtest_frame, BacktestEngine};
pub use state::EngineState;
