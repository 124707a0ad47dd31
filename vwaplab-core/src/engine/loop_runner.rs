//! Bar-by-bar event loop.
//!
//! Each bar is handled by exactly one state:
//! 1. IN_POSITION: tick hold count, bracket exit, then time stop
//! 2. ORDER_PENDING: fill check, then age/expire
//! 3. FLAT: trend gate, entry cross, place limit order
//!
//! A state transition made on bar t takes effect from bar t+1. The first bar
//! of a series only seeds the previous-bar context for the entry cross.

use crate::data::{bars_from_frame, ColumnMap};
use crate::domain::{Bar, PendingOrder, Position, ReasonCode, Side, Trade};
use crate::strategy::{
    build_entry_signal, check_exit, compute_brackets, trend_ok, EntryRuleParams, StrategyParams,
};
use polars::prelude::DataFrame;
use tracing::debug;

use super::error::EngineError;
use super::fill_model::place_limit_order;
use super::state::EngineState;

/// The slice of bar t-1 the entry rule is allowed to see.
#[derive(Debug, Clone, Copy)]
struct PrevBar {
    ts: i64,
    close: f64,
    vwap: f64,
}

impl PrevBar {
    fn of(bar: &Bar) -> Self {
        Self {
            ts: bar.ts,
            close: bar.close,
            vwap: bar.vwap,
        }
    }
}

/// Incremental single-symbol backtest engine.
///
/// Feeding bars one at a time, in chunks, or all at once through
/// [`run_backtest`] produces the same trades.
#[derive(Debug, Clone)]
pub struct BacktestEngine {
    symbol: String,
    params: StrategyParams,
    entry: EntryRuleParams,
    state: EngineState,
    prev: Option<PrevBar>,
    bars_processed: usize,
}

impl BacktestEngine {
    /// Validates parameters up front; an invalid config never sees a bar.
    pub fn new(
        symbol: impl Into<String>,
        params: StrategyParams,
        entry: EntryRuleParams,
    ) -> Result<Self, EngineError> {
        params.validate()?;
        entry.validate()?;
        Ok(Self {
            symbol: symbol.into(),
            params,
            entry,
            state: EngineState::Flat,
            prev: None,
            bars_processed: 0,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn params(&self) -> &StrategyParams {
        &self.params
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// Hand back the final state, e.g. to inspect an unresolved position.
    pub fn into_state(self) -> EngineState {
        self.state
    }

    /// Bars that went through the state machine (excludes the seeding bar).
    pub fn bars_processed(&self) -> usize {
        self.bars_processed
    }

    /// Process one bar. Returns the trade closed on this bar, if any.
    ///
    /// After an error the engine is left flat and should be discarded.
    pub fn on_bar(&mut self, bar: &Bar) -> Result<Option<Trade>, EngineError> {
        let Some(prev) = self.prev.replace(PrevBar::of(bar)) else {
            return Ok(None);
        };
        self.bars_processed += 1;

        let (next, trade) = match std::mem::take(&mut self.state) {
            EngineState::InPosition(pos) => self.step_in_position(pos, bar),
            EngineState::OrderPending(order) => (self.step_pending(order, bar)?, None),
            EngineState::Flat => (self.step_flat(prev, bar), None),
        };
        self.state = next;
        Ok(trade)
    }

    /// Feed a batch of bars, collecting the trades closed along the way.
    pub fn feed(&mut self, bars: &[Bar]) -> Result<Vec<Trade>, EngineError> {
        let mut trades = Vec::new();
        for bar in bars {
            if let Some(trade) = self.on_bar(bar)? {
                trades.push(trade);
            }
        }
        Ok(trades)
    }

    fn step_in_position(&self, mut pos: Position, bar: &Bar) -> (EngineState, Option<Trade>) {
        pos.tick_bar();

        if let Some((exit_px, reason)) = check_exit(pos.side, bar.low, bar.high, &pos.brackets) {
            let trade = pos.close(&self.symbol, bar.ts, exit_px, reason);
            debug!(symbol = %self.symbol, ts = bar.ts, exit_px, reason = %reason, "position closed");
            return (EngineState::Flat, Some(trade));
        }

        if let Some(limit) = self.params.time_stop_bars {
            if pos.hold_bars >= limit {
                let trade = pos.close(&self.symbol, bar.ts, bar.close, ReasonCode::TimeStop);
                debug!(symbol = %self.symbol, ts = bar.ts, exit_px = bar.close, "time stop");
                return (EngineState::Flat, Some(trade));
            }
        }

        (EngineState::InPosition(pos), None)
    }

    fn step_pending(&self, mut order: PendingOrder, bar: &Bar) -> Result<EngineState, EngineError> {
        if order.check_fill(bar.ts, bar.low, bar.high) {
            let entry_px = order.limit_px();
            // Volatility comes from the fill bar itself, never a later one.
            let brackets = compute_brackets(
                order.side(),
                entry_px,
                bar.atr,
                self.params.atr_stop_mult,
                self.params.take_profit_r,
            )
            .map_err(|source| EngineError::DataIntegrity { ts: bar.ts, source })?;

            debug!(
                symbol = %self.symbol,
                ts = bar.ts,
                entry_px,
                stop_px = brackets.stop_px,
                tp_px = brackets.tp_px,
                "limit filled"
            );
            let side = order.side();
            let position = Position::open(side, bar.ts, entry_px, order.into_reasons(), brackets);
            return Ok(EngineState::InPosition(position));
        }

        if order.step_age_and_expire() {
            debug!(symbol = %self.symbol, ts = bar.ts, age = order.age_bars(), "limit expired");
            return Ok(EngineState::Flat);
        }

        Ok(EngineState::OrderPending(order))
    }

    fn step_flat(&self, prev: PrevBar, bar: &Bar) -> EngineState {
        if !trend_ok(bar.trend_fast, bar.trend_slow).ok {
            return EngineState::Flat;
        }

        // A NaN ratio carries no information, same as a missing one.
        let vol_ratio = bar.vol_ratio.filter(|v| !v.is_nan());
        let Some(signal) = build_entry_signal(
            prev.ts,
            prev.close,
            prev.vwap,
            bar.close,
            bar.vwap,
            Side::Long,
            vol_ratio,
            &self.entry,
        ) else {
            return EngineState::Flat;
        };

        let mut order = place_limit_order(
            bar.ts,
            signal.side,
            signal.limit_px,
            self.params.limit_expiry_bars,
        );
        order.prepend_reasons(signal.reasons);
        debug!(symbol = %self.symbol, ts = bar.ts, limit_px = order.limit_px(), "limit placed");
        EngineState::OrderPending(order)
    }
}

/// Run a full backtest over an in-memory bar sequence.
///
/// Positions or orders still open after the last bar produce no trade.
pub fn run_backtest(
    bars: &[Bar],
    symbol: &str,
    params: &StrategyParams,
    entry: &EntryRuleParams,
) -> Result<Vec<Trade>, EngineError> {
    let mut engine = BacktestEngine::new(symbol, params.clone(), entry.clone())?;
    let trades = engine.feed(bars)?;
    debug!(
        symbol,
        bars = bars.len(),
        trades = trades.len(),
        final_state = %engine.state(),
        "backtest finished"
    );
    Ok(trades)
}

/// Run a backtest over a DataFrame, resolving columns through `columns`.
///
/// Missing required columns fail before any bar is processed.
pub fn run_backtest_frame(
    df: &DataFrame,
    columns: &ColumnMap,
    symbol: &str,
    params: &StrategyParams,
    entry: &EntryRuleParams,
) -> Result<Vec<Trade>, EngineError> {
    params.validate()?;
    entry.validate()?;
    let bars = bars_from_frame(df, columns)?;
    run_backtest(&bars, symbol, params, entry)
}
