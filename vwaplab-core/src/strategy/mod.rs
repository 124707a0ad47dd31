//! Strategy rules: trend gate, entry cross, exit brackets, and their parameters.
//!
//! Everything here is a pure function of the values passed in. The engine is
//! responsible for feeding only bar t-1 and bar t data.

pub mod entry;
pub mod exits;
pub mod params;
pub mod trend_filter;

pub use entry::{build_entry_signal, crosses_above, EntrySignal};
pub use exits::{
    check_exit, check_long_exit, compute_brackets, compute_long_brackets, BracketError, Brackets,
};
pub use params::{EntryRuleParams, ParamsError, StrategyParams};
pub use trend_filter::{trend_ok, TrendResult};
