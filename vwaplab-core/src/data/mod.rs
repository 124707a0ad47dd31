//! Bar data: DataFrame conversion and synthetic generators.

pub mod frame;
pub mod synthetic;

pub use frame::{
    append_f64_columns, bars_from_frame, bars_to_frame, f64_column, raw_bars_from_frame,
    raw_bars_to_frame, ts_column, ColumnMap, FrameError, RAW_COLUMNS,
};
pub use synthetic::{cycle_bars, random_walk, BAR_SECONDS};
