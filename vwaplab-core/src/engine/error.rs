//! Engine error type.

use crate::data::FrameError;
use crate::strategy::{BracketError, ParamsError};
use thiserror::Error;

/// Errors that abort a backtest run.
///
/// `InvalidParams` and `Frame` are configuration errors raised before any bar
/// is processed. `DataIntegrity` is raised mid-run; the run produces no trades.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid parameters: {0}")]
    InvalidParams(#[from] ParamsError),

    #[error("invalid input frame: {0}")]
    Frame(#[from] FrameError),

    #[error("data integrity error at ts={ts}: {source}")]
    DataIntegrity {
        ts: i64,
        #[source]
        source: BracketError,
    },
}

impl EngineError {
    /// True for errors caused by the input data rather than the configuration.
    pub fn is_data_integrity(&self) -> bool {
        matches!(self, EngineError::DataIntegrity { .. })
    }
}
