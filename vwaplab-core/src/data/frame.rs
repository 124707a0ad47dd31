//! DataFrame <-> bar conversion.
//!
//! Column names are resolved through a [`ColumnMap`] so feature frames built
//! elsewhere (e.g. with `ema50_1h` / `ema200_1h` trend columns) can be fed to
//! the engine without renaming.

use crate::domain::{Bar, RawBar};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Column names of a raw OHLCV frame.
pub const RAW_COLUMNS: [&str; 6] = ["ts", "open", "high", "low", "close", "volume"];

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("frame missing columns: {0:?}")]
    MissingColumns(Vec<String>),

    #[error("column '{column}': {source}")]
    Column {
        column: String,
        #[source]
        source: PolarsError,
    },

    #[error("null timestamp at row {row}")]
    NullTimestamp { row: usize },
}

/// Maps engine fields to frame column names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    pub ts: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub vwap: String,
    pub atr: String,
    pub trend_fast: String,
    pub trend_slow: String,
    /// Optional: absent from the frame means no volume data.
    pub vol_ratio: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            ts: "ts".into(),
            high: "high".into(),
            low: "low".into(),
            close: "close".into(),
            vwap: "vwap".into(),
            atr: "atr".into(),
            trend_fast: "ema50_1h".into(),
            trend_slow: "ema200_1h".into(),
            vol_ratio: "vol_ratio".into(),
        }
    }
}

impl ColumnMap {
    /// Columns the engine cannot run without.
    pub fn required(&self) -> [&str; 8] {
        [
            self.ts.as_str(),
            self.high.as_str(),
            self.low.as_str(),
            self.close.as_str(),
            self.vwap.as_str(),
            self.atr.as_str(),
            self.trend_fast.as_str(),
            self.trend_slow.as_str(),
        ]
    }

    /// Every required column absent from `df`, sorted.
    pub fn missing_in(&self, df: &DataFrame) -> Vec<String> {
        let mut missing: Vec<String> = self
            .required()
            .iter()
            .filter(|name| df.column(name).is_err())
            .map(|name| name.to_string())
            .collect();
        missing.sort();
        missing.dedup();
        missing
    }
}

fn column_err(column: &str) -> impl Fn(PolarsError) -> FrameError + '_ {
    move |source| FrameError::Column {
        column: column.to_string(),
        source,
    }
}

/// Read a column as f64, casting if needed. Nulls become NaN.
pub fn f64_column(df: &DataFrame, name: &str) -> Result<Vec<f64>, FrameError> {
    Ok(opt_f64_column(df, name)?
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect())
}

fn opt_f64_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, FrameError> {
    let col = df
        .column(name)
        .map_err(column_err(name))?
        .cast(&DataType::Float64)
        .map_err(column_err(name))?;
    let ca = col.f64().map_err(column_err(name))?;
    Ok(ca.into_iter().collect())
}

/// Read the timestamp column as i64. Nulls are an error.
pub fn ts_column(df: &DataFrame, name: &str) -> Result<Vec<i64>, FrameError> {
    let col = df
        .column(name)
        .map_err(column_err(name))?
        .cast(&DataType::Int64)
        .map_err(column_err(name))?;
    let ca = col.i64().map_err(column_err(name))?;
    ca.into_iter()
        .enumerate()
        .map(|(row, v)| v.ok_or(FrameError::NullTimestamp { row }))
        .collect()
}

/// Convert a feature frame into engine bars.
///
/// All required columns are checked before any is read, and every missing
/// one is reported.
pub fn bars_from_frame(df: &DataFrame, columns: &ColumnMap) -> Result<Vec<Bar>, FrameError> {
    let missing = columns.missing_in(df);
    if !missing.is_empty() {
        return Err(FrameError::MissingColumns(missing));
    }

    let ts = ts_column(df, &columns.ts)?;
    let high = f64_column(df, &columns.high)?;
    let low = f64_column(df, &columns.low)?;
    let close = f64_column(df, &columns.close)?;
    let vwap = f64_column(df, &columns.vwap)?;
    let atr = f64_column(df, &columns.atr)?;
    let trend_fast = f64_column(df, &columns.trend_fast)?;
    let trend_slow = f64_column(df, &columns.trend_slow)?;
    let vol_ratio = if df.column(&columns.vol_ratio).is_ok() {
        Some(opt_f64_column(df, &columns.vol_ratio)?)
    } else {
        None
    };

    let bars = (0..df.height())
        .map(|i| Bar {
            ts: ts[i],
            high: high[i],
            low: low[i],
            close: close[i],
            vwap: vwap[i],
            atr: atr[i],
            trend_fast: trend_fast[i],
            trend_slow: trend_slow[i],
            vol_ratio: vol_ratio.as_ref().and_then(|v| v[i]),
        })
        .collect();
    Ok(bars)
}

/// Convert bars into a feature frame using the mapped column names.
pub fn bars_to_frame(bars: &[Bar], columns: &ColumnMap) -> Result<DataFrame, FrameError> {
    let f64s = |f: fn(&Bar) -> f64| bars.iter().map(f).collect::<Vec<f64>>();

    DataFrame::new(vec![
        Column::new(
            columns.ts.as_str().into(),
            bars.iter().map(|b| b.ts).collect::<Vec<i64>>(),
        ),
        Column::new(columns.high.as_str().into(), f64s(|b| b.high)),
        Column::new(columns.low.as_str().into(), f64s(|b| b.low)),
        Column::new(columns.close.as_str().into(), f64s(|b| b.close)),
        Column::new(columns.vwap.as_str().into(), f64s(|b| b.vwap)),
        Column::new(columns.atr.as_str().into(), f64s(|b| b.atr)),
        Column::new(columns.trend_fast.as_str().into(), f64s(|b| b.trend_fast)),
        Column::new(columns.trend_slow.as_str().into(), f64s(|b| b.trend_slow)),
        Column::new(
            columns.vol_ratio.as_str().into(),
            bars.iter().map(|b| b.vol_ratio).collect::<Vec<Option<f64>>>(),
        ),
    ])
    .map_err(column_err("<frame>"))
}

/// Convert a raw OHLCV frame (see [`RAW_COLUMNS`]) into raw bars.
pub fn raw_bars_from_frame(df: &DataFrame) -> Result<Vec<RawBar>, FrameError> {
    let mut missing: Vec<String> = RAW_COLUMNS
        .iter()
        .filter(|name| df.column(name).is_err())
        .map(|name| name.to_string())
        .collect();
    if !missing.is_empty() {
        missing.sort();
        return Err(FrameError::MissingColumns(missing));
    }

    let ts = ts_column(df, "ts")?;
    let open = f64_column(df, "open")?;
    let high = f64_column(df, "high")?;
    let low = f64_column(df, "low")?;
    let close = f64_column(df, "close")?;
    let volume = f64_column(df, "volume")?;

    Ok((0..df.height())
        .map(|i| RawBar {
            ts: ts[i],
            open: open[i],
            high: high[i],
            low: low[i],
            close: close[i],
            volume: volume[i],
        })
        .collect())
}

/// Convert raw bars into an OHLCV frame.
pub fn raw_bars_to_frame(bars: &[RawBar]) -> Result<DataFrame, FrameError> {
    let f64s = |f: fn(&RawBar) -> f64| bars.iter().map(f).collect::<Vec<f64>>();

    DataFrame::new(vec![
        Column::new("ts".into(), bars.iter().map(|b| b.ts).collect::<Vec<i64>>()),
        Column::new("open".into(), f64s(|b| b.open)),
        Column::new("high".into(), f64s(|b| b.high)),
        Column::new("low".into(), f64s(|b| b.low)),
        Column::new("close".into(), f64s(|b| b.close)),
        Column::new("volume".into(), f64s(|b| b.volume)),
    ])
    .map_err(column_err("<frame>"))
}

/// Append f64 columns to a frame. Each column must match the frame height.
pub fn append_f64_columns<'a>(
    df: &mut DataFrame,
    columns: impl IntoIterator<Item = (String, &'a [f64])>,
) -> Result<(), FrameError> {
    for (name, values) in columns {
        df.with_column(Column::new(name.as_str().into(), values.to_vec()))
            .map_err(column_err(&name))?;
    }
    Ok(())
}
