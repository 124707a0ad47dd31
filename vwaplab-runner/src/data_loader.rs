//! Bar loading for the runner.
//!
//! Reads a `.csv` or `.parquet` file into a polars DataFrame and converts it
//! to engine bars. Two input shapes are supported:
//! 1. Feature frames, read through a [`ColumnMap`]
//! 2. Raw OHLCV frames, with features computed here before conversion

use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use vwaplab_core::data::{bars_from_frame, raw_bars_from_frame, ColumnMap, FrameError};
use vwaplab_core::domain::Bar;
use vwaplab_core::features::{build_feature_bars, FeatureConfig};

use crate::config::DataConfig;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unsupported file extension for '{0}' (expected .csv or .parquet)")]
    UnsupportedFormat(PathBuf),

    #[error("open '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("read '{path}': {source}")]
    Polars {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    #[error("no rows in '{0}'")]
    Empty(PathBuf),

    #[error(transparent)]
    Frame(#[from] FrameError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Parquet,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("csv") => Ok(Self::Csv),
            Some("parquet") | Some("pq") => Ok(Self::Parquet),
            _ => Err(LoadError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// Engine bars plus provenance.
#[derive(Debug, Clone)]
pub struct LoadedBars {
    pub bars: Vec<Bar>,
    /// BLAKE3 over the loaded bar values, for tagging run artifacts.
    pub dataset_hash: String,
    pub features_computed: bool,
}

fn polars_err(path: &Path) -> impl Fn(PolarsError) -> LoadError + '_ {
    move |source| LoadError::Polars {
        path: path.to_path_buf(),
        source,
    }
}

/// Read a CSV or Parquet file into a DataFrame.
pub fn read_frame(path: &Path) -> Result<DataFrame, LoadError> {
    let df = match FileFormat::from_path(path)? {
        FileFormat::Csv => CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .map_err(polars_err(path))?
            .finish()
            .map_err(polars_err(path))?,
        FileFormat::Parquet => {
            let file = File::open(path).map_err(|source| LoadError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            ParquetReader::new(file).finish().map_err(polars_err(path))?
        }
    };
    debug!(path = %path.display(), rows = df.height(), cols = df.width(), "frame read");
    Ok(df)
}

/// Write a DataFrame as CSV or Parquet, chosen by extension.
pub fn write_frame(df: &mut DataFrame, path: &Path) -> Result<(), LoadError> {
    let format = FileFormat::from_path(path)?;
    let file = File::create(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    match format {
        FileFormat::Csv => CsvWriter::new(file)
            .include_header(true)
            .finish(df)
            .map_err(polars_err(path))?,
        FileFormat::Parquet => {
            ParquetWriter::new(file).finish(df).map_err(polars_err(path))?;
        }
    }
    debug!(path = %path.display(), rows = df.height(), "frame written");
    Ok(())
}

/// Convert a loaded frame to engine bars, computing features when the frame
/// holds raw OHLCV.
pub fn frame_to_bars(
    df: &DataFrame,
    columns: &ColumnMap,
    features: Option<&FeatureConfig>,
) -> Result<Vec<Bar>, LoadError> {
    match features {
        Some(cfg) => {
            let raw = raw_bars_from_frame(df)?;
            Ok(build_feature_bars(&raw, cfg))
        }
        None => Ok(bars_from_frame(df, columns)?),
    }
}

/// Load bars per the `[data]` section.
pub fn load_bars(
    data: &DataConfig,
    columns: &ColumnMap,
    features: &FeatureConfig,
) -> Result<LoadedBars, LoadError> {
    let df = read_frame(&data.path)?;
    if df.height() == 0 {
        return Err(LoadError::Empty(data.path.clone()));
    }

    let cfg = data.compute_features.then_some(features);
    let bars = frame_to_bars(&df, columns, cfg)?;
    let dataset_hash = dataset_hash(&bars);

    info!(
        path = %data.path.display(),
        bars = bars.len(),
        features_computed = data.compute_features,
        dataset_hash = %&dataset_hash[..12],
        "bars loaded"
    );

    Ok(LoadedBars {
        bars,
        dataset_hash,
        features_computed: data.compute_features,
    })
}

/// BLAKE3 over every bar field, in order.
pub fn dataset_hash(bars: &[Bar]) -> String {
    let mut hasher = blake3::Hasher::new();
    for b in bars {
        hasher.update(&b.ts.to_le_bytes());
        for v in [b.high, b.low, b.close, b.vwap, b.atr, b.trend_fast, b.trend_slow] {
            hasher.update(&v.to_le_bytes());
        }
        hasher.update(&b.vol_ratio.unwrap_or(f64::NAN).to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}
