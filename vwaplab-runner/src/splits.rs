//! Chronological A/B/C splits (train / validate / test) by timestamp.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use vwaplab_core::domain::Bar;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SplitError {
    #[error("ratios must satisfy 0 < a < b < 1, got a={a}, b={b}")]
    BadRatios { a: f64, b: f64 },
    #[error("need at least 3 bars to split, got {0}")]
    TooFewBars(usize),
    #[error("cutoffs must satisfy a_end < b_end, got {a_end} >= {b_end}")]
    BadCutoffs { a_end: i64, b_end: i64 },
}

/// Timestamp cutoffs. A holds `ts <= a_end`, B holds `a_end < ts <= b_end`,
/// C holds `ts > b_end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitCutoffs {
    pub a_end: i64,
    pub b_end: i64,
}

/// Three non-overlapping, time-ordered partitions of one bar series.
#[derive(Debug, Clone, PartialEq)]
pub struct AbcSplit {
    pub train: Vec<Bar>,
    pub validate: Vec<Bar>,
    pub test: Vec<Bar>,
    pub cutoffs: SplitCutoffs,
}

impl AbcSplit {
    pub fn sizes(&self) -> (usize, usize, usize) {
        (self.train.len(), self.validate.len(), self.test.len())
    }
}

/// Partition bars by timestamp cutoffs. The input is sorted by `ts` first
/// (stable), so callers may pass bars in any order.
pub fn make_abc_split_by_ts(bars: &[Bar], a_end: i64, b_end: i64) -> Result<AbcSplit, SplitError> {
    if a_end >= b_end {
        return Err(SplitError::BadCutoffs { a_end, b_end });
    }

    let mut sorted = bars.to_vec();
    sorted.sort_by_key(|b| b.ts);

    let mut train = Vec::new();
    let mut validate = Vec::new();
    let mut test = Vec::new();
    for bar in sorted {
        if bar.ts <= a_end {
            train.push(bar);
        } else if bar.ts <= b_end {
            validate.push(bar);
        } else {
            test.push(bar);
        }
    }

    Ok(AbcSplit {
        train,
        validate,
        test,
        cutoffs: SplitCutoffs { a_end, b_end },
    })
}

/// Choose cutoff timestamps at fractional positions of the sorted series.
///
/// Positions round half to even. The A index is clamped to `[0, n-2]` and
/// the B index to `[a+1, n-1]`, so both partitions A and B are non-empty.
pub fn pick_cutoffs_by_ratio(
    bars: &[Bar],
    a_ratio: f64,
    b_ratio: f64,
) -> Result<SplitCutoffs, SplitError> {
    if !(0.0 < a_ratio && a_ratio < b_ratio && b_ratio < 1.0) {
        return Err(SplitError::BadRatios {
            a: a_ratio,
            b: b_ratio,
        });
    }
    let n = bars.len();
    if n < 3 {
        return Err(SplitError::TooFewBars(n));
    }

    let mut ts: Vec<i64> = bars.iter().map(|b| b.ts).collect();
    ts.sort_unstable();

    let last = (n - 1) as f64;
    let a_idx = ((a_ratio * last).round_ties_even() as usize).min(n - 2);
    let b_idx = ((b_ratio * last).round_ties_even() as usize)
        .min(n - 1)
        .max(a_idx + 1);

    Ok(SplitCutoffs {
        a_end: ts[a_idx],
        b_end: ts[b_idx],
    })
}
