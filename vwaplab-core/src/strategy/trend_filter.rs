//! Trend filter - gates new entries by the fast/slow trend regime.

use crate::domain::ReasonCode;

/// Verdict of the trend gate for one bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendResult {
    pub ok: bool,
    /// `Some(TrendFail)` when the gate rejects the bar.
    pub reason: Option<ReasonCode>,
}

/// Passes iff `fast > slow`. Equality and NaN inputs fail.
pub fn trend_ok(fast: f64, slow: f64) -> TrendResult {
    if fast > slow {
        TrendResult {
            ok: true,
            reason: None,
        }
    } else {
        TrendResult {
            ok: false,
            reason: Some(ReasonCode::TrendFail),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fast_above_slow_passes() {
        let r = trend_ok(101.0, 100.0);
        assert!(r.ok);
        assert_eq!(r.reason, None);
    }

    #[test]
    fn equality_fails() {
        let r = trend_ok(100.0, 100.0);
        assert!(!r.ok);
        assert_eq!(r.reason, Some(ReasonCode::TrendFail));
    }

    #[test]
    fn fast_below_slow_fails() {
        assert!(!trend_ok(99.0, 100.0).ok);
    }

    #[test]
    fn warmup_nan_fails() {
        assert!(!trend_ok(f64::NAN, 100.0).ok);
        assert!(!trend_ok(101.0, f64::NAN).ok);
    }
}
