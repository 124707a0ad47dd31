//! Entry signal: close crosses above the reference level, with optional
//! volume confirmation. The limit price is the current reference level.

use super::params::EntryRuleParams;
use crate::domain::{ReasonCode, Side};
use serde::{Deserialize, Serialize};

/// A candidate order intent produced by the entry rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntrySignal {
    /// Timestamp of the bar used as "previous" context for the cross.
    pub ts: i64,
    pub side: Side,
    pub limit_px: f64,
    pub reasons: Vec<ReasonCode>,
}

/// Previous close at/below its reference, current close strictly above.
///
/// A bar already above on both sides does not re-trigger.
pub fn crosses_above(prev_close: f64, prev_ref: f64, close: f64, reference: f64) -> bool {
    prev_close <= prev_ref && close > reference
}

/// Build an entry signal from bar t-1 and bar t values, or `None`.
///
/// Returning `None` is the normal non-triggering case, including when a
/// volume threshold is configured but `vol_ratio` is missing.
#[allow(clippy::too_many_arguments)]
pub fn build_entry_signal(
    ts: i64,
    prev_close: f64,
    prev_ref: f64,
    close: f64,
    reference: f64,
    side: Side,
    vol_ratio: Option<f64>,
    params: &EntryRuleParams,
) -> Option<EntrySignal> {
    if !crosses_above(prev_close, prev_ref, close, reference) {
        return None;
    }

    let mut reasons = vec![ReasonCode::EntryCross];

    if let Some(min) = params.min_vol_ratio {
        match vol_ratio {
            Some(v) if v >= min => reasons.push(ReasonCode::VolConfirm),
            _ => return None,
        }
    }

    Some(EntrySignal {
        ts,
        side,
        limit_px: reference,
        reasons,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_gate() -> EntryRuleParams {
        EntryRuleParams::default()
    }

    #[test]
    fn cross_detected_from_below() {
        assert!(crosses_above(9.9, 10.0, 10.2, 10.0));
    }

    #[test]
    fn equality_on_prior_bar_counts_as_not_yet_above() {
        assert!(crosses_above(10.0, 10.0, 10.1, 10.0));
    }

    #[test]
    fn already_above_does_not_retrigger() {
        assert!(!crosses_above(10.1, 10.0, 10.2, 10.0));
    }

    #[test]
    fn equality_on_current_bar_is_not_a_cross() {
        assert!(!crosses_above(9.9, 10.0, 10.0, 10.0));
    }

    #[test]
    fn signal_uses_current_reference_as_limit() {
        let sig = build_entry_signal(0, 9.9, 10.0, 10.2, 10.05, Side::Long, None, &no_gate())
            .expect("cross should fire");
        assert_eq!(sig.ts, 0);
        assert_eq!(sig.side, Side::Long);
        assert_eq!(sig.limit_px, 10.05);
        assert_eq!(sig.reasons, vec![ReasonCode::EntryCross]);
    }

    #[test]
    fn volume_gate_confirms_at_threshold() {
        let params = EntryRuleParams {
            min_vol_ratio: Some(1.5),
        };
        let sig = build_entry_signal(0, 9.9, 10.0, 10.2, 10.0, Side::Long, Some(1.5), &params)
            .expect("threshold is inclusive");
        assert_eq!(
            sig.reasons,
            vec![ReasonCode::EntryCross, ReasonCode::VolConfirm]
        );
    }

    #[test]
    fn volume_gate_rejects_low_ratio() {
        let params = EntryRuleParams {
            min_vol_ratio: Some(1.5),
        };
        assert!(
            build_entry_signal(0, 9.9, 10.0, 10.2, 10.0, Side::Long, Some(1.49), &params).is_none()
        );
    }

    #[test]
    fn missing_vol_ratio_is_non_confirmation() {
        let params = EntryRuleParams {
            min_vol_ratio: Some(1.0),
        };
        assert!(build_entry_signal(0, 9.9, 10.0, 10.2, 10.0, Side::Long, None, &params).is_none());
    }

    #[test]
    fn vol_ratio_ignored_without_threshold() {
        let sig = build_entry_signal(0, 9.9, 10.0, 10.2, 10.0, Side::Long, Some(0.1), &no_gate())
            .unwrap();
        assert_eq!(sig.reasons, vec![ReasonCode::EntryCross]);
    }
}
