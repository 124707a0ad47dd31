//! Limit order fill model.
//!
//! A resting limit fills at exactly its limit price when the bar's range
//! touches it. There is no queue position or partial fill model. Orders age
//! by one bar per call to [`PendingOrder::step_age_and_expire`], which the
//! engine only calls after a failed fill check on the same bar.

use crate::domain::{OrderStatus, PendingOrder, ReasonCode, Side};

/// Place a new limit order. Reasons start as `[ORDER_PLACED]`.
pub fn place_limit_order(
    placed_ts: i64,
    side: Side,
    limit_px: f64,
    expiry_bars: u32,
) -> PendingOrder {
    PendingOrder {
        side,
        limit_px,
        placed_ts,
        expiry_bars,
        age_bars: 0,
        status: OrderStatus::Pending,
        reasons: vec![ReasonCode::OrderPlaced],
    }
}

impl PendingOrder {
    /// Check whether this bar fills the order. No-op once terminal.
    ///
    /// Returns true only on the bar that transitions the order to filled.
    pub fn check_fill(&mut self, bar_ts: i64, low: f64, high: f64) -> bool {
        if self.is_terminal() {
            return false;
        }
        if low <= self.limit_px && self.limit_px <= high {
            self.status = OrderStatus::Filled {
                ts: bar_ts,
                px: self.limit_px,
            };
            self.reasons.push(ReasonCode::LimitFilled);
            return true;
        }
        false
    }

    /// Age the order by one bar and expire it once `age_bars >= expiry_bars`.
    ///
    /// No-op once terminal. Returns true only on the expiring call.
    pub fn step_age_and_expire(&mut self) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.age_bars += 1;
        if self.age_bars >= self.expiry_bars {
            self.status = OrderStatus::Expired;
            self.reasons.push(ReasonCode::LimitExpired);
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placed_order_starts_pending() {
        let o = place_limit_order(60, Side::Long, 10.0, 4);
        assert_eq!(o.status(), OrderStatus::Pending);
        assert_eq!(o.age_bars(), 0);
        assert_eq!(o.placed_ts(), 60);
        assert_eq!(o.reasons(), &[ReasonCode::OrderPlaced]);
    }

    #[test]
    fn fills_at_limit_when_touched() {
        let mut o = place_limit_order(0, Side::Long, 10.0, 4);
        assert!(o.check_fill(120, 9.0, 11.0));
        assert_eq!(o.fill_ts(), Some(120));
        assert_eq!(o.fill_px(), Some(10.0));
        assert_eq!(
            o.reasons(),
            &[ReasonCode::OrderPlaced, ReasonCode::LimitFilled]
        );
    }

    #[test]
    fn range_endpoints_are_inclusive() {
        let mut o = place_limit_order(0, Side::Long, 10.0, 4);
        assert!(o.check_fill(1, 10.0, 12.0));

        let mut o = place_limit_order(0, Side::Long, 10.0, 4);
        assert!(o.check_fill(1, 8.0, 10.0));
    }

    #[test]
    fn no_fill_when_range_misses() {
        let mut o = place_limit_order(0, Side::Long, 10.0, 4);
        assert!(!o.check_fill(1, 10.01, 12.0));
        assert!(!o.is_terminal());
    }

    #[test]
    fn nan_range_never_fills() {
        let mut o = place_limit_order(0, Side::Long, 10.0, 4);
        assert!(!o.check_fill(1, f64::NAN, 12.0));
        assert!(!o.check_fill(1, 8.0, f64::NAN));
        assert_eq!(o.status(), OrderStatus::Pending);
    }

    #[test]
    fn fill_is_idempotent() {
        let mut o = place_limit_order(0, Side::Long, 10.0, 4);
        assert!(o.check_fill(1, 9.0, 11.0));
        let snapshot = o.clone();
        assert!(!o.check_fill(2, 9.0, 11.0));
        assert!(!o.step_age_and_expire());
        assert_eq!(o, snapshot);
    }

    #[test]
    fn expires_after_expiry_bars() {
        let mut o = place_limit_order(0, Side::Long, 10.0, 2);
        assert!(!o.step_age_and_expire());
        assert!(o.step_age_and_expire());
        assert!(o.is_expired());
        assert_eq!(o.age_bars(), 2);
        assert_eq!(
            o.reasons(),
            &[ReasonCode::OrderPlaced, ReasonCode::LimitExpired]
        );
    }

    #[test]
    fn expiry_is_idempotent() {
        let mut o = place_limit_order(0, Side::Long, 10.0, 1);
        assert!(o.step_age_and_expire());
        let snapshot = o.clone();
        assert!(!o.step_age_and_expire());
        assert!(!o.check_fill(5, 0.0, 100.0));
        assert_eq!(o, snapshot);
    }
}
