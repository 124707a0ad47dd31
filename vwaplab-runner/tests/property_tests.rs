//! Property tests for metrics and splits.
//!
//! Uses proptest to verify:
//! 1. Metric identities: total = sum of net P&L, drawdown never positive
//! 2. Split partitions cover every bar exactly once and respect the cutoffs
//! 3. Ratio cutoffs always leave A and B non-empty

use proptest::prelude::*;
use vwaplab_core::domain::Bar;
use vwaplab_runner::metrics::{drawdown_series, equity_from_pnls};
use vwaplab_runner::{make_abc_split_by_ts, pick_cutoffs_by_ratio, PerformanceMetrics};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_pnls() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-50.0..50.0_f64, 0..60)
}

fn bar_at(ts: i64) -> Bar {
    Bar {
        ts,
        high: 10.5,
        low: 9.5,
        close: 10.0,
        vwap: 10.0,
        atr: 1.0,
        trend_fast: 101.0,
        trend_slow: 100.0,
        vol_ratio: None,
    }
}

/// Distinct timestamps with irregular gaps, in shuffled order.
fn arb_shuffled_bars() -> impl Strategy<Value = Vec<Bar>> {
    prop::collection::vec(1i64..500, 3..80)
        .prop_map(|gaps| {
            gaps.iter()
                .scan(0i64, |ts, gap| {
                    *ts += gap;
                    Some(bar_at(*ts))
                })
                .collect::<Vec<_>>()
        })
        .prop_shuffle()
}

fn arb_ratios() -> impl Strategy<Value = (f64, f64)> {
    (0.05..0.9_f64, 0.01..0.5_f64)
        .prop_map(|(a, gap)| (a, (a + gap).min(0.99)))
        .prop_filter("a < b", |(a, b)| a < b)
}

// ── 1. Metrics ───────────────────────────────────────────────────────

proptest! {
    #[test]
    fn metric_identities(pnls in arb_pnls()) {
        let m = PerformanceMetrics::compute(&pnls);
        let total: f64 = pnls.iter().sum();

        prop_assert_eq!(m.trades, pnls.len());
        prop_assert!((m.total_net_pnl - total).abs() < 1e-9);
        prop_assert!(m.max_drawdown <= 0.0);
        prop_assert!((0.0..=1.0).contains(&m.win_rate));
        prop_assert!((m.expectancy * pnls.len() as f64 - total).abs() < 1e-9);

        let has_loss = pnls.iter().any(|&p| p < 0.0);
        prop_assert_eq!(m.profit_factor.is_none(), !pnls.is_empty() && !has_loss);
    }

    #[test]
    fn drawdown_is_bounded_by_equity_swing(pnls in arb_pnls()) {
        let equity = equity_from_pnls(&pnls);
        let dd = drawdown_series(&equity);
        prop_assert_eq!(dd.len(), pnls.len());
        prop_assert!(dd.iter().all(|&d| d <= 0.0));
        if let (Some(&first), Some(&worst)) = (dd.first(), dd.iter().min_by(|a, b| a.total_cmp(b))) {
            prop_assert_eq!(first, 0.0);
            prop_assert_eq!(worst, PerformanceMetrics::compute(&pnls).max_drawdown);
        }
    }
}

// ── 2-3. Splits ──────────────────────────────────────────────────────

proptest! {
    #[test]
    fn split_partitions_are_disjoint_and_ordered(
        bars in arb_shuffled_bars(),
        (a, b) in arb_ratios(),
    ) {
        let c = pick_cutoffs_by_ratio(&bars, a, b).unwrap();
        prop_assert!(c.a_end < c.b_end);

        let split = make_abc_split_by_ts(&bars, c.a_end, c.b_end).unwrap();
        let (na, nb, nc) = split.sizes();
        prop_assert_eq!(na + nb + nc, bars.len());
        prop_assert!(na > 0 && nb > 0);

        prop_assert!(split.train.iter().all(|x| x.ts <= c.a_end));
        prop_assert!(split.validate.iter().all(|x| c.a_end < x.ts && x.ts <= c.b_end));
        prop_assert!(split.test.iter().all(|x| x.ts > c.b_end));

        let joined: Vec<i64> = split
            .train
            .iter()
            .chain(&split.validate)
            .chain(&split.test)
            .map(|x| x.ts)
            .collect();
        prop_assert!(joined.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn inverted_cutoffs_are_rejected(bars in arb_shuffled_bars(), t in 0i64..10_000) {
        prop_assert!(make_abc_split_by_ts(&bars, t, t).is_err());
        prop_assert!(make_abc_split_by_ts(&bars, t + 1, t).is_err());
    }
}
