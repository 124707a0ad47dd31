//! Integration tests for grid search and A/B/C walk-forward.
//!
//! Tests:
//! 1. Selection by total net P&L, first item wins ties
//! 2. Serial and parallel sweeps agree
//! 3. Engine errors abort the search with the failing index
//! 4. Walk-forward evaluates the train winner on B and C

use vwaplab_core::data::random_walk;
use vwaplab_core::domain::Bar;
use vwaplab_core::features::{build_feature_bars, FeatureConfig};
use vwaplab_core::strategy::{EntryRuleParams, StrategyParams};
use vwaplab_runner::{
    make_abc_split_by_ts, pick_cutoffs_by_ratio, run_grid_on_train, run_one, run_walkforward_abc,
    GridError, GridItem, GridSearch, ParamGrid, RunError,
};

/// Four-bar cycles whose last bar tops out at 12.1: a 1R target (12.0)
/// is reached, a 2R target (14.0) never is.
fn capped_cycles(cycles: usize) -> Vec<Bar> {
    let shape = [
        (9.8, 10.0, 9.9),
        (9.9, 10.3, 10.2),
        (9.95, 10.05, 10.0),
        (11.5, 12.1, 12.0),
    ];
    (0..cycles * shape.len())
        .map(|i| {
            let (low, high, close) = shape[i % shape.len()];
            Bar {
                ts: i as i64 * 60,
                high,
                low,
                close,
                vwap: 10.0,
                atr: 2.0,
                trend_fast: 101.0,
                trend_slow: 100.0,
                vol_ratio: None,
            }
        })
        .collect()
}

fn item(take_profit_r: f64) -> GridItem {
    GridItem {
        strategy: StrategyParams {
            limit_expiry_bars: 4,
            atr_stop_mult: 1.0,
            take_profit_r,
            ..Default::default()
        },
        entry: EntryRuleParams::default(),
    }
}

fn feature_bars(n: usize, seed: u64) -> Vec<Bar> {
    let cfg = FeatureConfig {
        vwap_window: 10,
        atr_period: 7,
        trend_fast: 10,
        trend_slow: 30,
        vol_window: 10,
        ..Default::default()
    };
    build_feature_bars(&random_walk(n, seed), &cfg)
}

// ──────────────────────────────────────────────
// Selection
// ──────────────────────────────────────────────

#[test]
fn grid_picks_target_that_is_actually_reached() {
    let grid = vec![item(2.0), item(1.0)];
    let result = run_grid_on_train(&capped_cycles(3), "TEST", &grid).unwrap();

    assert_eq!(result.best_index, 1);
    assert_eq!(result.best_params.strategy.take_profit_r, 1.0);
    assert_eq!(result.best_metrics.trades, 3);
    assert_eq!(result.best_metrics.total_net_pnl, 6.0);

    // The 2R item never closes a trade
    assert_eq!(result.runs[0].metrics.trades, 0);
    assert_eq!(result.runs.len(), 2);
    assert_eq!(result.runs[1].index, 1);
}

#[test]
fn ties_go_to_the_first_item() {
    let grid = vec![item(1.0), item(1.0), item(2.0)];
    let result = run_grid_on_train(&capped_cycles(2), "TEST", &grid).unwrap();
    assert_eq!(result.best_index, 0);
}

#[test]
fn all_zero_scores_select_first_item() {
    // No item ever closes a trade: every score is 0.0 and index 0 wins.
    let grid = vec![item(2.0), item(3.0)];
    let result = run_grid_on_train(&capped_cycles(2), "TEST", &grid).unwrap();
    assert_eq!(result.best_index, 0);
    assert_eq!(result.best_metrics.total_net_pnl, 0.0);
}

// ──────────────────────────────────────────────
// Determinism
// ──────────────────────────────────────────────

#[test]
fn serial_and_parallel_sweeps_agree() {
    let bars = feature_bars(800, 11);
    let grid = ParamGrid {
        limit_expiry_bars: vec![2, 4],
        atr_stop_mult: vec![1.0, 2.0],
        take_profit_r: vec![1.0, 1.5, 3.0],
        time_stop_bars: vec![None, Some(20)],
        ..Default::default()
    }
    .expand(&GridItem::default());
    assert_eq!(grid.len(), 24);

    let serial = GridSearch::new()
        .with_parallelism(false)
        .run(&bars, "RW", &grid)
        .unwrap();
    let parallel = GridSearch::new()
        .with_parallelism(true)
        .run(&bars, "RW", &grid)
        .unwrap();
    assert_eq!(serial, parallel);
    assert!(serial.runs.iter().enumerate().all(|(i, r)| r.index == i));
}

#[test]
fn fingerprints_follow_params() {
    let result = run_grid_on_train(&capped_cycles(1), "TEST", &[item(1.0), item(1.0)]).unwrap();
    assert_eq!(result.runs[0].fingerprint, result.runs[1].fingerprint);
    assert_eq!(result.runs[0].fingerprint, item(1.0).fingerprint());
}

// ──────────────────────────────────────────────
// Errors
// ──────────────────────────────────────────────

#[test]
fn engine_error_aborts_search() {
    let mut bad = item(1.0);
    bad.strategy.atr_stop_mult = -1.0;
    let err = run_grid_on_train(&capped_cycles(2), "TEST", &[item(1.0), bad]).unwrap_err();
    match err {
        GridError::Run { index, source } => {
            assert_eq!(index, 1);
            assert!(matches!(source, RunError::Engine(_)));
        }
        other => panic!("expected run error, got {other}"),
    }
}

#[test]
fn bad_atr_on_train_aborts_search() {
    let mut bars = capped_cycles(2);
    bars[2].atr = 0.0; // first fill bar
    let err = run_grid_on_train(&bars, "TEST", &[item(1.0)]).unwrap_err();
    assert!(matches!(err, GridError::Run { index: 0, .. }));
}

// ──────────────────────────────────────────────
// Walk-forward
// ──────────────────────────────────────────────

#[test]
fn walkforward_evaluates_winner_out_of_sample() {
    let bars = capped_cycles(10);
    let cutoffs = pick_cutoffs_by_ratio(&bars, 0.6, 0.8).unwrap();
    let split = make_abc_split_by_ts(&bars, cutoffs.a_end, cutoffs.b_end).unwrap();
    let grid = vec![item(2.0), item(1.0)];

    let report = run_walkforward_abc(&split, "TEST", &grid).unwrap();
    assert_eq!(report.best_params, item(1.0));
    assert_eq!(report.cutoffs, cutoffs);
    assert_eq!(report.train_grid_runs.len(), 2);

    let (a, b, c) = split.sizes();
    assert_eq!(report.split_sizes, [a, b, c]);
    assert_eq!(a + b + c, bars.len());

    let validate = run_one(&split.validate, "TEST", &item(1.0)).unwrap();
    let test = run_one(&split.test, "TEST", &item(1.0)).unwrap();
    assert_eq!(report.validate_metrics, validate.metrics);
    assert_eq!(report.test_metrics, test.metrics);
    assert_eq!(report.validate_pnl, validate.pnl);
    assert_eq!(report.test_pnl, test.pnl);
}

#[test]
fn walkforward_json_omits_ledgers() {
    let bars = capped_cycles(6);
    let c = pick_cutoffs_by_ratio(&bars, 0.5, 0.75).unwrap();
    let split = make_abc_split_by_ts(&bars, c.a_end, c.b_end).unwrap();
    let report = run_walkforward_abc(&split, "TEST", &[item(1.0)]).unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert!(json.get("best_params").is_some());
    assert!(json.get("validate_metrics").is_some());
    assert!(json.get("test_metrics").is_some());
    assert!(json.get("train_grid_runs").is_some());
    assert!(json.get("validate_pnl").is_none());
}

#[test]
fn empty_grid_is_rejected_by_walkforward() {
    let bars = capped_cycles(3);
    let split = make_abc_split_by_ts(&bars, 300, 540).unwrap();
    assert!(matches!(
        run_walkforward_abc(&split, "TEST", &[]),
        Err(GridError::EmptyGrid)
    ));
}
