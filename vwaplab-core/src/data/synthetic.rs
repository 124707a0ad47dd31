//! Synthetic bar generators for tests, benches, and the `synth` command.

use crate::domain::{Bar, RawBar};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Bar spacing used by the generators, in seconds.
pub const BAR_SECONDS: i64 = 60;

/// Repeating four-bar pattern, one closed trade per cycle.
///
/// With vwap = 10 and atr = 2 throughout and an uptrend:
/// 1. close 9.9 below the reference
/// 2. close 10.2 crosses above it, a limit is placed at 10.0
/// 3. range 9.95..10.05 fills the limit at 10.0
/// 4. high 14.1 reaches the 2R take profit at 14.0 (stop mult 1)
pub fn cycle_bars(cycles: usize) -> Vec<Bar> {
    let shape = [
        (9.8, 10.0, 9.9),
        (9.9, 10.3, 10.2),
        (9.95, 10.05, 10.0),
        (13.0, 14.1, 14.0),
    ];

    (0..cycles * shape.len())
        .map(|i| {
            let (low, high, close) = shape[i % shape.len()];
            Bar {
                ts: i as i64 * BAR_SECONDS,
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

/// Seeded OHLCV random walk starting at 100.
///
/// Each bar opens at the previous close and drifts by up to 1.2%; wicks
/// extend up to 0.4% past the body. Same seed, same bars.
pub fn random_walk(n: usize, seed: u64) -> Vec<RawBar> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut price = 100.0_f64;
    let mut bars = Vec::with_capacity(n);

    for i in 0..n {
        let open = price;
        let close = (open * (1.0 + rng.gen_range(-0.012..0.012))).max(1.0);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.004));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.004));
        let volume = rng.gen_range(10.0..250.0);
        bars.push(RawBar {
            ts: i as i64 * BAR_SECONDS,
            open,
            high,
            low,
            close,
            volume,
        });
        price = close;
    }

    bars
}
