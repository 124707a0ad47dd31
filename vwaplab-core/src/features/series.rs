//! Causal series functions.
//!
//! Every output value at index t depends only on inputs at indices <= t.
//! Warmup positions and rolling windows containing NaN produce NaN;
//! exponential means carry their last value through a NaN input.

use crate::domain::RawBar;

/// Rolling sum over a fixed window. NaN until the window is full, and NaN
/// while any value in the window is NaN.
pub fn rolling_sum(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if window == 0 || n < window {
        return result;
    }

    let mut sum = 0.0;
    let mut nan_count = 0usize;
    for i in 0..n {
        let entering = values[i];
        if entering.is_nan() {
            nan_count += 1;
        } else {
            sum += entering;
        }

        if i >= window {
            let leaving = values[i - window];
            if leaving.is_nan() {
                nan_count -= 1;
            } else {
                sum -= leaving;
            }
        }

        if i + 1 >= window && nan_count == 0 {
            result[i] = sum;
        }
    }

    result
}

/// Simple moving average.
pub fn sma(values: &[f64], window: usize) -> Vec<f64> {
    rolling_sum(values, window)
        .into_iter()
        .map(|s| s / window as f64)
        .collect()
}

/// Recursive exponential mean `m[t] = (1 - alpha) * m[t-1] + alpha * x[t]`,
/// seeded with the first observation.
///
/// A NaN input carries the previous mean forward and decays its weight, so
/// the next observation counts for more. Output stays NaN until
/// `min_periods` observations have been seen.
pub fn ewm(values: &[f64], alpha: f64, min_periods: usize) -> Vec<f64> {
    let mut result = vec![f64::NAN; values.len()];
    let min_periods = min_periods.max(1);

    let mut mean = f64::NAN;
    let mut old_weight = 1.0;
    let mut observations = 0usize;
    for (i, &x) in values.iter().enumerate() {
        let observed = !x.is_nan();
        if observed {
            observations += 1;
        }

        if mean.is_nan() {
            if observed {
                mean = x;
            }
        } else {
            old_weight *= 1.0 - alpha;
            if observed {
                mean = (old_weight * mean + alpha * x) / (old_weight + alpha);
                old_weight = 1.0;
            }
        }

        if observations >= min_periods {
            result[i] = mean;
        }
    }

    result
}

/// Exponential moving average with `alpha = 2 / (span + 1)`. First value at
/// index `span - 1`.
pub fn ema_of_series(values: &[f64], span: usize) -> Vec<f64> {
    if span == 0 {
        return vec![f64::NAN; values.len()];
    }
    ewm(values, 2.0 / (span as f64 + 1.0), span)
}

/// True range. TR[0] = high - low (no previous close).
/// TR[t] = max(high-low, |high-prev_close|, |low-prev_close|), skipping NaN
/// terms; NaN only when every term is NaN.
pub fn true_range(bars: &[RawBar]) -> Vec<f64> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let range = bar.high - bar.low;
            match i {
                0 => range,
                // f64::max returns the non-NaN operand
                _ => {
                    let pc = bars[i - 1].close;
                    range.max((bar.high - pc).abs()).max((bar.low - pc).abs())
                }
            }
        })
        .collect()
}

/// Wilder smoothing: [`ewm`] with `alpha = 1/period` and `period` warmup
/// observations.
pub fn wilder_smooth(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 {
        return vec![f64::NAN; values.len()];
    }
    ewm(values, 1.0 / period as f64, period)
}

/// Wilder ATR over the true range, TR[0] included. First value at index
/// `period - 1`.
pub fn wilder_atr(bars: &[RawBar], period: usize) -> Vec<f64> {
    wilder_smooth(&true_range(bars), period)
}

/// Wilder RSI on closes. The first delta is undefined, so the first value
/// lands at index `period`. Zero average loss gives 100.
pub fn rsi(close: &[f64], period: usize) -> Vec<f64> {
    let delta = diff(close);
    // NaN must survive the clip; f64::max would turn it into 0.0
    let gain: Vec<f64> = delta
        .iter()
        .map(|&d| if d.is_nan() { d } else { d.max(0.0) })
        .collect();
    let loss: Vec<f64> = delta
        .iter()
        .map(|&d| if d.is_nan() { d } else { (-d).max(0.0) })
        .collect();

    wilder_smooth(&gain, period)
        .into_iter()
        .zip(wilder_smooth(&loss, period))
        .map(|(g, l)| 100.0 - 100.0 / (1.0 + g / l))
        .collect()
}

/// One-step log return `ln(c[t]) - ln(c[t-1])`; NaN at index 0.
pub fn log_return(close: &[f64]) -> Vec<f64> {
    let logs: Vec<f64> = close.iter().map(|c| c.ln()).collect();
    diff(&logs)
}

/// Rolling sample standard deviation (n - 1 denominator). NaN until the
/// window is full and while the window holds a NaN.
pub fn rolling_std(values: &[f64], window: usize) -> Vec<f64> {
    let mut result = vec![f64::NAN; values.len()];
    if window < 2 {
        return result;
    }

    for end in window..=values.len() {
        let w = &values[end - window..end];
        if w.iter().any(|v| v.is_nan()) {
            continue;
        }
        let mean = w.iter().sum::<f64>() / window as f64;
        let var = w.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (window - 1) as f64;
        result[end - 1] = var.sqrt();
    }

    result
}

fn diff(values: &[f64]) -> Vec<f64> {
    std::iter::once(f64::NAN)
        .chain(values.windows(2).map(|w| w[1] - w[0]))
        .take(values.len())
        .collect()
}

/// Rolling VWAP approximation: sum(typical_price * volume) / sum(volume)
/// over the window. Zero volume in a full window yields NaN.
pub fn rolling_vwap(bars: &[RawBar], window: usize) -> Vec<f64> {
    let pv: Vec<f64> = bars.iter().map(|b| b.typical_price() * b.volume).collect();
    let vol: Vec<f64> = bars.iter().map(|b| b.volume).collect();

    rolling_sum(&pv, window)
        .into_iter()
        .zip(rolling_sum(&vol, window))
        .map(|(pv_sum, v_sum)| if v_sum > 0.0 { pv_sum / v_sum } else { f64::NAN })
        .collect()
}

/// Current volume over its trailing SMA (window includes the current bar).
pub fn vol_ratio(volume: &[f64], window: usize) -> Vec<f64> {
    volume
        .iter()
        .zip(sma(volume, window))
        .map(|(&v, avg)| if avg > 0.0 { v / avg } else { f64::NAN })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-10;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < EPS,
            "actual={actual}, expected={expected}"
        );
    }

    fn raw(data: &[(f64, f64, f64, f64)]) -> Vec<RawBar> {
        data.iter()
            .enumerate()
            .map(|(i, &(high, low, close, volume))| RawBar {
                ts: i as i64 * 60,
                open: close,
                high,
                low,
                close,
                volume,
            })
            .collect()
    }

    #[test]
    fn sma_known_values() {
        let out = sma(&[1.0, 2.0, 3.0, 4.0], 2);
        assert!(out[0].is_nan());
        assert_approx(out[1], 1.5);
        assert_approx(out[2], 2.5);
        assert_approx(out[3], 3.5);
    }

    #[test]
    fn rolling_sum_recovers_after_nan_leaves_window() {
        let out = rolling_sum(&[1.0, f64::NAN, 3.0, 4.0, 5.0], 2);
        assert!(out[1].is_nan());
        assert!(out[2].is_nan());
        assert_approx(out[3], 7.0);
        assert_approx(out[4], 9.0);
    }

    #[test]
    fn ema_seeds_from_first_value() {
        // alpha = 2/3: 1 -> 5/3 -> 23/9, first value after `span` observations
        let out = ema_of_series(&[1.0, 2.0, 3.0], 2);
        assert!(out[0].is_nan());
        assert_approx(out[1], 5.0 / 3.0);
        assert_approx(out[2], 23.0 / 9.0);
    }

    #[test]
    fn ema_3_known_values() {
        // alpha = 0.5: 10, 10.5, 11.25, 12.125, 13.0625
        let out = ema_of_series(&[10.0, 11.0, 12.0, 13.0, 14.0], 3);
        assert!(out[1].is_nan());
        assert_approx(out[2], 11.25);
        assert_approx(out[3], 12.125);
        assert_approx(out[4], 13.0625);
    }

    #[test]
    fn ewm_carries_mean_across_nan() {
        // Skipped step decays the old weight to 0.25 before 3.0 arrives
        let out = ewm(&[1.0, f64::NAN, 3.0], 0.5, 1);
        assert_approx(out[0], 1.0);
        assert_approx(out[1], 1.0);
        assert_approx(out[2], 7.0 / 3.0);
    }

    #[test]
    fn ewm_leading_nan_delays_seed() {
        let out = ewm(&[f64::NAN, 4.0, 2.0], 0.5, 2);
        assert!(out[0].is_nan());
        assert!(out[1].is_nan());
        assert_approx(out[2], 3.0);
    }

    #[test]
    fn true_range_uses_gap() {
        let bars = raw(&[(102.0, 97.0, 100.0, 1.0), (115.0, 108.0, 112.0, 1.0)]);
        let tr = true_range(&bars);
        assert_approx(tr[0], 5.0);
        assert_approx(tr[1], 15.0);
    }

    #[test]
    fn atr_period_3() {
        let bars = raw(&[
            (105.0, 95.0, 102.0, 1.0),  // TR = 10
            (108.0, 100.0, 106.0, 1.0), // TR = 8
            (107.0, 98.0, 99.0, 1.0),   // TR = 9
            (103.0, 97.0, 101.0, 1.0),  // TR = 6
            (106.0, 100.0, 105.0, 1.0), // TR = 6
        ]);
        let atr = wilder_atr(&bars, 3);
        assert!(atr[1].is_nan());
        assert_approx(atr[2], 83.0 / 9.0);
        assert_approx(atr[3], 220.0 / 27.0);
        assert_approx(atr[4], 602.0 / 81.0);
    }

    #[test]
    fn true_range_skips_nan_terms() {
        let bars = raw(&[(102.0, 97.0, 100.0, 1.0), (f64::NAN, 96.0, 98.0, 1.0)]);
        let tr = true_range(&bars);
        assert_approx(tr[1], 4.0);
    }

    #[test]
    fn rsi_known_values() {
        // gains 1, 1, 0 and losses 0, 0, 1 with alpha = 0.5
        let out = rsi(&[1.0, 2.0, 3.0, 2.0], 2);
        assert!(out[1].is_nan());
        assert_approx(out[2], 100.0);
        assert_approx(out[3], 50.0);
    }

    #[test]
    fn flat_closes_have_undefined_rsi() {
        let out = rsi(&[5.0, 5.0, 5.0, 5.0], 2);
        assert!(out.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn log_return_known_values() {
        let out = log_return(&[1.0, std::f64::consts::E, 1.0]);
        assert!(out[0].is_nan());
        assert_approx(out[1], 1.0);
        assert_approx(out[2], -1.0);
        assert!(log_return(&[]).is_empty());
    }

    #[test]
    fn rolling_std_is_sample_std() {
        let out = rolling_std(&[1.0, 2.0, 4.0, f64::NAN, 5.0], 2);
        assert!(out[0].is_nan());
        assert_approx(out[1], 0.5f64.sqrt());
        assert_approx(out[2], 2.0f64.sqrt());
        assert!(out[3].is_nan());
        assert!(out[4].is_nan());
        assert!(rolling_std(&[1.0, 2.0], 1).iter().all(|v| v.is_nan()));
    }

    #[test]
    fn vwap_weights_by_volume() {
        // typical prices 10 and 20, volumes 1 and 3
        let bars = raw(&[(10.0, 10.0, 10.0, 1.0), (20.0, 20.0, 20.0, 3.0)]);
        let vwap = rolling_vwap(&bars, 2);
        assert!(vwap[0].is_nan());
        assert_approx(vwap[1], 17.5);
    }

    #[test]
    fn vwap_zero_volume_is_nan() {
        let bars = raw(&[(10.0, 10.0, 10.0, 0.0), (20.0, 20.0, 20.0, 0.0)]);
        assert!(rolling_vwap(&bars, 2)[1].is_nan());
    }

    #[test]
    fn vol_ratio_against_trailing_mean() {
        let out = vol_ratio(&[100.0, 100.0, 400.0], 3);
        assert!(out[1].is_nan());
        assert_approx(out[2], 2.0);
    }
}
