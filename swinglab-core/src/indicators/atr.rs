//! Average True Range (ATR).
//!
//! True range per bar: max(high - low, |high - prev_close|, |low - prev_close|)
//! (plain high - low for the first bar). Smoothed with Wilder's method:
//! seed at index period-1 with the SMA of the first `period` true ranges,
//! then ATR[i] = (ATR[i-1] * (period-1) + TR[i]) / period.

use crate::domain::Bar;

/// True range series for `bars`.
pub fn true_range(bars: &[Bar]) -> Vec<f64> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            if i == 0 {
                bar.high - bar.low
            } else {
                let prev_close = bars[i - 1].close;
                (bar.high - bar.low)
                    .max((bar.high - prev_close).abs())
                    .max((bar.low - prev_close).abs())
            }
        })
        .collect()
}

/// Wilder-smoothed ATR of `bars` over `period`.
pub fn atr(bars: &[Bar], period: usize) -> Vec<f64> {
    assert!(period >= 1, "ATR period must be >= 1");

    let n = bars.len();
    let mut result = vec![f64::NAN; n];
    if n < period {
        return result;
    }

    let tr = true_range(bars);

    let mut sum = 0.0;
    for &v in tr.iter().take(period) {
        if v.is_nan() {
            return result;
        }
        sum += v;
    }
    let seed = sum / period as f64;
    result[period - 1] = seed;

    let mut prev = seed;
    for i in period..n {
        if tr[i].is_nan() {
            return result;
        }
        let next = (prev * (period as f64 - 1.0) + tr[i]) / period as f64;
        result[i] = next;
        prev = next;
    }

    result
}
