//! Simple Moving Average (SMA).
//!
//! Rolling mean over a lookback window. First valid value at index
//! period - 1; any NaN inside the window makes that window's output NaN.

/// Rolling mean of `values` over `period`.
///
/// O(n): maintains a running sum plus a count of NaNs currently in the
/// window, so NaN inputs poison exactly the windows that contain them.
pub fn sma(values: &[f64], period: usize) -> Vec<f64> {
    assert!(period >= 1, "SMA period must be >= 1");

    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if n < period {
        return result;
    }

    let mut sum = 0.0;
    let mut nan_in_window = 0usize;

    for i in 0..n {
        let entering = values[i];
        if entering.is_nan() {
            nan_in_window += 1;
        } else {
            sum += entering;
        }

        if i >= period {
            let leaving = values[i - period];
            if leaving.is_nan() {
                nan_in_window -= 1;
            } else {
                sum -= leaving;
            }
        }

        if i + 1 >= period && nan_in_window == 0 {
            result[i] = sum / period as f64;
        }
    }

    result
}
