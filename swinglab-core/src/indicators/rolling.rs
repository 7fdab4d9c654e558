//! Rolling window extrema.

/// Rolling maximum of `values` over `period`.
///
/// Output at index i covers the window [i+1-period, i]. NaN in the window
/// makes the output NaN, matching the other indicators.
pub fn rolling_max(values: &[f64], period: usize) -> Vec<f64> {
    assert!(period >= 1, "rolling_max period must be >= 1");

    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if n < period {
        return result;
    }

    for i in (period - 1)..n {
        let window = &values[i + 1 - period..=i];
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        result[i] = window.iter().cloned().fold(f64::MIN, f64::max);
    }

    result
}
