//! Column-level numeric helpers. All of them keep the input length and use
//! `NaN` for positions that are undefined.

/// Simple returns `x[t] / x[t-1] - 1`; position 0 is missing.
///
/// Missing prices are forward-filled first, as pandas' `pct_change()` does
/// by default: the return on a gap day is `0` and the next return spans the
/// gap. Missing prices before the first present one stay missing.
pub fn pct_change(values: &[f64]) -> Vec<f64> {
    let filled = forward_fill(values);
    let mut out = Vec::with_capacity(filled.len());
    if filled.is_empty() {
        return out;
    }
    out.push(f64::NAN);
    out.extend(filled.windows(2).map(|w| w[1] / w[0] - 1.0));
    out
}

/// Replaces each missing value with the last present one before it.
fn forward_fill(values: &[f64]) -> Vec<f64> {
    let mut last = f64::NAN;
    values
        .iter()
        .map(|&v| {
            if !v.is_nan() {
                last = v;
            }
            last
        })
        .collect()
}

/// Moves values `periods` positions later, filling the head with `NaN`.
pub fn shift(values: &[f64], periods: usize) -> Vec<f64> {
    let n = values.len();
    let mut out = vec![f64::NAN; n];
    if periods < n {
        out[periods..].copy_from_slice(&values[..n - periods]);
    }
    out
}

/// Running product that skips missing values: a missing input stays missing
/// at its own position and does not reset the product.
pub fn cumprod_skipna(values: &[f64]) -> Vec<f64> {
    let mut acc = 1.0;
    values
        .iter()
        .map(|&v| {
            if v.is_nan() {
                f64::NAN
            } else {
                acc *= v;
                acc
            }
        })
        .collect()
}

/// Sample standard deviation (`ddof = 1`) of each trailing window of
/// `window` values. Defined only when the whole window is present.
pub fn rolling_std(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    let mut out = vec![f64::NAN; n];
    if window < 2 || window > n {
        return out;
    }
    for end in window..=n {
        let slice = &values[end - window..end];
        if slice.iter().any(|v| v.is_nan()) {
            continue;
        }
        out[end - 1] = sample_std(slice);
    }
    out
}

/// Sample standard deviation; `NaN` for fewer than two values.
pub fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return f64::NAN;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let ss: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    (ss / (n as f64 - 1.0)).sqrt()
}

/// Mean of the present values; `NaN` when every value is missing.
pub fn mean_skipna(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 { f64::NAN } else { sum / count as f64 }
}

/// `-1`, `0` or `+1`; missing stays missing.
pub fn sign(v: f64) -> f64 {
    if v.is_nan() {
        f64::NAN
    } else if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}
