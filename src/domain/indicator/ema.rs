//! Exponential moving averages.
//!
//! Seeded recursively from the first finite input value (no bias
//! correction): `ema[t] = x[t]*alpha + ema[t-1]*(1-alpha)`. A NaN input
//! emits the prior accumulator value and leaves it unchanged; positions
//! before the first finite value are NaN.

fn ewm(xs: &[f64], alpha: f64) -> Vec<f64> {
    let mut out = vec![f64::NAN; xs.len()];
    let mut acc = f64::NAN;
    for (i, &x) in xs.iter().enumerate() {
        if x.is_nan() {
            out[i] = acc;
            continue;
        }
        acc = if acc.is_nan() {
            x
        } else {
            x * alpha + acc * (1.0 - alpha)
        };
        out[i] = acc;
    }
    out
}

/// EMA with `alpha = 2 / (span + 1)`.
pub fn ewm_span(xs: &[f64], span: usize) -> Vec<f64> {
    ewm(xs, 2.0 / (span as f64 + 1.0))
}

/// EMA with `alpha = 1 / (1 + com)` (center-of-mass parameterization,
/// used by the KDJ smoothing).
pub fn ewm_com(xs: &[f64], com: f64) -> Vec<f64> {
    ewm(xs, 1.0 / (1.0 + com))
}
