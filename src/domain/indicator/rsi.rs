//! RSI with simple (not exponential) gain/loss averaging.
//!
//! gain = mean of positive close deltas over trailing n
//! loss = mean of negative close deltas (absolute) over trailing n
//! RSI  = 100 - 100 / (1 + gain/loss)
//!
//! Division follows IEEE semantics: an all-rising window has loss = 0 so
//! the ratio is +inf and RSI collapses to 100; an all-flat window is 0/0
//! = NaN, which downstream rule evaluation treats as false.

use crate::domain::indicator::rolling::{diff, rolling_mean};

pub fn compute_rsi(closes: &[f64], period: usize) -> Vec<f64> {
    let deltas = diff(closes);
    let gains: Vec<f64> = deltas
        .iter()
        .map(|&d| if d.is_nan() { d } else { d.max(0.0) })
        .collect();
    let losses: Vec<f64> = deltas
        .iter()
        .map(|&d| if d.is_nan() { d } else { (-d).max(0.0) })
        .collect();

    let avg_gain = rolling_mean(&gains, period);
    let avg_loss = rolling_mean(&losses, period);

    avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(g, l)| 100.0 - 100.0 / (1.0 + g / l))
        .collect()
}
