//! Synthetic-candle trend channel with a cross-triggered latch.
//!
//! A Heikin-Ashi-style open is rebuilt from the prior bar's midpoint,
//! widened into a channel by the 8-bar mean synthetic range around the
//! 5-bar close mean. The latch flips to +1 when the close crosses above
//! the upper band, to -1 when the lower band crosses above the close,
//! and otherwise carries the last emitted value (0 before the first
//! cross in the fed series). The state is a fold over the ordered
//! series, not a windowed recomputation.

use crate::domain::bar::Bar;
use crate::domain::indicator::rolling::rolling_mean;

pub const RANGE_WINDOW: usize = 8;
pub const CLOSE_WINDOW: usize = 5;

pub struct RkingColumns {
    pub upper: Vec<f64>,
    pub lower: Vec<f64>,
    pub state: Vec<i8>,
}

pub fn compute_rking(bars: &[Bar]) -> RkingColumns {
    let n = bars.len();

    let mut x_open = vec![f64::NAN; n];
    for i in 1..n {
        x_open[i] = (bars[i - 1].open + bars[i - 1].close) / 2.0;
    }

    let x_close: Vec<f64> = bars.iter().map(|b| b.close).collect();

    // max/min against a NaN synthetic open stay NaN
    let spans: Vec<f64> = bars
        .iter()
        .enumerate()
        .map(|(i, b)| {
            if x_open[i].is_nan() {
                f64::NAN
            } else {
                b.high.max(x_open[i]) - b.low.min(x_open[i])
            }
        })
        .collect();

    let volatility = rolling_mean(&spans, RANGE_WINDOW);
    let close_mean = rolling_mean(&x_close, CLOSE_WINDOW);

    let upper: Vec<f64> = close_mean
        .iter()
        .zip(&volatility)
        .map(|(m, v)| m + v / 2.0)
        .collect();
    let lower: Vec<f64> = close_mean
        .iter()
        .zip(&volatility)
        .map(|(m, v)| m - v / 2.0)
        .collect();

    let mut state = vec![0i8; n];
    let mut last = 0i8;
    for i in 1..n {
        let buy = x_close[i] > upper[i] && x_close[i - 1] <= upper[i - 1];
        let sell = lower[i] > x_close[i] && lower[i - 1] <= x_close[i - 1];
        if buy {
            last = 1;
        } else if sell {
            last = -1;
        }
        state[i] = last;
    }

    RkingColumns {
        upper,
        lower,
        state,
    }
}
