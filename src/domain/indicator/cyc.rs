//! Synthetic cost-basis averages from traded value and volume.
//!
//! CYC_13  = sum(amount, 13) / sum(volume, 13)
//! CYC_Inf = cumulative amount / cumulative volume from the first row of
//!           the fed series
//!
//! A zero volume is treated as missing before summation so it can never
//! drag the average toward zero. A row with a missing amount (or missing
//! adjusted volume) emits NaN and does not advance the cumulative sums,
//! keeping "missing" from biasing the whole-history average. CYC_Inf is
//! an explicit fold carrying running sums; its value at row t depends on
//! every prior row fed in, so callers must supply warm-up history.

use crate::domain::bar::Bar;
use crate::domain::indicator::rolling::rolling_sum;

pub const SHORT_WINDOW: usize = 13;

pub struct CycColumns {
    pub short: Vec<f64>,
    pub infinite: Vec<f64>,
}

pub fn compute_cyc(bars: &[Bar]) -> CycColumns {
    let amounts: Vec<f64> = bars
        .iter()
        .map(|b| b.amount.unwrap_or(f64::NAN))
        .collect();
    let volumes: Vec<f64> = bars
        .iter()
        .map(|b| if b.volume == 0.0 { f64::NAN } else { b.volume })
        .collect();

    let amt_13 = rolling_sum(&amounts, SHORT_WINDOW);
    let vol_13 = rolling_sum(&volumes, SHORT_WINDOW);
    let short: Vec<f64> = amt_13.iter().zip(&vol_13).map(|(a, v)| a / v).collect();

    let mut infinite = vec![f64::NAN; bars.len()];
    let mut amt_sum = 0.0;
    let mut vol_sum = 0.0;
    for i in 0..bars.len() {
        if amounts[i].is_nan() || volumes[i].is_nan() {
            continue;
        }
        amt_sum += amounts[i];
        vol_sum += volumes[i];
        infinite[i] = amt_sum / vol_sum;
    }

    CycColumns { short, infinite }
}
