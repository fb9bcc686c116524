//! Strong-attack extended rule family.

use crate::domain::indicator::rolling::{rolling_mean, rolling_std};
use crate::domain::indicator::{IndicatorRow, IndicatorSeries};
use crate::domain::signal::{per_row, trailing_max, AuxInputs};

fn z_value(r: &IndicatorRow) -> f64 {
    if r.std20 == 0.0 {
        f64::NAN
    } else {
        (r.bar.close - r.ma20) / r.std20
    }
}

/// Close between 1.5 and 3 standard deviations above its 20-bar mean.
pub fn z_score(series: &IndicatorSeries, _aux: &AuxInputs) -> Vec<bool> {
    per_row(series, |rows, i| {
        let z = z_value(&rows[i]);
        z > 1.5 && z <= 3.0
    })
}

/// Close more than 3 standard deviations above its 20-bar mean.
pub fn z_overheat(series: &IndicatorSeries, _aux: &AuxInputs) -> Vec<bool> {
    per_row(series, |rows, i| z_value(&rows[i]) > 3.0)
}

/// Relative strength versus the benchmark breaks its own Bollinger
/// upper band. All false without a benchmark series.
pub fn rs(series: &IndicatorSeries, aux: &AuxInputs) -> Vec<bool> {
    let n = series.len();
    let Some(bench) = aux.benchmark_close.as_ref() else {
        return vec![false; n];
    };

    let ratio: Vec<f64> = series
        .rows
        .iter()
        .zip(bench)
        .map(|(r, b)| r.bar.close / b * 1000.0)
        .collect();
    let ma = rolling_mean(&ratio, 20);
    let std = rolling_std(&ratio, 20);
    let upper: Vec<f64> = ma.iter().zip(&std).map(|(m, s)| m + 2.0 * s).collect();

    (0..n)
        .map(|i| i >= 1 && ratio[i] > upper[i] && ratio[i - 1] <= upper[i - 1])
        .collect()
}

/// MACD histogram flips positive while price rides the upper band above
/// MA20.
pub fn dtr_plus(series: &IndicatorSeries, _aux: &AuxInputs) -> Vec<bool> {
    per_row(series, |rows, i| {
        if i == 0 {
            return false;
        }
        let r = &rows[i];
        r.macd_hist > 0.0
            && rows[i - 1].macd_hist <= 0.0
            && r.bar.close > r.ma20
            && r.bar.close >= r.boll_upper
    })
}

/// Positive histogram with simultaneous 52-bar price and volume highs,
/// both computed excluding today.
pub fn fighting_v2(series: &IndicatorSeries, _aux: &AuxInputs) -> Vec<bool> {
    per_row(series, |rows, i| {
        if i == 0 {
            return false;
        }
        let r = &rows[i];
        let prior_high = trailing_max(rows, i - 1, 52, |r| r.bar.high);
        let prior_vol = trailing_max(rows, i - 1, 52, |r| r.bar.volume);
        r.macd_hist > 0.0 && r.bar.close > prior_high && r.bar.volume > prior_vol
    })
}

/// First close above the high latched at the most recent 250-bar
/// maximum-volume day; the max-volume day itself never fires.
pub fn ua_v2(series: &IndicatorSeries, _aux: &AuxInputs) -> Vec<bool> {
    let rows = &series.rows;
    let is_anchor: Vec<bool> = rows
        .iter()
        .map(|r| !r.max_vol_250.is_nan() && r.bar.volume >= r.max_vol_250)
        .collect();

    let mut target = f64::NAN;
    let mut prev_breakout = false;
    let mut out = Vec::with_capacity(rows.len());
    for (i, r) in rows.iter().enumerate() {
        if is_anchor[i] {
            target = r.bar.high;
        }
        let breakout = r.bar.close > target && !is_anchor[i];
        out.push(breakout && !prev_breakout);
        prev_breakout = breakout;
    }
    out
}

/// Distance above the long EMA (red line) crosses above distance below
/// the 50-bar high (yellow line).
pub fn hmc_v2(series: &IndicatorSeries, _aux: &AuxInputs) -> Vec<bool> {
    let rows = &series.rows;
    let red: Vec<f64> = rows.iter().map(|r| r.bar.close - r.ema200).collect();
    let yellow: Vec<f64> = (0..rows.len())
        .map(|i| trailing_max(rows, i, 50, |r| r.bar.high) - rows[i].bar.close)
        .collect();

    (0..rows.len())
        .map(|i| i >= 1 && red[i] > yellow[i] && red[i - 1] <= yellow[i - 1])
        .collect()
}
