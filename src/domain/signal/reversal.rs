//! Oversold/reversal rule family.

use crate::domain::indicator::IndicatorSeries;
use crate::domain::signal::{per_row, trailing_count, trailing_max, AuxInputs};

/// Volume below half its 20-bar average.
pub fn limit(series: &IndicatorSeries, _aux: &AuxInputs) -> Vec<bool> {
    per_row(series, |rows, i| {
        let r = &rows[i];
        r.bar.volume < 0.5 * r.vol_ma20
    })
}

/// Close crosses up through the Bollinger mid while the high tags the
/// upper band.
pub fn boll_rev(series: &IndicatorSeries, _aux: &AuxInputs) -> Vec<bool> {
    per_row(series, |rows, i| {
        if i == 0 {
            return false;
        }
        let (prev, r) = (&rows[i - 1], &rows[i]);
        r.bar.close > r.boll_mid
            && prev.bar.close <= prev.boll_mid
            && r.bar.high >= r.boll_upper
    })
}

/// RSI(2) below 10 on the two bars ending yesterday, in a long-term
/// uptrend: the signal fires on the third day.
pub fn rsi2_rev(series: &IndicatorSeries, _aux: &AuxInputs) -> Vec<bool> {
    per_row(series, |rows, i| {
        if i < 2 {
            return false;
        }
        rows[i - 1].rsi2 < 10.0 && rows[i - 2].rsi2 < 10.0 && rows[i].bar.close > rows[i].ma250
    })
}

/// Low breaks the prior 20-bar low but the close recovers above it.
pub fn two_b(series: &IndicatorSeries, _aux: &AuxInputs) -> Vec<bool> {
    per_row(series, |rows, i| {
        if i == 0 {
            return false;
        }
        let support = rows[i - 1].low_20;
        rows[i].bar.low < support && rows[i].bar.close > support
    })
}

/// Volume below average on more than 70% of the trailing 60 bars, then a
/// close above the prior 20-bar high.
pub fn wyckoff(series: &IndicatorSeries, _aux: &AuxInputs) -> Vec<bool> {
    per_row(series, |rows, i| {
        let accumulation = trailing_count(rows, i, 60, |r| r.bar.volume < r.vol_ma20)
            .map(|c| c as f64 > 60.0 * 0.7)
            .unwrap_or(false);
        if !accumulation || i == 0 {
            return false;
        }
        let prior_high = trailing_max(rows, i - 1, 20, |r| r.bar.high);
        rows[i].bar.close > prior_high
    })
}

/// 2B breakdown-and-recovery on shrinking volume.
pub fn spring(series: &IndicatorSeries, _aux: &AuxInputs) -> Vec<bool> {
    per_row(series, |rows, i| {
        if i == 0 {
            return false;
        }
        let support = rows[i - 1].low_20;
        let r = &rows[i];
        r.bar.low < support && r.bar.close > support && r.bar.volume < r.vol_ma20
    })
}

/// Lower shadow dominates the candle: 3x the body and 60% of the range.
pub fn pinbar(series: &IndicatorSeries, _aux: &AuxInputs) -> Vec<bool> {
    per_row(series, |rows, i| {
        let r = &rows[i];
        r.lower_shadow > 3.0 * r.body && r.lower_shadow > 0.6 * r.range
    })
}

/// Volatility compressed against both longer horizons while price went
/// nowhere.
pub fn es(series: &IndicatorSeries, _aux: &AuxInputs) -> Vec<bool> {
    per_row(series, |rows, i| {
        let r = &rows[i];
        r.std20 < r.std60 && r.std20 < r.std120 && r.ret_20.abs() < 0.1
    })
}
