//! Weak-reversal extended rule family.

use crate::domain::indicator::IndicatorSeries;
use crate::domain::signal::{per_row, trailing_min, AuxInputs};

/// Winner percentage collapses below 1% yesterday and recovers above 35%
/// today. Requires the external chip feed; all false without it.
pub fn hlp3(series: &IndicatorSeries, aux: &AuxInputs) -> Vec<bool> {
    let n = series.len();
    let Some(winner) = aux.winner_pct.as_ref() else {
        return vec![false; n];
    };
    (0..n)
        .map(|i| i >= 1 && winner[i - 1] < 1.0 && winner[i] > 35.0)
        .collect()
}

/// An extreme volume shrink within the last 5 bars, resolved by a volume
/// breakout on an up close.
pub fn limit_bo(series: &IndicatorSeries, _aux: &AuxInputs) -> Vec<bool> {
    per_row(series, |rows, i| {
        if i < 4 {
            return false;
        }
        let setup = rows[i - 4..=i]
            .iter()
            .any(|r| r.bar.volume < 0.5 * r.vol_ma20);
        let r = &rows[i];
        setup && r.bar.volume > r.vol_ma20 && r.bar.up_close()
    })
}

/// RSI(2) below 25 on two consecutive bars while the close holds above
/// the long EMA.
pub fn rsi_rev(series: &IndicatorSeries, _aux: &AuxInputs) -> Vec<bool> {
    per_row(series, |rows, i| {
        if i == 0 {
            return false;
        }
        let r = &rows[i];
        r.bar.close > r.ema200 && r.rsi2 < 25.0 && rows[i - 1].rsi2 < 25.0
    })
}

/// Price sits at its 20-bar low while the signed 10-bar money flow is
/// still positive.
pub fn money_flow(series: &IndicatorSeries, _aux: &AuxInputs) -> Vec<bool> {
    let rows = &series.rows;
    let n = rows.len();

    let mut flow = vec![f64::NAN; n];
    for i in 1..n {
        let prev_close = rows[i - 1].bar.close;
        let delta = rows[i].bar.close - prev_close;
        let up = (delta / prev_close).max(0.0);
        let down = (-delta / prev_close).max(0.0);
        flow[i] = rows[i].bar.volume * up * 100.0 - rows[i].bar.volume * down * 100.0;
    }

    (0..n)
        .map(|i| {
            let at_low = {
                let low20 = trailing_min(rows, i, 20, |r| r.bar.close);
                rows[i].bar.close == low20
            };
            if !at_low || i + 1 < 10 {
                return false;
            }
            let net: f64 = flow[i + 1 - 10..=i].iter().sum();
            net > 0.0
        })
        .collect()
}

/// A bar on at least double the prior bar's volume latches its low;
/// fires while the close holds that low and volume re-expands on an up
/// close.
pub fn double_vol(series: &IndicatorSeries, _aux: &AuxInputs) -> Vec<bool> {
    let rows = &series.rows;
    let mut latched_low = f64::NAN;
    let mut out = Vec::with_capacity(rows.len());
    for (i, r) in rows.iter().enumerate() {
        if i >= 1 && r.bar.volume > 2.0 * rows[i - 1].bar.volume {
            latched_low = r.bar.low;
        }
        let holding = r.bar.close > latched_low;
        out.push(holding && r.bar.volume > r.vol_ma20 && r.bar.up_close());
    }
    out
}
