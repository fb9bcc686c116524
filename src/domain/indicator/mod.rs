//! Indicator Engine: maps a bar series to itself augmented with derived
//! columns.
//!
//! `compute_indicators` is a pure function; every derived field is NaN
//! until its warm-up history exists, and NaN/inf from malformed input
//! flow through the arithmetic unchanged (rule evaluation treats them as
//! false). Rolling fields use trailing windows only; nothing reads
//! ahead of the row being computed.

pub mod bollinger;
pub mod cyc;
pub mod ema;
pub mod macd;
pub mod oscillator;
pub mod rking;
pub mod rolling;
pub mod rsi;

use crate::domain::bar::Bar;
use bollinger::compute_bollinger;
use cyc::compute_cyc;
use ema::ewm_span;
use macd::compute_macd;
use oscillator::{compute_cci, compute_kdj, compute_wr};
use rking::compute_rking;
use rolling::{pct_change, rolling_max, rolling_mean, rolling_min, rolling_std};
use rsi::compute_rsi;

/// One bar plus every derived column. `f64::NAN` marks "not yet defined";
/// `rking_state` is the trend latch in {-1, 0, +1}.
#[derive(Debug, Clone)]
pub struct IndicatorRow {
    pub bar: Bar,

    pub ma5: f64,
    pub ma20: f64,
    pub ma250: f64,
    pub vol_ma20: f64,

    pub dif: f64,
    pub dea: f64,
    pub macd_hist: f64,
    pub macd_hist_ma5: f64,

    pub boll_mid: f64,
    pub boll_upper: f64,
    pub boll_lower: f64,

    pub rsi2: f64,
    pub rsi6: f64,

    pub cyc_13: f64,
    pub cyc_inf: f64,

    pub ret_20: f64,
    pub high_52: f64,
    pub max_vol_250: f64,
    pub low_20: f64,

    pub ema15: f64,
    pub ema200: f64,
    pub ema_high_15: f64,

    pub std20: f64,
    pub std60: f64,
    pub std120: f64,

    pub body: f64,
    pub upper_shadow: f64,
    pub lower_shadow: f64,
    pub range: f64,

    pub k: f64,
    pub d: f64,
    pub j: f64,
    pub wr: f64,
    pub cci: f64,

    pub rking_upper: f64,
    pub rking_lower: f64,
    pub rking_state: i8,
}

#[derive(Debug, Clone, Default)]
pub struct IndicatorSeries {
    pub rows: Vec<IndicatorRow>,
}

impl IndicatorSeries {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The 250-bar rolling extrema dominate every other warm-up.
pub const MAX_WARMUP_BARS: usize = 250;

pub fn compute_indicators(bars: &[Bar]) -> IndicatorSeries {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
    let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();

    let ma5 = rolling_mean(&closes, 5);
    let ma20 = rolling_mean(&closes, 20);
    let ma250 = rolling_mean(&closes, 250);
    let vol_ma20 = rolling_mean(&volumes, 20);

    let macd = compute_macd(&closes);
    let macd_hist_ma5 = rolling_mean(&macd.hist, 5);

    let boll = compute_bollinger(&closes);

    let rsi2 = compute_rsi(&closes, 2);
    let rsi6 = compute_rsi(&closes, 6);

    let cyc = compute_cyc(bars);

    let ret_20 = pct_change(&closes, 20);
    let high_52 = rolling_max(&highs, 250);
    let max_vol_250 = rolling_max(&volumes, 250);
    let low_20 = rolling_min(&lows, 20);

    let ema15 = ewm_span(&closes, 15);
    let ema200 = ewm_span(&closes, 200);
    let ema_high_15 = ewm_span(&highs, 15);

    let std20 = rolling_std(&closes, 20);
    let std60 = rolling_std(&closes, 60);
    let std120 = rolling_std(&closes, 120);

    let kdj = compute_kdj(bars);
    let wr = compute_wr(bars);
    let cci = compute_cci(bars);

    let rking = compute_rking(bars);

    let rows = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| IndicatorRow {
            bar: bar.clone(),
            ma5: ma5[i],
            ma20: ma20[i],
            ma250: ma250[i],
            vol_ma20: vol_ma20[i],
            dif: macd.dif[i],
            dea: macd.dea[i],
            macd_hist: macd.hist[i],
            macd_hist_ma5: macd_hist_ma5[i],
            boll_mid: boll.mid[i],
            boll_upper: boll.upper[i],
            boll_lower: boll.lower[i],
            rsi2: rsi2[i],
            rsi6: rsi6[i],
            cyc_13: cyc.short[i],
            cyc_inf: cyc.infinite[i],
            ret_20: ret_20[i],
            high_52: high_52[i],
            max_vol_250: max_vol_250[i],
            low_20: low_20[i],
            ema15: ema15[i],
            ema200: ema200[i],
            ema_high_15: ema_high_15[i],
            std20: std20[i],
            std60: std60[i],
            std120: std120[i],
            body: bar.body(),
            upper_shadow: bar.upper_shadow(),
            lower_shadow: bar.lower_shadow(),
            range: bar.range(),
            k: kdj.k[i],
            d: kdj.d[i],
            j: kdj.j[i],
            wr: wr[i],
            cci: cci[i],
            rking_upper: rking.upper[i],
            rking_lower: rking.lower[i],
            rking_state: rking.state[i],
        })
        .collect();

    IndicatorSeries { rows }
}
