//! Stochastic-family oscillators: KDJ, Williams %R, CCI.

use crate::domain::bar::Bar;
use crate::domain::indicator::ema::ewm_com;
use crate::domain::indicator::rolling::{rolling_mad, rolling_max, rolling_mean, rolling_min};

pub const KDJ_WINDOW: usize = 9;
pub const KDJ_COM: f64 = 2.0;
pub const WR_WINDOW: usize = 14;
pub const CCI_WINDOW: usize = 14;

pub struct KdjColumns {
    pub k: Vec<f64>,
    pub d: Vec<f64>,
    pub j: Vec<f64>,
}

/// KDJ(9,3,3). RSV is the close's position inside the 9-bar high/low
/// channel; K and D are EMA smoothings of RSV with com = 2; J = 3K - 2D.
pub fn compute_kdj(bars: &[Bar]) -> KdjColumns {
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();

    let hh = rolling_max(&highs, KDJ_WINDOW);
    let ll = rolling_min(&lows, KDJ_WINDOW);

    let rsv: Vec<f64> = bars
        .iter()
        .enumerate()
        .map(|(i, b)| (b.close - ll[i]) / (hh[i] - ll[i]) * 100.0)
        .collect();

    let k = ewm_com(&rsv, KDJ_COM);
    let d = ewm_com(&k, KDJ_COM);
    let j: Vec<f64> = k.iter().zip(&d).map(|(k, d)| 3.0 * k - 2.0 * d).collect();

    KdjColumns { k, d, j }
}

/// Williams %R over 14 bars: 0 at the channel high, -100 at the low.
pub fn compute_wr(bars: &[Bar]) -> Vec<f64> {
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();

    let hh = rolling_max(&highs, WR_WINDOW);
    let ll = rolling_min(&lows, WR_WINDOW);

    bars.iter()
        .enumerate()
        .map(|(i, b)| (hh[i] - b.close) / (hh[i] - ll[i]) * -100.0)
        .collect()
}

/// Commodity Channel Index over 14 bars of typical price.
pub fn compute_cci(bars: &[Bar]) -> Vec<f64> {
    let tp: Vec<f64> = bars.iter().map(|b| b.typical_price()).collect();
    let ma = rolling_mean(&tp, CCI_WINDOW);
    let mad = rolling_mad(&tp, CCI_WINDOW);

    tp.iter()
        .enumerate()
        .map(|(i, t)| (t - ma[i]) / (0.015 * mad[i]))
        .collect()
}
