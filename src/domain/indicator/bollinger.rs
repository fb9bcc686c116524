//! Bollinger bands: MA20 envelope at ±2 sample standard deviations.

use crate::domain::indicator::rolling::{rolling_mean, rolling_std};

pub const PERIOD: usize = 20;
pub const WIDTH: f64 = 2.0;

pub struct BollingerColumns {
    pub mid: Vec<f64>,
    pub upper: Vec<f64>,
    pub lower: Vec<f64>,
}

pub fn compute_bollinger(closes: &[f64]) -> BollingerColumns {
    let mid = rolling_mean(closes, PERIOD);
    let std = rolling_std(closes, PERIOD);

    let upper: Vec<f64> = mid.iter().zip(&std).map(|(m, s)| m + WIDTH * s).collect();
    let lower: Vec<f64> = mid.iter().zip(&std).map(|(m, s)| m - WIDTH * s).collect();

    BollingerColumns { mid, upper, lower }
}
