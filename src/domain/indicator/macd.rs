//! MACD oscillator columns.
//!
//! DIF = EMA(close,12) - EMA(close,26)
//! DEA = EMA(DIF,9)
//! Histogram = 2 * (DIF - DEA)
//!
//! EMAs are recursion-seeded from the series start, so the columns are
//! numerically defined from bar 0 but only meaningful after the slow EMA
//! warm-up (~26 bars).

use crate::domain::indicator::ema::ewm_span;

pub const FAST: usize = 12;
pub const SLOW: usize = 26;
pub const SIGNAL: usize = 9;

pub struct MacdColumns {
    pub dif: Vec<f64>,
    pub dea: Vec<f64>,
    pub hist: Vec<f64>,
}

pub fn compute_macd(closes: &[f64]) -> MacdColumns {
    let ema_fast = ewm_span(closes, FAST);
    let ema_slow = ewm_span(closes, SLOW);

    let dif: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| f - s)
        .collect();
    let dea = ewm_span(&dif, SIGNAL);
    let hist: Vec<f64> = dif.iter().zip(&dea).map(|(d, e)| 2.0 * (d - e)).collect();

    MacdColumns { dif, dea, hist }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_series_is_flat() {
        let closes = vec![50.0; 60];
        let m = compute_macd(&closes);
        for i in 0..60 {
            assert!(m.dif[i].abs() < 1e-12);
            assert!(m.dea[i].abs() < 1e-12);
            assert!(m.hist[i].abs() < 1e-12);
        }
    }

    #[test]
    fn hist_is_twice_dif_minus_dea() {
        let closes: Vec<f64> = (0..80).map(|i| 100.0 + (i as f64).sin() * 5.0).collect();
        let m = compute_macd(&closes);
        for i in 0..closes.len() {
            assert!((m.hist[i] - 2.0 * (m.dif[i] - m.dea[i])).abs() < 1e-9);
        }
    }

    #[test]
    fn rising_series_has_positive_dif() {
        let closes: Vec<f64> = (0..80).map(|i| 100.0 + i as f64).collect();
        let m = compute_macd(&closes);
        // fast EMA tracks a rising series more closely than slow
        assert!(m.dif[79] > 0.0);
        assert!(m.hist[79] > 0.0);
    }

    #[test]
    fn defined_from_first_bar() {
        let m = compute_macd(&[10.0, 11.0]);
        assert!(!m.dif[0].is_nan());
        assert!(!m.dea[0].is_nan());
        assert!(!m.hist[0].is_nan());
    }
}
