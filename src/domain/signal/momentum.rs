//! Strong/momentum rule family.

use crate::domain::indicator::IndicatorSeries;
use crate::domain::signal::{per_row, trailing_count, AuxInputs};

/// DIF above DEA, close at the 250-bar high, close above MA20.
pub fn fighting(series: &IndicatorSeries, _aux: &AuxInputs) -> Vec<bool> {
    per_row(series, |rows, i| {
        let r = &rows[i];
        r.dif > r.dea && r.bar.close >= r.high_52 && r.bar.close > r.ma20
    })
}

/// Close at the 250-bar high on 1.5x average volume.
pub fn ua(series: &IndicatorSeries, _aux: &AuxInputs) -> Vec<bool> {
    per_row(series, |rows, i| {
        let r = &rows[i];
        r.bar.close >= r.high_52 && r.bar.volume > 1.5 * r.vol_ma20
    })
}

/// Close above both cost averages: every holder is in profit.
pub fn cyc_max(series: &IndicatorSeries, _aux: &AuxInputs) -> Vec<bool> {
    per_row(series, |rows, i| {
        let r = &rows[i];
        r.bar.close > r.cyc_inf && r.bar.close > r.cyc_13
    })
}

/// Close above the strictly prior 250-bar high.
pub fn range_break(series: &IndicatorSeries, _aux: &AuxInputs) -> Vec<bool> {
    per_row(series, |rows, i| {
        i >= 1 && rows[i].bar.close > rows[i - 1].high_52
    })
}

/// At least 4 of the 5 bars ending yesterday were below average volume,
/// and today ignites above it on an up close.
pub fn vma20(series: &IndicatorSeries, _aux: &AuxInputs) -> Vec<bool> {
    per_row(series, |rows, i| {
        if i < 5 {
            return false;
        }
        let quiet = trailing_count(rows, i - 1, 5, |r| r.bar.volume < r.vol_ma20)
            .map(|c| c >= 4)
            .unwrap_or(false);
        let r = &rows[i];
        quiet && r.bar.volume > r.vol_ma20 && r.bar.up_close()
    })
}

/// MACD histogram above its own 5-bar mean and positive.
pub fn hmc(series: &IndicatorSeries, _aux: &AuxInputs) -> Vec<bool> {
    per_row(series, |rows, i| {
        let r = &rows[i];
        r.macd_hist > r.macd_hist_ma5 && r.macd_hist > 0.0
    })
}

/// Close above both the long trend EMA and the short channel EMA.
pub fn hps(series: &IndicatorSeries, _aux: &AuxInputs) -> Vec<bool> {
    per_row(series, |rows, i| {
        let r = &rows[i];
        r.bar.close > r.ema200 && r.bar.close > r.ema15
    })
}

/// Trailing 20-bar return above 30%.
pub fn tkos(series: &IndicatorSeries, _aux: &AuxInputs) -> Vec<bool> {
    per_row(series, |rows, i| rows[i].ret_20 > 0.30)
}

/// Trend-channel latch currently long.
pub fn rking(series: &IndicatorSeries, _aux: &AuxInputs) -> Vec<bool> {
    per_row(series, |rows, i| rows[i].rking_state == 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bar::Bar;
    use crate::domain::indicator::compute_indicators;
    use chrono::NaiveDate;

    fn bar(i: usize, close: f64, volume: f64) -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap() + chrono::Days::new(i as u64),
            open: close * 0.995,
            high: close * 1.01,
            low: close * 0.99,
            close,
            volume,
            amount: Some(close * volume),
            turn: None,
        }
    }

    /// 281 flat bars then a 10% jump on triple volume, closing at the
    /// high of the day.
    fn flat_then_jump() -> Vec<Bar> {
        let mut bars: Vec<Bar> = (0..281).map(|i| bar(i, 100.0, 1000.0)).collect();
        let mut jump = bar(281, 110.0, 3000.0);
        jump.open = 100.0;
        jump.high = 110.0;
        jump.low = 99.5;
        bars.push(jump);
        bars
    }

    #[test]
    fn range_break_fires_on_jump() {
        let series = compute_indicators(&flat_then_jump());
        let col = range_break(&series, &AuxInputs::default());
        assert!(col[281]);
        assert!(!col[280]);
    }

    #[test]
    fn fighting_fires_when_macd_agrees() {
        let series = compute_indicators(&flat_then_jump());
        let r = &series.rows[281];
        let col = fighting(&series, &AuxInputs::default());
        // flat prelude keeps DIF == DEA == 0 until the jump bar, where
        // the fast EMA pulls DIF above DEA
        assert!(r.dif > r.dea);
        assert!(col[281]);
    }

    #[test]
    fn ua_needs_volume_expansion() {
        let series = compute_indicators(&flat_then_jump());
        let col = ua(&series, &AuxInputs::default());
        assert!(col[281]);
        assert!(!col[250]);
    }

    #[test]
    fn tkos_threshold_is_30_pct() {
        let mut bars: Vec<Bar> = (0..40).map(|i| bar(i, 100.0, 1000.0)).collect();
        bars.push(bar(40, 131.0, 1000.0));
        let series = compute_indicators(&bars);
        let col = tkos(&series, &AuxInputs::default());
        assert!(col[40]);

        let mut bars: Vec<Bar> = (0..40).map(|i| bar(i, 100.0, 1000.0)).collect();
        bars.push(bar(40, 129.0, 1000.0));
        let series = compute_indicators(&bars);
        let col = tkos(&series, &AuxInputs::default());
        assert!(!col[40]);
    }

    #[test]
    fn vma20_wants_quiet_then_ignition() {
        // 30 bars of average volume, 5 quiet bars, then ignition
        let mut bars: Vec<Bar> = (0..30).map(|i| bar(i, 100.0, 1000.0)).collect();
        for i in 30..35 {
            bars.push(bar(i, 100.0, 500.0));
        }
        let mut ignition = bar(35, 101.0, 2000.0);
        ignition.open = 100.0;
        bars.push(ignition);

        let series = compute_indicators(&bars);
        let col = vma20(&series, &AuxInputs::default());
        assert!(col[35]);
    }

    #[test]
    fn nan_warmup_never_fires() {
        let bars: Vec<Bar> = (0..30).map(|i| bar(i, 100.0, 1000.0)).collect();
        let series = compute_indicators(&bars);
        for name_col in [
            fighting(&series, &AuxInputs::default()),
            ua(&series, &AuxInputs::default()),
            range_break(&series, &AuxInputs::default()),
            tkos(&series, &AuxInputs::default()),
        ] {
            assert!(name_col.iter().all(|&b| !b));
        }
    }

    #[test]
    fn cyc_max_false_without_amount() {
        let mut bars = flat_then_jump();
        for b in &mut bars {
            b.amount = None;
        }
        let series = compute_indicators(&bars);
        let col = cyc_max(&series, &AuxInputs::default());
        assert!(col.iter().all(|&b| !b));
    }
}
