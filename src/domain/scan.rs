//! Scan Orchestrator: batch reduction of the rule matrix to
//! per-instrument match records.
//!
//! Per instrument: load the wide warm-up window, compute indicators and
//! signals, restrict rows to the scan window, AND the selected rule
//! columns row-wise, and report the most recent matching bar together
//! with the selected rules individually true on it. Every
//! per-instrument failure (store error, short history, no match) is
//! "no match", never an error; only a fatal infrastructure problem
//! (instrument list unreadable) aborts a batch, and that happens before
//! this module is reached.

use crate::domain::error::BarscanError;
use crate::domain::indicator::compute_indicators;
use crate::domain::signal::{align_series, evaluate_signals, AuxInputs};
use crate::domain::universe::Instrument;
use crate::ports::data_port::{AuxStore, BarStore};
use chrono::NaiveDate;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tracing::{info, warn};

/// Instruments with fewer bars than this in the load window are skipped.
pub const MIN_BARS: usize = 120;

#[derive(Debug, Clone)]
pub struct ScanWindows {
    pub load_start: NaiveDate,
    pub load_end: NaiveDate,
    pub scan_start: NaiveDate,
    pub scan_end: NaiveDate,
}

/// One instrument that matched: the most recent bar in the scan window
/// on which every selected rule was simultaneously true, plus the
/// breakdown of which selected rules fired on that bar.
#[derive(Debug, Clone)]
pub struct ScanMatch {
    pub code: String,
    pub name: String,
    pub date: NaiveDate,
    pub close: f64,
    pub triggered: Vec<String>,
}

#[derive(Debug)]
pub struct ScanSummary {
    pub matches: Vec<ScanMatch>,
    pub scanned: usize,
    pub failed: usize,
    pub cancelled: bool,
}

fn scan_one(
    store: &dyn BarStore,
    aux: Option<&dyn AuxStore>,
    benchmark: Option<&BTreeMap<NaiveDate, f64>>,
    instrument: &Instrument,
    windows: &ScanWindows,
    selected: &[String],
) -> Result<Option<ScanMatch>, BarscanError> {
    let bars = store.load(&instrument.code, windows.load_start, windows.load_end)?;
    if bars.len() < MIN_BARS {
        return Ok(None);
    }

    let dates: Vec<NaiveDate> = bars.iter().map(|b| b.date).collect();
    let series = compute_indicators(&bars);

    let winner_pct = match aux {
        Some(store) => {
            let feed = store.load_winner_pct(&instrument.code)?;
            if feed.is_empty() {
                None
            } else {
                Some(align_series(&dates, &feed))
            }
        }
        None => None,
    };
    let benchmark_close = benchmark.map(|feed| align_series(&dates, feed));
    let aux_inputs = AuxInputs {
        winner_pct,
        benchmark_close,
    };

    let matrix = evaluate_signals(&series, &aux_inputs);

    // a selected rule with no column disqualifies the instrument
    let mut columns = Vec::with_capacity(selected.len());
    for name in selected {
        match matrix.column(name) {
            Some(col) => columns.push(col),
            None => return Ok(None),
        }
    }
    if columns.is_empty() {
        return Ok(None);
    }

    let hit = (0..bars.len())
        .rev()
        .filter(|&i| dates[i] >= windows.scan_start && dates[i] <= windows.scan_end)
        .find(|&i| columns.iter().all(|col| col[i]));

    Ok(hit.map(|i| ScanMatch {
        code: instrument.code.clone(),
        name: instrument.name.clone(),
        date: dates[i],
        close: bars[i].close,
        triggered: selected
            .iter()
            .zip(&columns)
            .filter(|(_, col)| col[i])
            .map(|(name, _)| name.clone())
            .collect(),
    }))
}

/// Scan a single instrument; any failure, store error or unexpected
/// panic included, is logged and reported as "no match".
pub fn scan_instrument(
    store: &dyn BarStore,
    aux: Option<&dyn AuxStore>,
    benchmark: Option<&BTreeMap<NaiveDate, f64>>,
    instrument: &Instrument,
    windows: &ScanWindows,
    selected: &[String],
) -> Option<ScanMatch> {
    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        scan_one(store, aux, benchmark, instrument, windows, selected)
    }));
    match outcome {
        Ok(Ok(hit)) => hit,
        Ok(Err(e)) => {
            warn!(code = %instrument.code, error = %e, "instrument scan failed");
            None
        }
        Err(_) => {
            warn!(code = %instrument.code, "instrument scan panicked");
            None
        }
    }
}

/// Fan the scan out across a worker pool sized to the machine, one task
/// per instrument, results collected unordered. The cancel flag is
/// checked between instrument tasks; a cancelled scan returns whatever
/// completed so far.
pub fn scan_universe(
    store: &(dyn BarStore + Sync),
    aux: Option<&(dyn AuxStore + Sync)>,
    benchmark: Option<&BTreeMap<NaiveDate, f64>>,
    instruments: &[Instrument],
    windows: &ScanWindows,
    selected: &[String],
    cancel: &AtomicBool,
) -> ScanSummary {
    let workers = std::thread::available_parallelism()
        .map(|n| n.get().saturating_sub(1).max(1))
        .unwrap_or(1);

    let failed = AtomicUsize::new(0);
    let scanned = AtomicUsize::new(0);

    let scan_task = |instrument: &Instrument| -> Option<ScanMatch> {
        if cancel.load(Ordering::Relaxed) {
            return None;
        }
        scanned.fetch_add(1, Ordering::Relaxed);
        let aux_ref: Option<&dyn AuxStore> = match aux {
            Some(a) => Some(a),
            None => None,
        };
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            scan_one(store, aux_ref, benchmark, instrument, windows, selected)
        }));
        match outcome {
            Ok(Ok(hit)) => hit,
            Ok(Err(e)) => {
                failed.fetch_add(1, Ordering::Relaxed);
                warn!(code = %instrument.code, error = %e, "instrument scan failed");
                None
            }
            Err(_) => {
                failed.fetch_add(1, Ordering::Relaxed);
                warn!(code = %instrument.code, "instrument scan panicked");
                None
            }
        }
    };

    let matches: Vec<ScanMatch> = match ThreadPoolBuilder::new().num_threads(workers).build() {
        Ok(pool) => pool.install(|| instruments.par_iter().filter_map(scan_task).collect()),
        // pool construction failing is not worth aborting a scan over
        Err(e) => {
            warn!(error = %e, "worker pool unavailable, scanning serially");
            instruments.iter().filter_map(scan_task).collect()
        }
    };

    let summary = ScanSummary {
        matches,
        scanned: scanned.load(Ordering::Relaxed),
        failed: failed.load(Ordering::Relaxed),
        cancelled: cancel.load(Ordering::Relaxed),
    };
    info!(
        scanned = summary.scanned,
        matched = summary.matches.len(),
        failed = summary.failed,
        "scan complete"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bar::Bar;
    use std::collections::HashMap;

    struct MockBarStore {
        data: HashMap<String, Vec<Bar>>,
        errors: HashMap<String, String>,
    }

    impl MockBarStore {
        fn new() -> Self {
            Self {
                data: HashMap::new(),
                errors: HashMap::new(),
            }
        }

        fn with_bars(mut self, code: &str, bars: Vec<Bar>) -> Self {
            self.data.insert(code.to_string(), bars);
            self
        }

        fn with_error(mut self, code: &str, reason: &str) -> Self {
            self.errors.insert(code.to_string(), reason.to_string());
            self
        }
    }

    impl BarStore for MockBarStore {
        fn load(
            &self,
            code: &str,
            start: NaiveDate,
            end: NaiveDate,
        ) -> Result<Vec<Bar>, BarscanError> {
            if let Some(reason) = self.errors.get(code) {
                return Err(BarscanError::Store {
                    reason: reason.clone(),
                });
            }
            Ok(self
                .data
                .get(code)
                .map(|bars| {
                    bars.iter()
                        .filter(|b| b.date >= start && b.date <= end)
                        .cloned()
                        .collect()
                })
                .unwrap_or_default())
        }
    }

    fn date(i: usize) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, 1).unwrap() + chrono::Days::new(i as u64)
    }

    fn flat_bar(i: usize, close: f64, volume: f64) -> Bar {
        Bar {
            date: date(i),
            open: close,
            high: close + 0.5,
            low: close - 0.5,
            close,
            volume,
            amount: None,
            turn: None,
        }
    }

    fn instrument(code: &str) -> Instrument {
        Instrument {
            code: code.to_string(),
            name: format!("{code} Corp"),
        }
    }

    fn windows(n: usize) -> ScanWindows {
        ScanWindows {
            load_start: date(0),
            load_end: date(n - 1),
            scan_start: date(0),
            scan_end: date(n - 1),
        }
    }

    /// 300 bars: flat, then a shrink bar near the end so the Limit rule
    /// has exactly one hit.
    fn limit_series() -> Vec<Bar> {
        let mut bars: Vec<Bar> = (0..299).map(|i| flat_bar(i, 100.0, 1000.0)).collect();
        bars.push(flat_bar(299, 100.0, 300.0));
        bars
    }

    #[test]
    fn short_history_is_no_match() {
        let bars: Vec<Bar> = (0..80).map(|i| flat_bar(i, 100.0, 300.0)).collect();
        let store = MockBarStore::new().with_bars("AAA", bars);
        let hit = scan_instrument(
            &store,
            None,
            None,
            &instrument("AAA"),
            &windows(80),
            &["Limit".to_string()],
        );
        assert!(hit.is_none());
    }

    #[test]
    fn store_error_is_no_match() {
        let store = MockBarStore::new().with_error("BAD", "disk on fire");
        let hit = scan_instrument(
            &store,
            None,
            None,
            &instrument("BAD"),
            &windows(10),
            &["Limit".to_string()],
        );
        assert!(hit.is_none());
    }

    #[test]
    fn missing_rule_disqualifies() {
        let store = MockBarStore::new().with_bars("AAA", limit_series());
        let hit = scan_instrument(
            &store,
            None,
            None,
            &instrument("AAA"),
            &windows(300),
            &["Limit".to_string(), "NoSuchRule".to_string()],
        );
        assert!(hit.is_none());
    }

    #[test]
    fn empty_selection_is_no_match() {
        let store = MockBarStore::new().with_bars("AAA", limit_series());
        let hit = scan_instrument(&store, None, None, &instrument("AAA"), &windows(300), &[]);
        assert!(hit.is_none());
    }

    #[test]
    fn match_reports_most_recent_date_and_close() {
        let store = MockBarStore::new().with_bars("AAA", limit_series());
        let hit = scan_instrument(
            &store,
            None,
            None,
            &instrument("AAA"),
            &windows(300),
            &["Limit".to_string()],
        )
        .unwrap();
        assert_eq!(hit.date, date(299));
        assert_eq!(hit.close, 100.0);
        assert_eq!(hit.triggered, vec!["Limit".to_string()]);
    }

    #[test]
    fn scan_window_excludes_matches_outside_it() {
        let store = MockBarStore::new().with_bars("AAA", limit_series());
        let mut w = windows(300);
        w.scan_end = date(200); // the shrink bar at 299 is outside
        let hit = scan_instrument(
            &store,
            None,
            None,
            &instrument("AAA"),
            &w,
            &["Limit".to_string()],
        );
        assert!(hit.is_none());
    }

    #[test]
    fn and_semantics_pick_the_common_bar() {
        // Limit fires on the shrink bar; Pinbar fires on a hammer bar.
        // Put both shapes on one bar and each alone on another: only the
        // common bar survives the AND, and the breakdown names both.
        let mut bars: Vec<Bar> = (0..297).map(|i| flat_bar(i, 100.0, 1000.0)).collect();
        bars.push(flat_bar(297, 100.0, 300.0)); // Limit only
        {
            // hammer on average volume: Pinbar only
            let mut b = flat_bar(298, 100.0, 1000.0);
            b.open = 100.0;
            b.high = 100.2;
            b.low = 92.0;
            bars.push(b);
        }
        {
            // hammer on shrunk volume: both rules at once
            let mut b = flat_bar(299, 100.0, 300.0);
            b.open = 100.0;
            b.high = 100.2;
            b.low = 92.0;
            bars.push(b);
        }

        let store = MockBarStore::new().with_bars("AAA", bars);
        let selected = vec!["Limit".to_string(), "Pinbar".to_string()];
        let hit = scan_instrument(
            &store,
            None,
            None,
            &instrument("AAA"),
            &windows(300),
            &selected,
        )
        .unwrap();
        assert_eq!(hit.date, date(299));
        assert_eq!(hit.triggered, selected);
    }

    #[test]
    fn universe_scan_swallows_per_instrument_failures() {
        let store = MockBarStore::new()
            .with_bars("AAA", limit_series())
            .with_error("BAD", "corrupt file")
            .with_bars("BBB", (0..50).map(|i| flat_bar(i, 100.0, 1000.0)).collect());
        let instruments = vec![instrument("AAA"), instrument("BAD"), instrument("BBB")];

        let cancel = AtomicBool::new(false);
        let summary = scan_universe(
            &store,
            None,
            None,
            &instruments,
            &windows(300),
            &["Limit".to_string()],
            &cancel,
        );

        assert_eq!(summary.scanned, 3);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.matches.len(), 1);
        assert_eq!(summary.matches[0].code, "AAA");
        assert!(!summary.cancelled);
    }

    #[test]
    fn cancelled_scan_stops_early() {
        let store = MockBarStore::new().with_bars("AAA", limit_series());
        let instruments = vec![instrument("AAA"), instrument("AAA"), instrument("AAA")];
        let cancel = AtomicBool::new(true);
        let summary = scan_universe(
            &store,
            None,
            None,
            &instruments,
            &windows(300),
            &["Limit".to_string()],
            &cancel,
        );
        assert_eq!(summary.scanned, 0);
        assert!(summary.cancelled);
        assert!(summary.matches.is_empty());
    }
}
