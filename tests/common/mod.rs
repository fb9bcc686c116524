#![allow(dead_code)]

use barscan::domain::bar::Bar;
use barscan::domain::error::BarscanError;
use barscan::ports::data_port::{AuxStore, BarStore};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

pub struct MockBarStore {
    pub data: HashMap<String, Vec<Bar>>,
    pub errors: HashMap<String, String>,
}

impl MockBarStore {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, code: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(code.to_string(), bars);
        self
    }

    pub fn with_error(mut self, code: &str, reason: &str) -> Self {
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

pub struct MockChipStore {
    pub feeds: HashMap<String, BTreeMap<NaiveDate, f64>>,
}

impl MockChipStore {
    pub fn new() -> Self {
        Self {
            feeds: HashMap::new(),
        }
    }

    pub fn with_feed(mut self, code: &str, feed: BTreeMap<NaiveDate, f64>) -> Self {
        self.feeds.insert(code.to_string(), feed);
        self
    }
}

impl AuxStore for MockChipStore {
    fn load_winner_pct(&self, code: &str) -> Result<BTreeMap<NaiveDate, f64>, BarscanError> {
        Ok(self.feeds.get(code).cloned().unwrap_or_default())
    }
}

pub fn date(i: usize) -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 1).unwrap() + chrono::Days::new(i as u64)
}

pub fn flat_bar(i: usize, close: f64, volume: f64) -> Bar {
    Bar {
        date: date(i),
        open: close,
        high: close + 0.5,
        low: close - 0.5,
        close,
        volume,
        amount: Some(close * volume),
        turn: Some(1.0),
    }
}

/// The scenario series from the engine contract: flat for 281 bars,
/// then a 10% jump on triple volume closing at the high of the day,
/// crossing the prior 250-bar high.
pub fn flat_then_jump() -> Vec<Bar> {
    let mut bars: Vec<Bar> = (0..281).map(|i| flat_bar(i, 100.0, 1000.0)).collect();
    let mut jump = flat_bar(281, 110.0, 3000.0);
    jump.open = 100.0;
    jump.high = 110.0;
    jump.low = 99.5;
    bars.push(jump);
    bars
}
