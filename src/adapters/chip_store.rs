//! Winner-percentage cache reader.
//!
//! The chip-distribution feed is strictly external: one
//! `<code>_chip.csv` per instrument with header `date,winner_pct`
//! (0-100), produced by the data-acquisition collaborator. A missing
//! file means no coverage and yields an empty map; the engine never
//! derives this series from OHLCV.

use crate::domain::error::BarscanError;
use crate::ports::data_port::AuxStore;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::path::PathBuf;

pub struct CsvChipStore {
    base_path: PathBuf,
}

impl CsvChipStore {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn chip_path(&self, code: &str) -> PathBuf {
        self.base_path.join(format!("{code}_chip.csv"))
    }
}

impl AuxStore for CsvChipStore {
    fn load_winner_pct(&self, code: &str) -> Result<BTreeMap<NaiveDate, f64>, BarscanError> {
        let path = self.chip_path(code);
        if !path.exists() {
            return Ok(BTreeMap::new());
        }

        let mut rdr = csv::Reader::from_path(&path).map_err(|e| BarscanError::Store {
            reason: format!("{}: {e}", path.display()),
        })?;

        let mut feed = BTreeMap::new();
        for result in rdr.records() {
            let record = result.map_err(|e| BarscanError::Store {
                reason: format!("{}: {e}", path.display()),
            })?;

            let date_str = record.get(0).unwrap_or("").trim();
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                BarscanError::Store {
                    reason: format!("{}: invalid date {date_str:?}: {e}", path.display()),
                }
            })?;
            // unparsable percentages are dropped rather than poisoning
            // the whole feed
            if let Some(value) = record.get(1).and_then(|s| s.trim().parse::<f64>().ok()) {
                feed.insert(date, value);
            }
        }
        Ok(feed)
    }
}
