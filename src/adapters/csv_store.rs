//! Flat-file CSV bar warehouse.
//!
//! One `<code>.csv` per instrument with header
//! `date,open,high,low,close,volume[,amount][,turn]`, plus an
//! `instruments.csv` (`code,name`) listing the scannable universe. A
//! missing instrument file is a valid "no data" outcome and yields an
//! empty series.

use crate::domain::bar::Bar;
use crate::domain::error::BarscanError;
use crate::domain::universe::Instrument;
use crate::ports::data_port::BarStore;
use chrono::NaiveDate;
use std::path::PathBuf;

pub struct CsvBarStore {
    base_path: PathBuf,
}

impl CsvBarStore {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn bar_path(&self, code: &str) -> PathBuf {
        self.base_path.join(format!("{code}.csv"))
    }

    /// Read the scannable universe from `instruments.csv`. Unlike a
    /// missing per-instrument file, an unreadable instrument list is a
    /// fatal infrastructure error.
    pub fn load_instruments(&self) -> Result<Vec<Instrument>, BarscanError> {
        let path = self.base_path.join("instruments.csv");
        let mut rdr =
            csv::Reader::from_path(&path).map_err(|e| BarscanError::InstrumentList {
                reason: format!("{}: {e}", path.display()),
            })?;

        let mut instruments = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| BarscanError::InstrumentList {
                reason: format!("{}: {e}", path.display()),
            })?;
            let code = record.get(0).unwrap_or("").trim();
            if code.is_empty() {
                continue;
            }
            let name = record.get(1).unwrap_or(code).trim();
            instruments.push(Instrument::new(code, name));
        }
        Ok(instruments)
    }
}

fn parse_required(field: Option<&str>, what: &str, path: &PathBuf) -> Result<f64, BarscanError> {
    field
        .ok_or_else(|| BarscanError::Store {
            reason: format!("{}: missing {what} column", path.display()),
        })?
        .trim()
        .parse()
        .map_err(|e| BarscanError::Store {
            reason: format!("{}: invalid {what} value: {e}", path.display()),
        })
}

/// Optional numeric column: absent header, empty cell, or unparsable
/// text all read as "missing".
fn parse_optional(field: Option<&str>) -> Option<f64> {
    field.and_then(|s| s.trim().parse().ok())
}

impl BarStore for CsvBarStore {
    fn load(
        &self,
        code: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Bar>, BarscanError> {
        let path = self.bar_path(code);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let mut rdr = csv::Reader::from_path(&path).map_err(|e| BarscanError::Store {
            reason: format!("{}: {e}", path.display()),
        })?;

        let headers = rdr
            .headers()
            .map_err(|e| BarscanError::Store {
                reason: format!("{}: {e}", path.display()),
            })?
            .clone();
        let col = |name: &str| headers.iter().position(|h| h.trim() == name);

        let (Some(i_date), Some(i_open), Some(i_high), Some(i_low), Some(i_close), Some(i_vol)) = (
            col("date"),
            col("open"),
            col("high"),
            col("low"),
            col("close"),
            col("volume"),
        ) else {
            return Err(BarscanError::Store {
                reason: format!("{}: missing required header columns", path.display()),
            });
        };
        let i_amount = col("amount");
        let i_turn = col("turn");

        let mut bars = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| BarscanError::Store {
                reason: format!("{}: {e}", path.display()),
            })?;

            let date_str = record.get(i_date).unwrap_or("").trim();
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                BarscanError::Store {
                    reason: format!("{}: invalid date {date_str:?}: {e}", path.display()),
                }
            })?;
            if date < start || date > end {
                continue;
            }

            bars.push(Bar {
                date,
                open: parse_required(record.get(i_open), "open", &path)?,
                high: parse_required(record.get(i_high), "high", &path)?,
                low: parse_required(record.get(i_low), "low", &path)?,
                close: parse_required(record.get(i_close), "close", &path)?,
                volume: parse_required(record.get(i_vol), "volume", &path)?,
                amount: i_amount.and_then(|i| parse_optional(record.get(i))),
                turn: i_turn.and_then(|i| parse_optional(record.get(i))),
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}
