//! Data access port traits.

use crate::domain::bar::Bar;
use crate::domain::error::BarscanError;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Supplies a contiguous, date-ordered bar series for one instrument.
///
/// An empty result is a valid "no data" outcome, never an error; calendar
/// gaps (non-trading days) inside the range are normal.
pub trait BarStore {
    fn load(
        &self,
        code: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Bar>, BarscanError>;
}

/// Supplies the optional per-bar winner-percentage feed for one
/// instrument. An empty map means no coverage; dependent rules degrade
/// to all-false.
pub trait AuxStore {
    fn load_winner_pct(&self, code: &str) -> Result<BTreeMap<NaiveDate, f64>, BarscanError>;
}
