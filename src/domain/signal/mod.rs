//! Signal Engine: evaluates the rule catalogue against an indicator
//! series.
//!
//! The catalogue is data: a registry of named rules, each an evaluation
//! function producing one boolean column with the same row count as the
//! input. Rules never read ahead of the row being evaluated and look
//! back at most 250 rows. Comparisons against NaN are false under IEEE
//! semantics: a rule whose inputs are undefined is "not satisfied",
//! never an error. Rules whose external inputs are absent (winner
//! percentage, benchmark closes) produce all-false columns.

pub mod attack;
pub mod bottom;
pub mod momentum;
pub mod reversal;

use crate::domain::indicator::{IndicatorRow, IndicatorSeries};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Auxiliary per-bar inputs, already aligned to the indicator rows.
///
/// Build the vectors with [`align_series`] so sparse date-keyed feeds
/// are forward-filled onto the bar dates before evaluation.
#[derive(Debug, Clone, Default)]
pub struct AuxInputs {
    /// Winner percentage (profit-in-position ratio, 0-100) per row.
    pub winner_pct: Option<Vec<f64>>,
    /// Benchmark index close per row.
    pub benchmark_close: Option<Vec<f64>>,
}

/// Forward-fill a sparse date-keyed series onto bar dates. Dates before
/// the feed's first observation stay NaN.
pub fn align_series(dates: &[NaiveDate], feed: &BTreeMap<NaiveDate, f64>) -> Vec<f64> {
    let mut out = Vec::with_capacity(dates.len());
    let mut last = f64::NAN;
    let mut iter = feed.iter().peekable();
    for date in dates {
        while let Some((d, v)) = iter.peek() {
            if *d <= date {
                last = **v;
                iter.next();
            } else {
                break;
            }
        }
        out.push(last);
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleFamily {
    Momentum,
    Reversal,
    Attack,
    Bottom,
}

pub type RuleFn = fn(&IndicatorSeries, &AuxInputs) -> Vec<bool>;

pub struct RuleDef {
    pub name: &'static str,
    pub label: &'static str,
    pub family: RuleFamily,
    pub eval: RuleFn,
}

/// The full rule catalogue. Orchestration selects by name; adding a rule
/// means adding an entry here, nothing else.
pub const REGISTRY: &[RuleDef] = &[
    // strong/momentum
    RuleDef { name: "Fighting", label: "Fighting breakout", family: RuleFamily::Momentum, eval: momentum::fighting },
    RuleDef { name: "UA", label: "Ultimate amount (proxy)", family: RuleFamily::Momentum, eval: momentum::ua },
    RuleDef { name: "CYC_MAX", label: "Above all cost averages", family: RuleFamily::Momentum, eval: momentum::cyc_max },
    RuleDef { name: "RangeBreak", label: "52-week range breakout", family: RuleFamily::Momentum, eval: momentum::range_break },
    RuleDef { name: "20VMA", label: "Quiet-then-ignition volume", family: RuleFamily::Momentum, eval: momentum::vma20 },
    RuleDef { name: "HMC", label: "Histogram momentum", family: RuleFamily::Momentum, eval: momentum::hmc },
    RuleDef { name: "HPS", label: "Trend system", family: RuleFamily::Momentum, eval: momentum::hps },
    RuleDef { name: "TKOS", label: "20-day momentum king", family: RuleFamily::Momentum, eval: momentum::tkos },
    RuleDef { name: "RKing", label: "Trend channel long", family: RuleFamily::Momentum, eval: momentum::rking },
    // oversold/reversal
    RuleDef { name: "Limit", label: "Extreme volume shrink", family: RuleFamily::Reversal, eval: reversal::limit },
    RuleDef { name: "Boll_Rev", label: "Bollinger mean reversion", family: RuleFamily::Reversal, eval: reversal::boll_rev },
    RuleDef { name: "RSI2_Rev", label: "RSI(2) reversion", family: RuleFamily::Reversal, eval: reversal::rsi2_rev },
    RuleDef { name: "2B", label: "False breakdown (2B)", family: RuleFamily::Reversal, eval: reversal::two_b },
    RuleDef { name: "Wyckoff", label: "Accumulation breakout", family: RuleFamily::Reversal, eval: reversal::wyckoff },
    RuleDef { name: "Spring", label: "Spring shakeout", family: RuleFamily::Reversal, eval: reversal::spring },
    RuleDef { name: "Pinbar", label: "Long lower shadow", family: RuleFamily::Reversal, eval: reversal::pinbar },
    RuleDef { name: "ES", label: "Volatility squeeze", family: RuleFamily::Reversal, eval: reversal::es },
    // strong-attack extended
    RuleDef { name: "Z_Score", label: "Z-score strength", family: RuleFamily::Attack, eval: attack::z_score },
    RuleDef { name: "Z_Overheat", label: "Z-score overheat", family: RuleFamily::Attack, eval: attack::z_overheat },
    RuleDef { name: "RS", label: "Relative-strength breakout", family: RuleFamily::Attack, eval: attack::rs },
    RuleDef { name: "DTR_Plus", label: "Histogram flip resonance", family: RuleFamily::Attack, eval: attack::dtr_plus },
    RuleDef { name: "Fighting_V2", label: "Price+volume 52-bar high", family: RuleFamily::Attack, eval: attack::fighting_v2 },
    RuleDef { name: "UA_V2", label: "Max-volume high breakout", family: RuleFamily::Attack, eval: attack::ua_v2 },
    RuleDef { name: "HMC_V2", label: "Red/yellow line cross", family: RuleFamily::Attack, eval: attack::hmc_v2 },
    // weak-reversal extended
    RuleDef { name: "HLP3", label: "Winner-percentage flush", family: RuleFamily::Bottom, eval: bottom::hlp3 },
    RuleDef { name: "Limit_BO", label: "Shrink-then-breakout", family: RuleFamily::Bottom, eval: bottom::limit_bo },
    RuleDef { name: "RSI_Rev", label: "RSI(2) pullback in uptrend", family: RuleFamily::Bottom, eval: bottom::rsi_rev },
    RuleDef { name: "Money_Flow", label: "Money-flow divergence", family: RuleFamily::Bottom, eval: bottom::money_flow },
    RuleDef { name: "Double_Vol", label: "Double-volume low held", family: RuleFamily::Bottom, eval: bottom::double_vol },
];

pub fn find_rule(name: &str) -> Option<&'static RuleDef> {
    REGISTRY.iter().find(|r| r.name == name)
}

/// One boolean column per rule, same row count as the indicator series.
#[derive(Debug, Clone)]
pub struct SignalMatrix {
    pub len: usize,
    columns: Vec<(&'static str, Vec<bool>)>,
}

impl SignalMatrix {
    pub fn column(&self, name: &str) -> Option<&[bool]> {
        self.columns
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, c)| c.as_slice())
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|(n, _)| *n)
    }
}

pub fn evaluate_signals(series: &IndicatorSeries, aux: &AuxInputs) -> SignalMatrix {
    let columns = REGISTRY
        .iter()
        .map(|rule| {
            let col = (rule.eval)(series, aux);
            debug_assert_eq!(col.len(), series.len());
            (rule.name, col)
        })
        .collect();
    SignalMatrix {
        len: series.len(),
        columns,
    }
}

// --- shared lookback helpers -------------------------------------------

/// Evaluate a per-row predicate across the whole series.
pub(crate) fn per_row(
    series: &IndicatorSeries,
    pred: impl Fn(&[IndicatorRow], usize) -> bool,
) -> Vec<bool> {
    (0..series.len()).map(|i| pred(&series.rows, i)).collect()
}

/// Max of `f` over the `n` rows ending at `end` inclusive; NaN when the
/// window is short or contains NaN.
pub(crate) fn trailing_max(
    rows: &[IndicatorRow],
    end: usize,
    n: usize,
    f: impl Fn(&IndicatorRow) -> f64,
) -> f64 {
    if n == 0 || end + 1 < n {
        return f64::NAN;
    }
    let mut m = f64::NEG_INFINITY;
    for row in &rows[end + 1 - n..=end] {
        let v = f(row);
        if v.is_nan() {
            return f64::NAN;
        }
        if v > m {
            m = v;
        }
    }
    m
}

/// Min counterpart of [`trailing_max`].
pub(crate) fn trailing_min(
    rows: &[IndicatorRow],
    end: usize,
    n: usize,
    f: impl Fn(&IndicatorRow) -> f64,
) -> f64 {
    if n == 0 || end + 1 < n {
        return f64::NAN;
    }
    let mut m = f64::INFINITY;
    for row in &rows[end + 1 - n..=end] {
        let v = f(row);
        if v.is_nan() {
            return f64::NAN;
        }
        if v < m {
            m = v;
        }
    }
    m
}

/// Count rows satisfying `pred` over the `n` rows ending at `end`
/// inclusive; `None` when the window is short.
pub(crate) fn trailing_count(
    rows: &[IndicatorRow],
    end: usize,
    n: usize,
    pred: impl Fn(&IndicatorRow) -> bool,
) -> Option<usize> {
    if n == 0 || end + 1 < n {
        return None;
    }
    Some(rows[end + 1 - n..=end].iter().filter(|r| pred(r)).count())
}
