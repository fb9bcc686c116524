//! Daily OHLCV bar representation.

use chrono::NaiveDate;

/// One trading day for one instrument.
///
/// `amount` (traded value) and `turn` (turnover-rate percent) are optional
/// columns in the warehouse; `None` means the source never supplied them,
/// which is distinct from a zero value.
#[derive(Debug, Clone)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub amount: Option<f64>,
    pub turn: Option<f64>,
}

impl Bar {
    /// (high + low + close) / 3
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// Close above open.
    pub fn up_close(&self) -> bool {
        self.close > self.open
    }

    /// |open - close|
    pub fn body(&self) -> f64 {
        (self.open - self.close).abs()
    }

    /// high - max(open, close)
    pub fn upper_shadow(&self) -> f64 {
        self.high - self.open.max(self.close)
    }

    /// min(open, close) - low
    pub fn lower_shadow(&self) -> f64 {
        self.open.min(self.close) - self.low
    }

    /// high - low
    pub fn range(&self) -> f64 {
        self.high - self.low
    }
}
