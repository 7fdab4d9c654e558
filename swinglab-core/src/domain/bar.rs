//! Daily OHLCV bar.
//!
//! One row of a normalized price series. Produced by `data::PriceTable::normalize`
//! (or constructed directly by callers/tests); the engine consumes bars strictly
//! in ascending date order.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily price bar.
///
/// Prices are passed through as loaded — no sanity filtering happens here.
/// `volume` is 0.0 when the source table had no volume column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Construct a bar where open/high/low all equal the close.
    ///
    /// Convenient for tests and synthetic flat series; real data comes from
    /// `PriceTable::normalize`.
    pub fn flat(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume: 0.0,
        }
    }
}
