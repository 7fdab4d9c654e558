//! Raw price table and its normalization into bars.
//!
//! A `PriceTable` is the untyped tabular view of a price series — headers plus
//! string cells, exactly as read from a CSV file or assembled by a caller.
//! `normalize` maps it onto the canonical bar schema:
//!
//! 1. headers matched case-insensitively (date/datetime/time, open, high,
//!    low, close, volume/vol) — first match wins per canonical column
//! 2. date, open, high, low, close mandatory; volume optional (0.0 when absent)
//! 3. dates parsed across the common daily formats
//! 4. rows sorted ascending by date (stable)
//!
//! No further schema validation happens; a literal "NaN" cell parses to NaN
//! and flows through to strategies untouched.

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

use super::columns::{find_column, DATE_NAMES, VOLUME_NAMES};
use crate::domain::Bar;

/// Errors raised while normalizing a raw table.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("price series is empty")]
    EmptySeries,

    #[error("missing required column: {0}")]
    MissingColumn(&'static str),

    #[error("row {row}: bad {column} value '{value}'")]
    BadCell {
        /// 1-based data row index (header row not counted).
        row: usize,
        column: &'static str,
        value: String,
    },
}

/// Headers plus string rows, as read from a source file.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl PriceTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Map the table onto sorted `Bar`s. See the module docs for the contract.
    pub fn normalize(&self) -> Result<Vec<Bar>, DataError> {
        let date_col = find_column(&self.headers, DATE_NAMES)
            .ok_or(DataError::MissingColumn("date"))?;
        let open_col =
            find_column(&self.headers, &["open"]).ok_or(DataError::MissingColumn("open"))?;
        let high_col =
            find_column(&self.headers, &["high"]).ok_or(DataError::MissingColumn("high"))?;
        let low_col =
            find_column(&self.headers, &["low"]).ok_or(DataError::MissingColumn("low"))?;
        let close_col =
            find_column(&self.headers, &["close"]).ok_or(DataError::MissingColumn("close"))?;
        let volume_col = find_column(&self.headers, VOLUME_NAMES);

        if self.rows.is_empty() {
            return Err(DataError::EmptySeries);
        }

        let mut bars = Vec::with_capacity(self.rows.len());
        for (i, row) in self.rows.iter().enumerate() {
            let row_no = i + 1;
            let date_cell = cell(row, date_col);
            let date = parse_date(date_cell).ok_or_else(|| DataError::BadCell {
                row: row_no,
                column: "date",
                value: date_cell.to_string(),
            })?;

            let bar = Bar {
                date,
                open: parse_price(row, open_col, "open", row_no)?,
                high: parse_price(row, high_col, "high", row_no)?,
                low: parse_price(row, low_col, "low", row_no)?,
                close: parse_price(row, close_col, "close", row_no)?,
                volume: match volume_col {
                    Some(col) => parse_volume(row, col, row_no)?,
                    None => 0.0,
                },
            };
            bars.push(bar);
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}

fn cell(row: &[String], col: usize) -> &str {
    row.get(col).map(String::as_str).unwrap_or("").trim()
}

fn parse_price(row: &[String], col: usize, column: &'static str, row_no: usize) -> Result<f64, DataError> {
    let raw = cell(row, col);
    raw.parse::<f64>().map_err(|_| DataError::BadCell {
        row: row_no,
        column,
        value: raw.to_string(),
    })
}

/// Volume is lenient: an empty cell means "not reported" and becomes 0.0.
fn parse_volume(row: &[String], col: usize, row_no: usize) -> Result<f64, DataError> {
    let raw = cell(row, col);
    if raw.is_empty() {
        return Ok(0.0);
    }
    raw.parse::<f64>().map_err(|_| DataError::BadCell {
        row: row_no,
        column: "volume",
        value: raw.to_string(),
    })
}

/// Parse a date cell across the common daily formats, falling back to the
/// date part of a datetime cell.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
    const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(date);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    None
}
