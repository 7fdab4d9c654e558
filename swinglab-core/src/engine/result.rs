//! Run output.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::metrics::Metrics;
use crate::domain::{Position, Signal, Trade};

/// Current layout version of `BacktestResult` artifacts. Readers reject
/// versions newer than this.
pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Everything a completed backtest produced.
///
/// Serializes to the artifact `result.json`; `schema_version` lets readers
/// of saved artifacts detect layout changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    pub strategy_name: String,
    pub symbol: String,

    /// First and last bar dates of the normalized series.
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    pub initial_capital: f64,

    /// Cash after the run (any open position was liquidated at the end).
    pub final_capital: f64,

    /// Snapshot of the position that was still open when the series ran out,
    /// taken before the engine force-closed it. None when the run ended flat
    /// on its own.
    pub final_position: Option<Position>,

    /// Completed round trips in exit order, forced end-of-run closure
    /// included.
    pub trades: Vec<Trade>,

    /// Every signal the strategy emitted: the scheduled batch first, then
    /// reactive signals in bar order. Signals are recorded whether or not
    /// they resulted in a fill.
    pub signals: Vec<Signal>,

    /// Bar dates, aligned with `equity_curve` and `daily_returns`.
    pub dates: Vec<NaiveDate>,

    /// Equity (cash + position market value) at each bar close.
    pub equity_curve: Vec<f64>,

    /// Per-bar returns; the first entry is measured against initial capital.
    pub daily_returns: Vec<f64>,

    pub metrics: Metrics,
}
