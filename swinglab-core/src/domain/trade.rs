//! Completed round-trip trades.
//!
//! A `Trade` is the unit all trade statistics are computed over. It is only
//! ever produced by `Position::close` (including the engine's forced closure
//! at the end of a run) or by the fill matcher's `MatchedTrade::to_trade`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::position::PositionSide;

/// One completed entry/exit pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    // ── Entry ────────────────────────────────────────────────
    pub entry_date: NaiveDate,
    pub entry_price: f64,

    // ── Exit ─────────────────────────────────────────────────
    pub exit_date: NaiveDate,
    pub exit_price: f64,

    // ── Economics ────────────────────────────────────────────
    pub quantity: f64,
    pub side: PositionSide,

    /// Realized profit, net of the exit commission. Entry commission is paid
    /// from cash at open and is not part of pnl.
    pub pnl: f64,

    // ── Provenance ───────────────────────────────────────────
    pub entry_reason: String,
    pub exit_reason: String,
}

impl Trade {
    /// Calendar days between entry and exit.
    pub fn holding_days(&self) -> i64 {
        (self.exit_date - self.entry_date).num_days()
    }

    /// Pnl as a fraction of the entry notional. 0 when the notional is 0.
    pub fn return_pct(&self) -> f64 {
        let notional = self.entry_price * self.quantity;
        if notional == 0.0 {
            0.0
        } else {
            self.pnl / notional
        }
    }

    /// Winner means strictly positive pnl; breakeven counts as a loss.
    pub fn is_winner(&self) -> bool {
        self.pnl > 0.0
    }
}
