//! Open position state.
//!
//! The engine holds at most one `Position` at a time. Lifecycle is
//! Flat → Open → Flat: opening constructs the value, closing consumes it
//! (`close` takes `self`) and yields the completed `Trade`, so a closed
//! position cannot be touched again.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::trade::Trade;

/// Direction of a holding.
///
/// The engine only ever opens `Long` positions; `Short` exists because closed
/// trades and matched broker fills record a side, and the fill matcher pairs
/// short round trips (sell first, buy back later).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PositionSide {
    Long,
    Short,
}

/// A single open holding between entry and exit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub quantity: f64,
    pub side: PositionSide,

    /// Latest mark price (bar close). Starts at `entry_price`.
    pub current_price: f64,

    /// Reason string from the entry signal.
    pub entry_reason: String,
}

impl Position {
    /// Open a new position marked at its entry price.
    pub fn open(
        entry_date: NaiveDate,
        entry_price: f64,
        quantity: f64,
        side: PositionSide,
        entry_reason: impl Into<String>,
    ) -> Self {
        Self {
            entry_date,
            entry_price,
            quantity,
            side,
            current_price: entry_price,
            entry_reason: entry_reason.into(),
        }
    }

    /// Update the mark price.
    pub fn mark(&mut self, price: f64) {
        self.current_price = price;
    }

    /// Notional value at the current mark.
    pub fn market_value(&self) -> f64 {
        self.quantity * self.current_price
    }

    /// Profit at the current mark, before any commission.
    pub fn unrealized_pnl(&self) -> f64 {
        match self.side {
            PositionSide::Long => (self.current_price - self.entry_price) * self.quantity,
            PositionSide::Short => (self.entry_price - self.current_price) * self.quantity,
        }
    }

    /// Close the position, consuming it.
    ///
    /// `exit_commission` is subtracted from the trade's pnl; crediting the
    /// proceeds back to cash is the engine's job.
    pub fn close(
        self,
        exit_date: NaiveDate,
        exit_price: f64,
        exit_reason: impl Into<String>,
        exit_commission: f64,
    ) -> Trade {
        let gross = match self.side {
            PositionSide::Long => (exit_price - self.entry_price) * self.quantity,
            PositionSide::Short => (self.entry_price - exit_price) * self.quantity,
        };

        Trade {
            entry_date: self.entry_date,
            entry_price: self.entry_price,
            exit_date,
            exit_price,
            quantity: self.quantity,
            side: self.side,
            pnl: gross - exit_commission,
            entry_reason: self.entry_reason,
            exit_reason: exit_reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn open_long() -> Position {
        Position::open(d(2024, 1, 2), 100.0, 50.0, PositionSide::Long, "entry")
    }

    #[test]
    fn opens_marked_at_entry() {
        let pos = open_long();
        assert_eq!(pos.current_price, 100.0);
        assert_eq!(pos.market_value(), 5000.0);
        assert_eq!(pos.unrealized_pnl(), 0.0);
    }

    #[test]
    fn mark_moves_value_and_pnl() {
        let mut pos = open_long();
        pos.mark(110.0);
        assert_eq!(pos.market_value(), 5500.0);
        assert_eq!(pos.unrealized_pnl(), 500.0);
    }

    #[test]
    fn short_pnl_is_inverted() {
        let mut pos = Position::open(d(2024, 1, 2), 100.0, 10.0, PositionSide::Short, "short");
        pos.mark(95.0);
        assert_eq!(pos.unrealized_pnl(), 50.0);
        pos.mark(105.0);
        assert_eq!(pos.unrealized_pnl(), -50.0);
    }

    #[test]
    fn close_produces_trade_net_of_exit_commission() {
        let pos = open_long();
        let trade = pos.close(d(2024, 1, 10), 120.0, "take profit", 6.0);
        assert_eq!(trade.pnl, (120.0 - 100.0) * 50.0 - 6.0);
        assert_eq!(trade.entry_reason, "entry");
        assert_eq!(trade.exit_reason, "take profit");
        assert_eq!(trade.exit_date, d(2024, 1, 10));
    }

    #[test]
    fn close_short_gains_on_decline() {
        let pos = Position::open(d(2024, 1, 2), 100.0, 10.0, PositionSide::Short, "short");
        let trade = pos.close(d(2024, 1, 5), 90.0, "cover", 0.0);
        assert_eq!(trade.pnl, 100.0);
    }
}
