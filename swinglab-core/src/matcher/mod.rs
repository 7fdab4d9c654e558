//! Fill reconciliation — matches a raw fill log into round-trip trades.
//!
//! Pure post-processing over an external execution stream (broker exports,
//! audit logs): fills are grouped per symbol and matched against open lots
//! LIFO, most recent lot first. An opposite-side fill larger than the top
//! lot keeps consuming down the stack; whatever remains after the stack is
//! empty flips the book to the fill's side. Commissions are split pro-rata
//! across the matched quantity. Lots still open when the stream ends are
//! not reported.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{PositionSide, SignalAction, Trade};

/// Quantities below this are float residue from lot splitting, not lots.
const QUANTITY_EPSILON: f64 = 1e-9;

/// One execution from an external fill log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillRecord {
    pub date: NaiveDate,
    pub symbol: String,
    pub side: SignalAction,
    pub price: f64,
    pub quantity: f64,
    #[serde(default)]
    pub commission: f64,
}

/// A closed round trip reconstructed from the fill log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedTrade {
    pub symbol: String,
    pub side: PositionSide,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub exit_date: NaiveDate,
    pub exit_price: f64,
    pub quantity: f64,
    /// Entry share plus exit share, both pro-rata to the matched quantity.
    pub commission: f64,
    /// Side-aware gross minus `commission`.
    pub pnl: f64,
}

impl MatchedTrade {
    pub fn holding_days(&self) -> i64 {
        (self.exit_date - self.entry_date).num_days()
    }

    pub fn is_winner(&self) -> bool {
        self.pnl > 0.0
    }

    /// View as an engine `Trade` so the metrics layer can aggregate fills
    /// with the same code that aggregates backtest trades.
    pub fn to_trade(&self) -> Trade {
        Trade {
            entry_date: self.entry_date,
            entry_price: self.entry_price,
            exit_date: self.exit_date,
            exit_price: self.exit_price,
            quantity: self.quantity,
            side: self.side,
            pnl: self.pnl,
            entry_reason: "fill".to_string(),
            exit_reason: "fill".to_string(),
        }
    }
}

/// An entry fill (or the unmatched remainder of one) awaiting its exit.
struct OpenLot {
    date: NaiveDate,
    price: f64,
    quantity: f64,
    commission_per_share: f64,
}

/// Per-symbol lot stack. `side` is the side of every lot on the stack.
struct Book {
    side: PositionSide,
    lots: Vec<OpenLot>,
}

/// Match a fill log into round-trip trades, in exit order.
///
/// Fills with a non-positive quantity or price carry no information and
/// are skipped.
pub fn match_fills(fills: &[FillRecord]) -> Vec<MatchedTrade> {
    let mut books: HashMap<String, Book> = HashMap::new();
    let mut trades = Vec::new();

    for fill in fills {
        if !(fill.quantity > 0.0) || !(fill.price > 0.0) {
            log::debug!(
                "{}: skipping degenerate fill {} {} x {}",
                fill.date,
                fill.symbol,
                fill.quantity,
                fill.price
            );
            continue;
        }

        let fill_side = match fill.side {
            SignalAction::Buy => PositionSide::Long,
            SignalAction::Sell => PositionSide::Short,
        };
        let commission_per_share = fill.commission / fill.quantity;
        let book = books.entry(fill.symbol.clone()).or_insert_with(|| Book {
            side: fill_side,
            lots: Vec::new(),
        });

        let mut remaining = fill.quantity;
        if book.side != fill_side {
            while remaining > QUANTITY_EPSILON {
                let Some(top) = book.lots.last_mut() else {
                    break;
                };
                let matched = top.quantity.min(remaining);
                let gross = match book.side {
                    PositionSide::Long => (fill.price - top.price) * matched,
                    PositionSide::Short => (top.price - fill.price) * matched,
                };
                let commission = matched * (top.commission_per_share + commission_per_share);
                trades.push(MatchedTrade {
                    symbol: fill.symbol.clone(),
                    side: book.side,
                    entry_date: top.date,
                    entry_price: top.price,
                    exit_date: fill.date,
                    exit_price: fill.price,
                    quantity: matched,
                    commission,
                    pnl: gross - commission,
                });
                top.quantity -= matched;
                remaining -= matched;
                if top.quantity <= QUANTITY_EPSILON {
                    book.lots.pop();
                }
            }
        }

        // Same-side fill, or the remainder of an oversized opposite fill:
        // goes on the stack as a new lot (flipping the book if needed).
        if remaining > QUANTITY_EPSILON {
            book.side = fill_side;
            book.lots.push(OpenLot {
                date: fill.date,
                price: fill.price,
                quantity: remaining,
                commission_per_share,
            });
        }
    }

    trades
}
