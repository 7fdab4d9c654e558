//! Trading signals.
//!
//! A `Signal` is a dated intent to buy or sell at a stated price. Strategies
//! emit a batch of them from `generate_signals` (scheduled signals) and may
//! emit one per bar from `on_bar` (reactive signals). The engine treats both
//! identically.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalAction {
    Buy,
    Sell,
}

impl fmt::Display for SignalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalAction::Buy => write!(f, "BUY"),
            SignalAction::Sell => write!(f, "SELL"),
        }
    }
}

/// A dated buy/sell intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Bar date the signal executes on. Signals dated outside the series
    /// never match a bar and are silently dropped.
    pub date: NaiveDate,

    pub action: SignalAction,

    /// Execution price for the bar (normally the close).
    pub price: f64,

    /// Shares to trade. 0.0 leaves sizing entirely to the strategy's
    /// `position_size` hook; a positive value caps that size.
    pub quantity: f64,

    /// Free-text provenance, carried onto the opened position / closed trade.
    pub reason: String,

    /// Informational signal strength in [0, 1]. Not consulted by the engine.
    pub confidence: f64,
}

impl Signal {
    /// A buy signal with engine-delegated sizing and full confidence.
    pub fn buy(date: NaiveDate, price: f64, reason: impl Into<String>) -> Self {
        Self {
            date,
            action: SignalAction::Buy,
            price,
            quantity: 0.0,
            reason: reason.into(),
            confidence: 1.0,
        }
    }

    /// A sell signal. Quantity is ignored on exit — the whole position closes.
    pub fn sell(date: NaiveDate, price: f64, reason: impl Into<String>) -> Self {
        Self {
            date,
            action: SignalAction::Sell,
            price,
            quantity: 0.0,
            reason: reason.into(),
            confidence: 1.0,
        }
    }

    /// Cap the entry quantity (buys only; exits always close in full).
    pub fn with_quantity(mut self, quantity: f64) -> Self {
        self.quantity = quantity;
        self
    }

    /// Override the confidence score.
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }
}
