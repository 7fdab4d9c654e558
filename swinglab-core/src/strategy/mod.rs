//! The strategy contract and the bundled strategies.
//!
//! A strategy plugs into the engine through four hooks:
//! - `generate_signals` — called once per run over the full series, before
//!   the bar loop; must be restartable (same bars in, same signals out)
//! - `should_exit` — per-bar exit check while a position is open, consulted
//!   before any same-bar entry
//! - `on_bar` — reactive per-bar hook, consulted after scheduled signals
//! - `position_size` — entry share sizing; an explicit signal quantity can
//!   only cap it
//!
//! All hooks take `&self`; strategies that need derived series compute them
//! inside `generate_signals` from the bars they are handed.

pub mod buy_hold;
pub mod ma_crossover;
pub mod vcp_breakout;

pub use buy_hold::BuyHold;
pub use ma_crossover::{MaCrossover, MaKind};
pub use vcp_breakout::{VcpBreakout, VcpParams};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Bar, Position, PositionSide, Signal};

/// Capital and cost parameters shared by every strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Starting cash. Must be positive; the engine rejects runs otherwise.
    #[serde(default = "default_initial_capital")]
    pub initial_capital: f64,

    /// Commission as a fraction of notional, charged on every fill.
    #[serde(default)]
    pub commission_rate: f64,

    /// Optional protective stop as a fraction below entry (0.05 = 5%).
    /// Drives the default `should_exit` implementation.
    #[serde(default)]
    pub stop_loss_pct: Option<f64>,
}

fn default_initial_capital() -> f64 {
    100_000.0
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            initial_capital: default_initial_capital(),
            commission_rate: 0.0,
            stop_loss_pct: None,
        }
    }
}

/// The contract between the engine and a trading strategy.
pub trait Strategy {
    /// Identifier used in results, reports and logs.
    fn name(&self) -> &str;

    fn config(&self) -> &StrategyConfig;

    /// Produce the scheduled signal batch for the whole series.
    ///
    /// Called exactly once per run. Two calls with the same bars must
    /// return the same signals — no hidden state, no randomness.
    fn generate_signals(&self, bars: &[Bar]) -> Vec<Signal>;

    /// Exit check while a position is open. `Some(reason)` closes the
    /// position at `price` on `date`, before any same-bar entry runs.
    ///
    /// Default: the configured stop loss, when one is set.
    fn should_exit(&self, position: &Position, price: f64, date: NaiveDate) -> Option<String> {
        let _ = date;
        let stop = self.config().stop_loss_pct?;
        let triggered = match position.side {
            PositionSide::Long => price <= position.entry_price * (1.0 - stop),
            PositionSide::Short => price >= position.entry_price * (1.0 + stop),
        };
        if triggered {
            Some(format!(
                "stop loss: {:.2} breached {:.1}% stop from entry {:.2}",
                price,
                stop * 100.0,
                position.entry_price
            ))
        } else {
            None
        }
    }

    /// Reactive per-bar hook. Runs after the bar's scheduled signal (if any)
    /// has been processed; `position` reflects that processing.
    fn on_bar(&self, bar: &Bar, position: Option<&Position>) -> Option<Signal> {
        let _ = (bar, position);
        None
    }

    /// Shares to buy on an entry. Consulted for every buy; a positive
    /// `Signal::quantity` caps the result but never raises it.
    ///
    /// Default: as many whole shares as `capital` affords at `price` once
    /// the entry commission is accounted for.
    fn position_size(&self, capital: f64, price: f64) -> f64 {
        if price <= 0.0 {
            return 0.0;
        }
        let cost_per_share = price * (1.0 + self.config().commission_rate);
        (capital / cost_per_share).floor().max(0.0)
    }
}
