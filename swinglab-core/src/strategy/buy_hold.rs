//! Buy-and-hold baseline.
//!
//! Buys on the first bar and never sells; the engine's end-of-run closure
//! realizes the trade. Useful as a benchmark row in sweeps and reports.

use super::{Strategy, StrategyConfig};
use crate::domain::{Bar, Signal};

#[derive(Debug, Clone)]
pub struct BuyHold {
    config: StrategyConfig,
}

impl BuyHold {
    pub fn new(config: StrategyConfig) -> Self {
        Self { config }
    }
}

impl Strategy for BuyHold {
    fn name(&self) -> &str {
        "buy_hold"
    }

    fn config(&self) -> &StrategyConfig {
        &self.config
    }

    fn generate_signals(&self, bars: &[Bar]) -> Vec<Signal> {
        match bars.first() {
            Some(first) => vec![Signal::buy(first.date, first.close, "initial entry")],
            None => Vec::new(),
        }
    }
}
