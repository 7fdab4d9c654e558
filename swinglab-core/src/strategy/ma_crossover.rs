//! Moving-average crossover strategy.
//!
//! Fast and slow moving averages over closes. A golden cross (fast crosses
//! from at-or-below to above the slow) schedules a buy at that bar's close;
//! a death cross schedules a sell. Crosses are only recognized when all four
//! MA values involved are defined — NaN warmup never produces a signal.

use serde::{Deserialize, Serialize};

use super::{Strategy, StrategyConfig};
use crate::domain::{Bar, Signal};
use crate::indicators::{ema, sma};

/// Which moving average family to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaKind {
    #[default]
    Simple,
    Exponential,
}

/// Fast/slow MA crossover.
#[derive(Debug, Clone)]
pub struct MaCrossover {
    fast_period: usize,
    slow_period: usize,
    kind: MaKind,
    config: StrategyConfig,
    name: String,
}

impl MaCrossover {
    /// Simple-MA crossover. Panics unless 1 <= fast < slow.
    pub fn new(fast_period: usize, slow_period: usize, config: StrategyConfig) -> Self {
        Self::with_kind(fast_period, slow_period, MaKind::Simple, config)
    }

    pub fn with_kind(
        fast_period: usize,
        slow_period: usize,
        kind: MaKind,
        config: StrategyConfig,
    ) -> Self {
        assert!(fast_period >= 1, "fast period must be >= 1");
        assert!(
            fast_period < slow_period,
            "fast period ({fast_period}) must be shorter than slow period ({slow_period})"
        );
        let tag = match kind {
            MaKind::Simple => "sma",
            MaKind::Exponential => "ema",
        };
        Self {
            fast_period,
            slow_period,
            kind,
            config,
            name: format!("ma_crossover_{tag}_{fast_period}_{slow_period}"),
        }
    }

    pub fn fast_period(&self) -> usize {
        self.fast_period
    }

    pub fn slow_period(&self) -> usize {
        self.slow_period
    }

    fn average(&self, values: &[f64], period: usize) -> Vec<f64> {
        match self.kind {
            MaKind::Simple => sma(values, period),
            MaKind::Exponential => ema(values, period),
        }
    }
}

impl Strategy for MaCrossover {
    fn name(&self) -> &str {
        &self.name
    }

    fn config(&self) -> &StrategyConfig {
        &self.config
    }

    fn generate_signals(&self, bars: &[Bar]) -> Vec<Signal> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let fast = self.average(&closes, self.fast_period);
        let slow = self.average(&closes, self.slow_period);

        let mut signals = Vec::new();
        for i in 1..bars.len() {
            let (pf, ps) = (fast[i - 1], slow[i - 1]);
            let (cf, cs) = (fast[i], slow[i]);
            if pf.is_nan() || ps.is_nan() || cf.is_nan() || cs.is_nan() {
                continue;
            }

            if pf <= ps && cf > cs {
                signals.push(Signal::buy(
                    bars[i].date,
                    bars[i].close,
                    format!(
                        "golden cross: {}-bar MA above {}-bar MA",
                        self.fast_period, self.slow_period
                    ),
                ));
            } else if pf >= ps && cf < cs {
                signals.push(Signal::sell(
                    bars[i].date,
                    bars[i].close,
                    format!(
                        "death cross: {}-bar MA below {}-bar MA",
                        self.fast_period, self.slow_period
                    ),
                ));
            }
        }

        signals
    }
}
