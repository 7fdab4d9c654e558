//! Volatility-contraction breakout strategy.
//!
//! Classic VCP shape: a base whose bar-to-bar ranges tighten (ATR falling
//! against its own recent history), then a close above the base's high on
//! expanded volume. Entries require all three conditions on the same bar:
//!
//! 1. contraction — ATR now ÷ ATR `contraction_period` bars ago is at most
//!    `max_atr_ratio`
//! 2. breakout — close above the prior `base_period`-bar high
//! 3. participation — volume at least `volume_mult` × its prior
//!    `base_period`-bar average
//!
//! Exits when the close drops below the `trail_period` SMA after having been
//! at or above it on the previous bar.

use serde::{Deserialize, Serialize};

use super::{Strategy, StrategyConfig};
use crate::domain::{Bar, Signal};
use crate::indicators::{atr, rolling_max, sma};

/// Tunable lookbacks and thresholds for `VcpBreakout`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VcpParams {
    /// Pivot lookback and volume-average window.
    pub base_period: usize,

    /// How many bars back the ATR is compared against.
    pub contraction_period: usize,

    /// ATR smoothing window.
    pub atr_period: usize,

    /// Upper bound on ATR-now / ATR-then for the base to count as contracted.
    pub max_atr_ratio: f64,

    /// Breakout volume must reach this multiple of the base's average volume.
    pub volume_mult: f64,

    /// SMA period for the trailing exit.
    pub trail_period: usize,
}

impl Default for VcpParams {
    fn default() -> Self {
        Self {
            base_period: 50,
            contraction_period: 10,
            atr_period: 14,
            max_atr_ratio: 0.8,
            volume_mult: 1.5,
            trail_period: 20,
        }
    }
}

/// Volatility-contraction breakout.
#[derive(Debug, Clone)]
pub struct VcpBreakout {
    params: VcpParams,
    config: StrategyConfig,
    name: String,
}

impl VcpBreakout {
    pub fn new(params: VcpParams, config: StrategyConfig) -> Self {
        assert!(params.base_period >= 1, "base period must be >= 1");
        assert!(
            params.contraction_period >= 1,
            "contraction period must be >= 1"
        );
        assert!(params.atr_period >= 1, "ATR period must be >= 1");
        assert!(params.trail_period >= 1, "trail period must be >= 1");
        assert!(params.max_atr_ratio > 0.0, "max ATR ratio must be positive");
        assert!(params.volume_mult >= 0.0, "volume multiple must be >= 0");

        Self {
            name: format!("vcp_breakout_{}", params.base_period),
            params,
            config,
        }
    }

    pub fn params(&self) -> &VcpParams {
        &self.params
    }
}

impl Strategy for VcpBreakout {
    fn name(&self) -> &str {
        &self.name
    }

    fn config(&self) -> &StrategyConfig {
        &self.config
    }

    fn generate_signals(&self, bars: &[Bar]) -> Vec<Signal> {
        let p = &self.params;
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
        let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();

        let atr_series = atr(bars, p.atr_period);
        let pivot = rolling_max(&highs, p.base_period);
        let vol_avg = sma(&volumes, p.base_period);
        let trail = sma(&closes, p.trail_period);

        let mut signals = Vec::new();
        for i in 1..bars.len() {
            // Entry: contraction + breakout + volume, all against the bar
            // before the breakout (the pivot must predate the break).
            if i >= p.contraction_period {
                let a_now = atr_series[i];
                let a_then = atr_series[i - p.contraction_period];
                let prior_pivot = pivot[i - 1];
                let prior_vol_avg = vol_avg[i - 1];

                if !a_now.is_nan()
                    && !a_then.is_nan()
                    && a_then > 0.0
                    && !prior_pivot.is_nan()
                    && !prior_vol_avg.is_nan()
                {
                    let ratio = a_now / a_then;
                    let contracted = ratio <= p.max_atr_ratio;
                    let breakout = closes[i] > prior_pivot;
                    let volume_ok = prior_vol_avg > 0.0
                        && volumes[i] >= p.volume_mult * prior_vol_avg;

                    if contracted && breakout && volume_ok {
                        signals.push(Signal::buy(
                            bars[i].date,
                            closes[i],
                            format!(
                                "vcp breakout: close {:.2} above {:.2} pivot, atr ratio {:.2}",
                                closes[i], prior_pivot, ratio
                            ),
                        ));
                    }
                }
            }

            // Exit: first close below the trailing MA.
            let (t_prev, t_cur) = (trail[i - 1], trail[i]);
            if !t_prev.is_nan()
                && !t_cur.is_nan()
                && closes[i - 1] >= t_prev
                && closes[i] < t_cur
            {
                signals.push(Signal::sell(
                    bars[i].date,
                    closes[i],
                    format!("close below {}-bar trail MA", p.trail_period),
                ));
            }
        }

        signals
    }
}
