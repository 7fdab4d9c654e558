//! MA-crossover parameter sweep.
//!
//! Takes the cartesian product of fast and slow period lists, drops the
//! pairs where fast is not strictly shorter, and runs one backtest per
//! surviving pair. Arms run in parallel; each gets its own engine and only
//! the bars are shared. Results come back ranked by Sharpe ratio.

use rayon::prelude::*;

use swinglab_core::domain::Bar;
use swinglab_core::engine::{BacktestEngine, BacktestResult, EngineError};
use swinglab_core::strategy::{MaCrossover, MaKind, StrategyConfig};

/// Fast/slow period lists defining the sweep.
#[derive(Debug, Clone)]
pub struct SweepGrid {
    pub fast: Vec<usize>,
    pub slow: Vec<usize>,
}

impl SweepGrid {
    /// Cartesian product of the period lists, invalid pairs skipped.
    pub fn arms(&self) -> Vec<(usize, usize)> {
        let mut arms = Vec::new();
        for &fast in &self.fast {
            for &slow in &self.slow {
                // A crossover needs fast strictly shorter than slow.
                if fast >= slow {
                    continue;
                }
                arms.push((fast, slow));
            }
        }
        arms
    }
}

/// One completed sweep arm.
#[derive(Debug, Clone)]
pub struct SweepArm {
    pub fast: usize,
    pub slow: usize,
    pub result: BacktestResult,
}

/// All arms of a finished sweep, best Sharpe first.
#[derive(Debug)]
pub struct SweepResults {
    pub arms: Vec<SweepArm>,
}

/// Run every arm of the grid over the same bars.
pub fn run_sweep(
    symbol: &str,
    bars: &[Bar],
    grid: &SweepGrid,
    kind: MaKind,
    config: &StrategyConfig,
) -> Result<SweepResults, EngineError> {
    let arms = grid
        .arms()
        .into_par_iter()
        .map(|(fast, slow)| {
            let strategy = MaCrossover::with_kind(fast, slow, kind, config.clone());
            let mut engine = BacktestEngine::new();
            let result = engine.run_bars(symbol, bars.to_vec(), &strategy)?;
            Ok(SweepArm { fast, slow, result })
        })
        .collect::<Result<Vec<_>, EngineError>>()?;

    let mut results = SweepResults { arms };
    results.sort_by_sharpe();
    Ok(results)
}

impl SweepResults {
    /// Sort arms by Sharpe ratio, best first. NaN never occurs (degenerate
    /// metrics come back 0.0), but ties keep a stable order.
    fn sort_by_sharpe(&mut self) {
        self.arms.sort_by(|a, b| {
            b.result
                .metrics
                .sharpe_ratio
                .partial_cmp(&a.result.metrics.sharpe_ratio)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    /// The top-ranked arm, if any ran.
    pub fn best(&self) -> Option<&SweepArm> {
        self.arms.first()
    }

    /// Render the ranked arms as a fixed-width table.
    pub fn to_table(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "{:<5} {:>5} {:>5} {:>8} {:>9} {:>8} {:>7} {:>7}\n",
            "Rank", "Fast", "Slow", "Sharpe", "Return%", "MaxDD%", "Trades", "Win%"
        ));
        out.push_str(&format!("{}\n", "-".repeat(61)));
        for (i, arm) in self.arms.iter().enumerate() {
            let m = &arm.result.metrics;
            out.push_str(&format!(
                "{:<5} {:>5} {:>5} {:>8.3} {:>8.2}% {:>7.2}% {:>7} {:>6.1}%{}\n",
                i + 1,
                arm.fast,
                arm.slow,
                m.sharpe_ratio,
                m.total_return_pct * 100.0,
                m.max_drawdown_pct * 100.0,
                m.total_trades,
                m.win_rate * 100.0,
                if i == 0 { "  <- best" } else { "" },
            ));
        }
        out
    }
}
