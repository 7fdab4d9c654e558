//! Performance metrics.
//!
//! Pure functions plus the aggregate `Metrics` struct. Every metric defaults
//! to 0 on degenerate input (empty curves, no trades, zero variance, zero
//! denominators) — callers never see NaN or infinity. Daily-return ratios
//! annualize with √252 trading days; the annualized return compounds over
//! calendar days (365).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::Trade;

/// Trading days per year, used to annualize daily-return ratios.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Calendar days per year, used to compound the annualized return.
const CALENDAR_DAYS_PER_YEAR: f64 = 365.0;

// ─── Equity-curve metrics ────────────────────────────────────────────

/// Final equity minus starting capital. 0 for an empty curve.
pub fn total_return(equity_curve: &[f64], initial_capital: f64) -> f64 {
    match equity_curve.last() {
        Some(&last) => last - initial_capital,
        None => 0.0,
    }
}

/// Total return as a fraction of starting capital. 0 when capital is not
/// positive.
pub fn total_return_pct(total_return: f64, initial_capital: f64) -> f64 {
    if initial_capital <= 0.0 {
        0.0
    } else {
        total_return / initial_capital
    }
}

/// Compound the whole-run return over calendar days:
/// (1 + pct)^(365/days) - 1. 0 when the run spans no days or the account
/// was wiped out (pct <= -1).
pub fn annualized_return(total_return_pct: f64, days: i64) -> f64 {
    if days <= 0 || total_return_pct <= -1.0 {
        return 0.0;
    }
    let compounded =
        (1.0 + total_return_pct).powf(CALENDAR_DAYS_PER_YEAR / days as f64) - 1.0;
    if compounded.is_finite() {
        compounded
    } else {
        0.0
    }
}

/// Deepest drop below the running peak: (absolute, fraction of that peak).
///
/// Both values are non-negative magnitudes; a flat or rising curve scores
/// (0, 0). NaN equity entries are skipped by the comparisons.
pub fn max_drawdown(equity_curve: &[f64]) -> (f64, f64) {
    let mut peak = f64::MIN;
    let mut worst = 0.0_f64;
    let mut worst_pct = 0.0_f64;

    for &equity in equity_curve {
        if equity > peak {
            peak = equity;
        }
        // Both values report the same point: the deepest absolute drop.
        let drawdown = peak - equity;
        if drawdown > worst {
            worst = drawdown;
            worst_pct = if peak > 0.0 { drawdown / peak } else { 0.0 };
        }
    }

    (worst, worst_pct)
}

/// mean / stdev × √252 over daily returns. Needs at least two returns and
/// nonzero spread, else 0.
pub fn sharpe_ratio(daily_returns: &[f64]) -> f64 {
    if daily_returns.len() < 2 {
        return 0.0;
    }
    let sd = std_dev(daily_returns);
    // A constant series leaves rounding dust in the stdev, not exactly 0.
    if !sd.is_finite() || sd < 1e-15 {
        return 0.0;
    }
    let m = mean(daily_returns);
    if !m.is_finite() {
        return 0.0;
    }
    m / sd * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Sharpe numerator over the stdev of the negative returns only. 0 when
/// fewer than two negative returns or their spread is zero.
pub fn sortino_ratio(daily_returns: &[f64]) -> f64 {
    let negatives: Vec<f64> = daily_returns
        .iter()
        .copied()
        .filter(|r| *r < 0.0)
        .collect();
    if negatives.len() < 2 {
        return 0.0;
    }
    let sd = std_dev(&negatives);
    if !sd.is_finite() || sd < 1e-15 {
        return 0.0;
    }
    let m = mean(daily_returns);
    if !m.is_finite() {
        return 0.0;
    }
    m / sd * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Annualized return over the max drawdown fraction. 0 when there was no
/// drawdown.
pub fn calmar_ratio(annualized_return: f64, max_drawdown_pct: f64) -> f64 {
    if max_drawdown_pct <= 0.0 {
        0.0
    } else {
        annualized_return / max_drawdown_pct
    }
}

// ─── Trade statistics ────────────────────────────────────────────────

/// Fraction of trades with strictly positive pnl. 0 with no trades.
pub fn win_rate(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let winners = trades.iter().filter(|t| t.is_winner()).count();
    winners as f64 / trades.len() as f64
}

/// Mean pnl of winning trades. 0 with no winners.
pub fn avg_win(trades: &[Trade]) -> f64 {
    let wins: Vec<f64> = trades
        .iter()
        .filter(|t| t.is_winner())
        .map(|t| t.pnl)
        .collect();
    if wins.is_empty() {
        0.0
    } else {
        mean(&wins)
    }
}

/// Mean *magnitude* of losing pnl (breakeven counts as a loss). 0 with no
/// losers. Kept non-negative so the expectancy formula composes.
pub fn avg_loss(trades: &[Trade]) -> f64 {
    let losses: Vec<f64> = trades
        .iter()
        .filter(|t| !t.is_winner())
        .map(|t| t.pnl.abs())
        .collect();
    if losses.is_empty() {
        0.0
    } else {
        mean(&losses)
    }
}

/// Gross profit over gross loss (both magnitudes). 0 when there are no
/// losses to divide by.
pub fn profit_factor(trades: &[Trade]) -> f64 {
    let gross_profit: f64 = trades.iter().filter(|t| t.is_winner()).map(|t| t.pnl).sum();
    let gross_loss: f64 = trades
        .iter()
        .filter(|t| !t.is_winner())
        .map(|t| t.pnl.abs())
        .sum();
    if gross_loss <= 0.0 {
        0.0
    } else {
        gross_profit / gross_loss
    }
}

/// Expected pnl per trade: win_rate × avg_win − (1 − win_rate) × avg_loss.
pub fn expectancy(win_rate: f64, avg_win: f64, avg_loss: f64) -> f64 {
    win_rate * avg_win - (1.0 - win_rate) * avg_loss
}

/// Mean calendar holding period. 0 with no trades.
pub fn avg_holding_days(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let total: i64 = trades.iter().map(Trade::holding_days).sum();
    total as f64 / trades.len() as f64
}

/// Longest run of consecutive winners (or losers), single scan.
pub fn max_consecutive(trades: &[Trade], winners: bool) -> usize {
    let mut best = 0usize;
    let mut current = 0usize;
    for trade in trades {
        if trade.is_winner() == winners {
            current += 1;
            best = best.max(current);
        } else {
            current = 0;
        }
    }
    best
}

// ─── Aggregate ───────────────────────────────────────────────────────

/// The full metric set reported for a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub total_return: f64,
    pub total_return_pct: f64,
    pub annualized_return: f64,
    pub max_drawdown: f64,
    pub max_drawdown_pct: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub calmar_ratio: f64,
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub profit_factor: f64,
    pub expectancy: f64,
    pub avg_holding_days: f64,
    pub max_consecutive_wins: usize,
    pub max_consecutive_losses: usize,
}

impl Metrics {
    /// Trade statistics only — equity-curve fields stay zero.
    ///
    /// This is what the fill matcher feeds with live round trips so backtest
    /// and live trade stats come out of the same code.
    pub fn from_trades(trades: &[Trade]) -> Self {
        let win_rate = win_rate(trades);
        let avg_win = avg_win(trades);
        let avg_loss = avg_loss(trades);
        Self {
            total_trades: trades.len(),
            winning_trades: trades.iter().filter(|t| t.is_winner()).count(),
            losing_trades: trades.iter().filter(|t| !t.is_winner()).count(),
            win_rate,
            avg_win,
            avg_loss,
            profit_factor: profit_factor(trades),
            expectancy: expectancy(win_rate, avg_win, avg_loss),
            avg_holding_days: avg_holding_days(trades),
            max_consecutive_wins: max_consecutive(trades, true),
            max_consecutive_losses: max_consecutive(trades, false),
            ..Self::default()
        }
    }

    /// Full metric set over a completed run.
    pub fn compute(
        equity_curve: &[f64],
        daily_returns: &[f64],
        trades: &[Trade],
        initial_capital: f64,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        let mut metrics = Self::from_trades(trades);

        metrics.total_return = total_return(equity_curve, initial_capital);
        metrics.total_return_pct = total_return_pct(metrics.total_return, initial_capital);
        metrics.annualized_return =
            annualized_return(metrics.total_return_pct, (end_date - start_date).num_days());

        let (drawdown, drawdown_pct) = max_drawdown(equity_curve);
        metrics.max_drawdown = drawdown;
        metrics.max_drawdown_pct = drawdown_pct;

        metrics.sharpe_ratio = sharpe_ratio(daily_returns);
        metrics.sortino_ratio = sortino_ratio(daily_returns);
        metrics.calmar_ratio = calmar_ratio(metrics.annualized_return, metrics.max_drawdown_pct);

        metrics
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1). 0 for fewer than two values.
fn std_dev(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n as f64 - 1.0);
    variance.sqrt()
}
