//! The backtest event loop.
//!
//! `BacktestEngine` replays a normalized daily series against a strategy:
//!
//! 1. Reset run state, validate capital, normalize the input table.
//! 2. Collect the strategy's scheduled signals, bucketed by date (a later
//!    batch entry for the same date replaces the earlier one). Scheduled
//!    and reactive signals both land in the result's signal history.
//! 3. Per bar, in date order: mark the open position and check
//!    `should_exit`, then the bar's scheduled signal, then the reactive
//!    `on_bar` signal, then record equity and the daily return.
//! 4. After the last bar, snapshot any still-open position into the result
//!    and force-close it at the last close with reason "end of backtest".
//!
//! Entries are long-only. A buy while a position is open and a sell while
//! flat are no-ops. At most one position exists at any time.

use std::collections::HashMap;

use chrono::NaiveDate;
use thiserror::Error;

use super::metrics::Metrics;
use super::result::BacktestResult;
use crate::data::{DataError, PriceTable};
use crate::domain::{Bar, Position, PositionSide, Signal, SignalAction, Trade};
use crate::strategy::Strategy;

/// Fatal run errors. Everything else (unaffordable buys, signals while in
/// the wrong state, signals dated off-series) is a silent no-op.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid initial capital: {0} (must be positive)")]
    InvalidCapital(f64),

    #[error("failed to normalize price data: {0}")]
    Data(#[from] DataError),
}

/// Single-position, long-only backtest engine.
///
/// Holds only per-run mutable state; `run` resets it, so one engine can be
/// reused (or several run in parallel, one per thread) with identical
/// results for identical inputs.
#[derive(Debug, Default)]
pub struct BacktestEngine {
    cash: f64,
    position: Option<Position>,
    trades: Vec<Trade>,
    signals: Vec<Signal>,
    dates: Vec<NaiveDate>,
    equity_curve: Vec<f64>,
    daily_returns: Vec<f64>,
}

impl BacktestEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run against a raw table: normalize (column mapping, date parsing,
    /// sort), then replay.
    pub fn run(
        &mut self,
        symbol: &str,
        table: &PriceTable,
        strategy: &dyn Strategy,
    ) -> Result<BacktestResult, EngineError> {
        let bars = table.normalize()?;
        self.run_bars(symbol, bars, strategy)
    }

    /// Run against already-typed bars. Sorts by date; rejects an empty
    /// series or non-positive starting capital.
    pub fn run_bars(
        &mut self,
        symbol: &str,
        mut bars: Vec<Bar>,
        strategy: &dyn Strategy,
    ) -> Result<BacktestResult, EngineError> {
        let initial_capital = strategy.config().initial_capital;
        if initial_capital <= 0.0 {
            return Err(EngineError::InvalidCapital(initial_capital));
        }
        if bars.is_empty() {
            return Err(DataError::EmptySeries.into());
        }
        bars.sort_by_key(|b| b.date);

        self.reset(initial_capital);
        let rate = strategy.config().commission_rate;

        // ─── Phase 1: scheduled signals, last write per date wins ────
        self.signals = strategy.generate_signals(&bars);
        let mut scheduled: HashMap<NaiveDate, Signal> = HashMap::new();
        for signal in &self.signals {
            scheduled.insert(signal.date, signal.clone());
        }
        log::debug!(
            "backtest start: {} on {symbol}, {} bars, {} scheduled dates",
            strategy.name(),
            bars.len(),
            scheduled.len()
        );

        // ─── Phase 2: bar loop ───────────────────────────────────────
        let mut prev_equity = initial_capital;
        for bar in &bars {
            if let Some(pos) = self.position.as_mut() {
                pos.mark(bar.close);
            }

            // Exit check runs before any same-bar entry.
            let exit_reason = match &self.position {
                Some(pos) => strategy.should_exit(pos, bar.close, bar.date),
                None => None,
            };
            if let Some(reason) = exit_reason {
                self.close_position(bar.date, bar.close, &reason, rate);
            }

            if let Some(signal) = scheduled.get(&bar.date) {
                self.apply_signal(signal, strategy, rate);
            }

            if let Some(signal) = strategy.on_bar(bar, self.position.as_ref()) {
                self.apply_signal(&signal, strategy, rate);
                self.signals.push(signal);
            }

            if let Some(pos) = self.position.as_mut() {
                pos.mark(bar.close);
            }
            let equity = self.cash + self.position.as_ref().map_or(0.0, Position::market_value);
            self.dates.push(bar.date);
            self.equity_curve.push(equity);
            self.daily_returns.push(if prev_equity > 0.0 {
                equity / prev_equity - 1.0
            } else {
                0.0
            });
            prev_equity = equity;
        }

        // ─── Phase 3: end-of-run settlement ──────────────────────────
        let final_position = self.position.clone();
        if self.position.is_some() {
            // An open position implies at least one processed bar.
            if let Some(last) = bars.last() {
                self.close_position(last.date, last.close, "end of backtest", rate);
                // The liquidation settles into the final equity entry so
                // final_capital always equals the curve's last point.
                let n = self.equity_curve.len();
                self.equity_curve[n - 1] = self.cash;
                let prev = if n >= 2 {
                    self.equity_curve[n - 2]
                } else {
                    initial_capital
                };
                self.daily_returns[n - 1] = if prev > 0.0 { self.cash / prev - 1.0 } else { 0.0 };
            }
        }

        // ─── Phase 4: assemble ───────────────────────────────────────
        let start_date = bars[0].date;
        let end_date = bars[bars.len() - 1].date;
        let metrics = Metrics::compute(
            &self.equity_curve,
            &self.daily_returns,
            &self.trades,
            initial_capital,
            start_date,
            end_date,
        );
        log::info!(
            "backtest complete: {} on {symbol}, {} trades, final capital {:.2}",
            strategy.name(),
            self.trades.len(),
            self.cash
        );

        Ok(BacktestResult {
            schema_version: super::result::SCHEMA_VERSION,
            strategy_name: strategy.name().to_string(),
            symbol: symbol.to_string(),
            start_date,
            end_date,
            initial_capital,
            final_capital: self.cash,
            final_position,
            trades: std::mem::take(&mut self.trades),
            signals: std::mem::take(&mut self.signals),
            dates: std::mem::take(&mut self.dates),
            equity_curve: std::mem::take(&mut self.equity_curve),
            daily_returns: std::mem::take(&mut self.daily_returns),
            metrics,
        })
    }

    fn reset(&mut self, initial_capital: f64) {
        self.cash = initial_capital;
        self.position = None;
        self.trades.clear();
        self.signals.clear();
        self.dates.clear();
        self.equity_curve.clear();
        self.daily_returns.clear();
    }

    fn apply_signal(&mut self, signal: &Signal, strategy: &dyn Strategy, rate: f64) {
        if signal.price.is_nan() || signal.price <= 0.0 {
            log::warn!(
                "{}: ignoring {} signal with unusable price {}",
                signal.date,
                signal.action,
                signal.price
            );
            return;
        }

        match signal.action {
            SignalAction::Buy => {
                if self.position.is_some() {
                    return; // already long — no pyramiding
                }
                self.open_position(signal, strategy, rate);
            }
            SignalAction::Sell => {
                if self.position.is_none() {
                    return; // nothing to close
                }
                self.close_position(signal.date, signal.price, &signal.reason, rate);
            }
        }
    }

    fn open_position(&mut self, signal: &Signal, strategy: &dyn Strategy, rate: f64) {
        let price = signal.price;
        // An explicit signal quantity caps the strategy's sizing; it never
        // raises it.
        let sized = strategy.position_size(self.cash, price);
        let requested = if signal.quantity > 0.0 {
            sized.min(signal.quantity)
        } else {
            sized
        };

        // Cap at what cash affords including the entry commission; entries
        // below one whole share are skipped.
        let affordable = (self.cash / (price * (1.0 + rate))).floor();
        let quantity = requested.min(affordable);
        if quantity < 1.0 {
            log::debug!(
                "{}: skipping buy, cannot afford a whole share at {:.2}",
                signal.date,
                price
            );
            return;
        }

        let commission = quantity * price * rate;
        self.cash -= quantity * price + commission;
        self.position = Some(Position::open(
            signal.date,
            price,
            quantity,
            PositionSide::Long,
            signal.reason.clone(),
        ));
        log::debug!(
            "{}: opened long {quantity} x {price:.2} ({})",
            signal.date,
            signal.reason
        );
    }

    fn close_position(&mut self, date: NaiveDate, price: f64, reason: &str, rate: f64) {
        if let Some(position) = self.position.take() {
            let exit_commission = position.quantity * price * rate;
            let entry_value = position.entry_price * position.quantity;
            let trade = position.close(date, price, reason, exit_commission);
            // Proceeds = entry basis plus realized pnl (pnl is already net
            // of the exit commission).
            self.cash += entry_value + trade.pnl;
            log::debug!(
                "{date}: closed {} x {price:.2}, pnl {:.2} ({reason})",
                trade.quantity,
                trade.pnl
            );
            self.trades.push(trade);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::StrategyConfig;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
        let base = d(2024, 1, 1);
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar::flat(base + chrono::Duration::days(i as i64), c))
            .collect()
    }

    /// Strategy that replays a fixed signal batch.
    struct Scripted {
        config: StrategyConfig,
        signals: Vec<Signal>,
    }

    impl Scripted {
        fn new(signals: Vec<Signal>) -> Self {
            Self {
                config: StrategyConfig {
                    initial_capital: 10_000.0,
                    ..StrategyConfig::default()
                },
                signals,
            }
        }

        fn with_config(signals: Vec<Signal>, config: StrategyConfig) -> Self {
            Self { config, signals }
        }
    }

    impl Strategy for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        fn config(&self) -> &StrategyConfig {
            &self.config
        }

        fn generate_signals(&self, _bars: &[Bar]) -> Vec<Signal> {
            self.signals.clone()
        }
    }

    /// Reactive strategy: buys dips, sells rips, via `on_bar` only.
    struct DipBuyer {
        config: StrategyConfig,
        buy_below: f64,
        sell_above: f64,
    }

    impl Strategy for DipBuyer {
        fn name(&self) -> &str {
            "dip_buyer"
        }

        fn config(&self) -> &StrategyConfig {
            &self.config
        }

        fn generate_signals(&self, _bars: &[Bar]) -> Vec<Signal> {
            Vec::new()
        }

        fn on_bar(&self, bar: &Bar, position: Option<&Position>) -> Option<Signal> {
            match position {
                None if bar.close <= self.buy_below => {
                    Some(Signal::buy(bar.date, bar.close, "dip buy"))
                }
                Some(_) if bar.close >= self.sell_above => {
                    Some(Signal::sell(bar.date, bar.close, "rip sell"))
                }
                _ => None,
            }
        }
    }

    /// Scripted signals plus a hard share ceiling from `position_size`.
    struct CappedSizer {
        config: StrategyConfig,
        signals: Vec<Signal>,
        max_shares: f64,
    }

    impl Strategy for CappedSizer {
        fn name(&self) -> &str {
            "capped_sizer"
        }

        fn config(&self) -> &StrategyConfig {
            &self.config
        }

        fn generate_signals(&self, _bars: &[Bar]) -> Vec<Signal> {
            self.signals.clone()
        }

        fn position_size(&self, capital: f64, price: f64) -> f64 {
            if price <= 0.0 {
                return 0.0;
            }
            (capital / price).floor().min(self.max_shares)
        }
    }

    #[test]
    fn round_trip_books_pnl_and_equity() {
        let bars = bars_from_closes(&[100.0, 110.0, 120.0]);
        let strategy = Scripted::new(vec![
            Signal::buy(d(2024, 1, 1), 100.0, "entry").with_quantity(50.0),
            Signal::sell(d(2024, 1, 3), 120.0, "exit"),
        ]);

        let mut engine = BacktestEngine::new();
        let result = engine.run_bars("TEST", bars, &strategy).unwrap();

        assert_eq!(result.trades.len(), 1);
        assert_eq!(result.signals.len(), 2);
        assert!((result.trades[0].pnl - 1000.0).abs() < 1e-9);
        assert!((result.final_capital - 11_000.0).abs() < 1e-9);
        assert!((result.metrics.total_return_pct - 0.10).abs() < 1e-9);
        assert!(result.final_position.is_none());

        assert_eq!(result.equity_curve, vec![10_000.0, 10_500.0, 11_000.0]);
        assert_eq!(result.daily_returns[0], 0.0);
        assert!((result.daily_returns[1] - 0.05).abs() < 1e-9);
        assert!((result.daily_returns[2] - (11_000.0 / 10_500.0 - 1.0)).abs() < 1e-9);
    }

    #[test]
    fn zero_quantity_delegates_sizing() {
        let bars = bars_from_closes(&[100.0, 110.0]);
        let strategy = Scripted::new(vec![
            Signal::buy(d(2024, 1, 1), 100.0, "entry"),
            Signal::sell(d(2024, 1, 2), 110.0, "exit"),
        ]);

        let result = BacktestEngine::new()
            .run_bars("TEST", bars, &strategy)
            .unwrap();

        // Default sizing: all 10_000 at 100 → 100 shares.
        assert!((result.trades[0].quantity - 100.0).abs() < 1e-9);
        assert!((result.final_capital - 11_000.0).abs() < 1e-9);
    }

    #[test]
    fn buy_while_open_is_a_noop() {
        let bars = bars_from_closes(&[100.0, 105.0, 110.0]);
        let strategy = Scripted::new(vec![
            Signal::buy(d(2024, 1, 1), 100.0, "first").with_quantity(10.0),
            Signal::buy(d(2024, 1, 2), 105.0, "second").with_quantity(10.0),
            Signal::sell(d(2024, 1, 3), 110.0, "exit"),
        ]);

        let result = BacktestEngine::new()
            .run_bars("TEST", bars, &strategy)
            .unwrap();

        assert_eq!(result.trades.len(), 1);
        assert_eq!(result.trades[0].entry_reason, "first");
        assert!((result.trades[0].quantity - 10.0).abs() < 1e-9);
    }

    #[test]
    fn sell_while_flat_is_a_noop() {
        let bars = bars_from_closes(&[100.0, 110.0]);
        let strategy = Scripted::new(vec![Signal::sell(d(2024, 1, 1), 100.0, "phantom")]);

        let result = BacktestEngine::new()
            .run_bars("TEST", bars, &strategy)
            .unwrap();

        assert!(result.trades.is_empty());
        assert_eq!(result.equity_curve, vec![10_000.0, 10_000.0]);
        assert_eq!(result.metrics.total_trades, 0);
    }

    #[test]
    fn unaffordable_entry_is_skipped() {
        let bars = bars_from_closes(&[20_000.0, 21_000.0]);
        let strategy = Scripted::new(vec![Signal::buy(d(2024, 1, 1), 20_000.0, "too big")]);

        let result = BacktestEngine::new()
            .run_bars("TEST", bars, &strategy)
            .unwrap();

        assert!(result.trades.is_empty());
        assert!(result.final_position.is_none());
        assert!((result.final_capital - 10_000.0).abs() < 1e-9);
    }

    #[test]
    fn oversized_request_is_capped_to_cash() {
        let bars = bars_from_closes(&[100.0, 100.0]);
        let strategy = Scripted::new(vec![
            Signal::buy(d(2024, 1, 1), 100.0, "greedy").with_quantity(500.0)
        ]);

        let result = BacktestEngine::new()
            .run_bars("TEST", bars, &strategy)
            .unwrap();

        // Capped to the 100 shares cash affords; forced close realizes it.
        assert_eq!(result.trades.len(), 1);
        assert!((result.trades[0].quantity - 100.0).abs() < 1e-9);
    }

    #[test]
    fn explicit_quantity_caps_sizing_but_never_raises_it() {
        let bars = bars_from_closes(&[100.0, 100.0, 100.0, 100.0]);
        let strategy = CappedSizer {
            config: StrategyConfig {
                initial_capital: 10_000.0,
                ..StrategyConfig::default()
            },
            signals: vec![
                Signal::buy(d(2024, 1, 1), 100.0, "wants 50").with_quantity(50.0),
                Signal::sell(d(2024, 1, 2), 100.0, "flatten"),
                Signal::buy(d(2024, 1, 3), 100.0, "wants 5").with_quantity(5.0),
            ],
            max_shares: 10.0,
        };

        let result = BacktestEngine::new()
            .run_bars("TEST", bars, &strategy)
            .unwrap();

        // The 50-share request is held to the strategy's 10-share size; the
        // 5-share request stays under it and passes through.
        assert_eq!(result.trades.len(), 2);
        assert!((result.trades[0].quantity - 10.0).abs() < 1e-9);
        assert!((result.trades[1].quantity - 5.0).abs() < 1e-9);
    }

    #[test]
    fn commission_charged_on_both_sides() {
        let bars = bars_from_closes(&[100.0, 110.0, 120.0]);
        let config = StrategyConfig {
            initial_capital: 10_000.0,
            commission_rate: 0.001,
            stop_loss_pct: None,
        };
        let strategy = Scripted::with_config(
            vec![
                Signal::buy(d(2024, 1, 1), 100.0, "entry").with_quantity(50.0),
                Signal::sell(d(2024, 1, 3), 120.0, "exit"),
            ],
            config,
        );

        let result = BacktestEngine::new()
            .run_bars("TEST", bars, &strategy)
            .unwrap();

        // Entry commission 5.0 paid from cash; exit commission 6.0 inside pnl.
        assert!((result.trades[0].pnl - 994.0).abs() < 1e-9);
        assert!((result.final_capital - 10_989.0).abs() < 1e-9);
    }

    #[test]
    fn open_position_is_force_closed_at_the_end() {
        let bars = bars_from_closes(&[100.0, 110.0, 120.0]);
        let strategy = Scripted::new(vec![Signal::buy(d(2024, 1, 1), 100.0, "entry")]);

        let result = BacktestEngine::new()
            .run_bars("TEST", bars, &strategy)
            .unwrap();

        assert_eq!(result.trades.len(), 1);
        let trade = &result.trades[0];
        assert_eq!(trade.exit_reason, "end of backtest");
        assert_eq!(trade.exit_date, d(2024, 1, 3));
        assert!((trade.exit_price - 120.0).abs() < 1e-9);

        // Snapshot taken before the forced closure.
        let snapshot = result.final_position.as_ref().unwrap();
        assert!((snapshot.entry_price - 100.0).abs() < 1e-9);
        assert!((result.final_capital - 12_000.0).abs() < 1e-9);
        assert_eq!(*result.equity_curve.last().unwrap(), result.final_capital);
    }

    #[test]
    fn forced_close_settles_exit_commission_into_final_equity() {
        let bars = bars_from_closes(&[100.0, 110.0]);
        let config = StrategyConfig {
            initial_capital: 10_000.0,
            commission_rate: 0.01,
            stop_loss_pct: None,
        };
        let strategy =
            Scripted::with_config(vec![Signal::buy(d(2024, 1, 1), 100.0, "entry")], config);

        let result = BacktestEngine::new()
            .run_bars("TEST", bars, &strategy)
            .unwrap();

        // 99 shares at 100 (commission reserve), entry commission 99.
        // Forced exit at 110: commission 108.9, pnl 990 - 108.9 = 881.1.
        let expected_final = 1.0 + 9_900.0 + 881.1;
        assert!((result.final_capital - expected_final).abs() < 1e-9);
        assert!((result.equity_curve[1] - expected_final).abs() < 1e-9);
        assert!(
            (result.daily_returns[1] - (expected_final / result.equity_curve[0] - 1.0)).abs()
                < 1e-9
        );
    }

    #[test]
    fn later_signal_for_the_same_date_wins() {
        let bars = bars_from_closes(&[100.0, 110.0]);
        let strategy = Scripted::new(vec![
            Signal::buy(d(2024, 1, 1), 100.0, "early").with_quantity(10.0),
            Signal::buy(d(2024, 1, 1), 100.0, "late").with_quantity(20.0),
        ]);

        let result = BacktestEngine::new()
            .run_bars("TEST", bars, &strategy)
            .unwrap();

        assert_eq!(result.trades.len(), 1);
        assert_eq!(result.trades[0].entry_reason, "late");
        assert!((result.trades[0].quantity - 20.0).abs() < 1e-9);
    }

    #[test]
    fn exit_check_runs_before_a_same_bar_entry() {
        let bars = bars_from_closes(&[100.0, 95.0, 85.0]);
        let config = StrategyConfig {
            initial_capital: 10_000.0,
            commission_rate: 0.0,
            stop_loss_pct: Some(0.10),
        };
        let strategy = Scripted::with_config(
            vec![
                Signal::buy(d(2024, 1, 1), 100.0, "first entry").with_quantity(50.0),
                Signal::buy(d(2024, 1, 3), 85.0, "re-entry").with_quantity(50.0),
            ],
            config,
        );

        let result = BacktestEngine::new()
            .run_bars("TEST", bars, &strategy)
            .unwrap();

        // Stop fires on the 85 bar, then the scheduled re-entry opens a new
        // position the same day (force-closed at the end).
        assert_eq!(result.trades.len(), 2);
        assert!(result.trades[0].exit_reason.contains("stop loss"));
        assert_eq!(result.trades[0].exit_date, d(2024, 1, 3));
        assert_eq!(result.trades[1].entry_reason, "re-entry");
        assert_eq!(result.trades[1].entry_date, d(2024, 1, 3));
        assert_eq!(result.trades[1].exit_reason, "end of backtest");
    }

    #[test]
    fn stop_and_scheduled_sell_on_the_same_bar_close_once() {
        let bars = bars_from_closes(&[100.0, 85.0]);
        let config = StrategyConfig {
            initial_capital: 10_000.0,
            commission_rate: 0.0,
            stop_loss_pct: Some(0.10),
        };
        let strategy = Scripted::with_config(
            vec![
                Signal::buy(d(2024, 1, 1), 100.0, "entry").with_quantity(50.0),
                Signal::sell(d(2024, 1, 2), 85.0, "planned exit"),
            ],
            config,
        );

        let result = BacktestEngine::new()
            .run_bars("TEST", bars, &strategy)
            .unwrap();

        // The stop closes the position first; the scheduled sell then finds
        // nothing to close.
        assert_eq!(result.trades.len(), 1);
        assert!(result.trades[0].exit_reason.contains("stop loss"));
        assert!((result.final_capital - 9_250.0).abs() < 1e-9);
    }

    #[test]
    fn reused_engine_reproduces_results() {
        let bars = bars_from_closes(&[100.0, 90.0, 95.0, 120.0, 80.0]);
        let strategy = DipBuyer {
            config: StrategyConfig {
                initial_capital: 10_000.0,
                ..StrategyConfig::default()
            },
            buy_below: 90.0,
            sell_above: 120.0,
        };

        let mut engine = BacktestEngine::new();
        let first = engine.run_bars("TEST", bars.clone(), &strategy).unwrap();
        let second = engine.run_bars("TEST", bars, &strategy).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn on_bar_signals_trade_reactively() {
        let bars = bars_from_closes(&[100.0, 90.0, 95.0, 120.0]);
        let strategy = DipBuyer {
            config: StrategyConfig {
                initial_capital: 10_000.0,
                ..StrategyConfig::default()
            },
            buy_below: 90.0,
            sell_above: 120.0,
        };

        let result = BacktestEngine::new()
            .run_bars("TEST", bars, &strategy)
            .unwrap();

        // Bought 111 shares at 90, sold at 120; both reactive signals are
        // kept in the history.
        assert_eq!(result.trades.len(), 1);
        assert_eq!(result.signals.len(), 2);
        assert_eq!(result.trades[0].entry_reason, "dip buy");
        assert_eq!(result.trades[0].exit_reason, "rip sell");
        assert!((result.trades[0].quantity - 111.0).abs() < 1e-9);
        assert!((result.final_capital - (10_000.0 + 111.0 * 30.0)).abs() < 1e-9);
    }

    #[test]
    fn signals_dated_off_series_never_execute() {
        let bars = bars_from_closes(&[100.0, 110.0]);
        let strategy = Scripted::new(vec![
            Signal::buy(d(2023, 12, 1), 100.0, "before"),
            Signal::buy(d(2024, 6, 1), 100.0, "after"),
        ]);

        let result = BacktestEngine::new()
            .run_bars("TEST", bars, &strategy)
            .unwrap();
        // No fills, but the emitted signals still appear in the history.
        assert!(result.trades.is_empty());
        assert_eq!(result.signals.len(), 2);
    }

    #[test]
    fn nan_priced_signal_is_ignored() {
        let bars = bars_from_closes(&[100.0, 110.0]);
        let strategy = Scripted::new(vec![Signal::buy(d(2024, 1, 1), f64::NAN, "broken")]);

        let result = BacktestEngine::new()
            .run_bars("TEST", bars, &strategy)
            .unwrap();
        assert!(result.trades.is_empty());
        assert!((result.final_capital - 10_000.0).abs() < 1e-9);
    }

    #[test]
    fn quiet_run_reports_zero_metrics() {
        let bars = bars_from_closes(&[100.0; 30]);
        let strategy = Scripted::new(Vec::new());

        let result = BacktestEngine::new()
            .run_bars("TEST", bars, &strategy)
            .unwrap();

        assert!(result.trades.is_empty());
        assert!(result.signals.is_empty());
        assert!(result.daily_returns.iter().all(|r| *r == 0.0));
        assert_eq!(result.metrics.sharpe_ratio, 0.0);
        assert_eq!(result.metrics.max_drawdown, 0.0);
        assert_eq!(result.metrics.total_return, 0.0);
    }

    #[test]
    fn single_bar_series_yields_a_flat_degenerate_run() {
        let bars = bars_from_closes(&[100.0]);
        let strategy = Scripted::new(Vec::new());

        let result = BacktestEngine::new()
            .run_bars("TEST", bars, &strategy)
            .unwrap();

        assert_eq!(result.start_date, result.end_date);
        assert_eq!(result.equity_curve, vec![10_000.0]);
        assert_eq!(result.daily_returns, vec![0.0]);
        assert_eq!(result.metrics.total_trades, 0);
        assert_eq!(result.metrics.sharpe_ratio, 0.0);
        assert_eq!(result.metrics.sortino_ratio, 0.0);
        assert_eq!(result.metrics.calmar_ratio, 0.0);
        assert!((result.final_capital - 10_000.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_nonpositive_capital() {
        let bars = bars_from_closes(&[100.0]);
        let strategy = Scripted::with_config(
            Vec::new(),
            StrategyConfig {
                initial_capital: 0.0,
                ..StrategyConfig::default()
            },
        );

        let err = BacktestEngine::new()
            .run_bars("TEST", bars, &strategy)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidCapital(_)));
    }

    #[test]
    fn rejects_empty_series() {
        let strategy = Scripted::new(Vec::new());
        let err = BacktestEngine::new()
            .run_bars("TEST", Vec::new(), &strategy)
            .unwrap_err();
        assert!(matches!(err, EngineError::Data(DataError::EmptySeries)));
    }

    #[test]
    fn run_normalizes_a_raw_table() {
        // Unsorted rows, shuffled case — the engine's entry point fixes both.
        let table = PriceTable::new(
            vec![
                "Date".into(),
                "OPEN".into(),
                "High".into(),
                "low".into(),
                "Close".into(),
                "Vol".into(),
            ],
            vec![
                vec![
                    "2024-01-03".into(),
                    "120".into(),
                    "121".into(),
                    "119".into(),
                    "120".into(),
                    "10".into(),
                ],
                vec![
                    "2024-01-01".into(),
                    "100".into(),
                    "101".into(),
                    "99".into(),
                    "100".into(),
                    "10".into(),
                ],
                vec![
                    "2024-01-02".into(),
                    "110".into(),
                    "111".into(),
                    "109".into(),
                    "110".into(),
                    "10".into(),
                ],
            ],
        );
        let strategy = Scripted::new(vec![
            Signal::buy(d(2024, 1, 1), 100.0, "entry").with_quantity(50.0),
            Signal::sell(d(2024, 1, 3), 120.0, "exit"),
        ]);

        let result = BacktestEngine::new()
            .run("TEST", &table, &strategy)
            .unwrap();

        assert_eq!(result.start_date, d(2024, 1, 1));
        assert_eq!(result.end_date, d(2024, 1, 3));
        assert!((result.final_capital - 11_000.0).abs() < 1e-9);
    }

    #[test]
    fn run_surfaces_missing_columns() {
        let table = PriceTable::new(
            vec!["date".into(), "open".into(), "high".into(), "low".into()],
            vec![vec![
                "2024-01-01".into(),
                "1".into(),
                "1".into(),
                "1".into(),
            ]],
        );
        let strategy = Scripted::new(Vec::new());

        let err = BacktestEngine::new()
            .run("TEST", &table, &strategy)
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Data(DataError::MissingColumn("close"))
        ));
    }
}
