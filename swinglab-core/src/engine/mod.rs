//! Backtest engine — bar-by-bar event loop, metrics, and the run result.
//!
//! The engine consumes a normalized daily series and a strategy, then runs
//! the per-bar sequence:
//!
//! 1. Mark the open position and check the strategy's exit rule
//! 2. Apply the bar's scheduled signal, if any
//! 3. Apply the strategy's reactive `on_bar` signal, if any
//! 4. Record equity and the daily return
//!
//! After the last bar, any surviving position is snapshotted and then
//! force-closed at the final close.

pub mod backtest;
pub mod metrics;
pub mod result;

pub use backtest::{BacktestEngine, EngineError};
pub use metrics::{Metrics, TRADING_DAYS_PER_YEAR};
pub use result::{BacktestResult, SCHEMA_VERSION};
