//! SwingLab Core — domain types, strategies, the daily event loop, metrics.
//!
//! This crate contains the heart of the backtesting library:
//! - Domain types (bars, signals, positions, trades)
//! - Raw-table normalization onto the canonical bar schema
//! - Indicator kernels (SMA, EMA, Wilder ATR, rolling max)
//! - The `Strategy` trait with the built-in strategies
//! - Single-position, long-only bar-by-bar event loop
//! - Performance metrics over equity curves, daily returns, and trades
//! - LIFO fill reconciliation for external execution logs

pub mod data;
pub mod domain;
pub mod engine;
pub mod indicators;
pub mod matcher;
pub mod strategy;
