//! Rendering and artifact export for backtest results.
//!
//! Three surfaces over a `BacktestResult`:
//! - `text` — fixed-width console summary
//! - `markdown` — human-readable single-run report
//! - `artifacts` — `result.json` / `trades.csv` / `equity.csv` / `report.md`
//!   bundle, plus loading a saved run back
//!
//! Persisted results carry `schema_version`; loading rejects versions newer
//! than this build understands.

pub mod artifacts;
pub mod markdown;
pub mod text;

pub use artifacts::{load_run, save_run};
