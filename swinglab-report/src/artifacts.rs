//! Artifact bundle — persists a run to disk and loads it back.
//!
//! `save_run` creates `<output_dir>/<strategy>_<symbol>_<end-date>/` with:
//! - `result.json` — the full `BacktestResult`, pretty-printed
//! - `trades.csv` — the trade tape
//! - `equity.csv` — date, equity, daily return per bar
//! - `report.md` — the Markdown report
//!
//! `load_run` reads `result.json` back, rejecting schema versions newer
//! than this build.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;

use swinglab_core::domain::Trade;
use swinglab_core::engine::{BacktestResult, SCHEMA_VERSION};

// ─── JSON ────────────────────────────────────────────────────────────

/// Serialize a result to pretty JSON.
pub fn export_json(result: &BacktestResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize BacktestResult to JSON")
}

/// Deserialize a result from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<BacktestResult> {
    let result: BacktestResult =
        serde_json::from_str(json).context("failed to deserialize BacktestResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

// ─── CSV ─────────────────────────────────────────────────────────────

/// Export the trade tape as CSV.
///
/// Columns: entry_date, exit_date, side, quantity, entry_price, exit_price,
/// pnl, return_pct, holding_days, entry_reason, exit_reason
pub fn export_trades_csv(trades: &[Trade]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "entry_date",
        "exit_date",
        "side",
        "quantity",
        "entry_price",
        "exit_price",
        "pnl",
        "return_pct",
        "holding_days",
        "entry_reason",
        "exit_reason",
    ])?;

    for t in trades {
        wtr.write_record([
            &t.entry_date.to_string(),
            &t.exit_date.to_string(),
            &format!("{:?}", t.side),
            &format!("{:.4}", t.quantity),
            &format!("{:.4}", t.entry_price),
            &format!("{:.4}", t.exit_price),
            &format!("{:.4}", t.pnl),
            &format!("{:.6}", t.return_pct()),
            &t.holding_days().to_string(),
            &t.entry_reason,
            &t.exit_reason,
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export the equity curve as CSV with date, equity, and daily_return
/// columns. The three slices are the aligned vectors from a result.
pub fn export_equity_csv(
    dates: &[NaiveDate],
    equity_curve: &[f64],
    daily_returns: &[f64],
) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["date", "equity", "daily_return"])?;
    for ((date, equity), ret) in dates.iter().zip(equity_curve).zip(daily_returns) {
        wtr.write_record([
            &date.to_string(),
            &format!("{:.4}", equity),
            &format!("{:.8}", ret),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Bundle ──────────────────────────────────────────────────────────

/// Save the full artifact set for a single run.
///
/// Returns the path of the created run directory.
pub fn save_run(output_dir: &Path, result: &BacktestResult) -> Result<PathBuf> {
    let dirname = format!(
        "{}_{}_{}",
        result.strategy_name, result.symbol, result.end_date
    );
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    let json = export_json(result)?;
    let json_path = run_dir.join("result.json");
    std::fs::write(&json_path, &json)
        .with_context(|| format!("failed to write {}", json_path.display()))?;

    let trades_csv = export_trades_csv(&result.trades)?;
    let trades_path = run_dir.join("trades.csv");
    std::fs::write(&trades_path, &trades_csv)
        .with_context(|| format!("failed to write {}", trades_path.display()))?;

    let equity_csv =
        export_equity_csv(&result.dates, &result.equity_curve, &result.daily_returns)?;
    let equity_path = run_dir.join("equity.csv");
    std::fs::write(&equity_path, &equity_csv)
        .with_context(|| format!("failed to write {}", equity_path.display()))?;

    let report_path = run_dir.join("report.md");
    std::fs::write(&report_path, crate::markdown::render(result))
        .with_context(|| format!("failed to write {}", report_path.display()))?;

    Ok(run_dir)
}

/// Load a result back from a run directory's `result.json`.
pub fn load_run(dir: &Path) -> Result<BacktestResult> {
    let path = dir.join("result.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}
