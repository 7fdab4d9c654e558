//! swinglab CLI — backtest, sweep, reconcile, and synthetic-data commands.
//!
//! Commands:
//! - `run` — execute one backtest from a TOML config and print a report
//! - `sweep` — grid-search MA-crossover periods, ranked by Sharpe
//! - `reconcile` — rebuild round-trip trades from a broker fills CSV
//! - `synth` — write a deterministic synthetic bar series as CSV

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};

use swinglab_core::domain::Bar;
use swinglab_core::engine::{BacktestEngine, Metrics};
use swinglab_core::matcher::{match_fills, MatchedTrade};
use swinglab_core::strategy::MaKind;

mod config;
mod loader;
mod sweep;

use config::{RunConfig, StrategySpec};
use sweep::SweepGrid;

#[derive(Parser)]
#[command(
    name = "swinglab",
    about = "swinglab CLI — daily-bar swing-trading backtester"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a backtest described by a TOML config file.
    Run {
        /// Path to the TOML run config.
        #[arg(long)]
        config: PathBuf,

        /// Artifact directory; overrides the config's out_dir.
        #[arg(long)]
        out: Option<PathBuf>,

        /// Output format: text, markdown, json.
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Grid-search MA-crossover periods over one symbol's bars.
    Sweep {
        /// Path to the TOML run config supplying symbol, data, and costs.
        #[arg(long)]
        config: PathBuf,

        /// Fast periods to try (comma-separated, e.g. 5,10,20).
        #[arg(long, value_delimiter = ',', required = true)]
        fast: Vec<usize>,

        /// Slow periods to try (comma-separated, e.g. 30,50,100).
        #[arg(long, value_delimiter = ',', required = true)]
        slow: Vec<usize>,

        /// Save the best arm's artifacts here.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Rebuild round-trip trades from a broker fills CSV.
    Reconcile {
        /// Fills CSV with date,symbol,side,price,quantity[,commission]
        /// columns; side is BUY or SELL.
        #[arg(long)]
        fills: PathBuf,

        /// Output format: text, json.
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Write a deterministic synthetic bar series as CSV.
    Synth {
        /// Symbol seeding the random walk.
        #[arg(long)]
        symbol: String,

        /// Number of bars to generate.
        #[arg(long, default_value_t = 500)]
        bars: usize,

        /// Output CSV path.
        #[arg(long)]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            out,
            format,
        } => run_backtest_cmd(&config, out, &format),
        Commands::Sweep {
            config,
            fast,
            slow,
            out,
        } => run_sweep_cmd(&config, fast, slow, out),
        Commands::Reconcile { fills, format } => run_reconcile_cmd(&fills, &format),
        Commands::Synth { symbol, bars, out } => run_synth_cmd(&symbol, bars, &out),
    }
}

/// Resolve the config's `[data]` section into bars.
fn load_bars(config: &RunConfig) -> Result<Vec<Bar>> {
    if let Some(csv_path) = &config.data.csv {
        let bars = loader::load_csv(csv_path)?.normalize()?;
        log::info!("loaded {} bars from {}", bars.len(), csv_path.display());
        Ok(bars)
    } else {
        let bars = loader::generate_synthetic_bars(&config.symbol, config.data.bars);
        log::info!(
            "generated {} synthetic bars for {}",
            bars.len(),
            config.symbol
        );
        Ok(bars)
    }
}

fn run_backtest_cmd(config_path: &Path, out: Option<PathBuf>, format: &str) -> Result<()> {
    let config = RunConfig::load(config_path)?;
    let run_id = config.run_id();
    let strategy = config.build_strategy();
    let bars = load_bars(&config)?;

    let mut engine = BacktestEngine::new();
    let result = engine.run_bars(&config.symbol, bars, strategy.as_ref())?;
    log::info!(
        "run {run_id} finished: {} trades, final capital {:.2}",
        result.trades.len(),
        result.final_capital
    );

    match format {
        "text" => print!("{}", swinglab_report::text::render(&result)),
        "markdown" => print!("{}", swinglab_report::markdown::render(&result)),
        "json" => println!("{}", swinglab_report::artifacts::export_json(&result)?),
        _ => bail!("unknown format '{format}'. Valid: text, markdown, json"),
    }

    if config.data.synthetic {
        eprintln!("WARNING: results based on SYNTHETIC data");
    }

    if let Some(dir) = out.or_else(|| config.out_dir.clone()) {
        let run_dir = swinglab_report::save_run(&dir, &result)?;
        println!("Artifacts saved to: {} (run {run_id})", run_dir.display());
    }

    Ok(())
}

fn run_sweep_cmd(
    config_path: &Path,
    fast: Vec<usize>,
    slow: Vec<usize>,
    out: Option<PathBuf>,
) -> Result<()> {
    let config = RunConfig::load(config_path)?;
    let bars = load_bars(&config)?;

    // Sweeping always means crossovers; adopt the config's MA family when
    // it already names one.
    let kind = match config.strategy {
        StrategySpec::MaCrossover { kind, .. } => kind,
        _ => MaKind::Simple,
    };

    let grid = SweepGrid { fast, slow };
    let arm_count = grid.arms().len();
    if arm_count == 0 {
        bail!("no valid fast/slow pairs (fast must be strictly shorter than slow)");
    }

    log::info!(
        "sweeping {arm_count} arms over {} bars of {}",
        bars.len(),
        config.symbol
    );
    let results = sweep::run_sweep(&config.symbol, &bars, &grid, kind, &config.strategy_config())?;

    println!();
    println!("=== Sweep: {} ({} arms) ===", config.symbol, results.arms.len());
    print!("{}", results.to_table());

    if config.data.synthetic {
        eprintln!("WARNING: results based on SYNTHETIC data");
    }

    if let Some(dir) = out {
        if let Some(best) = results.best() {
            let run_dir = swinglab_report::save_run(&dir, &best.result)?;
            println!();
            println!("Best arm artifacts saved to: {}", run_dir.display());
        }
    }

    Ok(())
}

/// JSON payload for `reconcile --format json`.
#[derive(Serialize)]
struct ReconcileReport<'a> {
    fills: usize,
    trades: &'a [MatchedTrade],
    stats: &'a Metrics,
}

fn run_reconcile_cmd(fills_path: &Path, format: &str) -> Result<()> {
    let fills = loader::load_fills_csv(fills_path)?;
    let matched = match_fills(&fills);
    let trades: Vec<_> = matched.iter().map(MatchedTrade::to_trade).collect();
    let stats = Metrics::from_trades(&trades);
    log::info!(
        "matched {} fills into {} round trips",
        fills.len(),
        matched.len()
    );

    match format {
        "text" => print_reconciliation(fills.len(), &matched, &stats),
        "json" => {
            let report = ReconcileReport {
                fills: fills.len(),
                trades: &matched,
                stats: &stats,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => bail!("unknown format '{format}'. Valid: text, json"),
    }

    Ok(())
}

fn print_reconciliation(fill_count: usize, matched: &[MatchedTrade], stats: &Metrics) {
    println!();
    println!("=== Reconciled Fills ===");
    println!("Fills:          {fill_count}");
    println!("Round trips:    {}", matched.len());

    if matched.is_empty() {
        return;
    }

    println!();
    println!(
        "{:<8} {:<6} {:<12} {:<12} {:>9} {:>10} {:>10} {:>12}",
        "Symbol", "Side", "Entry", "Exit", "Qty", "Entry Px", "Exit Px", "PnL"
    );
    println!("{}", "-".repeat(86));
    for t in matched {
        // NaiveDate's Display ignores width flags, so stringify first.
        println!(
            "{:<8} {:<6?} {:<12} {:<12} {:>9.2} {:>10.2} {:>10.2} {:>+12.2}",
            t.symbol,
            t.side,
            t.entry_date.to_string(),
            t.exit_date.to_string(),
            t.quantity,
            t.entry_price,
            t.exit_price,
            t.pnl,
        );
    }

    println!();
    println!("--- Trade Stats ---");
    println!("Trades:         {}", matched.len());
    println!("Win Rate:       {:.1}%", stats.win_rate * 100.0);
    println!("Avg Win:        {:.2}", stats.avg_win);
    println!("Avg Loss:       {:.2}", stats.avg_loss);
    println!("Profit Factor:  {:.2}", stats.profit_factor);
    println!("Expectancy:     {:.2}", stats.expectancy);
}

fn run_synth_cmd(symbol: &str, bars: usize, out: &Path) -> Result<()> {
    if bars < 2 {
        bail!("a synthetic series needs at least 2 bars, got {bars}");
    }

    let series = loader::generate_synthetic_bars(symbol, bars);
    loader::write_bars_csv(out, &series)?;
    println!(
        "Wrote {} bars for {} to {}",
        series.len(),
        symbol,
        out.display()
    );

    Ok(())
}
