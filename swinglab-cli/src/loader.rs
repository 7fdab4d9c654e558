//! Bar loading for the CLI.
//!
//! Two sources, per the config's `[data]` section:
//! 1. CSV file → raw `PriceTable` (header mapping and parsing happen inside
//!    the engine's normalize step, so quirky exports fail with row/column
//!    diagnostics instead of a reader error here)
//! 2. Synthetic series → deterministic random walk seeded from the symbol
//!    name, for demos and offline testing
//!
//! Synthetic bars are clearly fake; the run summary labels them as such.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use swinglab_core::data::PriceTable;
use swinglab_core::domain::Bar;
use swinglab_core::matcher::FillRecord;

/// Errors from reading a bar file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl LoadError {
    fn csv(path: &Path, source: csv::Error) -> Self {
        LoadError::Csv {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Read a CSV file into an unparsed `PriceTable`.
///
/// Cells stay strings here; `PriceTable::normalize` owns column mapping,
/// date parsing and sorting.
pub fn load_csv(path: &Path) -> Result<PriceTable, LoadError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| LoadError::csv(path, e))?;

    let headers = reader
        .headers()
        .map_err(|e| LoadError::csv(path, e))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| LoadError::csv(path, e))?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(PriceTable::new(headers, rows))
}

/// Read a broker fills CSV for reconciliation.
///
/// Expects a header row naming date, symbol, side, price, quantity and
/// optionally commission; side values are BUY or SELL.
pub fn load_fills_csv(path: &Path) -> Result<Vec<FillRecord>, LoadError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| LoadError::csv(path, e))?;

    let mut fills = Vec::new();
    for record in reader.deserialize() {
        let fill: FillRecord = record.map_err(|e| LoadError::csv(path, e))?;
        fills.push(fill);
    }

    Ok(fills)
}

/// Generate a deterministic synthetic daily series.
///
/// A random walk from 100.0 seeded by BLAKE3 of the symbol name: the same
/// symbol always yields the same bars, different symbols diverge. Weekends
/// are skipped so the dates look like a real trading calendar.
pub fn generate_synthetic_bars(symbol: &str, count: usize) -> Vec<Bar> {
    let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut bars = Vec::with_capacity(count);
    let mut price = 100.0_f64;
    let mut date = NaiveDate::from_ymd_opt(2020, 1, 2).expect("valid start date");

    while bars.len() < count {
        if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            date += chrono::Duration::days(1);
            continue;
        }

        let daily_return: f64 = rng.gen_range(-0.03..0.03);
        let open = price;
        let close = price * (1.0 + daily_return);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(500_000.0..5_000_000.0_f64).round();

        bars.push(Bar {
            date,
            open,
            high,
            low,
            close,
            volume,
        });

        price = close;
        date += chrono::Duration::days(1);
    }

    bars
}

/// Write bars as a date,open,high,low,close,volume CSV.
pub fn write_bars_csv(path: &Path, bars: &[Bar]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(["date", "open", "high", "low", "close", "volume"])?;
    for bar in bars {
        writer.write_record(&[
            bar.date.to_string(),
            bar.open.to_string(),
            bar.high.to_string(),
            bar.low.to_string(),
            bar.close.to_string(),
            bar.volume.to_string(),
        ])?;
    }
    let data = writer.into_inner()?;
    std::fs::write(path, data).with_context(|| format!("writing bars to {}", path.display()))?;
    Ok(())
}
