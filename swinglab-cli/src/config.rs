//! Serializable run configuration.
//!
//! One TOML file describes one backtest: the symbol, where its bars come
//! from, the strategy and its parameters, capital and costs. `run_id()` is a
//! content hash over the whole config, so output can always be tied back to
//! the exact config that produced it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use swinglab_core::strategy::{
    BuyHold, MaCrossover, MaKind, Strategy, StrategyConfig, VcpBreakout, VcpParams,
};

/// Unique identifier for a run (content-addressable hash prefix).
pub type RunId = String;

/// Errors from loading or validating a run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Serializable configuration for a single backtest run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunConfig {
    /// Ticker the run is labelled with.
    pub symbol: String,

    /// Where bars come from.
    pub data: DataSpec,

    /// Strategy and its parameters.
    pub strategy: StrategySpec,

    /// Starting cash.
    #[serde(default = "default_initial_capital")]
    pub initial_capital: f64,

    /// Commission as a fraction of traded value, charged per fill.
    #[serde(default)]
    pub commission_rate: f64,

    /// Optional stop-loss as a fraction below entry (0.08 = 8%).
    #[serde(default)]
    pub stop_loss_pct: Option<f64>,

    /// Where to write run artifacts; `None` means don't save.
    #[serde(default)]
    pub out_dir: Option<PathBuf>,
}

fn default_initial_capital() -> f64 {
    100_000.0
}

/// Bar source: a CSV file on disk, or a deterministic synthetic series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataSpec {
    /// CSV file with date/open/high/low/close columns (volume optional).
    #[serde(default)]
    pub csv: Option<PathBuf>,

    /// Generate bars from the symbol name instead of reading a file.
    /// Mutually exclusive with `csv`.
    #[serde(default)]
    pub synthetic: bool,

    /// Bar count when `synthetic` is set.
    #[serde(default = "default_synthetic_bars")]
    pub bars: usize,
}

fn default_synthetic_bars() -> usize {
    500
}

/// Strategy selection (serializable enum).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StrategySpec {
    /// Fast/slow moving-average crossover.
    MaCrossover {
        fast: usize,
        slow: usize,
        #[serde(default)]
        kind: MaKind,
    },

    /// Volatility-contraction breakout.
    VcpBreakout(VcpParams),

    /// Buy the first bar, hold to the end.
    BuyHold,
}

impl RunConfig {
    /// Read and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check the cross-field constraints the type system can't.
    ///
    /// The strategy constructors `assert!` on bad parameters; validating here
    /// turns a malformed config file into an error instead of a panic.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbol.trim().is_empty() {
            return Err(ConfigError::Invalid("symbol must not be empty".into()));
        }
        if !(self.initial_capital > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "initial_capital must be positive, got {}",
                self.initial_capital
            )));
        }
        if !(self.commission_rate >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "commission_rate must be >= 0, got {}",
                self.commission_rate
            )));
        }
        if let Some(stop) = self.stop_loss_pct {
            if !(stop > 0.0 && stop < 1.0) {
                return Err(ConfigError::Invalid(format!(
                    "stop_loss_pct must be in (0, 1), got {stop}"
                )));
            }
        }
        self.data.validate()?;
        self.strategy.validate()
    }

    /// Computes a deterministic hash ID for this configuration.
    ///
    /// Two runs with identical configs share a RunId, so logs and artifact
    /// labels identify re-runs of the same setup.
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_string(self).expect("RunConfig serialization failed");
        let hex = blake3::hash(json.as_bytes()).to_hex();
        hex[..16].to_string()
    }

    /// The engine-facing slice of this config.
    pub fn strategy_config(&self) -> StrategyConfig {
        StrategyConfig {
            initial_capital: self.initial_capital,
            commission_rate: self.commission_rate,
            stop_loss_pct: self.stop_loss_pct,
        }
    }

    /// Construct the configured strategy. Call `validate` first on untrusted
    /// input.
    pub fn build_strategy(&self) -> Box<dyn Strategy> {
        self.strategy.build(self.strategy_config())
    }
}

impl DataSpec {
    fn validate(&self) -> Result<(), ConfigError> {
        match (&self.csv, self.synthetic) {
            (Some(_), true) => Err(ConfigError::Invalid(
                "data.csv and data.synthetic are mutually exclusive".into(),
            )),
            (None, false) => Err(ConfigError::Invalid(
                "data needs either a csv path or synthetic = true".into(),
            )),
            (None, true) if self.bars < 2 => Err(ConfigError::Invalid(format!(
                "a synthetic series needs at least 2 bars, got {}",
                self.bars
            ))),
            _ => Ok(()),
        }
    }
}

impl StrategySpec {
    fn validate(&self) -> Result<(), ConfigError> {
        match self {
            StrategySpec::MaCrossover { fast, slow, .. } => {
                if *fast < 1 {
                    return Err(ConfigError::Invalid(format!(
                        "fast period must be >= 1, got {fast}"
                    )));
                }
                if fast >= slow {
                    return Err(ConfigError::Invalid(format!(
                        "fast period ({fast}) must be shorter than slow period ({slow})"
                    )));
                }
            }
            StrategySpec::VcpBreakout(p) => {
                if p.base_period < 1
                    || p.contraction_period < 1
                    || p.atr_period < 1
                    || p.trail_period < 1
                {
                    return Err(ConfigError::Invalid(
                        "vcp_breakout periods must all be >= 1".into(),
                    ));
                }
                if !(p.max_atr_ratio > 0.0) {
                    return Err(ConfigError::Invalid(format!(
                        "max_atr_ratio must be positive, got {}",
                        p.max_atr_ratio
                    )));
                }
                if !(p.volume_mult >= 0.0) {
                    return Err(ConfigError::Invalid(format!(
                        "volume_mult must be >= 0, got {}",
                        p.volume_mult
                    )));
                }
            }
            StrategySpec::BuyHold => {}
        }
        Ok(())
    }

    /// Construct the strategy this spec names.
    pub fn build(&self, config: StrategyConfig) -> Box<dyn Strategy> {
        match self {
            StrategySpec::MaCrossover { fast, slow, kind } => {
                Box::new(MaCrossover::with_kind(*fast, *slow, *kind, config))
            }
            StrategySpec::VcpBreakout(params) => Box::new(VcpBreakout::new(*params, config)),
            StrategySpec::BuyHold => Box::new(BuyHold::new(config)),
        }
    }
}
