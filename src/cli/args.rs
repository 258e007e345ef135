//! Command-line argument types.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use treecov_common::cli::CommonArgs;
use treecov_common::{Result, TreecovError};

use crate::config::{parse_criteria, DeriveConfig, DrawMode, WidthBasis};

/// treecov: property tests from surrogate decision trees
#[derive(Parser, Debug, Clone)]
#[command(name = "treecov")]
#[command(version)]
#[command(about = "Derive property-based test suites for classifiers from surrogate decision trees")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Derive DTC/BVA tests and write them as JSON or proptest source
    Derive(DeriveArgs),

    /// List every root-to-leaf path with its merged constraints
    Paths(PathsArgs),

    /// Derive tests, draw samples and classify them with the surrogate tree
    Replay(ReplayArgs),

    /// Validate a derivation configuration file
    Validate(ValidateArgs),
}

/// Tree, dataset and configuration inputs
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Surrogate tree in sklearn array JSON
    #[arg(short, long, value_name = "TREE")]
    pub tree: PathBuf,

    /// Training dataset JSON
    #[arg(short, long, value_name = "DATA")]
    pub data: PathBuf,

    /// YAML derivation configuration
    #[arg(short, long, value_name = "CONFIG")]
    pub config: Option<PathBuf>,
}

/// Command-line overrides of configuration values
#[derive(Args, Debug, Clone, Default)]
pub struct OverrideArgs {
    /// Criteria to derive, e.g. DTC,BVA
    #[arg(long)]
    pub criteria: Option<String>,

    /// BVA band width in percent, in (1, 100]
    #[arg(long)]
    pub rate: Option<f64>,

    /// Samples per derived test
    #[arg(long)]
    pub samples: Option<usize>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Maximum pool size for unconstrained features
    #[arg(long)]
    pub pool_size: Option<usize>,

    /// Generate fixed-decimal values
    #[arg(long)]
    pub float_as_decimal: bool,

    /// Harmonize to the smaller neighbouring precision
    #[arg(long)]
    pub update_precision: bool,

    /// BVA width basis: path, domain
    #[arg(long)]
    pub width_basis: Option<WidthBasis>,

    /// Emitted draw mode: single, tuple
    #[arg(long)]
    pub draw_mode: Option<DrawMode>,

    /// Predict function path used by emitted tests
    #[arg(long)]
    pub predict_fn: Option<String>,
}

impl OverrideArgs {
    /// Apply every given override to `config`.
    pub fn apply(&self, config: &mut DeriveConfig) -> Result<()> {
        if let Some(criteria) = &self.criteria {
            config.criteria = parse_criteria(criteria)
                .map_err(|e| TreecovError::config_value("criteria", e, "Use DTC, BVA, or DTC,BVA"))?;
        }
        if let Some(rate) = self.rate {
            config.boundary_value_rate = rate;
        }
        if let Some(samples) = self.samples {
            config.n_samples_per_test = samples;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(pool_size) = self.pool_size {
            config.pool_size = pool_size;
        }
        config.float_as_decimal |= self.float_as_decimal;
        config.update_precision |= self.update_precision;
        if let Some(basis) = self.width_basis {
            config.width_basis = basis;
        }
        if let Some(mode) = self.draw_mode {
            config.draw_mode = mode;
        }
        if let Some(predict_fn) = &self.predict_fn {
            config.predict_fn.clone_from(predict_fn);
        }
        Ok(())
    }
}

/// Arguments for the derive command
#[derive(Args, Debug, Clone)]
pub struct DeriveArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub overrides: OverrideArgs,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Emit a Rust proptest module instead of JSON
    #[arg(long)]
    pub emit: bool,
}

/// Arguments for the paths command
#[derive(Args, Debug, Clone)]
pub struct PathsArgs {
    /// Surrogate tree in sklearn array JSON
    #[arg(short, long, value_name = "TREE")]
    pub tree: PathBuf,

    /// Training dataset JSON (for domain bounds)
    #[arg(short, long, value_name = "DATA")]
    pub data: PathBuf,
}

/// Arguments for the replay command
#[derive(Args, Debug, Clone)]
pub struct ReplayArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub overrides: OverrideArgs,

    /// Write the experiment log to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the validate command
#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,
}
