//! Shared CLI flags, verbosity and terminal styling.

use clap::Args;

/// Output verbosity for CLI tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Suppress all non-error output
    Quiet,
    /// Normal output level
    #[default]
    Normal,
    /// Verbose output with additional details
    Verbose,
}

impl Verbosity {
    /// Default `tracing` filter directive for this verbosity.
    pub fn filter_directive(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "warn",
            Self::Verbose => "debug",
        }
    }
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// Machine-readable JSON
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "table" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown output format: {s}. Use: text, json")),
        }
    }
}

/// Flags shared by every treecov subcommand.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Show debug-level diagnostics
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format: text, json
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

impl CommonArgs {
    /// Resolve flags into a runtime CLI context.
    pub fn to_cli(&self) -> Cli {
        let verbosity = if self.quiet {
            Verbosity::Quiet
        } else if self.verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        };
        Cli { verbosity, format: self.format }
    }
}

/// Resolved CLI context passed to command handlers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cli {
    /// Output verbosity
    pub verbosity: Verbosity,
    /// Output format
    pub format: OutputFormat,
}

impl Cli {
    /// Whether non-error output is suppressed.
    pub fn is_quiet(&self) -> bool {
        self.verbosity == Verbosity::Quiet
    }

    /// Whether verbose output was requested.
    pub fn is_verbose(&self) -> bool {
        self.verbosity == Verbosity::Verbose
    }
}

/// Consistent terminal message styling.
pub mod styles {
    /// Section header.
    pub fn header(text: &str) -> String {
        format!("━━ {text} ━━")
    }

    /// Successful outcome.
    pub fn success(text: &str) -> String {
        format!("✓ {text}")
    }

    /// Informational message.
    pub fn info(text: &str) -> String {
        format!("ℹ {text}")
    }

    /// Non-fatal problem.
    pub fn warning(text: &str) -> String {
        format!("⚠ {text}")
    }

    /// Fatal problem.
    pub fn error(text: &str) -> String {
        format!("✗ {text}")
    }
}
