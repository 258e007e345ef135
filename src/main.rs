//! treecov CLI
//!
//! # Usage
//!
//! ```bash
//! # Derive DTC and BVA tests as JSON
//! treecov derive -t tree.json -d train.json --criteria DTC,BVA -o tests.json
//!
//! # Emit a proptest module
//! treecov derive -t tree.json -d train.json -c derive.yaml --emit -o tests/derived.rs
//!
//! # List paths and their constraints
//! treecov paths -t tree.json -d train.json
//!
//! # Check derived tests against the surrogate tree
//! treecov replay -t tree.json -d train.json -o experiment.json
//!
//! # Validate config
//! treecov validate derive.yaml
//! ```

use clap::Parser;
use std::process::ExitCode;
use treecov::cli::{init_tracing, run_command, Cli};
use treecov_common::cli::styles;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.common.to_cli().verbosity);

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", styles::error(&format!("[{}] {e}", e.code())));
            if e.is_user_error() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
