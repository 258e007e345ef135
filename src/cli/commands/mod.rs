//! CLI command implementations

mod derive;
mod paths;
mod replay;
mod validate;

#[cfg(test)]
mod tests;

use std::path::Path;
use tracing::debug;
use treecov_common::cli::Cli as Context;
use treecov_common::{Result, TreecovError};

use super::args::{Cli, Command, InputArgs, OverrideArgs};
use crate::config::DeriveConfig;
use crate::dataset::Dataset;
use crate::tree::{Tree, TreeExport};

/// Execute a CLI command based on the parsed arguments
pub fn run_command(cli: Cli) -> Result<()> {
    let ctx = cli.common.to_cli();
    match cli.command {
        Command::Derive(args) => derive::run_derive(&args, ctx),
        Command::Paths(args) => paths::run_paths(&args, ctx),
        Command::Replay(args) => replay::run_replay(&args, ctx),
        Command::Validate(args) => validate::run_validate(&args, ctx),
    }
}

/// Load the surrogate tree and validate its structure.
pub(crate) fn load_tree(path: &Path) -> Result<Tree> {
    let tree = TreeExport::from_file(path)?.into_tree()?;
    debug!(
        nodes = tree.n_nodes(),
        leaves = tree.n_leaves(),
        depth = tree.depth(),
        "loaded tree {}",
        path.display()
    );
    Ok(tree)
}

/// Load every input and resolve the effective configuration.
pub(crate) fn load_inputs(
    input: &InputArgs,
    overrides: &OverrideArgs,
) -> Result<(Tree, Dataset, DeriveConfig)> {
    let tree = load_tree(&input.tree)?;
    let dataset = Dataset::from_file(&input.data)?;
    let mut config = match &input.config {
        Some(path) => DeriveConfig::from_file(path)?,
        None => DeriveConfig::default(),
    };
    overrides.apply(&mut config)?;
    Ok((tree, dataset, config))
}

/// Write `content` to `output`, or stdout when no file is given.
pub(crate) fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, content)
            .map_err(|e| TreecovError::io(format!("writing {}", path.display()), e)),
        None => {
            println!("{content}");
            Ok(())
        }
    }
}

/// Print a status line to stderr unless quiet.
pub(crate) fn status(ctx: Context, line: &str) {
    if !ctx.is_quiet() {
        eprintln!("{line}");
    }
}
