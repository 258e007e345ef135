//! Replay command implementation

use treecov_common::cli::{styles, Cli as Context};
use treecov_common::{Result, TreecovError};

use super::{load_inputs, status, write_output};
use crate::cli::ReplayArgs;
use crate::derive::derive;
use crate::experiment::replay;

pub fn run_replay(args: &ReplayArgs, ctx: Context) -> Result<()> {
    let (tree, dataset, config) = load_inputs(&args.input, &args.overrides)?;
    let derivation = derive(&tree, &dataset, &config)?;
    let log = replay(&derivation, &tree, &config);
    write_output(args.output.as_deref(), &log.to_json()?)?;

    let failed: Vec<&str> = log.failed().map(|t| t.name.as_str()).collect();
    if !failed.is_empty() {
        // Samples come from the surrogate's own leaves
        return Err(TreecovError::Internal {
            message: format!("surrogate tree disagrees with derived tests: {}", failed.join(", ")),
        });
    }
    status(
        ctx,
        &styles::success(&format!(
            "{} tests × {} samples agree with the surrogate tree",
            log.n_test, log.n_samples_per_test
        )),
    );
    Ok(())
}
