//! Derive command implementation

use treecov_common::cli::{styles, Cli as Context};
use treecov_common::Result;

use super::{load_inputs, status, write_output};
use crate::cli::DeriveArgs;
use crate::config::Criterion;
use crate::derive::derive;
use crate::emit::ProptestSuite;

pub fn run_derive(args: &DeriveArgs, ctx: Context) -> Result<()> {
    let (tree, dataset, config) = load_inputs(&args.input, &args.overrides)?;
    let derivation = derive(&tree, &dataset, &config)?;

    let content = if args.emit {
        ProptestSuite::new(&derivation, &config)
            .with_feature_names(dataset.feature_names())
            .to_string()
    } else {
        derivation.to_json()?
    };
    write_output(args.output.as_deref(), &content)?;

    status(
        ctx,
        &styles::success(&format!(
            "{} tests from {} paths ({} DTC, {} BVA)",
            derivation.tests.len(),
            derivation.n_paths,
            derivation.count(Criterion::Dtc),
            derivation.count(Criterion::Bva)
        )),
    );
    for skipped in &derivation.skipped {
        status(ctx, &styles::warning(&format!("leaf {} skipped: {}", skipped.leaf_id, skipped.reason)));
    }
    for band in &derivation.dropped {
        status(
            ctx,
            &styles::warning(&format!("leaf {} outside band dropped: {}", band.leaf_id, band.reason)),
        );
    }
    if let Some(path) = &args.output {
        status(ctx, &styles::info(&format!("written to {}", path.display())));
    }
    Ok(())
}
