//! Paths command implementation

use serde::Serialize;
use treecov_common::cli::{styles, Cli as Context};
use treecov_common::{OutputFormat, Result, TreecovError};

use super::load_tree;
use crate::cli::PathsArgs;
use crate::config::DeriveConfig;
use crate::dataset::Dataset;
use crate::derive::{Deriver, FeatureConstraint, Path};
use crate::tree::{Tree, TreeExport};

#[derive(Serialize)]
struct PathReport {
    #[serde(flatten)]
    path: Path,
    constraints: Vec<FeatureConstraint>,
}

/// Validated tree echoed next to its paths.
#[derive(Serialize)]
struct PathsDocument {
    tree: TreeExport,
    paths: Vec<PathReport>,
}

/// Render every path with its constraints as text.
pub fn format_paths(reports: &[(Path, Vec<FeatureConstraint>)]) -> String {
    let mut lines = vec![styles::header(&format!("{} paths", reports.len()))];
    for (path, constraints) in reports {
        lines.push(path.to_string());
        lines.extend(constraints.iter().map(|c| format!("  {c}")));
    }
    lines.join("\n")
}

/// Render the validated tree and every path with its constraints as JSON.
pub fn paths_json(
    tree: &Tree,
    reports: Vec<(Path, Vec<FeatureConstraint>)>,
) -> Result<String> {
    let document = PathsDocument {
        tree: TreeExport::from_tree(tree),
        paths: reports
            .into_iter()
            .map(|(path, constraints)| PathReport { path, constraints })
            .collect(),
    };
    serde_json::to_string_pretty(&document)
        .map_err(|e| TreecovError::Serialization { message: e.to_string() })
}

pub fn run_paths(args: &PathsArgs, ctx: Context) -> Result<()> {
    let tree = load_tree(&args.tree)?;
    let dataset = Dataset::from_file(&args.data)?;
    let config = DeriveConfig::default();
    let deriver = Deriver::new(&tree, &dataset, &config)?;

    let reports: Vec<(Path, Vec<FeatureConstraint>)> = deriver
        .paths()
        .into_iter()
        .map(|path| {
            let constraints = deriver.constraints(&path).into_values().collect();
            (path, constraints)
        })
        .collect();

    match ctx.format {
        OutputFormat::Text => println!("{}", format_paths(&reports)),
        OutputFormat::Json => println!("{}", paths_json(&tree, reports)?),
    }
    Ok(())
}
