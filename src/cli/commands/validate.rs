//! Validate command implementation

use treecov_common::cli::{styles, Cli as Context};
use treecov_common::{OutputFormat, Result, TreecovError};

use crate::cli::ValidateArgs;
use crate::config::{ConfigValidator, DeriveConfig};

/// Summarize a configuration as indented lines
pub fn format_config_info(config: &DeriveConfig) -> String {
    let criteria: Vec<&str> = config.criteria.iter().map(|c| c.as_str()).collect();
    let mut lines = vec![
        format!("  Criteria: {}", criteria.join(",")),
        format!("  Boundary value rate: {}%", config.boundary_value_rate),
        format!("  Samples per test: {}", config.n_samples_per_test),
        format!("  Pool size: {}", config.pool_size),
        format!("  Seed: {}", config.seed),
    ];
    if config.float_as_decimal {
        let mode = if config.update_precision { "min" } else { "max" };
        lines.push(format!("  Fixed-decimal values ({mode} neighbour precision)"));
    }
    lines.join("\n")
}

pub fn run_validate(args: &ValidateArgs, ctx: Context) -> Result<()> {
    let config = DeriveConfig::from_file(&args.config)?;
    ConfigValidator::validate(&config)?;

    match ctx.format {
        OutputFormat::Json => {
            let report = serde_json::json!({ "valid": true, "config": config });
            let rendered = serde_json::to_string_pretty(&report)
                .map_err(|e| TreecovError::Serialization { message: e.to_string() })?;
            println!("{rendered}");
        }
        OutputFormat::Text if !ctx.is_quiet() => {
            println!("{}", styles::success(&format!("{} is valid", args.config.display())));
            if ctx.is_verbose() {
                println!("{}", format_config_info(&config));
            }
        }
        OutputFormat::Text => {}
    }
    Ok(())
}
