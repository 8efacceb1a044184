//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    raw_root: String,
    prod_root: String,
    program: String,
    camera_count: usize,
    flavors: Vec<String>,
    workers: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating blueprint");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Blueprint validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    // Try to load and validate
    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    raw_root: blueprint.paths.raw_root.display().to_string(),
                    prod_root: blueprint.paths.prod_root.display().to_string(),
                    program: blueprint.fastframe.program.clone(),
                    camera_count: blueprint.cameras().len(),
                    flavors: blueprint
                        .selection
                        .flavors
                        .iter()
                        .map(|f| f.label().to_string())
                        .collect(),
                    workers: blueprint.dispatch.workers,
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect blueprint warnings (non-fatal issues)
fn collect_warnings(blueprint: &contracts::RunBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if !blueprint.paths.raw_root.exists() {
        warnings.push(format!(
            "Raw root does not exist yet: {}",
            blueprint.paths.raw_root.display()
        ));
    }

    if blueprint.dispatch.item_timeout_secs == 0 {
        warnings.push(
            "No per-item timeout configured - a hung simulator process will stall its worker"
                .to_string(),
        );
    }

    if blueprint.fastframe.extra_args.iter().any(|a| a == "--simspec") {
        warnings.push("extra_args contains --simspec, which the dispatcher already passes".into());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Blueprint is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Raw root: {}", summary.raw_root);
            println!("  Prod root: {}", summary.prod_root);
            println!("  Program: {}", summary.program);
            println!("  Cameras: {}", summary.camera_count);
            println!("  Flavors: {}", summary.flavors.join(", "));
            println!("  Workers: {}", summary.workers);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Blueprint is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
