//! `validate` command implementation.

use serde::Serialize;
use tracing::info;

use contracts::{SafeRouteConfig, StoreKind};

use super::print_json;
use crate::cli::ValidateArgs;
use crate::error::{CliError, Result};

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
    radius_km: f64,
    store: String,
    user_count: usize,
    contact_edges: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        print_json(&result)?;
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        Err(CliError::config(
            result.error.unwrap_or_else(|| "validation failed".to_string()),
        ))
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);
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
                    version: format!("{:?}", config.version),
                    radius_km: config.alert.radius_km,
                    store: format!("{:?}", config.store.kind),
                    user_count: config.users.len(),
                    contact_edges: config.users.iter().map(|u| u.contacts.len()).sum(),
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

/// Non-fatal configuration issues
fn collect_warnings(config: &SafeRouteConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.users.is_empty() {
        warnings.push("No users configured - every panic alert will fail".to_string());
    }

    for user in &config.users {
        if user.last_known().is_none() {
            warnings.push(format!(
                "User '{}' has no known location and will never be alerted",
                user.username
            ));
        }
        if user.contacts.is_empty() {
            warnings.push(format!("User '{}' has no contacts", user.username));
        }
    }

    if config.store.kind == StoreKind::Memory {
        warnings.push(
            "Memory store configured - alerts are lost when the process exits \
             and inbox, events, notify and resolve will refuse to run"
                .to_string(),
        );
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Alert radius: {} km", summary.radius_km);
            println!("  Store: {}", summary.store);
            println!("  Users: {}", summary.user_count);
            println!("  Contact edges: {}", summary.contact_edges);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
