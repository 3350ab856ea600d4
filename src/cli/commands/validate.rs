//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Floodline configuration file.

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates as well; a failure here covers both
        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        if let Err(e) = config.validate() {
            println!("❌ Configuration validation failed");
            println!("   Error: {e}");
            println!();
            return Ok(2);
        }

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);
        println!("  Raw Data: {}", config.paths.raw.display());
        println!("  Processed Data: {}", config.paths.processed.display());
        println!("  Results: {}", config.paths.results.display());
        println!("  Country Catalogue: {}", config.paths.countries_csv.display());
        println!("  Hazard Kinds: {:?}", config.hazard.kinds);
        println!("  No-data Value: {}", config.hazard.nodata);
        println!("  EPSG: {}", config.hazard.epsg);
        println!(
            "  Region Code Column: {}{}",
            config.boundaries.code_column_prefix, config.boundaries.default_level
        );
        println!("  Population Column: {}", config.population.value_column);
        println!("  Coverage Technologies: {:?}", config.coverage.technologies);
        if config.selection.countries.is_empty() {
            println!("  Income Groups: {:?}", config.selection.income_groups);
        } else {
            println!("  Countries: {:?}", config.selection.countries);
        }
        println!();
        Ok(0)
    }
}
