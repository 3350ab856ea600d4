//! Run command implementation
//!
//! This module implements the `run` command: every stage for every selected
//! country and hazard kind.

use super::{error_exit_code, load_for_command, report};
use crate::core::pipeline::Pipeline;
use crate::domain::{CountryCode, HazardKind};
use clap::Args;

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Process a single country (ISO3) instead of the configured selection
    #[arg(long)]
    pub country: Option<CountryCode>,

    /// Process a single hazard kind (river or coastal) instead of hazard.kinds
    #[arg(long)]
    pub kind: Option<HazardKind>,

    /// Dry run mode - trace everything without writing outputs
    #[arg(long)]
    pub dry_run: bool,
}

impl RunArgs {
    /// Execute the run command
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Starting run command");

        let Some(config) = load_for_command(config_path, self.dry_run) else {
            return Ok(2);
        };

        let kinds = match self.kind {
            Some(kind) => {
                tracing::info!(kind = %kind, "Overriding hazard kinds from CLI");
                vec![kind]
            }
            None => match config.hazard.hazard_kinds() {
                Ok(kinds) => kinds,
                Err(e) => {
                    eprintln!("Configuration validation failed: {e}");
                    return Ok(2);
                }
            },
        };
        if let Some(country) = &self.country {
            tracing::info!(country = %country, "Restricting run to one country from CLI");
        }

        println!("🚀 Starting run...");
        let pipeline = Pipeline::new(config);
        let summary = match pipeline.run(self.country.as_ref(), &kinds) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Run failed");
                eprintln!("Run failed: {e}");
                return Ok(error_exit_code(&e));
            }
        };

        Ok(report("Run", &summary))
    }
}
