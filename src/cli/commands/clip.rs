//! Clip command implementation
//!
//! This module implements the `clip` command: raw hazard rasters are clipped
//! to every region of one country and the clipped rasters are stored.

use super::{error_exit_code, load_for_command, report};
use crate::core::pipeline::{CountryTarget, Pipeline};
use crate::domain::{CountryCode, FloodlineError, HazardKind, Result};
use clap::Args;

/// Arguments for the clip command
#[derive(Args, Debug)]
pub struct ClipArgs {
    /// Country to clip (ISO3)
    #[arg(long)]
    pub country: CountryCode,

    /// Hazard kind (river or coastal)
    #[arg(long, default_value = "river")]
    pub kind: HazardKind,

    /// Dry run mode - clip without writing rasters
    #[arg(long)]
    pub dry_run: bool,
}

impl ClipArgs {
    /// Execute the clip command
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(country = %self.country, kind = %self.kind, "Starting clip command");

        let Some(config) = load_for_command(config_path, self.dry_run) else {
            return Ok(2);
        };
        let pipeline = Pipeline::new(config);
        let target = match resolve_target(&pipeline, &self.country, self.kind) {
            Ok(t) => t,
            Err(e) => {
                eprintln!("Clip failed: {e}");
                return Ok(error_exit_code(&e));
            }
        };

        println!(
            "✂️  Clipping {} hazards for {} at level {}",
            self.kind, target.code, target.level
        );
        let summary = pipeline.clip_country(&target, self.kind);
        Ok(report("Clip", &summary))
    }
}

/// The single target for a country given on the command line
pub(crate) fn resolve_target(
    pipeline: &Pipeline,
    country: &CountryCode,
    kind: HazardKind,
) -> Result<CountryTarget> {
    let targets = pipeline.select_countries(Some(country), kind)?;
    targets
        .into_iter()
        .next()
        .ok_or_else(|| FloodlineError::DataNotFound(format!("No target for country {country}")))
}
