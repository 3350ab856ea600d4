//! Overlay command implementation
//!
//! This module implements the `overlay` command: the stored hazard polygons
//! of one country are intersected with its population and coverage layers.

use super::clip::resolve_target;
use super::{error_exit_code, load_for_command, report};
use crate::core::pipeline::Pipeline;
use crate::domain::{CountryCode, HazardKind};
use clap::Args;

/// Arguments for the overlay command
#[derive(Args, Debug)]
pub struct OverlayArgs {
    /// Country to overlay (ISO3)
    #[arg(long)]
    pub country: CountryCode,

    /// Hazard kind (river or coastal)
    #[arg(long, default_value = "river")]
    pub kind: HazardKind,
}

impl OverlayArgs {
    /// Execute the overlay command
    ///
    /// Dry-run has no meaning here: the hazard layer is read from the vector
    /// store, which a dry run never writes.
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(country = %self.country, kind = %self.kind, "Starting overlay command");

        let Some(mut config) = load_for_command(config_path, false) else {
            return Ok(2);
        };
        if config.application.dry_run {
            tracing::warn!("Ignoring dry_run for overlay; stored polygons are required");
            config.application.dry_run = false;
        }

        let pipeline = Pipeline::new(config);
        let target = match resolve_target(&pipeline, &self.country, self.kind) {
            Ok(t) => t,
            Err(e) => {
                eprintln!("Overlay failed: {e}");
                return Ok(error_exit_code(&e));
            }
        };

        println!("🗺️  Overlaying {} hazards for {}", self.kind, target.code);
        let summary = pipeline.overlay_stored(&target, self.kind);
        Ok(report("Overlay", &summary))
    }
}
