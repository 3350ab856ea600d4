//! Vectorize command implementation
//!
//! This module implements the `vectorize` command: every stored clipped
//! raster of one country is traced into hazard polygons.

use super::{load_for_command, report};
use crate::core::pipeline::Pipeline;
use crate::domain::{CountryCode, HazardKind};
use clap::Args;

/// Arguments for the vectorize command
#[derive(Args, Debug)]
pub struct VectorizeArgs {
    /// Country to vectorize (ISO3)
    #[arg(long)]
    pub country: CountryCode,

    /// Hazard kind (river or coastal)
    #[arg(long, default_value = "river")]
    pub kind: HazardKind,

    /// Dry run mode - trace polygons without writing vector files
    #[arg(long)]
    pub dry_run: bool,
}

impl VectorizeArgs {
    /// Execute the vectorize command
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(country = %self.country, kind = %self.kind, "Starting vectorize command");

        let Some(config) = load_for_command(config_path, self.dry_run) else {
            return Ok(2);
        };

        println!("🧭 Vectorizing {} hazards for {}", self.kind, self.country);
        let pipeline = Pipeline::new(config);
        let summary = pipeline.vectorize_country(&self.country, self.kind);
        Ok(report("Vectorize", &summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vectorize_args_debug() {
        let args = VectorizeArgs {
            country: CountryCode::new("ken").unwrap(),
            kind: HazardKind::Coastal,
            dry_run: true,
        };
        let debug = format!("{args:?}");
        assert!(debug.contains("KEN"));
        assert!(debug.contains("Coastal"));
    }
}
