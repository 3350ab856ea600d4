//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "floodline.toml")]
    pub output: String,

    /// Include example values and comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Floodline configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your data directories", self.output);
                println!("  2. Place hazard rasters under <raw>/flood_hazard and <raw>/coastal_hazard");
                println!("  3. Place boundaries under <processed>/<ISO3>/regions/gadm_<level>.geojson");
                println!("  4. Validate configuration: floodline validate-config");
                println!("  5. Try a dry run: floodline run --country <ISO3> --dry-run");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(5)
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# Floodline Configuration File
# Flood hazard clipping and exposure tool

[application]
log_level = "info"
dry_run = false

[paths]
raw = "data/raw"
processed = "data/processed"
results = "data/results"
countries_csv = "data/raw/countries.csv"

[hazard]
nodata = 255.0
epsg = 4326
river_dir = "flood_hazard"
coastal_dir = "coastal_hazard"
kinds = ["river", "coastal"]

[boundaries]
code_column_prefix = "GID_"
default_level = 1

[population]
file_name = "population.csv"
value_column = "population"

[coverage]
technologies = ["GSM"]

[selection]
income_groups = ["LIC", "LMC", "UMC"]

[logging]
local_enabled = false
local_path = "logs"
local_rotation = "daily"
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# Floodline Configuration File
# Flood hazard clipping and exposure tool
#
# This file contains all configuration options with examples and explanations.
#
# Any value can reference an environment variable with ${VAR_NAME}, and any
# key can be overridden with FLOODLINE_<SECTION>_<KEY>, for example
# FLOODLINE_PATHS_RAW=/mnt/data/raw.

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# Dry run mode (clip, trace and overlay everything, write nothing)
dry_run = false

# ============================================================================
# Data Directories
# ============================================================================
[paths]
# Raw inputs: hazard rasters live in <raw>/<hazard.river_dir> and
# <raw>/<hazard.coastal_dir>
raw = "data/raw"

# Per-country data:
#   <processed>/<ISO3>/regions/gadm_<level>.geojson
#   <processed>/<ISO3>/population/<population.file_name>
#   <processed>/<ISO3>/coverage/<technology>.geojson
#   <processed>/<ISO3>/hazards/<kind>/<hazard>/{tifs,vectors}/<region>.*
processed = "data/processed"

# Exposure results and run reports
results = "data/results"

# Country catalogue (iso3, gid_region, income_group, exclude)
countries_csv = "data/raw/countries.csv"

# ============================================================================
# Hazard Rasters
# ============================================================================
[hazard]
# No-data value forced onto every raster, whatever its header says
nodata = 255.0

# Coordinate reference system of rasters and boundaries (only 4326)
epsg = 4326

# Directories under paths.raw
river_dir = "flood_hazard"
coastal_dir = "coastal_hazard"

# Hazard kinds processed by `floodline run`
kinds = ["river", "coastal"]

# ============================================================================
# Administrative Boundaries
# ============================================================================
[boundaries]
# Region code attribute prefix; the level is appended (GID_1, GID_2, ...)
code_column_prefix = "GID_"

# Level used when the country catalogue has none
default_level = 1

# ============================================================================
# Population
# ============================================================================
[population]
# CSV file under <processed>/<ISO3>/population/
file_name = "population.csv"

# Region code column; defaults to the boundary code column (GID_<level>)
# code_column = "GID_1"

# Population value column
value_column = "population"

# ============================================================================
# Coverage
# ============================================================================
[coverage]
# Technologies overlaid with hazard footprints (coverage/<tech>.geojson)
technologies = ["GSM", "3G", "4G"]

# ============================================================================
# Country Selection
# ============================================================================
[selection]
# Income groups eligible for processing
income_groups = ["LIC", "LMC", "UMC"]

# Explicit ISO3 list; overrides the catalogue filter when non-empty
# countries = ["KEN", "BGD"]

# Countries processed for coastal hazards; empty means the same as river
# coastal_countries = ["BGD"]

# ============================================================================
# Logging
# ============================================================================
[logging]
# JSON file logging with rotation
local_enabled = false
local_path = "logs"

# Rotation strategy (daily, hourly, never)
local_rotation = "daily"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config;
    use tempfile::TempDir;
    use test_case::test_case;

    #[test_case(false ; "minimal")]
    #[test_case(true ; "with examples")]
    fn test_generated_config_loads(with_examples: bool) {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("floodline.toml");
        let args = InitArgs {
            output: output.to_string_lossy().into_owned(),
            with_examples,
            force: false,
        };

        assert_eq!(args.execute().unwrap(), 0);
        let config = load_config(&output).unwrap();
        assert_eq!(config.boundaries.code_column_prefix, "GID_");
        assert_eq!(config.hazard.nodata, 255.0);
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("floodline.toml");
        fs::write(&output, "# existing").unwrap();

        let args = InitArgs {
            output: output.to_string_lossy().into_owned(),
            with_examples: false,
            force: false,
        };
        assert_eq!(args.execute().unwrap(), 2);
        assert_eq!(fs::read_to_string(&output).unwrap(), "# existing");

        let args = InitArgs { force: true, ..args };
        assert_eq!(args.execute().unwrap(), 0);
    }
}
