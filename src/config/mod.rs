//! Configuration management for Floodline.
//!
//! Floodline uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `FLOODLINE_<SECTION>_<KEY>` overrides
//! - Default values for every setting
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use floodline::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("floodline.toml")?;
//! println!("Processed store: {}", config.paths.processed.display());
//! println!("No-data sentinel: {}", config.hazard.nodata);
//! # Ok(())
//! # }
//! ```
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [paths]
//! raw = "${FLOODLINE_DATA}/raw"
//! processed = "${FLOODLINE_DATA}/processed"
//! results = "${FLOODLINE_DATA}/results"
//! countries_csv = "${FLOODLINE_DATA}/raw/countries.csv"
//!
//! [hazard]
//! nodata = 255
//! kinds = ["river", "coastal"]
//!
//! [selection]
//! income_groups = ["LIC", "LMC", "UMC"]
//! ```

pub mod loader;
pub mod schema;

pub use loader::load_config;
pub use schema::{
    ApplicationConfig, BoundariesConfig, CoverageConfig, FloodlineConfig, HazardConfig,
    LoggingConfig, PathsConfig, PopulationConfig, SelectionConfig,
};
