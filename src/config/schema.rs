//! Configuration schema types
//!
//! This module defines the configuration structure for Floodline. The parsed
//! [`FloodlineConfig`] is passed explicitly to every component.

use crate::domain::{AdminLevel, CountryCode, HazardKind, WGS84_EPSG};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Main Floodline configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FloodlineConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Data directory roots
    #[serde(default)]
    pub paths: PathsConfig,

    /// Hazard raster settings
    #[serde(default)]
    pub hazard: HazardConfig,

    /// Boundary dataset settings
    #[serde(default)]
    pub boundaries: BoundariesConfig,

    /// Population table settings
    #[serde(default)]
    pub population: PopulationConfig,

    /// Coverage layer settings
    #[serde(default)]
    pub coverage: CoverageConfig,

    /// Country selection
    #[serde(default)]
    pub selection: SelectionConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl FloodlineConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.paths.validate()?;
        self.hazard.validate()?;
        self.boundaries.validate()?;
        self.population.validate()?;
        self.coverage.validate()?;
        self.selection.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (process everything, write nothing)
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// Data directory roots
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Raw inputs (hazard rasters)
    #[serde(default = "default_raw_path")]
    pub raw: PathBuf,

    /// Processed per-country data (boundaries, population, clipped and vector stores)
    #[serde(default = "default_processed_path")]
    pub processed: PathBuf,

    /// Exposure results
    #[serde(default = "default_results_path")]
    pub results: PathBuf,

    /// Country catalogue CSV
    #[serde(default = "default_countries_csv")]
    pub countries_csv: PathBuf,
}

impl PathsConfig {
    fn validate(&self) -> Result<(), String> {
        for (name, path) in [
            ("paths.raw", &self.raw),
            ("paths.processed", &self.processed),
            ("paths.results", &self.results),
            ("paths.countries_csv", &self.countries_csv),
        ] {
            if path.as_os_str().is_empty() {
                return Err(format!("{name} cannot be empty"));
            }
        }
        Ok(())
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            raw: default_raw_path(),
            processed: default_processed_path(),
            results: default_results_path(),
            countries_csv: default_countries_csv(),
        }
    }
}

/// Hazard raster configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HazardConfig {
    /// No-data sentinel forced onto every hazard raster
    #[serde(default = "default_nodata")]
    pub nodata: f32,

    /// EPSG code assumed for rasters and boundaries
    #[serde(default = "default_epsg")]
    pub epsg: u16,

    /// Directory under `paths.raw` holding riverine hazard rasters
    #[serde(default = "default_river_dir")]
    pub river_dir: String,

    /// Directory under `paths.raw` holding coastal hazard rasters
    #[serde(default = "default_coastal_dir")]
    pub coastal_dir: String,

    /// Hazard kinds processed by `run`
    #[serde(default = "default_kinds")]
    pub kinds: Vec<String>,
}

impl HazardConfig {
    fn validate(&self) -> Result<(), String> {
        if !self.nodata.is_finite() {
            return Err("hazard.nodata must be a finite number".to_string());
        }
        if self.epsg != WGS84_EPSG {
            return Err(format!(
                "hazard.epsg must be {WGS84_EPSG}; reprojection is not supported, got {}",
                self.epsg
            ));
        }
        if self.river_dir.trim().is_empty() || self.coastal_dir.trim().is_empty() {
            return Err("hazard.river_dir and hazard.coastal_dir cannot be empty".to_string());
        }
        if self.kinds.is_empty() {
            return Err("hazard.kinds cannot be empty".to_string());
        }
        self.hazard_kinds().map(|_| ())
    }

    /// Parsed hazard kinds
    pub fn hazard_kinds(&self) -> Result<Vec<HazardKind>, String> {
        self.kinds.iter().map(|k| HazardKind::from_str(k)).collect()
    }

    /// Raw directory name for a hazard kind
    pub fn dir_for(&self, kind: HazardKind) -> &str {
        match kind {
            HazardKind::River => &self.river_dir,
            HazardKind::Coastal => &self.coastal_dir,
        }
    }
}

impl Default for HazardConfig {
    fn default() -> Self {
        Self {
            nodata: default_nodata(),
            epsg: default_epsg(),
            river_dir: default_river_dir(),
            coastal_dir: default_coastal_dir(),
            kinds: default_kinds(),
        }
    }
}

/// Boundary dataset configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundariesConfig {
    /// Prefix of the region-code attribute; the level is appended (`GID_` → `GID_1`)
    #[serde(default = "default_code_column_prefix")]
    pub code_column_prefix: String,

    /// Level used when the country catalogue does not specify one
    #[serde(default = "default_admin_level")]
    pub default_level: u8,
}

impl BoundariesConfig {
    fn validate(&self) -> Result<(), String> {
        if self.code_column_prefix.trim().is_empty() {
            return Err("boundaries.code_column_prefix cannot be empty".to_string());
        }
        AdminLevel::new(self.default_level)
            .map(|_| ())
            .map_err(|e| format!("boundaries.default_level: {e}"))
    }
}

impl Default for BoundariesConfig {
    fn default() -> Self {
        Self {
            code_column_prefix: default_code_column_prefix(),
            default_level: default_admin_level(),
        }
    }
}

/// Population table configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// File name under `processed/{ISO3}/population/`
    #[serde(default = "default_population_file")]
    pub file_name: String,

    /// Column holding the region code; `None` uses the boundary code column
    #[serde(default)]
    pub code_column: Option<String>,

    /// Column holding the population value
    #[serde(default = "default_population_column")]
    pub value_column: String,
}

impl PopulationConfig {
    fn validate(&self) -> Result<(), String> {
        if self.file_name.trim().is_empty() {
            return Err("population.file_name cannot be empty".to_string());
        }
        if self.value_column.trim().is_empty() {
            return Err("population.value_column cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            file_name: default_population_file(),
            code_column: None,
            value_column: default_population_column(),
        }
    }
}

/// Coverage layer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageConfig {
    /// Technologies overlaid with hazard footprints
    #[serde(default = "default_technologies")]
    pub technologies: Vec<String>,
}

impl CoverageConfig {
    fn validate(&self) -> Result<(), String> {
        if let Some(bad) = self
            .technologies
            .iter()
            .find(|t| t.trim().is_empty() || t.contains(['/', '\\']))
        {
            return Err(format!("Invalid coverage technology '{bad}'"));
        }
        Ok(())
    }
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            technologies: default_technologies(),
        }
    }
}

/// Country selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Income groups eligible for processing
    #[serde(default = "default_income_groups")]
    pub income_groups: Vec<String>,

    /// Explicit ISO3 list; overrides the catalogue filter when non-empty
    #[serde(default)]
    pub countries: Vec<String>,

    /// Countries processed for coastal hazards; empty means the same as river
    #[serde(default)]
    pub coastal_countries: Vec<String>,
}

impl SelectionConfig {
    fn validate(&self) -> Result<(), String> {
        for code in self.countries.iter().chain(&self.coastal_countries) {
            CountryCode::new(code.as_str()).map_err(|e| format!("selection: {e}"))?;
        }
        Ok(())
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            income_groups: default_income_groups(),
            countries: Vec::new(),
            coastal_countries: Vec::new(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when file logging is enabled".into());
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_raw_path() -> PathBuf {
    PathBuf::from("data/raw")
}

fn default_processed_path() -> PathBuf {
    PathBuf::from("data/processed")
}

fn default_results_path() -> PathBuf {
    PathBuf::from("data/results")
}

fn default_countries_csv() -> PathBuf {
    PathBuf::from("data/raw/countries.csv")
}

fn default_nodata() -> f32 {
    crate::domain::DEFAULT_NODATA
}

fn default_epsg() -> u16 {
    WGS84_EPSG
}

fn default_river_dir() -> String {
    "flood_hazard".to_string()
}

fn default_coastal_dir() -> String {
    "coastal_hazard".to_string()
}

fn default_kinds() -> Vec<String> {
    vec!["river".to_string(), "coastal".to_string()]
}

fn default_code_column_prefix() -> String {
    "GID_".to_string()
}

fn default_admin_level() -> u8 {
    1
}

fn default_population_file() -> String {
    "population.csv".to_string()
}

fn default_population_column() -> String {
    "population".to_string()
}

fn default_technologies() -> Vec<String> {
    vec!["GSM".to_string()]
}

fn default_income_groups() -> Vec<String> {
    vec!["LIC".to_string(), "LMC".to_string(), "UMC".to_string()]
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
