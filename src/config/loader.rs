//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::FloodlineConfig;
use crate::domain::errors::FloodlineError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into FloodlineConfig
/// 4. Applies environment variable overrides (FLOODLINE_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns a `Configuration` error if the file is missing or unreadable,
/// a referenced variable is unset, parsing fails, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use floodline::config::loader::load_config;
///
/// let config = load_config("floodline.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<FloodlineConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(FloodlineError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        FloodlineError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: FloodlineConfig = toml::from_str(&contents)
        .map_err(|e| FloodlineError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        FloodlineError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied through untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| FloodlineError::Other(format!("Invalid substitution pattern: {e}")))?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    processed_line = processed_line.replace(&format!("${{{var_name}}}"), &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        lines.push(processed_line);
    }

    if !missing_vars.is_empty() {
        return Err(FloodlineError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

/// Applies environment variable overrides using the FLOODLINE_* prefix
///
/// Variables follow the pattern `FLOODLINE_<SECTION>_<KEY>`, for example
/// `FLOODLINE_PATHS_RAW` or `FLOODLINE_HAZARD_NODATA`. Unparseable numeric or
/// boolean values are ignored and the file value is kept.
fn apply_env_overrides(config: &mut FloodlineConfig) {
    // Application overrides
    if let Ok(val) = std::env::var("FLOODLINE_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("FLOODLINE_APPLICATION_DRY_RUN") {
        if let Ok(dry_run) = val.parse() {
            config.application.dry_run = dry_run;
        }
    }

    // Path overrides
    if let Ok(val) = std::env::var("FLOODLINE_PATHS_RAW") {
        config.paths.raw = PathBuf::from(val);
    }
    if let Ok(val) = std::env::var("FLOODLINE_PATHS_PROCESSED") {
        config.paths.processed = PathBuf::from(val);
    }
    if let Ok(val) = std::env::var("FLOODLINE_PATHS_RESULTS") {
        config.paths.results = PathBuf::from(val);
    }
    if let Ok(val) = std::env::var("FLOODLINE_PATHS_COUNTRIES_CSV") {
        config.paths.countries_csv = PathBuf::from(val);
    }

    // Hazard overrides
    if let Ok(val) = std::env::var("FLOODLINE_HAZARD_NODATA") {
        if let Ok(nodata) = val.parse() {
            config.hazard.nodata = nodata;
        }
    }
    if let Ok(val) = std::env::var("FLOODLINE_HAZARD_KINDS") {
        config.hazard.kinds = split_list(&val);
    }

    // Selection overrides
    if let Ok(val) = std::env::var("FLOODLINE_SELECTION_COUNTRIES") {
        config.selection.countries = split_list(&val);
    }

    // Logging overrides
    if let Ok(val) = std::env::var("FLOODLINE_LOGGING_LOCAL_ENABLED") {
        if let Ok(enabled) = val.parse() {
            config.logging.local_enabled = enabled;
        }
    }
    if let Ok(val) = std::env::var("FLOODLINE_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}

/// Splits a comma-separated override into trimmed, non-empty items
pub(crate) fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
