//! CLI command implementations
//!
//! Every command returns a process exit code: 0 success, 1 partial success
//! (some items failed), 2 configuration error, 5 fatal error.

pub mod clip;
pub mod init;
pub mod overlay;
pub mod run;
pub mod validate;
pub mod vectorize;

use crate::config::{load_config, FloodlineConfig};
use crate::core::pipeline::RunSummary;
use crate::domain::FloodlineError;

/// Loads the configuration for a command, printing the failure
///
/// `None` means the caller should exit with code 2.
pub(crate) fn load_for_command(config_path: &str, dry_run: bool) -> Option<FloodlineConfig> {
    let mut config = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load configuration");
            eprintln!("❌ Failed to load configuration: {e}");
            return None;
        }
    };

    if dry_run {
        tracing::info!("Enabling dry-run mode from CLI");
        config.application.dry_run = true;
    }
    if config.application.dry_run {
        println!("🔍 DRY RUN MODE - No files will be written");
        println!();
    }
    Some(config)
}

/// Exit code for an error that stopped a command before any item ran
pub(crate) fn error_exit_code(error: &FloodlineError) -> i32 {
    match error {
        FloodlineError::Configuration(_) | FloodlineError::Validation(_) => 2,
        _ => 5,
    }
}

/// Prints a run summary and returns the matching exit code
pub(crate) fn report(title: &str, summary: &RunSummary) -> i32 {
    summary.log_summary();

    println!();
    println!("📊 {title} Summary:");
    println!("  Countries: {}", summary.countries);
    println!("  Items: {}", summary.items.len());
    println!("  Completed: {}", summary.completed());
    println!("  Skipped: {}", summary.skipped());
    for (reason, count) in summary.skips_by_reason() {
        println!("    {reason}: {count}");
    }
    println!("  Polygons: {}", summary.polygons);
    println!("  Exposure Results: {}", summary.exposure_results);
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!();

    if summary.is_successful() {
        println!("✅ {title} completed successfully!");
        0
    } else {
        println!("⚠️  {title} completed with {} failures", summary.failures());
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pipeline::{ItemReport, SkipReason, Stage};
    use crate::domain::{CountryCode, HazardKind, ItemKey};

    #[test]
    fn test_report_exit_codes() {
        let key = ItemKey::country(CountryCode::new("KEN").unwrap(), HazardKind::River);
        let mut summary = RunSummary::new(true);
        summary.record(ItemReport::skipped(key.clone(), Stage::Clipped, SkipReason::EmptyGeometry));
        assert_eq!(report("Run", &summary), 0);

        summary.record(ItemReport::skipped(
            key,
            Stage::Clipped,
            SkipReason::MalformedRaster("truncated strip".to_string()),
        ));
        assert_eq!(report("Run", &summary), 1);
    }

    #[test]
    fn test_error_exit_codes() {
        assert_eq!(error_exit_code(&FloodlineError::Configuration("x".into())), 2);
        assert_eq!(error_exit_code(&FloodlineError::DataNotFound("x".into())), 5);
    }

    #[test]
    fn test_load_for_command_missing_file() {
        assert!(load_for_command("/nonexistent/floodline.toml", false).is_none());
    }
}
