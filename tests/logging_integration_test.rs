//! Integration tests for logging functionality

use floodline::config::LoggingConfig;
use floodline::core::pipeline::{ItemReport, SkipReason, Stage};
use floodline::domain::{CountryCode, HazardId, HazardKind, ItemKey, RegionCode};
use floodline::logging::init_logging;
use tempfile::TempDir;

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert!(!config.local_enabled);
    assert_eq!(config.local_path, "logs");
    assert_eq!(config.local_rotation, "daily");
}

#[test]
fn test_invalid_level_is_rejected_before_install() {
    let result = init_logging("loud", &LoggingConfig::default());
    assert!(result.is_err());
}

// The global subscriber can be installed once per process; this is the only
// test in this binary that installs it. The filter only admits `floodline`
// targets, so events are emitted through the library.
#[test]
fn test_file_logging_creates_directory_and_writes_json() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs");

    let config = LoggingConfig {
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        local_rotation: "never".to_string(),
    };

    let guard = init_logging("debug", &config).expect("Failed to initialize logging");
    assert!(log_path.exists());

    let key = ItemKey::country(CountryCode::new("TST").unwrap(), HazardKind::River)
        .with_hazard(HazardId::new("inunriver_rp00100").unwrap())
        .with_region(RegionCode::new("TST.1_1").unwrap());
    let _ = ItemReport::skipped(key, Stage::Clipped, SkipReason::EmptyGeometry);
    drop(guard);

    let contents = std::fs::read_to_string(log_path.join("floodline.log")).unwrap();
    let lines: Vec<serde_json::Value> = contents
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert!(lines
        .iter()
        .any(|l| l["fields"]["message"] == "Item skipped" && l["fields"]["stage"] == "clipped"));
    assert!(lines.iter().all(|l| l["target"]
        .as_str()
        .is_some_and(|t| t.starts_with("floodline"))));
}
