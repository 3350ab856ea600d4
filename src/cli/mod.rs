//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Floodline using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Floodline - flood hazard clipping and exposure tool
#[derive(Parser, Debug)]
#[command(name = "floodline")]
#[command(version, about, long_about = None)]
#[command(author = "Floodline Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "floodline.toml", env = "FLOODLINE_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "FLOODLINE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Clip, vectorize and overlay every selected country
    Run(commands::run::RunArgs),

    /// Clip raw hazard rasters to the regions of one country
    Clip(commands::clip::ClipArgs),

    /// Trace polygons from the clipped rasters of one country
    Vectorize(commands::vectorize::VectorizeArgs),

    /// Overlay stored hazard polygons with population and coverage
    Overlay(commands::overlay::OverlayArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::HazardKind;

    #[test]
    fn test_cli_parse_run() {
        let cli = Cli::parse_from(["floodline", "run"]);
        assert_eq!(cli.config, "floodline.toml");
        assert!(matches!(cli.command, Commands::Run(_)));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["floodline", "--config", "custom.toml", "run"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["floodline", "--log-level", "debug", "run"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_run_filters() {
        let cli = Cli::parse_from([
            "floodline", "run", "--country", "ken", "--kind", "coastal", "--dry-run",
        ]);
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.country.map(|c| c.to_string()), Some("KEN".to_string()));
        assert_eq!(args.kind, Some(HazardKind::Coastal));
        assert!(args.dry_run);
    }

    #[test]
    fn test_cli_rejects_bad_country() {
        let result = Cli::try_parse_from(["floodline", "run", "--country", "KENYA"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_clip_requires_country() {
        assert!(Cli::try_parse_from(["floodline", "clip"]).is_err());

        let cli = Cli::parse_from(["floodline", "clip", "--country", "KEN"]);
        let Commands::Clip(args) = cli.command else {
            panic!("expected clip");
        };
        assert_eq!(args.kind, HazardKind::River);
    }

    #[test]
    fn test_cli_parse_stage_commands() {
        let cli = Cli::parse_from(["floodline", "vectorize", "--country", "KEN"]);
        assert!(matches!(cli.command, Commands::Vectorize(_)));

        let cli = Cli::parse_from(["floodline", "overlay", "--country", "KEN", "--kind", "coastal"]);
        assert!(matches!(cli.command, Commands::Overlay(_)));
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["floodline", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["floodline", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }
}
