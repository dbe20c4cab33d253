//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Scrubber using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Scrubber - PII detection and deterministic anonymization
#[derive(Parser, Debug)]
#[command(name = "scrubber")]
#[command(version, about, long_about = None)]
#[command(author = "Scrubber Contributors")]
pub struct Cli {
    /// Path to configuration file; `scrubber.toml` is used when present
    #[arg(short, long, env = "SCRUBBER_CONFIG")]
    pub config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "SCRUBBER_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect PII and print a report
    Scan(commands::scan::ScanArgs),

    /// Anonymize text from a file or stdin
    Anonymize(commands::anonymize::AnonymizeArgs),

    /// List detection rules
    Rules(commands::rules::RulesArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_scan() {
        let cli = Cli::parse_from(["scrubber", "scan", "notes.txt"]);
        assert!(cli.config.is_none());
        assert!(matches!(cli.command, Commands::Scan(_)));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["scrubber", "--config", "custom.toml", "rules"]);
        assert_eq!(cli.config.as_deref(), Some("custom.toml"));
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["scrubber", "--log-level", "debug", "rules"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_anonymize_flags() {
        let cli = Cli::parse_from([
            "scrubber",
            "anonymize",
            "--no-pseudonyms",
            "--rules",
            "email,ipv4",
            "--timeout-ms",
            "250",
        ]);
        match cli.command {
            Commands::Anonymize(args) => {
                assert!(args.no_pseudonyms);
                assert_eq!(args.rules, vec!["email", "ipv4"]);
                assert_eq!(args.timeout_ms, Some(250));
                assert!(args.input.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["scrubber", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["scrubber", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }
}
