// Scrubber - PII Detection and Deterministic Anonymization
// Copyright (c) 2025 Scrubber Contributors
// Licensed under the MIT License

use clap::Parser;
use scrubber::cli::commands::load_settings;
use scrubber::cli::{Cli, Commands};
use scrubber::config::{LoggingConfig, ScrubberConfig};
use scrubber::logging::init_logging;
use std::process;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    // This is optional - if .env doesn't exist, it's silently ignored
    let _ = dotenvy::dotenv();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Logging comes from the config file when it loads; the command itself
    // reports configuration errors
    let settings: Option<ScrubberConfig> = load_settings(cli.config.as_deref()).ok();
    let log_level = cli
        .log_level
        .clone()
        .or_else(|| settings.as_ref().map(|s| s.application.log_level.clone()))
        .unwrap_or_else(|| "info".to_string());
    let logging_config = settings
        .map(|s| s.logging)
        .unwrap_or_else(LoggingConfig::default);

    let guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(5);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Scrubber - PII Detection and Deterministic Anonymization"
    );

    // Execute command and get exit code
    let exit_code = match execute_command(&cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            5 // Fatal error exit code
        }
    };

    // Flush file logs before exiting
    drop(guard);
    process::exit(exit_code);
}

/// Execute the CLI command
async fn execute_command(cli: &Cli) -> anyhow::Result<i32> {
    let config_path = cli.config.as_deref();
    match &cli.command {
        Commands::Scan(args) => args.execute(config_path).await,
        Commands::Anonymize(args) => args.execute(config_path).await,
        Commands::Rules(args) => args.execute(config_path).await,
        Commands::ValidateConfig(args) => args.execute(config_path).await,
        Commands::Init(args) => args.execute().await,
    }
}
