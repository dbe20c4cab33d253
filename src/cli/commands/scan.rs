//! Scan command implementation
//!
//! This module implements the `scan` command: detect PII in one or more
//! inputs without modifying them and print a [`ScanReport`].

use super::{exit_code_for, load_settings, read_input};
use crate::anonymization::{AnonymizationEngine, ScanReport};
use clap::Args;
use std::path::PathBuf;

/// Arguments for the scan command
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Files to scan; stdin when none are given
    pub inputs: Vec<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Exit with code 1 when any PII is found
    #[arg(long)]
    pub fail_on_pii: bool,

    /// Only run these rule ids (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub rules: Vec<String>,

    /// Processing budget per input in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

impl ScanArgs {
    /// Execute the scan command
    pub async fn execute(&self, config_path: Option<&str>) -> anyhow::Result<i32> {
        tracing::info!(inputs = self.inputs.len(), "Starting scan");

        let config = match load_settings(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("❌ Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        let engine = match AnonymizationEngine::from_config(&config.engine) {
            Ok(engine) => engine,
            Err(e) => {
                eprintln!("❌ Failed to build engine: {e}");
                return Ok(2);
            }
        };

        let mut options = config.defaults.clone();
        options.detect_only = true;
        if !self.rules.is_empty() {
            options = options.with_enabled_rules(self.rules.iter().cloned());
        }
        if let Some(timeout_ms) = self.timeout_ms {
            options.max_processing_time_ms = timeout_ms;
        }

        let sources: Vec<Option<&PathBuf>> = if self.inputs.is_empty() {
            vec![None]
        } else {
            self.inputs.iter().map(Some).collect()
        };

        let mut report = ScanReport::new();
        for source in sources {
            let (label, text) = read_input(source)?;
            let result = match engine.anonymize(&text, &options).await {
                Ok(result) => result,
                Err(e) => {
                    eprintln!("❌ Scan of {label} failed: {e}");
                    return Ok(exit_code_for(&e));
                }
            };

            if let Some(ref detection) = result.detection {
                report.add_detection(&label, detection, result.metadata.processing_time_ms);
            }
        }

        let stats = engine.stats();
        if stats.rule_failures > 0 {
            report.add_warning(format!(
                "{} rule execution(s) failed and were skipped; see the log for details",
                stats.rule_failures
            ));
        }

        if self.json {
            println!("{}", report.format_json()?);
        } else {
            print!("{}", report.format_console());
        }

        tracing::info!(
            sources = report.total_sources,
            matches = report.total_pii_detected,
            "Scan completed"
        );

        if self.fail_on_pii && report.has_pii() {
            return Ok(1);
        }
        Ok(0)
    }
}
