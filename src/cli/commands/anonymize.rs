//! Anonymize command implementation
//!
//! This module implements the `anonymize` command: rewrite a file or stdin
//! and append an audit record. Original values never leave the process; the
//! pseudonym table can only be summarized as counts per value type.

use super::{exit_code_for, load_settings, read_input};
use crate::anonymization::audit::AuditLogger;
use crate::anonymization::{AnonymizationEngine, PseudonymMapping, ValueShape};
use clap::Args;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

/// Arguments for the anonymize command
#[derive(Args, Debug)]
pub struct AnonymizeArgs {
    /// File to anonymize; stdin when absent or `-`
    pub input: Option<PathBuf>,

    /// Write the result here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Redact values that would otherwise get a pseudonym
    #[arg(long)]
    pub no_pseudonyms: bool,

    /// Use opaque pseudonyms instead of shape-preserving ones
    #[arg(long)]
    pub no_preserve_structure: bool,

    /// Only run these rule ids (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub rules: Vec<String>,

    /// Processing budget in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Print how many pseudonyms were issued per value type to stderr
    #[arg(long)]
    pub mapping_summary: bool,

    /// Print call metadata to stderr
    #[arg(long)]
    pub show_metadata: bool,
}

impl AnonymizeArgs {
    /// Execute the anonymize command
    pub async fn execute(&self, config_path: Option<&str>) -> anyhow::Result<i32> {
        tracing::info!("Starting anonymize command");

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

        // Apply CLI overrides
        let mut options = config.defaults.clone();
        if self.no_pseudonyms {
            options.enable_pseudonyms = false;
        }
        if self.no_preserve_structure {
            options.preserve_structure = false;
        }
        if !self.rules.is_empty() {
            tracing::info!(rules = ?self.rules, "Restricting rules from CLI");
            options = options.with_enabled_rules(self.rules.iter().cloned());
        }
        if let Some(timeout_ms) = self.timeout_ms {
            options.max_processing_time_ms = timeout_ms;
        }

        let audit = AuditLogger::from_config(&config.audit)?;

        let (source, text) = read_input(self.input.as_ref())?;
        let result = match engine.anonymize(&text, &options).await {
            Ok(result) => result,
            Err(e) => {
                eprintln!("❌ Anonymization of {source} failed: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        match self.output {
            Some(ref path) => fs::write(path, &result.data)?,
            None => print!("{}", result.data),
        }

        if self.mapping_summary {
            for (shape, count) in mapping_counts(&engine.list_mappings()) {
                eprintln!("{shape:<10} {count}");
            }
        }

        if audit.is_enabled() {
            audit.log_anonymization(&source, &text, &result)?;
            tracing::debug!(source = %source, "Audit record written");
        }

        if self.show_metadata {
            eprintln!("{}", serde_json::to_string_pretty(&result.metadata)?);
        }

        tracing::info!(
            source = %source,
            rules_applied = result.metadata.rules_applied.len(),
            pseudonyms_used = result.metadata.pseudonyms_used,
            duration_ms = result.metadata.processing_time_ms,
            "Anonymization completed"
        );
        Ok(0)
    }
}

/// Pseudonyms issued per value type
fn mapping_counts(mappings: &[PseudonymMapping]) -> BTreeMap<ValueShape, usize> {
    let mut counts = BTreeMap::new();
    for mapping in mappings {
        *counts.entry(mapping.value_type).or_insert(0) += 1;
    }
    counts
}
