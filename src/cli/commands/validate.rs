//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Scrubber configuration file.

use super::DEFAULT_CONFIG_PATH;
use crate::anonymization::AnonymizationEngine;
use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: Option<&str>) -> anyhow::Result<i32> {
        let config_path = config_path.unwrap_or(DEFAULT_CONFIG_PATH);
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates as its last step
        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        let engine = match AnonymizationEngine::from_config(&config.engine) {
            Ok(engine) => engine,
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                return Ok(2);
            }
        };

        let rules = engine.rules();
        let enabled = rules.iter().filter(|(_, enabled)| *enabled).count();

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!(
            "  Session Salt: {}",
            if config.engine.hash_salt.is_some() {
                "configured"
            } else {
                "random per run"
            }
        );
        println!("  Rules: {} registered, {} enabled", rules.len(), enabled);
        println!("  Custom Rules: {}", config.engine.custom_rules.len());
        println!("  Max Matches Per Rule: {}", config.engine.max_matches_per_rule);
        println!("  Pseudonyms: {}", config.defaults.enable_pseudonyms);
        println!("  Preserve Structure: {}", config.defaults.preserve_structure);
        println!(
            "  Processing Budget: {} ms",
            config.defaults.max_processing_time_ms
        );
        println!(
            "  Audit: {}",
            if config.audit.enabled {
                config.audit.log_path.display().to_string()
            } else {
                "disabled".to_string()
            }
        );
        println!();

        // Malformed custom patterns do not fail validation; their rules are
        // skipped on every call instead
        for (rule_id, error) in broken_rules(&engine) {
            println!("⚠️  Rule '{rule_id}' will be skipped: {error}");
        }
        Ok(0)
    }
}

/// Rules whose pattern failed to compile, with the compile error
fn broken_rules(engine: &AnonymizationEngine) -> Vec<(String, String)> {
    engine
        .rules()
        .into_iter()
        .filter_map(|(rule, _)| {
            rule.matcher()
                .compiled()
                .error()
                .map(|error| (rule.id().to_string(), error.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_validate_reports_bad_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[engine]\nmax_matches_per_rule = 0\n").unwrap();

        let code = ValidateArgs {}
            .execute(file.path().to_str())
            .await
            .unwrap();
        assert_eq!(code, 2);
    }

    #[tokio::test]
    async fn test_validate_accepts_empty_config() {
        let file = NamedTempFile::new().unwrap();
        let code = ValidateArgs {}
            .execute(file.path().to_str())
            .await
            .unwrap();
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn test_broken_custom_pattern_is_reported_not_fatal() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            "[[engine.custom_rules]]\nid = \"vmid\"\ncategory = \"system\"\npattern = \"vm-([0-9]+\"\n"
        )
        .unwrap();

        let code = ValidateArgs {}
            .execute(file.path().to_str())
            .await
            .unwrap();
        assert_eq!(code, 0);

        let config = load_config(file.path()).unwrap();
        let engine = AnonymizationEngine::from_config(&config.engine).unwrap();
        let broken = broken_rules(&engine);
        assert_eq!(broken.len(), 1);
        assert_eq!(broken[0].0, "vmid");
    }
}
