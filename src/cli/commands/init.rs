//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use super::DEFAULT_CONFIG_PATH;
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub output: String,

    /// Include example values and comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Scrubber configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2); // Configuration error exit code
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Set SCRUBBER_SALT in your environment or a .env file");
                println!("     to keep pseudonyms stable across runs");
                println!("  3. Validate configuration: scrubber validate-config");
                println!("  4. Try it: echo 'mail admin@example.com' | scrubber anonymize");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(5) // Fatal error exit code
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# Scrubber Configuration File
# PII detection and deterministic anonymization

[application]
log_level = "info"

[engine]
# hash_salt = "${SCRUBBER_SALT}"
max_matches_per_rule = 10000
disabled_rules = []

[defaults]
enable_pseudonyms = true
preserve_structure = true
max_processing_time_ms = 5000

[audit]
enabled = false
log_path = "./audit/anonymization.log"
json_format = true

[logging]
local_enabled = false
local_path = "./logs"
local_rotation = "daily"
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# Scrubber Configuration File
# PII detection and deterministic anonymization
#
# This file contains all configuration options with examples and explanations.
# Every section is optional.

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# ============================================================================
# Engine
# ============================================================================
[engine]
# Session salt keying every pseudonym (1-256 bytes, no control characters).
# When unset a random salt is drawn per run, so pseudonyms differ between runs.
# hash_salt = "${SCRUBBER_SALT}"

# Candidate budget per rule and call; exceeding it skips the rule
max_matches_per_rule = 10000

# Built-in rules to switch off
# Built-ins: api_token, bearer_token, credential, email, ipv4, ipv6,
#            mac_address, username, hostname, uuid, filepath
disabled_rules = ["filepath"]

# Custom rules. An id equal to a built-in replaces it.
# strategy: pseudonym | redact | hash | generic_placeholder
# format_preserving: email | ipv4 | ipv6 | hostname | uuid | username | filepath | opaque
[[engine.custom_rules]]
id = "vmid"
category = "system"        # personal | network | infrastructure | system | credential | filesystem
priority = 65              # 0-100, higher wins overlaps
pattern = "\\bvm-[0-9]{3,}\\b"
strategy = "hash"

# ============================================================================
# Default Call Options
# ============================================================================
[defaults]
# Replace values with pseudonyms; when false, pseudonym rules redact instead
enable_pseudonyms = true

# Keep the shape of replaced values (emails stay emails, IPs stay IPs)
preserve_structure = true

# Wall-clock budget per call in milliseconds
max_processing_time_ms = 5000

# Restrict matching to these rule ids (all enabled rules when unset)
# enabled_rules = ["email", "ipv4", "credential"]

# ============================================================================
# Audit Trail
# ============================================================================
[audit]
# Append one record per anonymize call (input is fingerprinted, never stored)
enabled = false
log_path = "./audit/anonymization.log"
json_format = true

# ============================================================================
# Logging Configuration
# ============================================================================
[logging]
# Enable JSON file logging in addition to the console
local_enabled = false

# Directory for log files
local_path = "./logs"

# Log rotation (daily, hourly, never)
local_rotation = "daily"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScrubberConfig;

    #[test]
    fn test_init_args_defaults() {
        let args = InitArgs {
            output: DEFAULT_CONFIG_PATH.to_string(),
            with_examples: false,
            force: false,
        };

        assert_eq!(args.output, "scrubber.toml");
        assert!(!args.with_examples);
        assert!(!args.force);
    }

    #[test]
    fn test_generate_minimal_config_is_valid() {
        let config: ScrubberConfig = toml::from_str(&InitArgs::generate_minimal_config()).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_generate_config_with_examples_is_valid() {
        let content = InitArgs::generate_config_with_examples();
        assert!(content.contains("# Scrubber Configuration File"));

        let config: ScrubberConfig = toml::from_str(&content).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.engine.custom_rules.len(), 1);
        assert_eq!(config.engine.disabled_rules, vec!["filepath"]);
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scrubber.toml");
        std::fs::write(&path, "# existing").unwrap();

        let args = InitArgs {
            output: path.display().to_string(),
            with_examples: false,
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), 2);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# existing");
    }
}
