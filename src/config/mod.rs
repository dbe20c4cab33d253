//! Configuration management for Scrubber.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! Scrubber uses a TOML configuration file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `SCRUBBER_<SECTION>_<KEY>` environment overrides
//! - Default values for every setting
//! - Validation of rule ids and salts on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use scrubber::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("scrubber.toml")?;
//! println!("Custom rules: {}", config.engine.custom_rules.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level
//! - `[engine]` - Session salt, match budget, disabled and custom rules
//! - `[defaults]` - Per-call options used by the CLI
//! - `[audit]` - Audit trail of anonymization calls
//! - [`LoggingConfig`] - JSON file logging
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [engine]
//! hash_salt = "${SCRUBBER_SALT}"
//! disabled_rules = ["filepath"]
//!
//! [[engine.custom_rules]]
//! id = "vmid"
//! category = "system"
//! priority = 65
//! pattern = "\\bvm-[0-9]{3,}\\b"
//! strategy = "hash"
//!
//! [defaults]
//! preserve_structure = true
//! max_processing_time_ms = 5000
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{ApplicationConfig, LoggingConfig, ScrubberConfig};
pub use secret::{secret_string, SecretString, SecretValue};
