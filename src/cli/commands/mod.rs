//! CLI command implementations
//!
//! This module contains all CLI command implementations and the helpers they
//! share for loading configuration and reading input.

pub mod anonymize;
pub mod init;
pub mod rules;
pub mod scan;
pub mod validate;

use crate::config::{load_config, ScrubberConfig};
use crate::domain::{Result, ScrubberError};
use std::io::Read;
use std::path::{Path, PathBuf};

/// Config file looked up when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "scrubber.toml";

/// Load the configuration the CLI runs with
///
/// An explicit path must exist. Without one, `scrubber.toml` is loaded when
/// present and built-in defaults are used otherwise.
pub fn load_settings(config_path: Option<&str>) -> Result<ScrubberConfig> {
    match config_path {
        Some(path) => load_config(path),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => load_config(DEFAULT_CONFIG_PATH),
        None => {
            tracing::debug!("No configuration file, using defaults");
            Ok(ScrubberConfig::default())
        }
    }
}

/// Exit code for a failed engine call: 2 for configuration problems, 5 otherwise
pub fn exit_code_for(error: &ScrubberError) -> i32 {
    match error {
        ScrubberError::Configuration(_) | ScrubberError::NoActiveRules => 2,
        _ => 5,
    }
}

/// Read all of `path`, or stdin when absent or `-`
pub fn read_input(path: Option<&PathBuf>) -> Result<(String, String)> {
    match path {
        Some(p) if p.as_os_str() != "-" => {
            let text = std::fs::read_to_string(p)?;
            Ok((p.display().to_string(), text))
        }
        _ => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(("stdin".to_string(), text))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_explicit_missing_config_is_an_error() {
        assert!(load_settings(Some("definitely-missing-scrubber.toml")).is_err());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code_for(&ScrubberError::NoActiveRules), 2);
        assert_eq!(
            exit_code_for(&ScrubberError::ProcessingTimeout {
                elapsed_ms: 10,
                limit_ms: 5
            }),
            5
        );
    }

    #[test]
    fn test_read_input_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "ip 10.0.0.1").unwrap();
        let path = file.path().to_path_buf();

        let (source, text) = read_input(Some(&path)).unwrap();
        assert_eq!(text, "ip 10.0.0.1");
        assert_eq!(source, path.display().to_string());
    }
}
