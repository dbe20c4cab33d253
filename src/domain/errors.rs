//! Domain error types
//!
//! This module defines the error hierarchy for Scrubber. Per-rule failures
//! ([`ScrubberError::RuleExecution`]) are recovered inside the detector;
//! every other variant is surfaced to the caller of the engine.

use thiserror::Error;

/// Main Scrubber error type
///
/// This is the primary error type used throughout the library.
#[derive(Debug, Error)]
pub enum ScrubberError {
    /// Invalid configuration or per-call options (unknown rule id, bad salt, ...)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A single rule's matcher failed; the rule is skipped for that call
    #[error("Rule '{rule_id}' failed: {reason}")]
    RuleExecution { rule_id: String, reason: String },

    /// The call exceeded its processing budget; no partial output is returned
    #[error("Processing timed out after {elapsed_ms}ms (limit {limit_ms}ms)")]
    ProcessingTimeout { elapsed_ms: u64, limit_ms: u64 },

    /// Every rule is disabled or filtered out for this call
    #[error("No active rules remain for this call")]
    NoActiveRules,

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for ScrubberError {
    fn from(err: std::io::Error) -> Self {
        ScrubberError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for ScrubberError {
    fn from(err: serde_json::Error) -> Self {
        ScrubberError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for ScrubberError {
    fn from(err: toml::de::Error) -> Self {
        ScrubberError::Configuration(format!("TOML parse error: {err}"))
    }
}

// Custom patterns that fail to compile are configuration problems
impl From<regex::Error> for ScrubberError {
    fn from(err: regex::Error) -> Self {
        ScrubberError::Configuration(format!("Invalid pattern: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ScrubberError::Configuration("Unknown rule id: foo".to_string());
        assert_eq!(err.to_string(), "Configuration error: Unknown rule id: foo");

        let err = ScrubberError::ProcessingTimeout {
            elapsed_ms: 12,
            limit_ms: 10,
        };
        assert_eq!(
            err.to_string(),
            "Processing timed out after 12ms (limit 10ms)"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: ScrubberError = io_err.into();
        assert!(matches!(err, ScrubberError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: ScrubberError = json_err.into();
        assert!(matches!(err, ScrubberError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: ScrubberError = toml_err.into();
        assert!(matches!(err, ScrubberError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_regex_error_conversion() {
        let regex_err = regex::Regex::new("(unclosed").unwrap_err();
        let err: ScrubberError = regex_err.into();
        assert!(matches!(err, ScrubberError::Configuration(_)));
    }

    #[test]
    fn test_implements_std_error() {
        let err = ScrubberError::NoActiveRules;
        let _: &dyn std::error::Error = &err;
    }
}
