//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Human-readable console output on stderr
//! - Configurable log levels
//! - JSON file logging with rotation
//!
//! Matched values are never logged; events carry rule ids, counts and
//! timings only.
//!
//! # Example
//!
//! ```no_run
//! use scrubber::logging::init_logging;
//! use scrubber::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, parse_log_level, LoggingGuard};

/// Log a rule that failed and was skipped for one call
///
/// # Example
///
/// ```no_run
/// use scrubber::log_rule_failure;
///
/// log_rule_failure!("custom_vmid", "pattern failed to compile");
/// ```
#[macro_export]
macro_rules! log_rule_failure {
    ($rule_id:expr, $reason:expr) => {
        tracing::warn!(
            rule_id = %$rule_id,
            reason = %$reason,
            "Rule failed; skipping it for this call"
        );
    };
}

/// Log the completion of an anonymization call
///
/// # Example
///
/// ```no_run
/// use scrubber::log_anonymization_complete;
///
/// log_anonymization_complete!(3, 1, 12u64);
/// ```
#[macro_export]
macro_rules! log_anonymization_complete {
    ($matches:expr, $pseudonyms:expr, $elapsed_ms:expr) => {
        tracing::debug!(
            matches = $matches,
            pseudonyms = $pseudonyms,
            elapsed_ms = $elapsed_ms,
            "Anonymization completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use scrubber::log_error_with_context;
/// use scrubber::domain::ScrubberError;
///
/// let error = ScrubberError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
