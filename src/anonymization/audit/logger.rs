//! Audit logger for anonymization calls

use crate::anonymization::config::AuditConfig;
use crate::anonymization::models::AnonymizationResult;
use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// Audit log entry
#[derive(Debug, Serialize)]
struct AuditLogEntry<'a> {
    timestamp: String,
    source: &'a str,
    /// SHA-256 of the input text (never log plaintext)
    input_sha256: String,
    input_bytes: usize,
    rules_applied: &'a [String],
    pseudonyms_used: usize,
    processing_time_ms: u64,
    is_anonymized: bool,
}

/// Audit logger for anonymization calls
pub struct AuditLogger {
    log_path: PathBuf,
    json_format: bool,
    enabled: bool,
}

impl AuditLogger {
    /// Create a new audit logger
    pub fn new(log_path: PathBuf, json_format: bool, enabled: bool) -> Result<Self> {
        if enabled {
            // Ensure parent directory exists
            if let Some(parent) = log_path.parent() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create audit log directory: {}", parent.display())
                })?;
            }
        }

        Ok(Self {
            log_path,
            json_format,
            enabled,
        })
    }

    /// Create a logger from the `[audit]` section
    pub fn from_config(config: &AuditConfig) -> Result<Self> {
        Self::new(config.log_path.clone(), config.json_format, config.enabled)
    }

    /// Whether records are written at all
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Record one anonymization call
    ///
    /// `source` names where the input came from (a file path or `stdin`).
    pub fn log_anonymization(
        &self,
        source: &str,
        input: &str,
        result: &AnonymizationResult,
    ) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let entry = AuditLogEntry {
            timestamp: Utc::now().to_rfc3339(),
            source,
            input_sha256: fingerprint(input),
            input_bytes: input.len(),
            rules_applied: &result.metadata.rules_applied,
            pseudonyms_used: result.metadata.pseudonyms_used,
            processing_time_ms: result.metadata.processing_time_ms,
            is_anonymized: result.metadata.is_anonymized,
        };

        self.write_entry(&entry)
    }

    /// Write an audit entry to the log file
    fn write_entry(&self, entry: &AuditLogEntry<'_>) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .with_context(|| format!("Failed to open audit log: {}", self.log_path.display()))?;

        if self.json_format {
            let json_line =
                serde_json::to_string(entry).context("Failed to serialize audit entry")?;
            writeln!(file, "{json_line}").context("Failed to write audit entry")?;
        } else {
            writeln!(
                file,
                "[{}] Source: {} | Input: {} | Rules: {} | Pseudonyms: {} | Time: {}ms",
                entry.timestamp,
                entry.source,
                entry.input_sha256,
                entry.rules_applied.join(","),
                entry.pseudonyms_used,
                entry.processing_time_ms
            )
            .context("Failed to write audit entry")?;
        }

        Ok(())
    }
}

/// Hex SHA-256 of `value`
fn fingerprint(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::models::AnonymizationMetadata;
    use tempfile::tempdir;

    fn result(data: &str) -> AnonymizationResult {
        AnonymizationResult {
            data: data.to_string(),
            metadata: AnonymizationMetadata {
                rules_applied: vec!["email".to_string()],
                pseudonyms_used: 1,
                processing_time_ms: 3,
                is_anonymized: true,
                preserved_structure: true,
            },
            detection: None,
        }
    }

    #[test]
    fn test_fingerprint_is_stable() {
        assert_eq!(fingerprint("a@b.io"), fingerprint("a@b.io"));
        assert_ne!(fingerprint("a@b.io"), fingerprint("c@d.io"));
        assert_eq!(fingerprint("").len(), 64);
    }

    #[test]
    fn test_log_anonymization_json() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("audit").join("anonymization.log");
        let logger = AuditLogger::new(log_path.clone(), true, true).unwrap();

        let input = "Contact admin@example.com";
        logger
            .log_anonymization("stdin", input, &result("Contact x@y.io"))
            .unwrap();
        logger
            .log_anonymization("stdin", input, &result("Contact x@y.io"))
            .unwrap();

        let content = std::fs::read_to_string(&log_path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(!content.contains("admin@example.com"));

        let record: serde_json::Value =
            serde_json::from_str(content.lines().next().unwrap()).unwrap();
        assert_eq!(record["source"], "stdin");
        assert_eq!(record["input_sha256"], fingerprint(input));
        assert_eq!(record["rules_applied"][0], "email");
    }

    #[test]
    fn test_plain_text_format() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("audit.log");
        let logger = AuditLogger::new(log_path.clone(), false, true).unwrap();

        logger
            .log_anonymization("notes.txt", "secret", &result("x"))
            .unwrap();

        let content = std::fs::read_to_string(&log_path).unwrap();
        assert!(content.contains("Source: notes.txt"));
        assert!(content.contains("Rules: email"));
        assert!(!content.contains("secret"));
    }

    #[test]
    fn test_disabled_logger_writes_nothing() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("nested").join("audit.log");
        let logger = AuditLogger::from_config(&AuditConfig {
            enabled: false,
            log_path: log_path.clone(),
            json_format: true,
        })
        .unwrap();

        assert!(!logger.is_enabled());
        logger.log_anonymization("stdin", "x", &result("x")).unwrap();
        assert!(!log_path.exists());
    }
}
