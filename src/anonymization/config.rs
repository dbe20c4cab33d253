//! Anonymization configuration
//!
//! [`AnonymizeOptions`] are supplied per call; [`EngineConfig`] shapes an
//! engine instance (salt, rule set, match budget) and [`AuditConfig`] controls
//! the audit trail written by the CLI.

use crate::anonymization::detector::DEFAULT_MAX_MATCHES_PER_RULE;
use crate::anonymization::models::PiiCategory;
use crate::anonymization::rules::{Matcher, Rule, RuleRegistry, Strategy, ValueShape};
use crate::config::{secret_string, SecretString};
use crate::domain::{Result, ScrubberError};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;

/// Longest accepted salt in bytes
pub const MAX_SALT_LEN: usize = 256;

/// Per-call anonymization options
///
/// Deserializes leniently: missing keys take their defaults and unknown keys
/// are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnonymizeOptions {
    /// Substitute pseudonyms; when off, pseudonym rules redact instead
    pub enable_pseudonyms: bool,

    /// Keep the syntactic shape of pseudonymized values
    pub preserve_structure: bool,

    /// Wall-clock budget for the call
    pub max_processing_time_ms: u64,

    /// Salt for this call only; the session salt is used when absent
    #[serde(skip_serializing)]
    pub hash_salt: Option<SecretString>,

    /// Restrict matching to these rule ids
    pub enabled_rules: Option<BTreeSet<String>>,

    /// Detect only and return the input unchanged
    pub detect_only: bool,
}

impl Default for AnonymizeOptions {
    fn default() -> Self {
        Self {
            enable_pseudonyms: true,
            preserve_structure: true,
            max_processing_time_ms: default_max_processing_time_ms(),
            hash_salt: None,
            enabled_rules: None,
            detect_only: false,
        }
    }
}

impl AnonymizeOptions {
    /// Use `salt` for this call instead of the session salt
    pub fn with_hash_salt(mut self, salt: impl Into<String>) -> Self {
        self.hash_salt = Some(secret_string(salt.into()));
        self
    }

    /// Only run the given rules
    pub fn with_enabled_rules<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enabled_rules = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    /// Validate options against the registry they will run with
    ///
    /// # Errors
    ///
    /// Returns [`ScrubberError::Configuration`] for a zero time budget, a
    /// malformed salt or an unknown rule id.
    pub fn validate(&self, registry: &RuleRegistry) -> Result<()> {
        if self.max_processing_time_ms == 0 {
            return Err(ScrubberError::Configuration(
                "max_processing_time_ms must be > 0".to_string(),
            ));
        }

        if let Some(ref salt) = self.hash_salt {
            validate_salt(salt.expose_secret().as_str())?;
        }

        if let Some(ref ids) = self.enabled_rules {
            let unknown: Vec<&str> = ids
                .iter()
                .filter(|id| !registry.contains(id))
                .map(String::as_str)
                .collect();
            if !unknown.is_empty() {
                return Err(ScrubberError::Configuration(format!(
                    "Unknown rule id(s) in enabled_rules: {}",
                    unknown.join(", ")
                )));
            }
        }

        Ok(())
    }
}

/// Reject salts that are empty, oversized or contain control characters
pub fn validate_salt(salt: &str) -> Result<()> {
    if salt.is_empty() {
        return Err(ScrubberError::Configuration(
            "hash_salt must not be empty".to_string(),
        ));
    }
    if salt.len() > MAX_SALT_LEN {
        return Err(ScrubberError::Configuration(format!(
            "hash_salt must be at most {MAX_SALT_LEN} bytes"
        )));
    }
    if salt.chars().any(char::is_control) {
        return Err(ScrubberError::Configuration(
            "hash_salt must not contain control characters".to_string(),
        ));
    }
    Ok(())
}

/// Engine instance configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Session salt; random per instance when absent
    #[serde(default, skip_serializing)]
    pub hash_salt: Option<SecretString>,

    /// Candidate budget per rule and call
    #[serde(default = "default_max_matches_per_rule")]
    pub max_matches_per_rule: usize,

    /// Rule ids registered but not matched
    #[serde(default)]
    pub disabled_rules: Vec<String>,

    /// Additional rules; an id equal to a built-in replaces it
    #[serde(default)]
    pub custom_rules: Vec<CustomRuleConfig>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hash_salt: None,
            max_matches_per_rule: default_max_matches_per_rule(),
            disabled_rules: Vec::new(),
            custom_rules: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Validate the configuration
    ///
    /// Custom patterns are not compiled here; a malformed pattern only makes
    /// its own rule fail at match time.
    pub fn validate(&self) -> Result<()> {
        if let Some(ref salt) = self.hash_salt {
            validate_salt(salt.expose_secret().as_str())?;
        }

        if self.max_matches_per_rule == 0 {
            return Err(ScrubberError::Configuration(
                "engine.max_matches_per_rule must be > 0".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for rule in &self.custom_rules {
            rule.validate()?;
            if !seen.insert(rule.id.as_str()) {
                return Err(ScrubberError::Configuration(format!(
                    "Duplicate custom rule id: {}",
                    rule.id
                )));
            }
        }

        Ok(())
    }

    /// Build the registry this configuration describes
    ///
    /// Built-ins first, then custom rules, then the disabled list.
    ///
    /// # Errors
    ///
    /// Returns [`ScrubberError::Configuration`] when `disabled_rules` names an
    /// unknown id.
    pub fn build_registry(&self) -> Result<RuleRegistry> {
        let mut registry = RuleRegistry::with_builtin_rules()?;
        for custom in &self.custom_rules {
            registry.register(custom.to_rule());
        }
        for id in &self.disabled_rules {
            registry.disable(id)?;
        }
        Ok(registry)
    }
}

/// A rule defined in configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomRuleConfig {
    pub id: String,

    pub category: PiiCategory,

    #[serde(default = "default_custom_priority")]
    pub priority: u8,

    /// Regular expression; the whole match is the detected span
    pub pattern: String,

    #[serde(default = "default_custom_strategy")]
    pub strategy: Strategy,

    /// Shape pseudonyms keep; opaque when absent
    #[serde(default)]
    pub format_preserving: Option<ValueShape>,
}

impl CustomRuleConfig {
    fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(ScrubberError::Configuration(
                "custom rule id must not be empty".to_string(),
            ));
        }
        if self.priority > crate::anonymization::rules::MAX_PRIORITY {
            return Err(ScrubberError::Configuration(format!(
                "custom rule '{}' priority {} exceeds {}",
                self.id,
                self.priority,
                crate::anonymization::rules::MAX_PRIORITY
            )));
        }
        if self.pattern.is_empty() {
            return Err(ScrubberError::Configuration(format!(
                "custom rule '{}' has an empty pattern",
                self.id
            )));
        }
        Ok(())
    }

    /// Materialize the rule
    pub fn to_rule(&self) -> Rule {
        let rule = Rule::new(
            self.id.clone(),
            self.category,
            self.priority,
            Matcher::user_pattern(&self.pattern),
            self.strategy,
        );
        match self.format_preserving {
            Some(shape) => rule.preserving_format(shape),
            None => rule,
        }
    }
}

/// Audit logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Enable audit logging
    #[serde(default)]
    pub enabled: bool,

    /// Audit log file path
    #[serde(default = "default_audit_log_path")]
    pub log_path: PathBuf,

    /// Use JSON format for audit logs
    #[serde(default = "default_audit_json_format")]
    pub json_format: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_path: default_audit_log_path(),
            json_format: default_audit_json_format(),
        }
    }
}

impl AuditConfig {
    /// Validate audit configuration
    pub fn validate(&self) -> Result<()> {
        if self.enabled && self.log_path.as_os_str().is_empty() {
            return Err(ScrubberError::Configuration(
                "audit.log_path must be set when auditing is enabled".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_max_processing_time_ms() -> u64 {
    5000
}

fn default_max_matches_per_rule() -> usize {
    DEFAULT_MAX_MATCHES_PER_RULE
}

fn default_custom_priority() -> u8 {
    60
}

fn default_custom_strategy() -> Strategy {
    Strategy::Redact
}

fn default_audit_log_path() -> PathBuf {
    PathBuf::from("./audit/anonymization.log")
}

fn default_audit_json_format() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> RuleRegistry {
        RuleRegistry::with_builtin_rules().unwrap()
    }

    #[test]
    fn test_default_options() {
        let options = AnonymizeOptions::default();
        assert!(options.enable_pseudonyms);
        assert!(options.preserve_structure);
        assert_eq!(options.max_processing_time_ms, 5000);
        assert!(options.hash_salt.is_none());
        assert!(options.enabled_rules.is_none());
        assert!(!options.detect_only);
    }

    #[test]
    fn test_options_ignore_unknown_keys() {
        let options: AnonymizeOptions = serde_json::from_str(
            r#"{"enable_pseudonyms": false, "someFutureFlag": 1, "detect_only": true}"#,
        )
        .unwrap();
        assert!(!options.enable_pseudonyms);
        assert!(options.detect_only);
        assert_eq!(options.max_processing_time_ms, 5000);
    }

    #[test]
    fn test_unknown_enabled_rule_rejected() {
        let options = AnonymizeOptions::default().with_enabled_rules(["email", "nope"]);
        let err = options.validate(&registry()).unwrap_err();
        assert!(matches!(err, ScrubberError::Configuration(ref m) if m.contains("nope")));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let options = AnonymizeOptions {
            max_processing_time_ms: 0,
            ..AnonymizeOptions::default()
        };
        assert!(options.validate(&registry()).is_err());
    }

    #[test]
    fn test_salt_validation() {
        assert!(validate_salt("pepper").is_ok());
        assert!(validate_salt("").is_err());
        assert!(validate_salt("bad\nsalt").is_err());
        assert!(validate_salt(&"x".repeat(MAX_SALT_LEN + 1)).is_err());

        let options = AnonymizeOptions::default().with_hash_salt("");
        assert!(options.validate(&registry()).is_err());
    }

    #[test]
    fn test_custom_rule_from_toml() {
        let config: EngineConfig = toml::from_str(
            r#"
            disabled_rules = ["filepath"]

            [[custom_rules]]
            id = "vmid"
            category = "system"
            priority = 65
            pattern = "\\bvm-[0-9]{3,}\\b"
            strategy = "hash"
            "#,
        )
        .unwrap();
        config.validate().unwrap();

        let registry = config.build_registry().unwrap();
        let vmid = registry.get("vmid").unwrap();
        assert_eq!(vmid.strategy(), Strategy::Hash);
        assert_eq!(vmid.priority(), 65);
        assert!(registry.active_rules().iter().all(|r| r.id() != "filepath"));
    }

    #[test]
    fn test_duplicate_custom_ids_rejected() {
        let rule = CustomRuleConfig {
            id: "dup".to_string(),
            category: PiiCategory::System,
            priority: 60,
            pattern: "x".to_string(),
            strategy: Strategy::Redact,
            format_preserving: None,
        };
        let config = EngineConfig {
            custom_rules: vec![rule.clone(), rule],
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_disabled_rule_rejected() {
        let config = EngineConfig {
            disabled_rules: vec!["nope".to_string()],
            ..EngineConfig::default()
        };
        assert!(config.build_registry().is_err());
    }
}
