//! Redaction strategies

use super::Anonymizer;
use crate::anonymization::models::PiiMatch;
use crate::anonymization::rules::Rule;

/// Literal every redacted value is replaced with
pub const REDACTED: &str = "[REDACTED]";

/// Redaction strategy - replaces the value with [`REDACTED`]
pub struct RedactionStrategy;

impl RedactionStrategy {
    /// Create a new redaction strategy
    pub fn new() -> Self {
        Self
    }
}

impl Anonymizer for RedactionStrategy {
    fn substitute(&self, _pii: &PiiMatch, _rule: &Rule) -> String {
        REDACTED.to_string()
    }
}

impl Default for RedactionStrategy {
    fn default() -> Self {
        Self::new()
    }
}

/// Placeholder strategy - replaces the value with `[CATEGORY]`
pub struct PlaceholderStrategy;

impl PlaceholderStrategy {
    /// Create a new placeholder strategy
    pub fn new() -> Self {
        Self
    }
}

impl Anonymizer for PlaceholderStrategy {
    fn substitute(&self, pii: &PiiMatch, _rule: &Rule) -> String {
        format!("[{}]", pii.category.label())
    }
}

impl Default for PlaceholderStrategy {
    fn default() -> Self {
        Self::new()
    }
}
