//! Detection and anonymization data models

use serde::{de, Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Category of sensitive information a rule detects
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PiiCategory {
    /// People: email addresses, usernames
    Personal,
    /// Addresses on the wire: IPv4, IPv6, MAC
    Network,
    /// Named machines and services: hostnames, FQDNs
    Infrastructure,
    /// System identifiers: UUIDs, VM ids
    System,
    /// Secrets: passwords, tokens, API keys
    Credential,
    /// File system paths
    Filesystem,
}

impl PiiCategory {
    /// Every category, in declaration order
    pub const ALL: [PiiCategory; 6] = [
        Self::Personal,
        Self::Network,
        Self::Infrastructure,
        Self::System,
        Self::Credential,
        Self::Filesystem,
    ];

    /// Upper-case label used by generic placeholders
    pub fn label(&self) -> &'static str {
        match self {
            Self::Personal => "PERSONAL",
            Self::Network => "NETWORK",
            Self::Infrastructure => "INFRASTRUCTURE",
            Self::System => "SYSTEM",
            Self::Credential => "CREDENTIAL",
            Self::Filesystem => "FILESYSTEM",
        }
    }

    /// Parse a category name as written in configuration files
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "personal" => Some(Self::Personal),
            "network" => Some(Self::Network),
            "infrastructure" => Some(Self::Infrastructure),
            "system" => Some(Self::System),
            "credential" => Some(Self::Credential),
            "filesystem" => Some(Self::Filesystem),
            _ => None,
        }
    }
}

impl fmt::Display for PiiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Personal => "personal",
            Self::Network => "network",
            Self::Infrastructure => "infrastructure",
            Self::System => "system",
            Self::Credential => "credential",
            Self::Filesystem => "filesystem",
        };
        f.write_str(name)
    }
}

impl<'de> Deserialize<'de> for PiiCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Self::parse(&name).ok_or_else(|| de::Error::custom(format!("unknown category: {name}")))
    }
}

/// A detected span of sensitive text
///
/// `start` and `end` are half-open byte offsets into the scanned text and
/// always fall on UTF-8 character boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PiiMatch {
    /// Id of the rule that produced this match
    pub rule_id: String,
    /// Category of the producing rule
    pub category: PiiCategory,
    /// Start offset (inclusive)
    pub start: usize,
    /// End offset (exclusive)
    pub end: usize,
    /// Raw matched substring
    pub value: String,
}

impl PiiMatch {
    /// Length of the matched span in bytes
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the span is empty
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Outcome of a detection pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    /// True iff at least one match survived conflict resolution
    pub has_pii: bool,
    /// Score in `[0, 1]`, a pure function of `locations`
    pub confidence: f64,
    /// Categories of all surviving matches
    pub detected_types: BTreeSet<PiiCategory>,
    /// Non-overlapping matches ordered by start offset
    pub locations: Vec<PiiMatch>,
}

impl DetectionResult {
    /// Number of surviving matches
    pub fn total_matches(&self) -> usize {
        self.locations.len()
    }
}

/// Metadata describing a single anonymization call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnonymizationMetadata {
    /// Ids of rules whose matches were substituted, in order of first use
    pub rules_applied: Vec<String>,
    /// Number of substitutions that used a pseudonym
    pub pseudonyms_used: usize,
    /// Wall-clock processing time
    pub processing_time_ms: u64,
    /// Whether the output differs from the input
    pub is_anonymized: bool,
    /// Whether pseudonyms kept the shape of the values they replaced
    pub preserved_structure: bool,
}

/// Anonymized text plus call metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnonymizationResult {
    /// Output text
    pub data: String,
    /// Call metadata
    pub metadata: AnonymizationMetadata,
    /// Detection outcome, present only for detect-only calls
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detection: Option<DetectionResult>,
}
