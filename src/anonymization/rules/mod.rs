//! Detection rules
//!
//! A [`Rule`] is an immutable detection and replacement policy: a matcher
//! that finds candidate spans, a priority used to resolve overlaps, and a
//! [`Strategy`] describing how matched values are substituted.
//!
//! Rules live in a [`RuleRegistry`]; the built-in catalogue is provided by
//! [`builtin::builtin_rules`].

pub mod builtin;
pub mod matcher;
pub mod registry;

pub use matcher::{Matcher, Span};
pub use registry::RuleRegistry;

use crate::anonymization::models::PiiCategory;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;

/// Highest priority a rule may carry
pub const MAX_PRIORITY: u8 = 100;

/// How a matched value is substituted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Session-consistent, one-way substitute in the value's shape
    Pseudonym,
    /// Fixed redaction literal
    Redact,
    /// Fixed-length salted hash token
    Hash,
    /// Category label without per-value uniqueness
    GenericPlaceholder,
}

impl Strategy {
    /// Parse a strategy name as written in configuration files
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "pseudonym" => Some(Self::Pseudonym),
            "redact" => Some(Self::Redact),
            "hash" => Some(Self::Hash),
            "generic_placeholder" | "placeholder" => Some(Self::GenericPlaceholder),
            _ => None,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pseudonym => "pseudonym",
            Self::Redact => "redact",
            Self::Hash => "hash",
            Self::GenericPlaceholder => "generic_placeholder",
        };
        f.write_str(name)
    }
}

/// Syntactic shape a pseudonym is synthesized in
///
/// Also serves as the `type` half of a pseudonym mapping key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueShape {
    Email,
    Ipv4,
    Ipv6,
    Hostname,
    Uuid,
    Username,
    #[serde(rename = "filepath")]
    FilePath,
    /// No particular shape; `anon_<token>`
    Opaque,
}

impl ValueShape {
    /// Parse a shape name as written in configuration files
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "email" => Some(Self::Email),
            "ipv4" => Some(Self::Ipv4),
            "ipv6" => Some(Self::Ipv6),
            "hostname" => Some(Self::Hostname),
            "uuid" => Some(Self::Uuid),
            "username" => Some(Self::Username),
            "filepath" | "file_path" => Some(Self::FilePath),
            "opaque" => Some(Self::Opaque),
            _ => None,
        }
    }
}

impl fmt::Display for ValueShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Email => "email",
            Self::Ipv4 => "ipv4",
            Self::Ipv6 => "ipv6",
            Self::Hostname => "hostname",
            Self::Uuid => "uuid",
            Self::Username => "username",
            Self::FilePath => "filepath",
            Self::Opaque => "opaque",
        };
        f.write_str(name)
    }
}

impl<'de> Deserialize<'de> for Strategy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Self::parse(&name).ok_or_else(|| de::Error::custom(format!("unknown strategy: {name}")))
    }
}

impl<'de> Deserialize<'de> for ValueShape {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Self::parse(&name).ok_or_else(|| de::Error::custom(format!("unknown value shape: {name}")))
    }
}

/// Immutable detection and replacement policy
#[derive(Debug, Clone)]
pub struct Rule {
    id: String,
    category: PiiCategory,
    priority: u8,
    matcher: Matcher,
    strategy: Strategy,
    format_preserving: bool,
    shape: ValueShape,
}

impl Rule {
    /// Create a rule with an opaque pseudonym shape
    ///
    /// Priorities above [`MAX_PRIORITY`] are clamped.
    pub fn new(
        id: impl Into<String>,
        category: PiiCategory,
        priority: u8,
        matcher: Matcher,
        strategy: Strategy,
    ) -> Self {
        Self {
            id: id.into(),
            category,
            priority: priority.min(MAX_PRIORITY),
            matcher,
            strategy,
            format_preserving: false,
            shape: ValueShape::Opaque,
        }
    }

    /// Synthesize pseudonyms in `shape` so they resemble the original value
    pub fn preserving_format(mut self, shape: ValueShape) -> Self {
        self.format_preserving = shape != ValueShape::Opaque;
        self.shape = shape;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn category(&self) -> PiiCategory {
        self.category
    }

    pub fn priority(&self) -> u8 {
        self.priority
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn is_format_preserving(&self) -> bool {
        self.format_preserving
    }

    /// Shape used for pseudonyms of this rule's matches
    pub fn shape(&self) -> ValueShape {
        self.shape
    }
}
