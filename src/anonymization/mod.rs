//! PII detection and deterministic anonymization
//!
//! This module finds sensitive values in free text (emails, addresses,
//! hostnames, credentials, identifiers, paths) and rewrites them according
//! to per-rule strategies.
//!
//! # Architecture
//!
//! The pipeline consists of:
//! - **Rules**: immutable detection policies held in a [`rules::RuleRegistry`]
//! - **Detection**: every active rule runs, then overlaps are resolved by priority
//! - **Anonymization**: matches are replaced by pseudonyms, hashes, redaction or placeholders
//! - **Pseudonyms**: salted, one-way, session-consistent substitutes
//! - **Audit**: append-only records fingerprinting each input
//!
//! # Usage
//!
//! ```rust,no_run
//! use scrubber::anonymization::{AnonymizationEngine, AnonymizeOptions};
//!
//! # async fn example() -> scrubber::domain::Result<()> {
//! let engine = AnonymizationEngine::new()?;
//! let result = engine
//!     .anonymize("password: secret123", &AnonymizeOptions::default())
//!     .await?;
//! assert_eq!(result.data, "password: [REDACTED]");
//! # Ok(())
//! # }
//! ```

pub mod anonymizer;
pub mod audit;
pub mod config;
pub mod detector;
pub mod engine;
pub mod models;
pub mod pseudonym;
pub mod report;
pub mod rules;
pub mod stats;

// Re-export main types
pub use config::{AnonymizeOptions, AuditConfig, CustomRuleConfig, EngineConfig};
pub use engine::{create_anonymization_engine, AnonymizationEngine};
pub use models::{
    AnonymizationMetadata, AnonymizationResult, DetectionResult, PiiCategory, PiiMatch,
};
pub use pseudonym::PseudonymMapping;
pub use report::ScanReport;
pub use rules::{Matcher, Rule, RuleRegistry, Strategy, ValueShape};
pub use stats::EngineStats;
