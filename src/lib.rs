// Scrubber - PII Detection and Deterministic Anonymization
// Copyright (c) 2025 Scrubber Contributors
// Licensed under the MIT License

//! # Scrubber - PII Detection and Deterministic Anonymization
//!
//! Scrubber finds personally identifiable and infrastructure-sensitive values
//! in free text and replaces them with redactions, hashes, placeholders or
//! session-consistent pseudonyms that keep the shape of the original.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Detecting** emails, IP and MAC addresses, hostnames, UUIDs, usernames,
//!   file paths and credentials with a prioritized rule set
//! - **Resolving** overlapping matches deterministically by priority and length
//! - **Anonymizing** matches with per-rule strategies
//! - **Pseudonymizing** values through a salted, one-way mapping that is stable
//!   within a session
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`anonymization`] - Rules, detector, replacer, pseudonyms and the engine facade
//! - [`domain`] - Error types
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scrubber::anonymization::{create_anonymization_engine, AnonymizeOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = create_anonymization_engine()?;
//!
//!     let result = engine
//!         .anonymize("Contact admin@example.com for help", &AnonymizeOptions::default())
//!         .await?;
//!
//!     println!("{}", result.data);
//!     println!("rules applied: {:?}", result.metadata.rules_applied);
//!     Ok(())
//! }
//! ```
//!
//! ## Detection Only
//!
//! ```rust,no_run
//! use scrubber::anonymization::AnonymizationEngine;
//!
//! # fn example() -> scrubber::domain::Result<()> {
//! let engine = AnonymizationEngine::global()?;
//! let detection = engine.detect_pii("Server at 192.168.1.1")?;
//! assert!(detection.has_pii);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Scrubber uses the [`domain::ScrubberError`] type for all errors. A rule
//! that fails is skipped for that call and logged; configuration errors and
//! timeouts fail the call.
//!
//! ## Logging
//!
//! Scrubber uses structured logging with the `tracing` crate and never logs
//! matched values.

pub mod anonymization;
pub mod cli;
pub mod config;
pub mod domain;
pub mod logging;
