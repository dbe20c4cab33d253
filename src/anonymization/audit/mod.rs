//! Audit logging module
//!
//! Provides an append-only audit trail of anonymization calls.

pub mod logger;

pub use logger::AuditLogger;
