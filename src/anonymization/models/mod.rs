//! Data models shared by the detector, replacer and engine

pub mod pii_match;

pub use pii_match::{
    AnonymizationMetadata, AnonymizationResult, DetectionResult, PiiCategory, PiiMatch,
};
