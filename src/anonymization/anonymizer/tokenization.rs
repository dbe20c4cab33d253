//! Keyed tokenization strategies
//!
//! Both strategies derive their output from the session salt: pseudonyms are
//! cached so a value keeps its substitute for the whole session, hash tokens
//! are recomputed on every use.

use super::Anonymizer;
use crate::anonymization::models::PiiMatch;
use crate::anonymization::pseudonym::PseudonymManager;
use crate::anonymization::rules::{Rule, ValueShape};

/// Pseudonym strategy - session-consistent substitute in the value's shape
pub struct PseudonymStrategy<'a> {
    pseudonyms: &'a PseudonymManager,
    preserve_structure: bool,
}

impl<'a> PseudonymStrategy<'a> {
    /// Create a pseudonym strategy backed by `pseudonyms`
    ///
    /// With `preserve_structure` off every value is keyed and synthesized as
    /// [`ValueShape::Opaque`].
    pub fn new(pseudonyms: &'a PseudonymManager, preserve_structure: bool) -> Self {
        Self {
            pseudonyms,
            preserve_structure,
        }
    }

    fn shape_for(&self, rule: &Rule) -> ValueShape {
        if self.preserve_structure && rule.is_format_preserving() {
            rule.shape()
        } else {
            ValueShape::Opaque
        }
    }
}

impl Anonymizer for PseudonymStrategy<'_> {
    fn substitute(&self, pii: &PiiMatch, rule: &Rule) -> String {
        self.pseudonyms.pseudonym_for(self.shape_for(rule), &pii.value)
    }
}

/// Hash strategy - fixed-length `hash_<hex>` token
pub struct HashStrategy<'a> {
    pseudonyms: &'a PseudonymManager,
}

impl<'a> HashStrategy<'a> {
    /// Create a hash strategy keyed by the salt of `pseudonyms`
    pub fn new(pseudonyms: &'a PseudonymManager) -> Self {
        Self { pseudonyms }
    }
}

impl Anonymizer for HashStrategy<'_> {
    fn substitute(&self, pii: &PiiMatch, _rule: &Rule) -> String {
        self.pseudonyms.hash_token(&pii.value)
    }
}
