//! Anonymization strategy module
//!
//! Provides the substitution strategies and the [`Replacer`] that splices
//! their output into the original text.

pub mod redaction;
pub mod tokenization;

use crate::anonymization::models::PiiMatch;
use crate::anonymization::pseudonym::PseudonymManager;
use crate::anonymization::rules::{Rule, Strategy};
use redaction::{PlaceholderStrategy, RedactionStrategy};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokenization::{HashStrategy, PseudonymStrategy};

/// Trait for anonymization strategy implementations
pub trait Anonymizer: Send + Sync {
    /// Substitute for a matched value
    fn substitute(&self, pii: &PiiMatch, rule: &Rule) -> String;
}

/// Output of a replacement pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Replacement {
    /// Reassembled text
    pub data: String,
    /// Ids of rules that substituted at least one match, in order of first use
    pub rules_applied: Vec<String>,
    /// Substitutions that produced a pseudonym
    pub pseudonyms_used: usize,
    /// Substitutions per rule id
    pub rules_usage: BTreeMap<String, u64>,
}

/// Rewrites matched spans according to each rule's strategy
pub struct Replacer<'a> {
    redaction: RedactionStrategy,
    placeholder: PlaceholderStrategy,
    hash: HashStrategy<'a>,
    pseudonym: PseudonymStrategy<'a>,
    enable_pseudonyms: bool,
}

impl<'a> Replacer<'a> {
    /// Create a replacer drawing keyed output from `pseudonyms`
    pub fn new(
        pseudonyms: &'a PseudonymManager,
        enable_pseudonyms: bool,
        preserve_structure: bool,
    ) -> Self {
        Self {
            redaction: RedactionStrategy::new(),
            placeholder: PlaceholderStrategy::new(),
            hash: HashStrategy::new(pseudonyms),
            pseudonym: PseudonymStrategy::new(pseudonyms, preserve_structure),
            enable_pseudonyms,
        }
    }

    fn strategy_for(&self, strategy: Strategy) -> &dyn Anonymizer {
        match strategy {
            Strategy::Redact => &self.redaction,
            Strategy::GenericPlaceholder => &self.placeholder,
            Strategy::Hash => &self.hash,
            Strategy::Pseudonym if self.enable_pseudonyms => &self.pseudonym,
            Strategy::Pseudonym => &self.redaction,
        }
    }

    /// Replace every match in `text`
    ///
    /// `matches` must be non-overlapping and ordered by start, as produced by
    /// the detector. Bytes outside matches are copied verbatim. A match whose
    /// rule is not in `rules` is redacted.
    pub fn apply(&self, text: &str, matches: &[PiiMatch], rules: &[Arc<Rule>]) -> Replacement {
        let by_id: HashMap<&str, &Rule> = rules.iter().map(|r| (r.id(), r.as_ref())).collect();

        let mut out = Replacement {
            data: String::with_capacity(text.len()),
            ..Replacement::default()
        };
        let mut cursor = 0;

        for pii in matches {
            out.data.push_str(&text[cursor..pii.start]);

            let substitute = match by_id.get(pii.rule_id.as_str()) {
                Some(rule) => {
                    let strategy = self.strategy_for(rule.strategy());
                    if rule.strategy() == Strategy::Pseudonym && self.enable_pseudonyms {
                        out.pseudonyms_used += 1;
                    }
                    strategy.substitute(pii, rule)
                }
                None => redaction::REDACTED.to_string(),
            };
            out.data.push_str(&substitute);

            if !out.rules_applied.contains(&pii.rule_id) {
                out.rules_applied.push(pii.rule_id.clone());
            }
            *out.rules_usage.entry(pii.rule_id.clone()).or_insert(0) += 1;
            cursor = pii.end;
        }

        out.data.push_str(&text[cursor..]);
        out
    }
}
