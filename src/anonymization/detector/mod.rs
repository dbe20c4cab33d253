//! PII detection
//!
//! The [`Detector`] runs every active rule against a text independently,
//! merges the candidates and resolves overlaps by priority. A rule that
//! fails is skipped for that call and reported alongside the result; it
//! never aborts the pass.

pub mod resolve;

use crate::anonymization::models::{DetectionResult, PiiCategory, PiiMatch};
use crate::anonymization::rules::Rule;
use crate::domain::{Result, ScrubberError};
use resolve::Candidate;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default cap on candidates a single rule may produce per call
pub const DEFAULT_MAX_MATCHES_PER_RULE: usize = 10_000;

/// Wall-clock budget for one call
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started: Instant,
    limit: Duration,
}

impl Deadline {
    /// Budget of `limit` starting now
    pub fn after(limit: Duration) -> Self {
        Self {
            started: Instant::now(),
            limit,
        }
    }

    /// Time spent so far
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Fail with [`ScrubberError::ProcessingTimeout`] once the budget is spent
    pub fn check(&self) -> Result<()> {
        let elapsed = self.elapsed();
        if elapsed > self.limit {
            return Err(ScrubberError::ProcessingTimeout {
                elapsed_ms: elapsed.as_millis() as u64,
                limit_ms: self.limit.as_millis() as u64,
            });
        }
        Ok(())
    }
}

/// Detection result plus the rule failures recovered while producing it
#[derive(Debug)]
pub struct DetectionOutcome {
    pub result: DetectionResult,
    pub failures: Vec<ScrubberError>,
}

/// Applies rules to text and produces a conflict-free match set
#[derive(Debug, Clone)]
pub struct Detector {
    max_matches_per_rule: usize,
}

impl Detector {
    /// Create a detector with the default per-rule match budget
    pub fn new() -> Self {
        Self {
            max_matches_per_rule: DEFAULT_MAX_MATCHES_PER_RULE,
        }
    }

    /// Override the per-rule match budget
    pub fn with_max_matches_per_rule(mut self, max: usize) -> Self {
        self.max_matches_per_rule = max.max(1);
        self
    }

    /// Detect PII in `text` using `rules`
    ///
    /// The deadline, when given, is checked between rules; exceeding it is
    /// the only error this returns.
    pub fn detect(
        &self,
        text: &str,
        rules: &[Arc<Rule>],
        deadline: Option<&Deadline>,
    ) -> Result<DetectionOutcome> {
        let mut candidates = Vec::new();
        let mut failures = Vec::new();

        for rule in rules {
            if let Some(deadline) = deadline {
                deadline.check()?;
            }

            match rule.matcher().find(text, self.max_matches_per_rule) {
                Ok(spans) => {
                    candidates.extend(spans.into_iter().map(|span| Candidate {
                        priority: rule.priority(),
                        pii: PiiMatch {
                            rule_id: rule.id().to_string(),
                            category: rule.category(),
                            start: span.start,
                            end: span.end,
                            value: text[span.start..span.end].to_string(),
                        },
                    }));
                }
                Err(reason) => {
                    crate::log_rule_failure!(rule.id(), &reason);
                    failures.push(ScrubberError::RuleExecution {
                        rule_id: rule.id().to_string(),
                        reason,
                    });
                }
            }
        }

        let candidate_count = candidates.len();
        let locations = resolve::resolve(candidates);
        tracing::debug!(
            candidates = candidate_count,
            accepted = locations.len(),
            failed_rules = failures.len(),
            "Detection pass complete"
        );

        let detected_types: BTreeSet<PiiCategory> =
            locations.iter().map(|m| m.category).collect();
        let result = DetectionResult {
            has_pii: !locations.is_empty(),
            confidence: confidence(text.len(), &locations),
            detected_types,
            locations,
        };

        Ok(DetectionOutcome { result, failures })
    }
}

impl Default for Detector {
    fn default() -> Self {
        Self::new()
    }
}

/// Confidence score for a resolved match set
///
/// `1 - 0.5 * (1 - coverage) * (1 - diversity)`, where coverage is the share
/// of text bytes inside matches and diversity the share of categories seen.
/// Zero without matches; a single match scores at least 0.5.
pub fn confidence(text_len: usize, matches: &[PiiMatch]) -> f64 {
    if matches.is_empty() || text_len == 0 {
        return 0.0;
    }
    let covered: usize = matches.iter().map(PiiMatch::len).sum();
    let coverage = (covered as f64 / text_len as f64).min(1.0);
    let categories: BTreeSet<PiiCategory> = matches.iter().map(|m| m.category).collect();
    let diversity = categories.len() as f64 / PiiCategory::ALL.len() as f64;

    (1.0 - 0.5 * (1.0 - coverage) * (1.0 - diversity)).clamp(0.0, 1.0)
}
