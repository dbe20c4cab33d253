//! Overlap resolution
//!
//! Candidates from every rule are ranked by `(priority desc, span length
//! desc, start asc, rule id asc)` and accepted greedily when they do not
//! overlap anything accepted before them. The ranking is total, so the
//! outcome does not depend on the order rules ran in.

use crate::anonymization::models::PiiMatch;
use std::collections::BTreeMap;

/// A raw match together with the priority of the rule that produced it
#[derive(Debug, Clone)]
pub struct Candidate {
    pub priority: u8,
    pub pii: PiiMatch,
}

/// Reduce candidates to a non-overlapping set ordered by start offset
pub fn resolve(mut candidates: Vec<Candidate>) -> Vec<PiiMatch> {
    candidates.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| b.pii.len().cmp(&a.pii.len()))
            .then_with(|| a.pii.start.cmp(&b.pii.start))
            .then_with(|| a.pii.rule_id.cmp(&b.pii.rule_id))
    });

    // start -> end of every accepted span
    let mut accepted_spans: BTreeMap<usize, usize> = BTreeMap::new();
    let mut accepted = Vec::new();

    for candidate in candidates {
        let PiiMatch { start, end, .. } = candidate.pii;
        // Accepted spans are disjoint, so the only one that can reach into
        // [start, end) is the last one starting before `end`.
        let blocked = accepted_spans
            .range(..end)
            .next_back()
            .is_some_and(|(_, &other_end)| other_end > start);
        if blocked {
            continue;
        }
        accepted_spans.insert(start, end);
        accepted.push(candidate.pii);
    }

    accepted.sort_by_key(|m| m.start);
    accepted
}
