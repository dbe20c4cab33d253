//! Engine statistics

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

/// Aggregate statistics over every `anonymize` call since the last reset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineStats {
    /// Completed `anonymize` calls, failed ones included
    pub total_processed: u64,
    /// Pseudonym substitutions across all calls
    pub total_pseudonyms: u64,
    /// Mean wall-clock time per call in milliseconds
    pub average_processing_time: f64,
    /// Share of calls that failed, in `[0, 1]`
    pub error_rate: f64,
    /// Substituted matches per rule id
    pub rules_usage: BTreeMap<String, u64>,
    /// `detect_pii` calls
    pub detect_calls: u64,
    /// Rule failures recovered during detection
    pub rule_failures: u64,
}

#[derive(Debug, Default)]
struct StatsInner {
    total_processed: u64,
    total_errors: u64,
    total_pseudonyms: u64,
    total_time_ms: u64,
    rules_usage: BTreeMap<String, u64>,
    detect_calls: u64,
    rule_failures: u64,
}

/// Thread-safe statistics accumulator
///
/// Every update happens under one lock so a snapshot never observes a call
/// half-recorded.
#[derive(Debug, Default)]
pub struct StatsCollector {
    inner: Mutex<StatsInner>,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<R>(&self, f: impl FnOnce(&mut StatsInner) -> R) -> R {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut inner)
    }

    /// Record a successful `anonymize` call
    pub fn record_success(
        &self,
        elapsed_ms: u64,
        pseudonyms_used: usize,
        rules_usage: &BTreeMap<String, u64>,
        rule_failures: usize,
    ) {
        self.with(|s| {
            s.total_processed += 1;
            s.total_time_ms += elapsed_ms;
            s.total_pseudonyms += pseudonyms_used as u64;
            s.rule_failures += rule_failures as u64;
            for (rule_id, count) in rules_usage {
                *s.rules_usage.entry(rule_id.clone()).or_insert(0) += count;
            }
        });
    }

    /// Record a failed `anonymize` call
    pub fn record_failure(&self, elapsed_ms: u64) {
        self.with(|s| {
            s.total_processed += 1;
            s.total_errors += 1;
            s.total_time_ms += elapsed_ms;
        });
    }

    /// Record a `detect_pii` call
    pub fn record_detection(&self, rule_failures: usize) {
        self.with(|s| {
            s.detect_calls += 1;
            s.rule_failures += rule_failures as u64;
        });
    }

    /// Consistent snapshot of the current counters
    pub fn snapshot(&self) -> EngineStats {
        self.with(|s| {
            let (average_processing_time, error_rate) = if s.total_processed == 0 {
                (0.0, 0.0)
            } else {
                let n = s.total_processed as f64;
                (s.total_time_ms as f64 / n, s.total_errors as f64 / n)
            };
            EngineStats {
                total_processed: s.total_processed,
                total_pseudonyms: s.total_pseudonyms,
                average_processing_time,
                error_rate,
                rules_usage: s.rules_usage.clone(),
                detect_calls: s.detect_calls,
                rule_failures: s.rule_failures,
            }
        })
    }

    /// Zero every counter
    pub fn reset(&self) {
        self.with(|s| *s = StatsInner::default());
    }
}
