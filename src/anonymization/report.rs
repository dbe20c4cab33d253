//! Scan reporting
//!
//! Aggregates detection results into a report with per-category and per-rule
//! counts, masked samples and warnings, printable to the console or as JSON.

use crate::anonymization::models::{DetectionResult, PiiCategory, PiiMatch};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const MAX_SAMPLES: usize = 20;
const SAMPLES_PER_SOURCE: usize = 3;
const MAX_SAMPLE_CHARS: usize = 50;
/// Credential samples show neither characters nor length
const CREDENTIAL_MASK: &str = "********";

/// Scan report with PII detection statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanReport {
    /// Inputs scanned
    pub total_sources: usize,

    /// Total matches detected
    pub total_pii_detected: usize,

    /// Matches by category
    pub detections_by_category: BTreeMap<PiiCategory, usize>,

    /// Matches by rule id
    pub detections_by_rule: BTreeMap<String, usize>,

    /// Masked samples of detected values
    pub samples: Vec<DetectionSample>,

    /// Warnings such as failed rules
    pub warnings: Vec<String>,

    /// Processing statistics
    pub stats: ScanStats,
}

/// One detected value, masked
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionSample {
    /// Where the value was found
    pub source: String,

    /// Byte offset of the match
    pub offset: usize,

    /// Rule that matched
    pub rule_id: String,

    pub category: PiiCategory,

    /// Value with every character but the first and last masked
    pub masked_value: String,

    /// Confidence of the detection pass that found it
    pub confidence: f64,
}

/// Processing statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanStats {
    pub avg_processing_time_ms: u64,
    pub total_processing_time_ms: u64,
    pub sources_with_pii: usize,
    pub sources_without_pii: usize,
}

impl ScanReport {
    /// Create a new empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the detection result for one input
    pub fn add_detection(&mut self, source: &str, result: &DetectionResult, processing_time_ms: u64) {
        self.total_sources += 1;
        self.stats.total_processing_time_ms += processing_time_ms;

        if result.has_pii {
            self.stats.sources_with_pii += 1;
            self.total_pii_detected += result.total_matches();

            for location in &result.locations {
                *self
                    .detections_by_category
                    .entry(location.category)
                    .or_insert(0) += 1;
                *self
                    .detections_by_rule
                    .entry(location.rule_id.clone())
                    .or_insert(0) += 1;
            }

            for location in result.locations.iter().take(SAMPLES_PER_SOURCE) {
                self.add_sample(source, location, result.confidence);
            }
        } else {
            self.stats.sources_without_pii += 1;
        }

        self.stats.avg_processing_time_ms =
            self.stats.total_processing_time_ms / self.total_sources as u64;
    }

    fn add_sample(&mut self, source: &str, location: &PiiMatch, confidence: f64) {
        if self.samples.len() >= MAX_SAMPLES {
            return;
        }

        self.samples.push(DetectionSample {
            source: source.to_string(),
            offset: location.start,
            rule_id: location.rule_id.clone(),
            category: location.category,
            masked_value: mask_value(&location.value, location.category),
            confidence,
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    /// Whether any input contained PII
    pub fn has_pii(&self) -> bool {
        self.total_pii_detected > 0
    }

    /// Format report for console output
    pub fn format_console(&self) -> String {
        let mut output = String::new();

        output.push('\n');
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push_str("                        PII SCAN REPORT                        \n");
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push('\n');

        output.push_str("📊 SUMMARY\n");
        output.push_str("───────────────────────────────────────────────────────────────\n");
        output.push_str(&format!(
            "  Sources Scanned:             {}\n",
            self.total_sources
        ));
        output.push_str(&format!(
            "  Sources with PII:            {}\n",
            self.stats.sources_with_pii
        ));
        output.push_str(&format!(
            "  Sources without PII:         {}\n",
            self.stats.sources_without_pii
        ));
        output.push_str(&format!(
            "  Total PII Matches Detected:  {}\n",
            self.total_pii_detected
        ));
        output.push_str(&format!(
            "  Avg Processing Time:         {} ms\n",
            self.stats.avg_processing_time_ms
        ));
        output.push('\n');

        if !self.detections_by_category.is_empty() {
            output.push_str("🔍 PII DETECTIONS BY CATEGORY\n");
            output.push_str("───────────────────────────────────────────────────────────────\n");

            let mut categories: Vec<_> = self.detections_by_category.iter().collect();
            categories.sort_by(|a, b| b.1.cmp(a.1));

            for (category, count) in categories {
                output.push_str(&format!("  {:30} {:>5}\n", category.to_string(), count));
            }
            output.push('\n');

            output.push_str("📐 PII DETECTIONS BY RULE\n");
            output.push_str("───────────────────────────────────────────────────────────────\n");
            for (rule_id, count) in &self.detections_by_rule {
                output.push_str(&format!("  {:30} {:>5}\n", rule_id, count));
            }
            output.push('\n');
        }

        if !self.samples.is_empty() {
            output.push_str("📝 SAMPLE DETECTIONS\n");
            output.push_str("───────────────────────────────────────────────────────────────\n");

            for (i, sample) in self.samples.iter().take(10).enumerate() {
                output.push_str(&format!("\n  Sample #{}\n", i + 1));
                output.push_str(&format!("    Source:      {}@{}\n", sample.source, sample.offset));
                output.push_str(&format!("    Rule:        {} ({})\n", sample.rule_id, sample.category));
                output.push_str(&format!(
                    "    Confidence:  {:.2}%\n",
                    sample.confidence * 100.0
                ));
                output.push_str(&format!("    Value:       \"{}\"\n", sample.masked_value));
            }
            output.push('\n');
        }

        if !self.warnings.is_empty() {
            output.push_str("⚠️  WARNINGS\n");
            output.push_str("───────────────────────────────────────────────────────────────\n");
            for warning in &self.warnings {
                output.push_str(&format!("  • {}\n", warning));
            }
            output.push('\n');
        }

        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push('\n');

        output
    }

    /// Format report as JSON
    pub fn format_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Keep the first and last character, mask the rest; credentials entirely
fn mask_value(value: &str, category: PiiCategory) -> String {
    if category == PiiCategory::Credential {
        return CREDENTIAL_MASK.to_string();
    }
    let chars: Vec<char> = value.chars().take(MAX_SAMPLE_CHARS).collect();
    let truncated = value.chars().count() > MAX_SAMPLE_CHARS;

    let mut masked = match chars.len() {
        0 => String::new(),
        1 | 2 => "*".repeat(chars.len()),
        n => {
            let mut s = String::with_capacity(n);
            s.push(chars[0]);
            s.push_str(&"*".repeat(n - 2));
            s.push(chars[n - 1]);
            s
        }
    };
    if truncated {
        masked.push_str("...");
    }
    masked
}
