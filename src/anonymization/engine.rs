//! Main anonymization engine
//!
//! This module provides the [`AnonymizationEngine`] facade that ties the rule
//! registry, detector, replacer, pseudonym manager and statistics together.
//!
//! # Architecture
//!
//! - **Detector**: runs every active rule and resolves overlapping matches
//! - **Replacer**: rewrites matches according to each rule's strategy
//! - **PseudonymManager**: hands out session-consistent pseudonyms
//! - **StatsCollector**: aggregates counters over repeated calls
//!
//! Engines own all of their state. [`AnonymizationEngine::global`] is one
//! process-wide instance; [`create_anonymization_engine`] returns a fresh,
//! isolated one.
//!
//! # Examples
//!
//! ```no_run
//! use scrubber::anonymization::{create_anonymization_engine, AnonymizeOptions};
//!
//! # async fn example() -> scrubber::domain::Result<()> {
//! let engine = create_anonymization_engine()?;
//!
//! let result = engine
//!     .anonymize("Contact admin@example.com for help", &AnonymizeOptions::default())
//!     .await?;
//! println!("{}", result.data);
//! # Ok(())
//! # }
//! ```

use crate::anonymization::{
    anonymizer::Replacer,
    config::{AnonymizeOptions, EngineConfig},
    detector::{Deadline, Detector},
    models::{AnonymizationMetadata, AnonymizationResult, DetectionResult},
    pseudonym::{PseudonymManager, PseudonymMapping},
    rules::{Rule, RuleRegistry},
    stats::{EngineStats, StatsCollector},
};
use crate::domain::{Result, ScrubberError};
use secrecy::ExposeSecret;
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};
use std::time::{Duration, Instant};

static GLOBAL_ENGINE: OnceLock<AnonymizationEngine> = OnceLock::new();

/// Create a new, isolated engine with the built-in rules and a random salt
pub fn create_anonymization_engine() -> Result<AnonymizationEngine> {
    AnonymizationEngine::new()
}

struct EngineInner {
    registry: RwLock<RuleRegistry>,
    detector: Detector,
    pseudonyms: PseudonymManager,
    stats: StatsCollector,
}

/// Outcome of the blocking part of a call, before stats are recorded
struct CallOutcome {
    data: String,
    rules_applied: Vec<String>,
    pseudonyms_used: usize,
    rules_usage: BTreeMap<String, u64>,
    rule_failures: usize,
    match_count: usize,
    detection: Option<DetectionResult>,
}

/// PII detection and anonymization facade
///
/// Cloning is cheap and clones share state: the same pseudonym table and
/// statistics.
///
/// # Thread Safety
///
/// All methods take `&self`. The pseudonym cache and statistics sit behind
/// mutexes, the rule registry behind a read-write lock, so concurrent calls
/// on one engine are safe and see one consistent pseudonym per value.
///
/// # Examples
///
/// ```no_run
/// use scrubber::anonymization::{AnonymizationEngine, AnonymizeOptions};
///
/// # async fn example() -> scrubber::domain::Result<()> {
/// let engine = AnonymizationEngine::new()?;
/// let first = engine.anonymize("ip 10.1.2.3", &AnonymizeOptions::default()).await?;
/// let second = engine.anonymize("again 10.1.2.3", &AnonymizeOptions::default()).await?;
/// assert_eq!(first.data[3..], second.data[6..]);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AnonymizationEngine {
    inner: Arc<EngineInner>,
}

impl AnonymizationEngine {
    /// Create an engine with the built-in rules and a random session salt
    ///
    /// # Errors
    ///
    /// Returns an error if the built-in rule catalogue fails to build.
    pub fn new() -> Result<Self> {
        Ok(Self::assemble(
            RuleRegistry::with_builtin_rules()?,
            Detector::new(),
            PseudonymManager::with_random_salt(),
        ))
    }

    /// Create an engine from configuration
    ///
    /// # Errors
    ///
    /// Returns [`ScrubberError::Configuration`] if the configuration is
    /// invalid or disables an unknown rule.
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        config.validate()?;

        let registry = config.build_registry()?;
        let pseudonyms = match config.hash_salt {
            Some(ref salt) => PseudonymManager::new(salt.expose_secret().as_str()),
            None => PseudonymManager::with_random_salt(),
        };
        let detector = Detector::new().with_max_matches_per_rule(config.max_matches_per_rule);

        tracing::debug!(
            rules = registry.len(),
            custom_rules = config.custom_rules.len(),
            disabled_rules = config.disabled_rules.len(),
            explicit_salt = config.hash_salt.is_some(),
            "Engine configured"
        );

        Ok(Self::assemble(registry, detector, pseudonyms))
    }

    /// The process-wide engine, created on first use
    ///
    /// # Errors
    ///
    /// Returns an error if the first construction fails; a later call will
    /// try again.
    pub fn global() -> Result<&'static AnonymizationEngine> {
        if let Some(engine) = GLOBAL_ENGINE.get() {
            return Ok(engine);
        }
        let engine = Self::new()?;
        Ok(GLOBAL_ENGINE.get_or_init(|| engine))
    }

    fn assemble(registry: RuleRegistry, detector: Detector, pseudonyms: PseudonymManager) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                registry: RwLock::new(registry),
                detector,
                pseudonyms,
                stats: StatsCollector::new(),
            }),
        }
    }

    /// Detect PII in `text` with every enabled rule
    ///
    /// Only the `detect_calls` and `rule_failures` counters are updated.
    ///
    /// # Errors
    ///
    /// Returns [`ScrubberError::NoActiveRules`] if every rule is disabled.
    pub fn detect_pii(&self, text: &str) -> Result<DetectionResult> {
        let rules = self.with_registry(RuleRegistry::active_rules);
        if rules.is_empty() {
            return Err(ScrubberError::NoActiveRules);
        }

        let outcome = self.inner.detector.detect(text, &rules, None)?;
        self.inner.stats.record_detection(outcome.failures.len());
        Ok(outcome.result)
    }

    /// Anonymize `text`
    ///
    /// Detection and replacement run on the blocking thread pool under
    /// `options.max_processing_time_ms`. Every call, successful or not, is
    /// recorded in the statistics exactly once.
    ///
    /// # Errors
    ///
    /// - [`ScrubberError::Configuration`] for invalid options
    /// - [`ScrubberError::NoActiveRules`] if filtering leaves no rule
    /// - [`ScrubberError::ProcessingTimeout`] if the budget is exceeded; no
    ///   partial output is returned
    pub async fn anonymize(
        &self,
        text: &str,
        options: &AnonymizeOptions,
    ) -> Result<AnonymizationResult> {
        let started = Instant::now();
        let outcome = self.run_call(text, options).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(call) => {
                self.inner.stats.record_success(
                    elapsed_ms,
                    call.pseudonyms_used,
                    &call.rules_usage,
                    call.rule_failures,
                );
                crate::log_anonymization_complete!(
                    call.match_count,
                    call.pseudonyms_used,
                    elapsed_ms
                );

                let is_anonymized = call.data != text;
                Ok(AnonymizationResult {
                    data: call.data,
                    metadata: AnonymizationMetadata {
                        rules_applied: call.rules_applied,
                        pseudonyms_used: call.pseudonyms_used,
                        processing_time_ms: elapsed_ms,
                        is_anonymized,
                        preserved_structure: options.preserve_structure,
                    },
                    detection: call.detection,
                })
            }
            Err(e) => {
                self.inner.stats.record_failure(elapsed_ms);
                crate::log_error_with_context!(&e, "Anonymization call failed");
                Err(e)
            }
        }
    }

    async fn run_call(&self, text: &str, options: &AnonymizeOptions) -> Result<CallOutcome> {
        let rules = self.rules_for_call(options)?;

        // A per-call salt different from the session salt gets its own
        // short-lived manager so it never mixes with session mappings.
        let call_pseudonyms = match options.hash_salt {
            Some(ref salt) => {
                let salt = salt.expose_secret().as_str();
                (!self.inner.pseudonyms.uses_salt(salt.as_bytes()))
                    .then(|| Arc::new(PseudonymManager::new(salt)))
            }
            None => None,
        };

        let limit = Duration::from_millis(options.max_processing_time_ms);
        let deadline = Deadline::after(limit);
        let engine = self.clone();
        let text = text.to_owned();
        let options = options.clone();

        let task = tokio::task::spawn_blocking(move || {
            let pseudonyms = call_pseudonyms
                .as_deref()
                .unwrap_or(&engine.inner.pseudonyms);
            engine.process(&text, &rules, &options, pseudonyms, &deadline)
        });

        match tokio::time::timeout(limit, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(ScrubberError::Other(format!(
                "Anonymization task failed: {join_error}"
            ))),
            Err(_) => Err(ScrubberError::ProcessingTimeout {
                elapsed_ms: deadline.elapsed().as_millis() as u64,
                limit_ms: limit.as_millis() as u64,
            }),
        }
    }

    fn process(
        &self,
        text: &str,
        rules: &[Arc<Rule>],
        options: &AnonymizeOptions,
        pseudonyms: &PseudonymManager,
        deadline: &Deadline,
    ) -> Result<CallOutcome> {
        let detected = self.inner.detector.detect(text, rules, Some(deadline))?;
        let rule_failures = detected.failures.len();
        let match_count = detected.result.total_matches();

        if options.detect_only {
            return Ok(CallOutcome {
                data: text.to_string(),
                rules_applied: Vec::new(),
                pseudonyms_used: 0,
                rules_usage: BTreeMap::new(),
                rule_failures,
                match_count,
                detection: Some(detected.result),
            });
        }

        deadline.check()?;
        let replacer = Replacer::new(
            pseudonyms,
            options.enable_pseudonyms,
            options.preserve_structure,
        );
        let replaced = replacer.apply(text, &detected.result.locations, rules);

        Ok(CallOutcome {
            data: replaced.data,
            rules_applied: replaced.rules_applied,
            pseudonyms_used: replaced.pseudonyms_used,
            rules_usage: replaced.rules_usage,
            rule_failures,
            match_count,
            detection: None,
        })
    }

    /// Validate options and pick the rules they allow
    fn rules_for_call(&self, options: &AnonymizeOptions) -> Result<Vec<Arc<Rule>>> {
        let registry = self
            .inner
            .registry
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        options.validate(&registry)?;

        let rules: Vec<Arc<Rule>> = registry
            .active_rules()
            .into_iter()
            .filter(|rule| {
                options
                    .enabled_rules
                    .as_ref()
                    .map_or(true, |ids| ids.contains(rule.id()))
            })
            .collect();

        if rules.is_empty() {
            return Err(ScrubberError::NoActiveRules);
        }
        Ok(rules)
    }

    fn with_registry<R>(&self, f: impl FnOnce(&RuleRegistry) -> R) -> R {
        let registry = self
            .inner
            .registry
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        f(&registry)
    }

    fn with_registry_mut<R>(&self, f: impl FnOnce(&mut RuleRegistry) -> R) -> R {
        let mut registry = self
            .inner
            .registry
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut registry)
    }

    /// Register a rule, replacing any rule with the same id
    pub fn register_rule(&self, rule: Rule) -> Option<Arc<Rule>> {
        self.with_registry_mut(|registry| registry.register(rule))
    }

    /// Stop a rule from matching
    pub fn disable_rule(&self, id: &str) -> Result<()> {
        self.with_registry_mut(|registry| registry.disable(id))
    }

    /// Let a disabled rule match again
    pub fn enable_rule(&self, id: &str) -> Result<()> {
        self.with_registry_mut(|registry| registry.enable(id))
    }

    /// Every registered rule with its enabled flag
    pub fn rules(&self) -> Vec<(Arc<Rule>, bool)> {
        self.with_registry(RuleRegistry::rules)
    }

    /// Snapshot of the statistics
    pub fn stats(&self) -> EngineStats {
        self.inner.stats.snapshot()
    }

    /// Snapshot of the session pseudonym table
    pub fn list_mappings(&self) -> Vec<PseudonymMapping> {
        self.inner.pseudonyms.all_mappings()
    }

    /// Forget every pseudonym and start a new session; statistics are kept
    pub fn clear_mappings(&self) {
        self.inner.pseudonyms.clear();
        tracing::debug!("Pseudonym mappings cleared");
    }

    /// Zero the statistics; pseudonyms are kept
    pub fn reset_stats(&self) {
        self.inner.stats.reset();
    }
}

impl std::fmt::Debug for AnonymizationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnonymizationEngine")
            .field("rules", &self.with_registry(RuleRegistry::len))
            .field("mappings", &self.inner.pseudonyms.len())
            .finish()
    }
}
