//! Rule registry

use super::{builtin, Rule};
use crate::domain::{Result, ScrubberError};
use std::sync::Arc;

#[derive(Debug, Clone)]
struct RegistryEntry {
    rule: Arc<Rule>,
    enabled: bool,
}

/// Ordered collection of rules with per-rule enable/disable
///
/// Ids are unique. Registering a rule whose id already exists **replaces**
/// the previous definition in place (last write wins) and keeps its
/// enabled/disabled state, so rule sets can be reconfigured at runtime.
/// Disabling a rule stops it from matching but keeps it in the registry.
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    entries: Vec<RegistryEntry>,
}

impl RuleRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in rule catalogue
    pub fn with_builtin_rules() -> Result<Self> {
        let mut registry = Self::new();
        for rule in builtin::builtin_rules()? {
            registry.register(rule);
        }
        Ok(registry)
    }

    /// Register a rule, replacing any existing rule with the same id
    ///
    /// Returns the replaced rule, if any.
    pub fn register(&mut self, rule: Rule) -> Option<Arc<Rule>> {
        let rule = Arc::new(rule);
        match self.entries.iter_mut().find(|e| e.rule.id() == rule.id()) {
            Some(entry) => {
                tracing::debug!(rule_id = %rule.id(), "Replacing existing rule definition");
                Some(std::mem::replace(&mut entry.rule, rule))
            }
            None => {
                tracing::debug!(
                    rule_id = %rule.id(),
                    priority = rule.priority(),
                    strategy = %rule.strategy(),
                    "Registered rule"
                );
                self.entries.push(RegistryEntry {
                    rule,
                    enabled: true,
                });
                None
            }
        }
    }

    /// Stop a rule from matching
    pub fn disable(&mut self, id: &str) -> Result<()> {
        self.set_enabled(id, false)
    }

    /// Let a previously disabled rule match again
    pub fn enable(&mut self, id: &str) -> Result<()> {
        self.set_enabled(id, true)
    }

    fn set_enabled(&mut self, id: &str, enabled: bool) -> Result<()> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.rule.id() == id)
            .ok_or_else(|| ScrubberError::Configuration(format!("Unknown rule id: {id}")))?;
        entry.enabled = enabled;
        Ok(())
    }

    /// Whether a rule with this id is registered
    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.rule.id() == id)
    }

    /// Look up a rule by id
    pub fn get(&self, id: &str) -> Option<Arc<Rule>> {
        self.entries
            .iter()
            .find(|e| e.rule.id() == id)
            .map(|e| Arc::clone(&e.rule))
    }

    /// Every registered rule with its enabled flag, in registration order
    pub fn rules(&self) -> Vec<(Arc<Rule>, bool)> {
        self.entries
            .iter()
            .map(|e| (Arc::clone(&e.rule), e.enabled))
            .collect()
    }

    /// Enabled rules ordered by priority (highest first), ties by id
    pub fn active_rules(&self) -> Vec<Arc<Rule>> {
        let mut active: Vec<Arc<Rule>> = self
            .entries
            .iter()
            .filter(|e| e.enabled)
            .map(|e| Arc::clone(&e.rule))
            .collect();
        active.sort_by(|a, b| {
            b.priority()
                .cmp(&a.priority())
                .then_with(|| a.id().cmp(b.id()))
        });
        active
    }

    /// Number of registered rules
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
