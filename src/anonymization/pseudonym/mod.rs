//! Session pseudonyms
//!
//! A [`PseudonymManager`] hands out stable substitutes for sensitive values.
//! Within one manager the same `(shape, value)` pair always maps to the same
//! pseudonym; the mapping is derived with a keyed one-way function, so it
//! cannot be inverted without the salt and is never stored anywhere but
//! memory.

pub mod hasher;
pub mod synth;

use crate::anonymization::rules::ValueShape;
use hasher::SaltedHasher;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Length of the per-instance random salt in bytes
pub const DEFAULT_SALT_LEN: usize = 32;

/// One entry of the session mapping table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PseudonymMapping {
    #[serde(rename = "type")]
    pub value_type: ValueShape,
    pub original_value: String,
    pub pseudonym: String,
}

struct SessionState {
    hasher: SaltedHasher,
    mappings: HashMap<(ValueShape, String), String>,
}

/// Session-scoped pseudonym cache
///
/// Salt and mapping table live under one lock, so a lookup that misses and
/// inserts is a single critical section and never races a concurrent
/// [`clear`](Self::clear).
pub struct PseudonymManager {
    state: Mutex<SessionState>,
}

impl PseudonymManager {
    /// Create a manager keyed by `salt`
    pub fn new(salt: impl AsRef<[u8]>) -> Self {
        Self {
            state: Mutex::new(SessionState {
                hasher: SaltedHasher::new(salt),
                mappings: HashMap::new(),
            }),
        }
    }

    /// Create a manager keyed by fresh random bytes
    pub fn with_random_salt() -> Self {
        Self {
            state: Mutex::new(SessionState {
                hasher: random_hasher(),
                mappings: HashMap::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether this manager currently derives pseudonyms from `salt`
    pub fn uses_salt(&self, salt: &[u8]) -> bool {
        self.lock().hasher.is_keyed_by(salt)
    }

    /// Pseudonym for `value` in `shape`, creating it on first use
    pub fn pseudonym_for(&self, shape: ValueShape, value: &str) -> String {
        let mut state = self.lock();
        let SessionState { hasher, mappings } = &mut *state;
        mappings
            .entry((shape, value.to_string()))
            .or_insert_with(|| synth::synthesize(shape, &hasher.digest(shape, value), value))
            .clone()
    }

    /// Salted `hash_<hex>` token; not recorded in the mapping table
    pub fn hash_token(&self, value: &str) -> String {
        self.lock().hasher.hash_token(value)
    }

    /// Snapshot of every mapping, ordered by type then original value
    pub fn all_mappings(&self) -> Vec<PseudonymMapping> {
        let state = self.lock();
        let mut all: Vec<PseudonymMapping> = state
            .mappings
            .iter()
            .map(|((shape, original), pseudonym)| PseudonymMapping {
                value_type: *shape,
                original_value: original.clone(),
                pseudonym: pseudonym.clone(),
            })
            .collect();
        all.sort_by(|a, b| {
            a.value_type
                .cmp(&b.value_type)
                .then_with(|| a.original_value.cmp(&b.original_value))
        });
        all
    }

    /// Number of cached mappings
    pub fn len(&self) -> usize {
        self.lock().mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget every mapping and start a new session
    ///
    /// The salt is replaced with fresh random bytes, so values seen again
    /// receive pseudonyms unrelated to the ones handed out before.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.mappings.clear();
        state.hasher = random_hasher();
    }
}

impl std::fmt::Debug for PseudonymManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PseudonymManager")
            .field("mappings", &self.len())
            .finish()
    }
}

fn random_hasher() -> SaltedHasher {
    let mut salt = zeroize::Zeroizing::new([0u8; DEFAULT_SALT_LEN]);
    rand::thread_rng().fill_bytes(&mut salt[..]);
    SaltedHasher::new(&salt[..])
}

impl Default for PseudonymManager {
    fn default() -> Self {
        Self::with_random_salt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_same_value_same_pseudonym() {
        let manager = PseudonymManager::new("salt");
        let a = manager.pseudonym_for(ValueShape::Email, "admin@example.com");
        let b = manager.pseudonym_for(ValueShape::Email, "admin@example.com");
        assert_eq!(a, b);
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_shape_partitions_mappings() {
        let manager = PseudonymManager::new("salt");
        manager.pseudonym_for(ValueShape::Hostname, "pve1");
        manager.pseudonym_for(ValueShape::Opaque, "pve1");
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn test_random_salts_diverge() {
        let a = PseudonymManager::with_random_salt();
        let b = PseudonymManager::with_random_salt();
        assert_ne!(
            a.pseudonym_for(ValueShape::Opaque, "value"),
            b.pseudonym_for(ValueShape::Opaque, "value")
        );
    }

    #[test]
    fn test_same_salt_is_reproducible() {
        let a = PseudonymManager::new("shared");
        let b = PseudonymManager::new("shared");
        assert_eq!(
            a.pseudonym_for(ValueShape::Ipv4, "192.168.1.1"),
            b.pseudonym_for(ValueShape::Ipv4, "192.168.1.1")
        );
        assert!(a.uses_salt(b"shared"));
        assert!(!a.uses_salt(b"other"));
    }

    #[test]
    fn test_hash_tokens_are_not_mapped() {
        let manager = PseudonymManager::new("salt");
        manager.hash_token("52:54:00:12:34:56");
        assert!(manager.is_empty());
    }

    #[test]
    fn test_clear_and_list() {
        let manager = PseudonymManager::new("salt");
        manager.pseudonym_for(ValueShape::Username, "bob");
        manager.pseudonym_for(ValueShape::Email, "bob@example.com");

        let listed = manager.all_mappings();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].value_type, ValueShape::Email);

        manager.clear();
        assert!(manager.all_mappings().is_empty());
    }

    #[test]
    fn test_clear_starts_new_session() {
        let manager = PseudonymManager::new("salt");
        let before = manager.pseudonym_for(ValueShape::Email, "admin@example.com");
        manager.clear();
        let after = manager.pseudonym_for(ValueShape::Email, "admin@example.com");
        assert_ne!(before, after);
        assert!(!manager.uses_salt(b"salt"));
    }

    #[test]
    fn test_concurrent_first_use_agrees() {
        let manager = Arc::new(PseudonymManager::new("salt"));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let manager = Arc::clone(&manager);
                std::thread::spawn(move || manager.pseudonym_for(ValueShape::Email, "x@y.org"))
            })
            .collect();
        let results: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(results.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_mapping_serializes_type_field() {
        let mapping = PseudonymMapping {
            value_type: ValueShape::Ipv4,
            original_value: "10.1.1.1".to_string(),
            pseudonym: "10.2.2.2".to_string(),
        };
        let json = serde_json::to_value(&mapping).unwrap();
        assert_eq!(json["type"], "ipv4");
    }
}
