//! Salted hasher
//!
//! HMAC-SHA256 keyed by the session salt. Every pseudonym and hash token is
//! derived from a digest produced here, so outputs are stable for a salt and
//! unlinkable across salts.

use crate::anonymization::rules::ValueShape;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::Zeroizing;

type HmacSha256 = Hmac<Sha256>;

/// Separates the shape tag from the value inside the MAC input
const FIELD_SEPARATOR: u8 = 0x1f;

/// Length of hash tokens in hex characters
pub const HASH_TOKEN_HEX_LEN: usize = 16;

/// Keyed digest source for one salt
#[derive(Clone)]
pub struct SaltedHasher {
    key: Zeroizing<Vec<u8>>,
}

impl SaltedHasher {
    /// Create a hasher keyed by `salt`
    pub fn new(salt: impl AsRef<[u8]>) -> Self {
        Self {
            key: Zeroizing::new(salt.as_ref().to_vec()),
        }
    }

    /// Whether this hasher is keyed by exactly `salt`
    pub fn is_keyed_by(&self, salt: &[u8]) -> bool {
        self.key.as_slice() == salt
    }

    /// Digest of `shape || 0x1f || value`
    pub fn digest(&self, shape: ValueShape, value: &str) -> [u8; 32] {
        let mut mac = self.mac();
        mac.update(shape.to_string().as_bytes());
        mac.update(&[FIELD_SEPARATOR]);
        mac.update(value.as_bytes());

        let mut digest = [0u8; 32];
        digest.copy_from_slice(&mac.finalize().into_bytes());
        digest
    }

    /// Fixed-length `hash_<16 hex>` token for `value`
    pub fn hash_token(&self, value: &str) -> String {
        let mut mac = self.mac();
        mac.update(b"hash");
        mac.update(&[FIELD_SEPARATOR]);
        mac.update(value.as_bytes());
        let digest = mac.finalize().into_bytes();

        let hex: String = digest[..HASH_TOKEN_HEX_LEN / 2]
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect();
        format!("hash_{hex}")
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.key).expect("HMAC can take key of any size")
    }
}

impl std::fmt::Debug for SaltedHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaltedHasher")
            .field("key", &"[REDACTED]")
            .finish()
    }
}
