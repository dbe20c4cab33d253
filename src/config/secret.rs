//! Secure handling of salts using the secrecy crate
//!
//! Salts key every pseudonym the engine derives, so they are held in
//! [`SecretString`]: zeroed on drop, redacted in `Debug` output, and only
//! readable through `expose_secret()`. They deserialize from configuration but
//! never serialize back out; fields holding them are marked
//! `skip_serializing`.
//!
//! # Example
//!
//! ```rust
//! use scrubber::config::secret_string;
//! use secrecy::ExposeSecret;
//!
//! let salt = secret_string("pepper".to_string());
//! assert_eq!(salt.expose_secret().as_str(), "pepper");
//! println!("{:?}", salt); // Secret([REDACTED ...])
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret};
use serde::{Deserialize, Deserializer};
use zeroize::Zeroize;

/// Newtype wrapper for String that implements the required traits for Secret
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl PartialEq<str> for SecretValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl SecretValue {
    /// Borrow the secret as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if the secret value is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretValue)
    }
}

/// Type alias for a secret string
pub type SecretString = Secret<SecretValue>;

/// Helper function to create a SecretString from a String
#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}
