//! Domain types shared across Scrubber.
//!
//! The domain layer provides the error hierarchy ([`ScrubberError`]) and the
//! [`Result`] alias used by every fallible operation:
//!
//! ```rust
//! use scrubber::domain::{Result, ScrubberError};
//!
//! fn check_salt(salt: &str) -> Result<()> {
//!     if salt.is_empty() {
//!         return Err(ScrubberError::Configuration("hash_salt must not be empty".into()));
//!     }
//!     Ok(())
//! }
//! # assert!(check_salt("").is_err());
//! ```

pub mod errors;
pub mod result;

pub use errors::ScrubberError;
pub use result::Result;
