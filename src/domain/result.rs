//! Result type alias for Scrubber

use super::errors::ScrubberError;

/// Result type alias for Scrubber operations
///
/// # Examples
///
/// ```
/// use scrubber::domain::result::Result;
/// use scrubber::domain::errors::ScrubberError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(ScrubberError::Configuration("bad salt".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, ScrubberError>;
