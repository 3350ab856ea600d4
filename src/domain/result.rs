//! Result type alias for Floodline

use super::errors::FloodlineError;

/// Result type alias for Floodline operations
///
/// # Examples
///
/// ```
/// use floodline::domain::result::Result;
/// use floodline::domain::errors::FloodlineError;
///
/// fn failing_function() -> Result<()> {
///     Err(FloodlineError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, FloodlineError>;
