//! Redaction marker for conversation text
//!
//! Message bodies are user data. Anything that may reach a log line is wrapped
//! in `Sensitive<T>` so that `Debug` and `Display` never print it.

use std::fmt;

/// Wrapper that redacts its value in Debug and Display
///
/// # Example
///
/// ```
/// use chatlog_core_types::Sensitive;
///
/// let body = Sensitive::new("my bank pin is 1234");
/// assert_eq!(format!("{:?}", body), "***REDACTED***");
/// assert_eq!(format!("{}", body), "***REDACTED***");
///
/// assert_eq!(body.expose(), &"my bank pin is 1234");
/// ```
pub struct Sensitive<T>(T);

impl<T> Sensitive<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Borrow the wrapped value
    pub fn expose(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl Sensitive<&str> {
    /// Length in bytes, safe to log
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T> fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***REDACTED***")
    }
}

impl<T> fmt::Display for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***REDACTED***")
    }
}

impl<T: Clone> Clone for Sensitive<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}
