//! # Remote Error Classification
//!
//! External calls fail with a symbolic error code; classification over that
//! code decides whether the call is retried. The retryable set lives in
//! [`crate::constants::retryable_codes`] and is a closed contract: any code
//! outside it is terminal.

use crate::constants::{is_retryable_code, ALREADY_EXISTS_CODES, ALREADY_GONE_CODES};
use serde::{Deserialize, Serialize};

/// Error reported by an external control-plane call.
///
/// `retryable` carries the SDK-level transient hint and is honored in
/// addition to the symbolic code set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{code}: {message}")]
pub struct RemoteError {
    /// Symbolic error code from the external service
    pub code: String,

    /// Human-readable message
    pub message: String,

    /// Transport-level hint that the error is transient
    #[serde(default)]
    pub retryable: bool,
}

impl RemoteError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            retryable: false,
        }
    }

    /// Mark this error as transient regardless of its code
    pub fn with_retryable_hint(mut self) -> Self {
        self.retryable = true;
        self
    }

    /// Check whether this error should be retried
    pub fn is_transient(&self) -> bool {
        self.retryable || is_retryable_code(&self.code)
    }

    /// Check whether this error means the resource no longer exists
    pub fn is_already_gone(&self) -> bool {
        ALREADY_GONE_CODES.contains(&self.code.as_str())
    }

    /// Check whether this error means the resource already exists
    pub fn is_already_exists(&self) -> bool {
        ALREADY_EXISTS_CODES.contains(&self.code.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_classification() {
        assert!(RemoteError::new("ThrottlingException", "rate exceeded").is_transient());
        assert!(RemoteError::new("ConcurrentUpdateException", "busy").is_transient());
        assert!(!RemoteError::new("AccessDeniedException", "denied").is_transient());
    }

    #[test]
    fn test_retryable_hint_overrides_code() {
        let error = RemoteError::new("SocketTimeout", "timed out").with_retryable_hint();
        assert!(error.is_transient());
    }

    #[test]
    fn test_lifecycle_code_helpers() {
        assert!(RemoteError::new("ResourceNotFoundException", "gone").is_already_gone());
        assert!(RemoteError::new("AlreadyExistsException", "exists").is_already_exists());
        assert!(!RemoteError::new("ThrottlingException", "rate").is_already_gone());
    }
}
