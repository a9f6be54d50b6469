//! Error types for the watchdog engine.
//!
//! Every variant is local and synchronous: the caller learns about it from the
//! call it made and can retry with different arguments. A trigger that ends the
//! process is the intended outcome of the watchdog and is never reported here.

use thiserror::Error;

/// Errors that can occur during watchdog operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WatchdogError {
    /// Options were rejected at start; no instance was created.
    #[error("Invalid watchdog options: {0}")]
    InvalidOptions(String),

    /// The single-instance slot is occupied; the running instance is untouched.
    #[error("Watchdog already running")]
    AlreadyRunning,

    /// The handle is unknown to this registry or its instance is no longer running.
    #[error("Watchdog is not running")]
    NotRunning,

    /// The operating system refused to create the monitor thread.
    #[error("Failed to launch watchdog thread: {0}")]
    SpawnFailed(String),
}

impl WatchdogError {
    /// Create an invalid options error.
    #[must_use]
    pub fn invalid_options(reason: impl Into<String>) -> Self {
        Self::InvalidOptions(reason.into())
    }

    /// Create a spawn failure error.
    #[must_use]
    pub fn spawn_failed(reason: impl Into<String>) -> Self {
        Self::SpawnFailed(reason.into())
    }
}

/// A specialized `Result` type for watchdog operations.
pub type WatchdogResult<T> = std::result::Result<T, WatchdogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            WatchdogError::AlreadyRunning.to_string(),
            "Watchdog already running"
        );
        assert_eq!(
            WatchdogError::NotRunning.to_string(),
            "Watchdog is not running"
        );

        let err = WatchdogError::invalid_options("timeout must be greater than 0");
        assert!(err.to_string().contains("timeout must be greater than 0"));
    }

    #[test]
    fn test_error_constructors() {
        let err = WatchdogError::invalid_options("ping_interval must be greater than 0");
        assert!(matches!(err, WatchdogError::InvalidOptions(_)));

        let err = WatchdogError::spawn_failed("Resource temporarily unavailable");
        assert!(matches!(err, WatchdogError::SpawnFailed(_)));
    }
}
