//! Error types for the convenience API.

use canary_watchdog::WatchdogError;
use thiserror::Error;

/// Errors returned by [`Canary`](crate::Canary) and the global functions.
#[derive(Debug, Error)]
pub enum CanaryError {
    /// The underlying watchdog rejected the operation.
    #[error(transparent)]
    Watchdog(#[from] WatchdogError),

    /// `start` was called outside a tokio runtime, so nothing can drive the heartbeat.
    #[error("No tokio runtime available to drive the heartbeat: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}

impl CanaryError {
    /// Check if this is [`WatchdogError::AlreadyRunning`].
    #[must_use]
    pub fn is_already_running(&self) -> bool {
        matches!(self, Self::Watchdog(WatchdogError::AlreadyRunning))
    }

    /// Check if this is [`WatchdogError::NotRunning`].
    #[must_use]
    pub fn is_not_running(&self) -> bool {
        matches!(self, Self::Watchdog(WatchdogError::NotRunning))
    }
}

/// A specialized `Result` type for the convenience API.
pub type CanaryResult<T> = std::result::Result<T, CanaryError>;
