//! Watchdog instance state machine.
//!
//! The way out of `Running` is decided by one compare-and-exchange, so the
//! monitor's trigger attempt and the caller's stop attempt can race freely:
//! exactly one of them wins.

use std::sync::atomic::{AtomicU8, Ordering};

use crate::error::{WatchdogError, WatchdogResult};

/// Lifecycle status of a watchdog instance.
///
/// An instance exists only once started, so there is no idle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WatchdogStatus {
    /// Monitoring; the deadline is being compared against the clock.
    Running = 0,
    /// The deadline expired and the trigger action has fired (or is firing).
    Triggered = 1,
    /// Stopped by the caller (terminal).
    Stopped = 2,
}

impl WatchdogStatus {
    /// Convert from raw u8 value.
    #[must_use]
    pub fn from_raw(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Running),
            1 => Some(Self::Triggered),
            2 => Some(Self::Stopped),
            _ => None,
        }
    }

    /// Convert to raw u8 value.
    #[must_use]
    pub fn to_raw(self) -> u8 {
        self as u8
    }

    /// Check if no further transition is possible.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Stopped)
    }

    /// Get the status as a string slice.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Running => "Running",
            Self::Triggered => "Triggered",
            Self::Stopped => "Stopped",
        }
    }
}

impl std::fmt::Display for WatchdogStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Atomic status cell.
///
/// ```text
/// Running ──trigger()──► Triggered
///    │                       │
///  stop()                  stop()
///    │                       │
///    └──────► Stopped ◄──────┘
/// ```
#[derive(Debug)]
pub struct WatchdogState {
    status: AtomicU8,
}

impl WatchdogState {
    /// Create a state in the `Running` status.
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: AtomicU8::new(WatchdogStatus::Running.to_raw()),
        }
    }

    /// Get the current status.
    #[must_use]
    pub fn status(&self) -> WatchdogStatus {
        let raw = self.status.load(Ordering::Acquire);
        WatchdogStatus::from_raw(raw).unwrap_or(WatchdogStatus::Stopped)
    }

    /// Check if the instance is still monitoring.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.status() == WatchdogStatus::Running
    }

    /// Attempt `Running -> Triggered`.
    ///
    /// Returns `false` if the caller stopped the instance first; in that case
    /// the trigger must have no side effect.
    pub fn trigger(&self) -> bool {
        self.status
            .compare_exchange(
                WatchdogStatus::Running.to_raw(),
                WatchdogStatus::Triggered.to_raw(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Move to `Stopped` from `Running` or `Triggered`.
    ///
    /// Returns the status the instance left.
    ///
    /// # Errors
    ///
    /// Returns [`WatchdogError::NotRunning`] if the instance was already stopped.
    pub fn stop(&self) -> WatchdogResult<WatchdogStatus> {
        let mut current = self.status.load(Ordering::Acquire);
        loop {
            match WatchdogStatus::from_raw(current) {
                Some(from @ (WatchdogStatus::Running | WatchdogStatus::Triggered)) => {
                    match self.status.compare_exchange(
                        current,
                        WatchdogStatus::Stopped.to_raw(),
                        Ordering::AcqRel,
                        Ordering::Acquire,
                    ) {
                        Ok(_) => return Ok(from),
                        // The monitor moved Running -> Triggered under us; retry from there.
                        Err(observed) => current = observed,
                    }
                }
                Some(WatchdogStatus::Stopped) | None => return Err(WatchdogError::NotRunning),
            }
        }
    }
}

impl Default for WatchdogState {
    fn default() -> Self {
        Self::new()
    }
}
