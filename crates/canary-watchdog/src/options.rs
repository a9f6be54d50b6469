//! Watchdog options.
//!
//! Options are validated when an instance starts and copied into it, so a
//! running instance never observes later changes.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{WatchdogError, WatchdogResult};

/// Default stall timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Default renewal cadence.
pub const DEFAULT_PING_INTERVAL: Duration = Duration::from_millis(1_000);

/// Process exit status used when a trigger terminates the process.
pub const DEFAULT_EXIT_CODE: i32 = 87;

/// Options for a single watchdog instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchdogOptions {
    /// Maximum time allowed between two pings (or start and the first ping).
    pub timeout: Duration,
    /// Intended renewal cadence of the supervised context.
    ///
    /// Advisory only: the engine never pings on its own. It should be
    /// smaller than `timeout`.
    pub ping_interval: Duration,
    /// End the process when the watchdog triggers.
    pub terminate_on_trigger: bool,
    /// Write a diagnostic to stderr when the watchdog triggers.
    pub print_on_trigger: bool,
    /// Exit status used when `terminate_on_trigger` ends the process.
    pub exit_code: i32,
}

impl Default for WatchdogOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            ping_interval: DEFAULT_PING_INTERVAL,
            terminate_on_trigger: true,
            print_on_trigger: true,
            exit_code: DEFAULT_EXIT_CODE,
        }
    }
}

impl WatchdogOptions {
    /// Validate the options.
    ///
    /// # Errors
    ///
    /// Returns [`WatchdogError::InvalidOptions`] if `timeout` or
    /// `ping_interval` is zero.
    pub fn validate(&self) -> WatchdogResult<()> {
        if self.timeout.is_zero() {
            return Err(WatchdogError::invalid_options(
                "timeout must be greater than 0",
            ));
        }
        if self.ping_interval.is_zero() {
            return Err(WatchdogError::invalid_options(
                "ping_interval must be greater than 0",
            ));
        }
        Ok(())
    }

    /// Whether the renewal cadence leaves room to ping before the deadline.
    #[must_use]
    pub fn ping_fits_timeout(&self) -> bool {
        self.ping_interval < self.timeout
    }

    /// Create an options builder.
    #[must_use]
    pub fn builder() -> WatchdogOptionsBuilder {
        WatchdogOptionsBuilder::default()
    }
}

/// Builder for `WatchdogOptions`.
#[derive(Debug, Default)]
pub struct WatchdogOptionsBuilder {
    options: WatchdogOptions,
}

impl WatchdogOptionsBuilder {
    /// Set the stall timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = timeout;
        self
    }

    /// Set the stall timeout in milliseconds.
    #[must_use]
    pub fn timeout_ms(self, ms: u64) -> Self {
        self.timeout(Duration::from_millis(ms))
    }

    /// Set the renewal cadence.
    #[must_use]
    pub fn ping_interval(mut self, interval: Duration) -> Self {
        self.options.ping_interval = interval;
        self
    }

    /// Set the renewal cadence in milliseconds.
    #[must_use]
    pub fn ping_interval_ms(self, ms: u64) -> Self {
        self.ping_interval(Duration::from_millis(ms))
    }

    /// End the process on trigger.
    #[must_use]
    pub fn terminate_on_trigger(mut self, terminate: bool) -> Self {
        self.options.terminate_on_trigger = terminate;
        self
    }

    /// Print a diagnostic on trigger.
    #[must_use]
    pub fn print_on_trigger(mut self, print: bool) -> Self {
        self.options.print_on_trigger = print;
        self
    }

    /// Set the exit status used on termination.
    #[must_use]
    pub fn exit_code(mut self, code: i32) -> Self {
        self.options.exit_code = code;
        self
    }

    /// Build the options.
    ///
    /// # Errors
    ///
    /// Returns an error if the options are invalid.
    pub fn build(self) -> WatchdogResult<WatchdogOptions> {
        self.options.validate()?;
        Ok(self.options)
    }
}
