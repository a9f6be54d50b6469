//! Process-wide canary.
//!
//! A thin adapter over one lazily created [`Canary`]. It is never dropped: if
//! the process exits without `stop`, the watchdog is simply abandoned.

use canary_watchdog::WatchdogOptions;
use std::sync::OnceLock;

use crate::canary::Canary;
use crate::error::CanaryResult;

static GLOBAL: OnceLock<Canary> = OnceLock::new();

fn global() -> &'static Canary {
    GLOBAL.get_or_init(Canary::new)
}

/// Start the process-wide watchdog on the current tokio runtime.
///
/// # Errors
///
/// See [`Canary::start`].
pub fn start(options: WatchdogOptions) -> CanaryResult<()> {
    global().start(options)
}

/// Stop the process-wide watchdog. Returns whether it had triggered.
///
/// # Errors
///
/// See [`Canary::stop`].
pub fn stop() -> CanaryResult<bool> {
    global().stop()
}

/// Whether the process-wide watchdog is running.
#[must_use]
pub fn is_running() -> bool {
    GLOBAL.get().is_some_and(Canary::is_running)
}
