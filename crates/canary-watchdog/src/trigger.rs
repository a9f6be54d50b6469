//! What happens when a stall is detected.
//!
//! The action runs once per instance, on the monitor thread, with no lock
//! held. Production code uses [`ProcessTrigger`]; tests swap in a recording
//! action so the trigger path can run without ending the test process.

use std::time::Duration;

use crate::instance::HandleId;
use crate::options::WatchdogOptions;

/// Description of a detected stall.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StallEvent {
    /// Instance that fired.
    pub handle: HandleId,
    /// Time since the last ping (or start) when the stall was declared.
    pub stalled_for: Duration,
    /// Options the instance was started with.
    pub options: WatchdogOptions,
}

impl StallEvent {
    /// Whether the action is expected to end the process.
    #[must_use]
    pub fn terminate(&self) -> bool {
        self.options.terminate_on_trigger
    }
}

impl std::fmt::Display for StallEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let timeout_ms = self.options.timeout.as_millis();
        let stalled_ms = self.stalled_for.as_millis();
        if self.terminate() {
            write!(
                f,
                "FATAL: canary - watchdog timeout detected (no ping after {timeout_ms}ms, stalled for {stalled_ms}ms), exiting application."
            )
        } else {
            write!(
                f,
                "canary - watchdog timeout detected (no ping after {timeout_ms}ms, stalled for {stalled_ms}ms)"
            )
        }
    }
}

/// Side effect performed when a watchdog fires.
pub trait TriggerAction: Send + Sync {
    /// Handle a detected stall. Called at most once per instance.
    fn fire(&self, event: &StallEvent);
}

impl<F> TriggerAction for F
where
    F: Fn(&StallEvent) + Send + Sync,
{
    fn fire(&self, event: &StallEvent) {
        self(event);
    }
}

/// Default action: print the diagnostic, then end the process.
///
/// Termination calls `_exit(2)` on Unix and skips every atexit handler and
/// destructor, including those of a context stuck in its own shutdown.
/// Other targets fall back to `std::process::exit`. The diagnostic is
/// written to stderr before the termination attempt.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessTrigger;

impl TriggerAction for ProcessTrigger {
    fn fire(&self, event: &StallEvent) {
        if event.options.print_on_trigger {
            eprintln!("{event}");
        }

        if event.terminate() {
            tracing::error!(
                handle = %event.handle,
                timeout_ms = event.options.timeout.as_millis(),
                stalled_ms = event.stalled_for.as_millis(),
                exit_code = event.options.exit_code,
                "Watchdog fired, terminating process"
            );
            terminate(event.options.exit_code);
        }

        tracing::warn!(
            handle = %event.handle,
            timeout_ms = event.options.timeout.as_millis(),
            stalled_ms = event.stalled_for.as_millis(),
            "Watchdog fired, process left running"
        );
    }
}

#[cfg(unix)]
fn terminate(code: i32) -> ! {
    nix::unistd::_exit(code)
}

#[cfg(not(unix))]
#[expect(
    clippy::exit,
    reason = "no raw _exit available on this target"
)]
fn terminate(code: i32) -> ! {
    std::process::exit(code)
}
