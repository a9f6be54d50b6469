//! Periodic pinger driven by the supervised tokio runtime.
//!
//! The heartbeat is an ordinary task on the runtime it supervises. While the
//! runtime keeps polling tasks, the watchdog is renewed every `ping_interval`;
//! once a blocking call or busy loop starves the runtime, the pings stop and
//! the watchdog fires.
//!
//! On a multi-threaded runtime, other workers may keep polling the heartbeat
//! while one worker is blocked. Supervise a `current_thread` runtime to catch
//! every stall.

use canary_watchdog::WatchdogHandle;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

/// Background task pinging a watchdog at its configured interval.
#[derive(Debug)]
pub struct Heartbeat {
    task: JoinHandle<()>,
}

impl Heartbeat {
    /// Spawn the heartbeat for `watchdog` on `runtime`.
    ///
    /// The task ends by itself once the watchdog stops running.
    #[must_use]
    pub fn spawn(runtime: &Handle, watchdog: WatchdogHandle) -> Self {
        let period = watchdog.options().ping_interval;
        let task = runtime.spawn(async move {
            let mut ticker = time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if watchdog.ping().is_err() {
                    tracing::debug!(
                        handle = %watchdog.id(),
                        status = %watchdog.status(),
                        "Heartbeat ended"
                    );
                    break;
                }
            }
        });
        Self { task }
    }

    /// Whether the task has ended.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancel the task.
    pub fn stop(self) {
        self.task.abort();
    }
}

impl Drop for Heartbeat {
    fn drop(&mut self) {
        self.task.abort();
    }
}
