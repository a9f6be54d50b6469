//! Monitor loop.
//!
//! One OS thread per instance. The thread only ever touches the instance's
//! atomics and parks between checks; `stop` unparks it. It never takes a lock,
//! so nothing the supervised context does can block it.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::instance::Instance;
use crate::trigger::{StallEvent, TriggerAction};

/// Spawn the monitor thread for `instance`.
pub(crate) fn spawn(
    instance: Arc<Instance>,
    action: Arc<dyn TriggerAction>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name(format!("canary-watchdog-{}", instance.id))
        .spawn(move || run(&instance, action.as_ref()))
}

fn run(instance: &Instance, action: &dyn TriggerAction) {
    tracing::debug!(handle = %instance.id, "Monitor loop started");

    while instance.state.is_running() {
        let now = instance.deadline.now_ns();
        let deadline = instance.deadline.deadline_ns();

        if now <= deadline {
            let remaining = Duration::from_nanos(deadline.saturating_sub(now));
            tracing::debug!(
                handle = %instance.id,
                remaining_ms = remaining.as_millis(),
                "Monitor sleeping until deadline"
            );
            // Any wakeup re-checks state and deadline.
            thread::park_timeout(remaining);
            continue;
        }

        if instance.state.trigger() {
            fire(instance, action);
        }
        break;
    }

    tracing::debug!(
        handle = %instance.id,
        status = %instance.state.status(),
        "Monitor loop exited"
    );
}

fn fire(instance: &Instance, action: &dyn TriggerAction) {
    let event = StallEvent {
        handle: instance.id,
        stalled_for: instance.stalled_for(),
        options: instance.options.clone(),
    };

    tracing::warn!(
        handle = %event.handle,
        timeout_ms = event.options.timeout.as_millis(),
        stalled_ms = event.stalled_for.as_millis(),
        "Watchdog deadline expired"
    );

    action.fire(&event);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{HandleId, WatchdogHandle};
    use crate::options::WatchdogOptions;
    use crate::state::WatchdogStatus;
    use parking_lot::Mutex;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn quiet(timeout_ms: u64) -> WatchdogOptions {
        WatchdogOptions {
            timeout: Duration::from_millis(timeout_ms),
            ping_interval: Duration::from_millis(timeout_ms / 4 + 1),
            terminate_on_trigger: false,
            print_on_trigger: false,
            ..Default::default()
        }
    }

    fn recorder() -> (Arc<Mutex<Vec<StallEvent>>>, Arc<dyn TriggerAction>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let action: Arc<dyn TriggerAction> =
            Arc::new(move |event: &StallEvent| sink.lock().push(event.clone()));
        (events, action)
    }

    #[test]
    fn test_fires_once_after_expiry() -> TestResult {
        let handle = WatchdogHandle::start(HandleId::new(1), quiet(30));
        let (events, action) = recorder();

        let monitor = spawn(Arc::clone(handle.instance()), action)?;
        assert!(matches!(monitor.join(), Ok(())), "Monitor should not panic");

        assert_eq!(handle.status(), WatchdogStatus::Triggered);
        let events = events.lock();
        assert_eq!(events.len(), 1);
        let event = events.first().ok_or("missing event")?;
        assert!(event.stalled_for > Duration::from_millis(30));
        Ok(())
    }

    #[test]
    fn test_stop_wakes_sleeping_monitor() -> TestResult {
        let handle = WatchdogHandle::start(HandleId::new(2), quiet(60_000));
        let (events, action) = recorder();

        let monitor = spawn(Arc::clone(handle.instance()), action)?;
        thread::sleep(Duration::from_millis(20));

        handle.instance().state.stop()?;
        monitor.thread().unpark();
        assert!(matches!(monitor.join(), Ok(())), "Monitor should not panic");

        assert!(events.lock().is_empty());
        Ok(())
    }

    #[test]
    fn test_ping_defers_trigger() -> TestResult {
        let handle = WatchdogHandle::start(HandleId::new(3), quiet(100));
        let (events, action) = recorder();
        let monitor = spawn(Arc::clone(handle.instance()), action)?;

        for _ in 0..10 {
            thread::sleep(Duration::from_millis(25));
            handle.ping()?;
        }
        assert!(events.lock().is_empty());
        assert_eq!(handle.status(), WatchdogStatus::Running);

        handle.instance().state.stop()?;
        monitor.thread().unpark();
        assert!(matches!(monitor.join(), Ok(())), "Monitor should not panic");
        assert!(events.lock().is_empty());
        Ok(())
    }
}
