//! Registry of active watchdog instances.
//!
//! The registry owns each instance's monitor thread from `start` until
//! `stop`. Its map lock is only taken by `start` and `stop`; `ping` and the
//! monitor threads never touch it.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::JoinHandle;

use crate::error::{WatchdogError, WatchdogResult};
use crate::instance::{HandleId, WatchdogHandle};
use crate::monitor;
use crate::options::WatchdogOptions;
use crate::state::WatchdogStatus;
use crate::trigger::{ProcessTrigger, TriggerAction};

/// How many instances may run at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RegistryMode {
    /// At most one running instance; further starts fail with `AlreadyRunning`.
    #[default]
    SingleInstance,
    /// Any number of instances, each with a unique handle.
    MultiInstance,
}

struct Entry {
    handle: WatchdogHandle,
    monitor: JoinHandle<()>,
}

/// Registry of running watchdog instances.
///
/// # Example
///
/// ```rust
/// use canary_watchdog::prelude::*;
///
/// let registry = WatchdogRegistry::new(RegistryMode::SingleInstance);
/// let options = WatchdogOptions::builder()
///     .timeout_ms(5_000)
///     .ping_interval_ms(500)
///     .terminate_on_trigger(false)
///     .build()?;
///
/// let handle = registry.start(options)?;
/// registry.ping(&handle)?;
/// assert!(!registry.stop(&handle)?);
/// # Ok::<(), WatchdogError>(())
/// ```
pub struct WatchdogRegistry {
    mode: RegistryMode,
    slot_occupied: AtomicBool,
    next_id: AtomicU64,
    instances: Mutex<HashMap<HandleId, Entry>>,
    action: Arc<dyn TriggerAction>,
}

impl WatchdogRegistry {
    /// Create a registry whose instances use [`ProcessTrigger`].
    #[must_use]
    pub fn new(mode: RegistryMode) -> Self {
        Self::with_trigger_action(mode, ProcessTrigger)
    }

    /// Create a registry whose instances fire `action` instead of the
    /// process trigger.
    #[must_use]
    pub fn with_trigger_action(mode: RegistryMode, action: impl TriggerAction + 'static) -> Self {
        Self {
            mode,
            slot_occupied: AtomicBool::new(false),
            next_id: AtomicU64::new(1),
            instances: Mutex::new(HashMap::new()),
            action: Arc::new(action),
        }
    }

    /// Registry admission mode.
    #[must_use]
    pub fn mode(&self) -> RegistryMode {
        self.mode
    }

    /// Start a new watchdog instance.
    ///
    /// The deadline starts at `now + options.timeout`; the caller must ping
    /// before it passes.
    ///
    /// # Errors
    ///
    /// - [`WatchdogError::InvalidOptions`] if the options fail validation.
    /// - [`WatchdogError::AlreadyRunning`] if this is a single-instance
    ///   registry and an instance is running.
    /// - [`WatchdogError::SpawnFailed`] if the monitor thread could not be created.
    pub fn start(&self, options: WatchdogOptions) -> WatchdogResult<WatchdogHandle> {
        options.validate()?;
        self.claim_slot()?;

        if !options.ping_fits_timeout() {
            tracing::debug!(
                timeout_ms = options.timeout.as_millis(),
                ping_interval_ms = options.ping_interval.as_millis(),
                "Ping interval is not shorter than the timeout"
            );
        }

        let id = HandleId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let handle = WatchdogHandle::start(id, options);

        let monitor = match monitor::spawn(Arc::clone(handle.instance()), Arc::clone(&self.action))
        {
            Ok(monitor) => monitor,
            Err(e) => {
                self.release_slot();
                tracing::error!(
                    handle = %id,
                    error = %e,
                    "Failed to spawn watchdog monitor thread"
                );
                return Err(WatchdogError::spawn_failed(e.to_string()));
            }
        };

        self.instances.lock().insert(
            id,
            Entry {
                handle: handle.clone(),
                monitor,
            },
        );

        tracing::info!(
            handle = %id,
            timeout_ms = handle.options().timeout.as_millis(),
            terminate = handle.options().terminate_on_trigger,
            "Watchdog started"
        );
        Ok(handle)
    }

    /// Renew the deadline of `handle`.
    ///
    /// Lock-free; see [`WatchdogHandle::ping`].
    ///
    /// # Errors
    ///
    /// Returns [`WatchdogError::NotRunning`] if the instance is not running.
    pub fn ping(&self, handle: &WatchdogHandle) -> WatchdogResult<()> {
        handle.ping()
    }

    /// Stop `handle` and wait for its monitor thread to exit.
    ///
    /// If the watchdog is firing concurrently, this waits until the trigger
    /// action has returned. Returns whether the watchdog had triggered.
    ///
    /// # Errors
    ///
    /// Returns [`WatchdogError::NotRunning`] if the handle does not belong to
    /// this registry or has already been stopped.
    pub fn stop(&self, handle: &WatchdogHandle) -> WatchdogResult<bool> {
        let entry = {
            let mut instances = self.instances.lock();
            let owned = instances
                .get(&handle.id())
                .is_some_and(|entry| entry.handle.same_instance(handle));
            if !owned {
                return Err(WatchdogError::NotRunning);
            }
            instances.remove(&handle.id())
        };
        let Some(entry) = entry else {
            return Err(WatchdogError::NotRunning);
        };

        let triggered = shutdown(entry);
        self.release_slot();

        tracing::info!(handle = %handle.id(), triggered, "Watchdog stopped");
        Ok(triggered)
    }

    /// Whether `handle` is registered here and has not been stopped.
    #[must_use]
    pub fn is_active(&self, handle: &WatchdogHandle) -> bool {
        self.instances
            .lock()
            .get(&handle.id())
            .is_some_and(|entry| entry.handle.same_instance(handle))
    }

    /// Number of instances started and not yet stopped.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.instances.lock().len()
    }

    fn claim_slot(&self) -> WatchdogResult<()> {
        if self.mode == RegistryMode::MultiInstance {
            return Ok(());
        }
        let claimed = self
            .slot_occupied
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if claimed {
            Ok(())
        } else {
            Err(WatchdogError::AlreadyRunning)
        }
    }

    fn release_slot(&self) {
        if self.mode == RegistryMode::SingleInstance {
            self.slot_occupied.store(false, Ordering::Release);
        }
    }
}

/// Move the instance to `Stopped`, wake its monitor and join it.
fn shutdown(entry: Entry) -> bool {
    let Entry { handle, monitor } = entry;

    let previous = handle
        .instance()
        .state
        .stop()
        .unwrap_or(WatchdogStatus::Stopped);

    monitor.thread().unpark();
    if monitor.join().is_err() {
        tracing::error!(handle = %handle.id(), "Watchdog monitor thread panicked");
    }

    previous == WatchdogStatus::Triggered
}

impl Default for WatchdogRegistry {
    fn default() -> Self {
        Self::new(RegistryMode::default())
    }
}

impl Drop for WatchdogRegistry {
    fn drop(&mut self) {
        let entries: Vec<Entry> = self.instances.get_mut().drain().map(|(_, e)| e).collect();
        for entry in entries {
            let id = entry.handle.id();
            let triggered = shutdown(entry);
            tracing::warn!(handle = %id, triggered, "Watchdog stopped by registry drop");
        }
    }
}

impl std::fmt::Debug for WatchdogRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchdogRegistry")
            .field("mode", &self.mode)
            .field("active", &self.instances.lock().len())
            .field("slot_occupied", &self.slot_occupied.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}
