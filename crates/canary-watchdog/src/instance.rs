//! Watchdog instances and the handles that reference them.

use std::sync::Arc;
use std::time::Duration;

use crate::deadline::DeadlineCell;
use crate::error::{WatchdogError, WatchdogResult};
use crate::options::WatchdogOptions;
use crate::state::{WatchdogState, WatchdogStatus};

/// Opaque identifier of a watchdog instance, unique within its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(u64);

impl HandleId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw numeric value.
    #[must_use]
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for HandleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cells shared by the caller and the monitor thread. Only atomics cross
/// the thread boundary.
#[derive(Debug)]
pub(crate) struct Instance {
    pub(crate) id: HandleId,
    pub(crate) options: WatchdogOptions,
    pub(crate) state: WatchdogState,
    pub(crate) deadline: DeadlineCell,
}

impl Instance {
    fn new(id: HandleId, options: WatchdogOptions) -> Self {
        let deadline = DeadlineCell::new(options.timeout);
        Self {
            id,
            options,
            state: WatchdogState::new(),
            deadline,
        }
    }

    /// Time since the last ping, or since start if never pinged.
    pub(crate) fn stalled_for(&self) -> Duration {
        self.deadline.since_renewal(self.options.timeout)
    }
}

/// Handle to a started watchdog instance.
///
/// Cloning is cheap; every clone refers to the same instance. Pinging goes
/// straight to the instance's atomic deadline and never touches the registry.
#[derive(Clone)]
pub struct WatchdogHandle {
    instance: Arc<Instance>,
}

impl WatchdogHandle {
    pub(crate) fn start(id: HandleId, options: WatchdogOptions) -> Self {
        Self {
            instance: Arc::new(Instance::new(id, options)),
        }
    }

    pub(crate) fn instance(&self) -> &Arc<Instance> {
        &self.instance
    }

    /// Whether both handles refer to the same instance.
    #[must_use]
    pub fn same_instance(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.instance, &other.instance)
    }

    /// Identifier of the instance.
    #[must_use]
    pub fn id(&self) -> HandleId {
        self.instance.id
    }

    /// Current lifecycle status.
    #[must_use]
    pub fn status(&self) -> WatchdogStatus {
        self.instance.state.status()
    }

    /// Options the instance was started with.
    #[must_use]
    pub fn options(&self) -> &WatchdogOptions {
        &self.instance.options
    }

    /// Time left before the watchdog fires, or `None` once the deadline has passed.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.instance.deadline.remaining()
    }

    /// Renew the deadline to `timeout` from now.
    ///
    /// # RT Safety
    ///
    /// One atomic load, one clock read and one atomic store. Never blocks,
    /// including while the monitor is sleeping or firing its trigger.
    ///
    /// # Errors
    ///
    /// Returns [`WatchdogError::NotRunning`] if the instance has triggered or
    /// been stopped; nothing is changed in that case.
    pub fn ping(&self) -> WatchdogResult<()> {
        if !self.instance.state.is_running() {
            return Err(WatchdogError::NotRunning);
        }
        self.instance.deadline.renew(self.instance.options.timeout);
        Ok(())
    }
}

impl std::fmt::Debug for WatchdogHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchdogHandle")
            .field("id", &self.instance.id)
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}
