//! Single-handle watchdog with an automatic heartbeat.

use canary_watchdog::{
    RegistryMode, WatchdogError, WatchdogHandle, WatchdogOptions, WatchdogRegistry, WatchdogStatus,
};
use parking_lot::Mutex;
use tokio::runtime::Handle;

use crate::error::CanaryResult;
use crate::heartbeat::Heartbeat;

struct Session {
    watchdog: WatchdogHandle,
    heartbeat: Heartbeat,
}

/// A watchdog that holds its own handle and pings itself from the current
/// tokio runtime.
///
/// # Example
///
/// ```rust
/// use canary::Canary;
/// use canary_watchdog::WatchdogOptions;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), canary::CanaryError> {
/// let canary = Canary::new();
/// canary.start(WatchdogOptions {
///     terminate_on_trigger: false,
///     ..Default::default()
/// })?;
///
/// // ... async work; the heartbeat keeps the watchdog fed ...
///
/// let triggered = canary.stop()?;
/// assert!(!triggered);
/// # Ok(())
/// # }
/// ```
pub struct Canary {
    registry: WatchdogRegistry,
    session: Mutex<Option<Session>>,
}

impl Canary {
    /// Create a canary backed by its own single-instance registry.
    #[must_use]
    pub fn new() -> Self {
        Self::with_registry(WatchdogRegistry::new(RegistryMode::SingleInstance))
    }

    /// Create a canary backed by `registry`, e.g. one with a custom trigger action.
    #[must_use]
    pub fn with_registry(registry: WatchdogRegistry) -> Self {
        Self {
            registry,
            session: Mutex::new(None),
        }
    }

    /// Start the watchdog and its heartbeat on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// - [`CanaryError::NoRuntime`](crate::CanaryError::NoRuntime) outside a tokio runtime.
    /// - `AlreadyRunning` if this canary is already started.
    /// - `InvalidOptions` / `SpawnFailed` from the underlying registry.
    pub fn start(&self, options: WatchdogOptions) -> CanaryResult<()> {
        let runtime = Handle::try_current()?;

        let mut session = self.session.lock();
        if session.is_some() {
            return Err(WatchdogError::AlreadyRunning.into());
        }

        let watchdog = self.registry.start(options)?;
        let heartbeat = Heartbeat::spawn(&runtime, watchdog.clone());
        *session = Some(Session {
            watchdog,
            heartbeat,
        });
        Ok(())
    }

    /// Stop the heartbeat and the watchdog. Returns whether the watchdog had
    /// triggered.
    ///
    /// Blocks until the monitor thread has exited, which is bounded by one
    /// wakeup plus any trigger action already in progress.
    ///
    /// # Errors
    ///
    /// Returns `NotRunning` if the canary was not started.
    pub fn stop(&self) -> CanaryResult<bool> {
        let Some(Session {
            watchdog,
            heartbeat,
        }) = self.session.lock().take()
        else {
            return Err(WatchdogError::NotRunning.into());
        };

        heartbeat.stop();
        Ok(self.registry.stop(&watchdog)?)
    }

    /// Handle of the running watchdog, for pinging by hand.
    ///
    /// Pinging through the returned handle is lock-free; prefer it over
    /// [`Canary::ping`] in a hot loop.
    #[must_use]
    pub fn handle(&self) -> Option<WatchdogHandle> {
        self.session
            .lock()
            .as_ref()
            .map(|session| session.watchdog.clone())
    }

    /// Ping the watchdog in addition to the heartbeat.
    ///
    /// # Errors
    ///
    /// Returns `NotRunning` if the canary was not started or has triggered.
    pub fn ping(&self) -> CanaryResult<()> {
        let watchdog = self.handle().ok_or(WatchdogError::NotRunning)?;
        Ok(watchdog.ping()?)
    }

    /// Whether the canary is started and has not triggered.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.session
            .lock()
            .as_ref()
            .is_some_and(|session| session.watchdog.status() == WatchdogStatus::Running)
    }
}

impl Default for Canary {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Canary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let session = self.session.lock();
        f.debug_struct("Canary")
            .field("registry", &self.registry)
            .field("watchdog", &session.as_ref().map(|s| &s.watchdog))
            .finish()
    }
}
