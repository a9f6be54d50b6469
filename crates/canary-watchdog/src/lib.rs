//! # canary-watchdog
//!
//! Liveness watchdog engine: detects when a program's main execution context
//! stops making progress and, if it does not recover in time, reports the
//! stall and ends the process.
//!
//! The default trigger prints a diagnostic to stderr and exits with status 87.
//!
//! ## Guarantees
//!
//! - **Independent monitor**: each instance owns a dedicated OS thread that
//!   only reads atomics, so a busy loop or blocking call in the supervised
//!   context cannot hold it up.
//! - **Non-blocking ping**: renewing the deadline is one clock read and one
//!   atomic store, with no lock and no allocation.
//! - **Race-free outcome**: trigger and stop race on a single
//!   compare-and-exchange; `stop` reports exactly what happened.
//! - **Monotonic time**: deadlines use `Instant`, never the wall clock.
//!
//! ## Architecture
//!
//! - [`options`] - Validated, serde-friendly instance options
//! - [`deadline`] - Lock-free monotonic deadline cell
//! - [`state`] - Running / Triggered / Stopped state machine
//! - [`instance`] - Instances and the handles that reference them
//! - [`trigger`] - Stall events and the action run when one is detected
//! - [`registry`] - Start/stop bookkeeping and single-instance admission
//! - [`error`] - Watchdog-specific error types
//!
//! ## Example
//!
//! ```rust
//! use canary_watchdog::prelude::*;
//! use std::time::Duration;
//!
//! let registry = WatchdogRegistry::new(RegistryMode::SingleInstance);
//! let handle = registry.start(WatchdogOptions {
//!     timeout: Duration::from_secs(2),
//!     ping_interval: Duration::from_millis(200),
//!     terminate_on_trigger: false,
//!     ..Default::default()
//! })?;
//!
//! // From the supervised context, at least once per timeout:
//! handle.ping()?;
//!
//! let triggered = registry.stop(&handle)?;
//! assert!(!triggered);
//! # Ok::<(), WatchdogError>(())
//! ```

#![deny(
    unsafe_op_in_unsafe_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::panic,
    missing_docs,
    missing_debug_implementations
)]
#![warn(clippy::pedantic)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod deadline;
pub mod error;
pub mod instance;
mod monitor;
pub mod options;
pub mod registry;
pub mod state;
pub mod trigger;

pub mod prelude;

pub use deadline::DeadlineCell;
pub use error::{WatchdogError, WatchdogResult};
pub use instance::{HandleId, WatchdogHandle};
pub use options::{WatchdogOptions, WatchdogOptionsBuilder};
pub use registry::{RegistryMode, WatchdogRegistry};
pub use state::{WatchdogState, WatchdogStatus};
pub use trigger::{ProcessTrigger, StallEvent, TriggerAction};
