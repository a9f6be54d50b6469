//! # canary
//!
//! Convenience layer over [`canary_watchdog`]: one implicit watchdog per
//! [`Canary`], kept alive by a heartbeat task on the tokio runtime being
//! supervised. If that runtime stops polling tasks for longer than the
//! timeout, the watchdog fires.
//!
//! ## Example
//!
//! ```rust,no_run
//! use canary_watchdog::WatchdogOptions;
//! use std::time::Duration;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), canary::CanaryError> {
//!     canary::start(WatchdogOptions {
//!         timeout: Duration::from_secs(10),
//!         ping_interval: Duration::from_secs(1),
//!         ..Default::default()
//!     })?;
//!
//!     // A blocking call here that outlives the timeout ends the process
//!     // with exit status 87 and a FATAL diagnostic on stderr.
//!
//!     canary::stop()?;
//!     Ok(())
//! }
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

mod canary;
pub mod error;
mod global;
pub mod heartbeat;

pub use crate::canary::Canary;
pub use error::{CanaryError, CanaryResult};
pub use global::{is_running, start, stop};
pub use heartbeat::Heartbeat;
