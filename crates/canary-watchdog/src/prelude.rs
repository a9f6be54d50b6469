//! Prelude for canary-watchdog.
//!
//! This module re-exports the most commonly used types for convenient importing.
//!
//! # Example
//!
//! ```rust
//! use canary_watchdog::prelude::*;
//!
//! let registry = WatchdogRegistry::default();
//! assert_eq!(registry.mode(), RegistryMode::SingleInstance);
//! assert_eq!(registry.active_count(), 0);
//! ```

pub use crate::error::{WatchdogError, WatchdogResult};
pub use crate::instance::{HandleId, WatchdogHandle};
pub use crate::options::{WatchdogOptions, WatchdogOptionsBuilder};
pub use crate::registry::{RegistryMode, WatchdogRegistry};
pub use crate::state::WatchdogStatus;
pub use crate::trigger::{ProcessTrigger, StallEvent, TriggerAction};
