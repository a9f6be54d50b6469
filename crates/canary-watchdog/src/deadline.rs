//! Lock-free monotonic deadline.
//!
//! The deadline is kept as nanoseconds since an `Instant` captured when the
//! cell was created, so it fits in a single `AtomicU64` and is immune to
//! wall-clock adjustments.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

fn saturating_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

/// A single monotonic timestamp shared between the pinging thread and the
/// monitor thread.
///
/// # RT Safety
///
/// `renew()` and every read are a clock read plus one atomic operation:
/// no locks, no allocation.
#[derive(Debug)]
pub struct DeadlineCell {
    origin: Instant,
    deadline_ns: AtomicU64,
}

impl DeadlineCell {
    /// Create a cell whose deadline is `timeout` from now.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            origin: Instant::now(),
            deadline_ns: AtomicU64::new(saturating_nanos(timeout)),
        }
    }

    /// Nanoseconds elapsed since the cell was created.
    #[must_use]
    pub fn now_ns(&self) -> u64 {
        saturating_nanos(self.origin.elapsed())
    }

    /// Current deadline, in nanoseconds since the cell was created.
    #[must_use]
    pub fn deadline_ns(&self) -> u64 {
        self.deadline_ns.load(Ordering::Acquire)
    }

    /// Move the deadline to `timeout` from now.
    pub fn renew(&self, timeout: Duration) {
        let deadline = self.now_ns().saturating_add(saturating_nanos(timeout));
        self.deadline_ns.store(deadline, Ordering::Release);
    }

    /// Time left until the deadline, or `None` once `now` is strictly past it.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        let deadline = self.deadline_ns();
        let now = self.now_ns();
        if now > deadline {
            None
        } else {
            Some(Duration::from_nanos(deadline.saturating_sub(now)))
        }
    }

    /// Time since the deadline was last set, given the `timeout` it was set with.
    #[must_use]
    pub fn since_renewal(&self, timeout: Duration) -> Duration {
        let renewed_at = self.deadline_ns().saturating_sub(saturating_nanos(timeout));
        Duration::from_nanos(self.now_ns().saturating_sub(renewed_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_fresh_cell_has_full_timeout() {
        let cell = DeadlineCell::new(Duration::from_secs(10));
        let remaining = cell.remaining();
        assert!(remaining.is_some_and(|r| r > Duration::from_secs(9)));
    }

    #[test]
    fn test_expires_after_timeout() {
        let cell = DeadlineCell::new(Duration::from_millis(5));
        thread::sleep(Duration::from_millis(20));
        assert!(cell.remaining().is_none());
        assert!(cell.since_renewal(Duration::from_millis(5)) >= Duration::from_millis(20));
    }

    #[test]
    fn test_renew_pushes_deadline_forward() {
        let cell = DeadlineCell::new(Duration::from_millis(5));
        thread::sleep(Duration::from_millis(20));
        let before = cell.deadline_ns();

        cell.renew(Duration::from_secs(10));

        assert!(cell.deadline_ns() > before);
        assert!(cell.remaining().is_some());
        assert!(cell.since_renewal(Duration::from_secs(10)) < Duration::from_secs(1));
    }

    #[test]
    fn test_huge_timeout_saturates() {
        let cell = DeadlineCell::new(Duration::MAX);
        assert_eq!(cell.deadline_ns(), u64::MAX);
        cell.renew(Duration::MAX);
        assert_eq!(cell.deadline_ns(), u64::MAX);
        assert!(cell.remaining().is_some());
    }
}
