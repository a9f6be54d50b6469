//! Concurrency tests for the watchdog registry.

use canary_watchdog::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn quiet(timeout_ms: u64) -> WatchdogOptions {
    WatchdogOptions {
        timeout: Duration::from_millis(timeout_ms),
        ping_interval: Duration::from_millis(timeout_ms / 5 + 1),
        terminate_on_trigger: false,
        print_on_trigger: false,
        ..Default::default()
    }
}

fn counting_registry(mode: RegistryMode) -> (Arc<WatchdogRegistry>, Arc<AtomicUsize>) {
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fired);
    let registry = WatchdogRegistry::with_trigger_action(mode, move |_: &StallEvent| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    (Arc::new(registry), fired)
}

#[test]
fn test_concurrent_starts_admit_exactly_one() -> TestResult {
    let (registry, _) = counting_registry(RegistryMode::SingleInstance);
    let barrier = Arc::new(Barrier::new(8));
    let mut threads = vec![];

    for _ in 0..8 {
        let registry = Arc::clone(&registry);
        let barrier = Arc::clone(&barrier);
        threads.push(thread::spawn(move || {
            barrier.wait();
            registry.start(quiet(10_000))
        }));
    }

    let mut admitted = vec![];
    let mut rejected = 0;
    for t in threads {
        match t.join() {
            Ok(Ok(handle)) => admitted.push(handle),
            Ok(Err(WatchdogError::AlreadyRunning)) => rejected += 1,
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => return Err("start thread panicked".into()),
        }
    }

    assert_eq!(admitted.len(), 1);
    assert_eq!(rejected, 7);
    assert_eq!(registry.active_count(), 1);

    for handle in &admitted {
        registry.stop(handle)?;
    }
    Ok(())
}

#[test]
fn test_pings_from_many_threads() -> TestResult {
    let (registry, fired) = counting_registry(RegistryMode::SingleInstance);
    let handle = registry.start(quiet(200))?;
    let mut threads = vec![];

    for _ in 0..4 {
        let handle = handle.clone();
        threads.push(thread::spawn(move || -> WatchdogResult<()> {
            let started = Instant::now();
            while started.elapsed() < Duration::from_millis(600) {
                handle.ping()?;
                thread::sleep(Duration::from_millis(20));
            }
            Ok(())
        }));
    }

    for t in threads {
        assert!(matches!(t.join(), Ok(Ok(()))), "Pinger should not fail");
    }

    assert!(!registry.stop(&handle)?);
    assert_eq!(fired.load(Ordering::SeqCst), 0);
    Ok(())
}

#[test]
fn test_stop_racing_trigger_reports_outcome() -> TestResult {
    let (registry, fired) = counting_registry(RegistryMode::MultiInstance);

    let mut reported = 0;
    for round in 0..20u64 {
        let handle = registry.start(quiet(20))?;
        // Land the stop right around the deadline.
        thread::sleep(Duration::from_millis(18 + round % 5));
        if registry.stop(&handle)? {
            reported += 1;
        }
        assert_eq!(handle.status(), WatchdogStatus::Stopped);
    }

    // Every reported trigger ran its action before stop returned, and no
    // action ran for an instance that stop won.
    assert_eq!(fired.load(Ordering::SeqCst), reported);
    Ok(())
}

#[test]
fn test_stop_waits_for_running_trigger_action() -> TestResult {
    let entered = Arc::new(Barrier::new(2));
    let finished = Arc::new(AtomicUsize::new(0));
    let (action_entered, action_finished) = (Arc::clone(&entered), Arc::clone(&finished));

    let registry = WatchdogRegistry::with_trigger_action(
        RegistryMode::SingleInstance,
        move |_: &StallEvent| {
            action_entered.wait();
            thread::sleep(Duration::from_millis(100));
            action_finished.fetch_add(1, Ordering::SeqCst);
        },
    );

    let handle = registry.start(quiet(20))?;
    entered.wait();

    assert!(registry.stop(&handle)?);
    assert_eq!(finished.load(Ordering::SeqCst), 1);
    Ok(())
}

#[test]
fn test_independent_instances() -> TestResult {
    let (registry, fired) = counting_registry(RegistryMode::MultiInstance);

    let stalled = registry.start(quiet(30))?;
    let healthy = registry.start(quiet(300))?;

    for _ in 0..10 {
        thread::sleep(Duration::from_millis(30));
        healthy.ping()?;
    }

    assert_eq!(stalled.status(), WatchdogStatus::Triggered);
    assert_eq!(healthy.status(), WatchdogStatus::Running);
    assert!(registry.stop(&stalled)?);
    assert!(!registry.stop(&healthy)?);
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    Ok(())
}

#[test]
fn test_blocked_context_is_detected() -> TestResult {
    let (registry, fired) = counting_registry(RegistryMode::SingleInstance);
    let handle = registry.start(quiet(100))?;

    // A supervised context that pings, then blocks in a synchronous call.
    let supervised = {
        let handle = handle.clone();
        thread::spawn(move || -> WatchdogResult<()> {
            for _ in 0..5 {
                handle.ping()?;
                thread::sleep(Duration::from_millis(20));
            }
            thread::sleep(Duration::from_millis(400));
            Ok(())
        })
    };

    assert!(matches!(supervised.join(), Ok(Ok(()))), "Supervised thread should not fail");
    assert!(registry.stop(&handle)?);
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    Ok(())
}
