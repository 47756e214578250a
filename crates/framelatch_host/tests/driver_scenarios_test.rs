//! Integration tests: frame driver scenarios end to end.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use framelatch_core::{DrainOutcome, FrameAction, ReentryPolicy};
use framelatch_host::{FrameDriver, FramelatchConfig};
use parking_lot::Mutex;

type Log = Arc<Mutex<Vec<(u64, &'static str)>>>;

/// Records `(frame, name)` using a frame counter shared with the test.
fn recording(log: &Log, frame: &Arc<Mutex<u64>>, name: &'static str) -> FrameAction {
    let log = Arc::clone(log);
    let frame = Arc::clone(frame);
    FrameAction::new(move || {
        let at = *frame.lock();
        log.lock().push((at, name));
    })
}

fn config(reentry: ReentryPolicy) -> FramelatchConfig {
    FramelatchConfig::from_toml_str(&format!(
        "[coalescer]\nreentry = \"{}\"\n[frame_loop]\ntick_rate = 1000\n",
        match reentry {
            ReentryPolicy::NextDrain => "next_drain",
            ReentryPolicy::SamePass => "same_pass",
        }
    ))
    .unwrap()
}

#[test]
fn test_a_b_a_runs_a_then_b_at_frame_boundary() {
    let mut driver = FrameDriver::new(&config(ReentryPolicy::NextDrain)).unwrap();
    let log = Log::default();
    let frame = Arc::new(Mutex::new(0));
    let a = recording(&log, &frame, "a");
    let b = recording(&log, &frame, "b");

    driver.step(|ctx| {
        *frame.lock() = ctx.frame;
        ctx.request_once_per_frame(&a);
        ctx.request_once_per_frame(&b);
        ctx.request_once_per_frame(&a);
        assert!(log.lock().is_empty());
    });

    assert_eq!(*log.lock(), vec![(0u64, "a"), (0u64, "b")]);
}

#[test]
fn test_reentrant_request_policies() {
    for (reentry, expected) in [
        (ReentryPolicy::NextDrain, vec![(0u64, "a"), (1u64, "c")]),
        (ReentryPolicy::SamePass, vec![(0u64, "a"), (0u64, "c")]),
    ] {
        let mut driver = FrameDriver::new(&config(reentry)).unwrap();
        let log = Log::default();
        let frame = Arc::new(Mutex::new(0));
        let c = recording(&log, &frame, "c");

        let a = {
            let log = Arc::clone(&log);
            let frame = Arc::clone(&frame);
            let coalescer = driver.coalescer();
            FrameAction::new(move || {
                log.lock().push((*frame.lock(), "a"));
                coalescer.request_once_per_frame(&c);
            })
        };

        driver.step(|ctx| {
            *frame.lock() = ctx.frame;
            ctx.request_once_per_frame(&a);
        });
        driver.step(|ctx| *frame.lock() = ctx.frame);

        assert_eq!(*log.lock(), expected, "{reentry:?}");
        assert_eq!(driver.step(|_| {}).outcome, DrainOutcome::Idle);
    }
}

#[test]
fn test_stop_from_another_thread() {
    let mut driver = FrameDriver::new(&config(ReentryPolicy::NextDrain)).unwrap();
    let handle = driver.handle();

    let stopper = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        handle.stop()
    });

    let frames = driver.run(|_| {});

    assert!(stopper.join().unwrap());
    assert!(frames > 0);
    assert!(!driver.run_flag().is_running());
}

#[test]
fn test_handle_after_driver_dropped() {
    let driver = FrameDriver::new(&FramelatchConfig::default()).unwrap();
    let handle = driver.handle();
    drop(driver);
    assert!(!handle.stop());
}
