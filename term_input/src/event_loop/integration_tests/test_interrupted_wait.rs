// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! A signal handled on the loop thread interrupts the OS wait. The loop retries with
//! what is left of the timeout instead of surfacing the interruption.

use crate::{Continuation, EventLoop, FnMonitor};
use pretty_assertions::assert_eq;
use rustix::pipe::pipe;
use serial_test::serial;
use signal_hook::consts::SIGUSR1;
use std::{os::fd::AsRawFd,
          sync::{Arc,
                 atomic::{AtomicBool, Ordering}},
          thread,
          time::{Duration, Instant}};

/// `pthread_t` is a pointer on some platforms.
struct LoopThread(libc::pthread_t);

// SAFETY: the id is only passed to `pthread_kill` while the loop thread is alive.
unsafe impl Send for LoopThread {}

#[test]
#[serial]
fn test_signal_during_wait_is_retried_until_timeout() {
    let delivered = Arc::new(AtomicBool::new(false));
    let signal_id = signal_hook::flag::register(SIGUSR1, Arc::clone(&delivered)).unwrap();

    let (reader, _writer) = pipe().unwrap();
    let mut event_loop = EventLoop::new().unwrap();
    event_loop
        .register(Box::new(FnMonitor::new(
            reader.as_raw_fd(),
            (),
            |_context, _readiness, _control| Continuation::Continue,
        )))
        .unwrap();

    // SAFETY: no preconditions.
    let loop_thread = LoopThread(unsafe { libc::pthread_self() });
    let signaller = thread::spawn(move || {
        // Capture the wrapper, not its field.
        let loop_thread = loop_thread;
        thread::sleep(Duration::from_millis(50));
        // SAFETY: the loop thread is blocked in `run_once` until after the join below.
        unsafe { libc::pthread_kill(loop_thread.0, SIGUSR1) }
    });

    let timeout = Duration::from_millis(300);
    let start = Instant::now();
    let result = event_loop.run_once(Some(timeout));
    let elapsed = start.elapsed();
    let kill_result = signaller.join().unwrap();
    signal_hook::low_level::unregister(signal_id);

    assert_eq!(kill_result, 0);
    assert!(delivered.load(Ordering::SeqCst));
    assert_eq!(result.unwrap(), 0);
    assert!(elapsed >= timeout, "returned early after {elapsed:?}");
}
