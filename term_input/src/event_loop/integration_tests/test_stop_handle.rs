// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! [`LoopStopHandle`] is the only piece of the loop that crosses threads. Stopping
//! through it has to interrupt a wait that would otherwise block forever.
//!
//! [`LoopStopHandle`]: crate::LoopStopHandle

use crate::{Continuation, EventLoop, FnMonitor};
use pretty_assertions::assert_eq;
use rustix::pipe::pipe;
use std::{os::fd::AsRawFd,
          thread,
          time::{Duration, Instant}};

#[test]
fn test_stop_from_another_thread_wakes_a_blocked_run() {
    // Never written to: without the stop the loop would wait forever.
    let (reader, _writer) = pipe().unwrap();
    let mut event_loop = EventLoop::new().unwrap();
    event_loop
        .register(Box::new(FnMonitor::new(
            reader.as_raw_fd(),
            (),
            |_context, _readiness, _control| Continuation::Continue,
        )))
        .unwrap();

    let stop_handle = event_loop.stop_handle();
    let start = Instant::now();
    let stopper = thread::spawn(move || {
        thread::sleep(Duration::from_millis(30));
        stop_handle.stop();
    });

    event_loop.run().unwrap();
    stopper.join().unwrap();

    assert!(start.elapsed() >= Duration::from_millis(30));
    // Cleared on return, so the loop can be run again.
    assert!(!event_loop.is_stop_requested());
    assert_eq!(event_loop.len(), 1);
}

#[test]
fn test_stop_before_run_returns_immediately() {
    let (reader, _writer) = pipe().unwrap();
    let mut event_loop = EventLoop::new().unwrap();
    event_loop
        .register(Box::new(FnMonitor::new(
            reader.as_raw_fd(),
            (),
            |_context, _readiness, _control| Continuation::Continue,
        )))
        .unwrap();

    event_loop.stop_handle().stop();
    event_loop.run().unwrap();
    assert!(!event_loop.is_stop_requested());
}

#[test]
fn test_stop_returned_from_trigger_ends_run() {
    let (reader, writer) = pipe().unwrap();
    rustix::io::write(&writer, b"x").unwrap();

    let mut event_loop = EventLoop::new().unwrap();
    event_loop
        .register(Box::new(FnMonitor::new(
            reader.as_raw_fd(),
            0_u32,
            |count, _readiness, _control| {
                *count += 1;
                Continuation::Stop
            },
        )))
        .unwrap();

    event_loop.run().unwrap();
    assert_eq!(event_loop.len(), 1);
}
