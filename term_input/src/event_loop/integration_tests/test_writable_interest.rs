// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{Continuation, EventLoop, FnMonitor, Readiness};
use mio::Interest;
use pretty_assertions::assert_eq;
use rustix::pipe::pipe;
use std::{cell::Cell, os::fd::AsRawFd, rc::Rc, time::Duration};

#[test]
fn test_empty_pipe_write_end_is_reported_writable() {
    let (_reader, writer) = pipe().unwrap();
    let seen = Rc::new(Cell::new(Readiness::NONE));
    let seen_clone = Rc::clone(&seen);

    let mut event_loop = EventLoop::new().unwrap();
    event_loop
        .register(Box::new(
            FnMonitor::new(writer.as_raw_fd(), (), move |_context, readiness, _control| {
                seen_clone.set(seen_clone.get() | readiness);
                Continuation::Continue
            })
            .with_interest(Interest::WRITABLE),
        ))
        .unwrap();

    assert_eq!(event_loop.run_once(Some(Duration::from_millis(500))).unwrap(), 1);
    assert!(seen.get().is_writable(), "{:?}", seen.get());
    assert!(!seen.get().is_readable());
}
