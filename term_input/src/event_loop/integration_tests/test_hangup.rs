// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{Continuation, EventLoop, FnMonitor, Readiness};
use pretty_assertions::assert_eq;
use rustix::pipe::pipe;
use std::{cell::Cell, os::fd::AsRawFd, rc::Rc, time::Duration};

#[test]
fn test_closed_writer_reports_hangup() {
    let (reader, writer) = pipe().unwrap();
    let seen = Rc::new(Cell::new(Readiness::NONE));
    let seen_clone = Rc::clone(&seen);

    let mut event_loop = EventLoop::new().unwrap();
    let id = event_loop
        .register(Box::new(FnMonitor::new(
            reader.as_raw_fd(),
            (),
            move |_context, readiness, control| {
                seen_clone.set(seen_clone.get() | readiness);
                if let Some(id) = control.current_monitor() {
                    control.unregister(id);
                }
                Continuation::Continue
            },
        )))
        .unwrap();

    drop(writer);
    assert_eq!(event_loop.run_once(Some(Duration::from_millis(500))).unwrap(), 1);

    assert!(seen.get().is_hangup(), "{:?}", seen.get());
    assert!(!event_loop.contains(id));
}
