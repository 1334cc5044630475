// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! A monitor may unregister itself or any other monitor from inside its trigger. The
//! removal takes effect for the rest of the pass (a removed monitor that has not fired
//! yet is skipped) and the registry shrinks once the pass is over.

use crate::{Continuation, EventLoop, FnMonitor, MonitorId};
use pretty_assertions::assert_eq;
use rustix::{io::write, pipe::pipe};
use std::{cell::{Cell, RefCell},
          os::fd::{AsRawFd, OwnedFd},
          rc::Rc,
          time::Duration};

const WAIT: Option<Duration> = Some(Duration::from_millis(500));

type Log = Rc<RefCell<Vec<&'static str>>>;
type Target = Rc<Cell<Option<MonitorId>>>;

/// Three pipes with one byte each. Keep the writers alive for the whole test.
fn three_ready_pipes() -> (Vec<OwnedFd>, Vec<OwnedFd>) {
    let mut readers = vec![];
    let mut writers = vec![];
    for _ in 0..3 {
        let (reader, writer) = pipe().unwrap();
        write(&writer, b"x").unwrap();
        readers.push(reader);
        writers.push(writer);
    }
    (readers, writers)
}

/// Logs `label` when triggered and unregisters `target` (if set) plus itself when
/// `remove_self` is on.
fn remover(
    fd: &OwnedFd,
    label: &'static str,
    log: &Log,
    target: &Target,
    remove_self: bool,
) -> Box<FnMonitor<()>> {
    let log = Rc::clone(log);
    let target = Rc::clone(target);
    Box::new(FnMonitor::new(fd.as_raw_fd(), (), move |_context, _readiness, control| {
        log.borrow_mut().push(label);
        if let Some(id) = target.get() {
            control.unregister(id);
        }
        if remove_self && let Some(id) = control.current_monitor() {
            control.unregister(id);
        }
        Continuation::Continue
    }))
}

#[test]
fn test_self_removal_does_not_skip_later_monitors() {
    let (readers, _writers) = three_ready_pipes();
    let log = Log::default();
    let none = Target::default();
    let mut event_loop = EventLoop::new().unwrap();

    let first = event_loop
        .register(remover(&readers[0], "first", &log, &none, true))
        .unwrap();
    let second = event_loop
        .register(remover(&readers[1], "second", &log, &none, false))
        .unwrap();
    let third = event_loop
        .register(remover(&readers[2], "third", &log, &none, false))
        .unwrap();

    assert_eq!(event_loop.run_once(WAIT).unwrap(), 3);
    assert_eq!(*log.borrow(), vec!["first", "second", "third"]);

    assert!(!event_loop.contains(first));
    assert!(event_loop.contains(second));
    assert!(event_loop.contains(third));
    assert_eq!(event_loop.len(), 2);
}

#[test]
fn test_removing_a_later_monitor_skips_it_this_pass() {
    let (readers, _writers) = three_ready_pipes();
    let log = Log::default();
    let target = Target::default();
    let none = Target::default();
    let mut event_loop = EventLoop::new().unwrap();

    event_loop
        .register(remover(&readers[0], "first", &log, &target, false))
        .unwrap();
    let second = event_loop
        .register(remover(&readers[1], "second", &log, &none, false))
        .unwrap();
    let third = event_loop
        .register(remover(&readers[2], "third", &log, &none, false))
        .unwrap();
    target.set(Some(third));

    assert_eq!(event_loop.run_once(WAIT).unwrap(), 2);
    assert_eq!(*log.borrow(), vec!["first", "second"]);
    assert!(event_loop.contains(second));
    assert!(!event_loop.contains(third));
}

#[test]
fn test_removing_an_earlier_monitor_applies_after_the_pass() {
    let (readers, _writers) = three_ready_pipes();
    let log = Log::default();
    let target = Target::default();
    let none = Target::default();
    let mut event_loop = EventLoop::new().unwrap();

    let first = event_loop
        .register(remover(&readers[0], "first", &log, &none, false))
        .unwrap();
    event_loop
        .register(remover(&readers[1], "second", &log, &none, false))
        .unwrap();
    event_loop
        .register(remover(&readers[2], "third", &log, &target, false))
        .unwrap();
    target.set(Some(first));

    assert_eq!(event_loop.run_once(WAIT).unwrap(), 3);
    assert_eq!(*log.borrow(), vec!["first", "second", "third"]);
    assert!(!event_loop.contains(first));
    assert_eq!(event_loop.len(), 2);
}

#[test]
fn test_removing_every_monitor_ends_run() {
    let (readers, _writers) = three_ready_pipes();
    let log = Log::default();
    let none = Target::default();
    let mut event_loop = EventLoop::new().unwrap();

    for (reader, label) in readers.iter().zip(["first", "second", "third"]) {
        event_loop
            .register(remover(reader, label, &log, &none, true))
            .unwrap();
    }

    event_loop.run().unwrap();
    assert!(event_loop.is_empty());
    assert_eq!(*log.borrow(), vec!["first", "second", "third"]);
}
